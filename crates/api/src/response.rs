//! Response bodies and the API error type.
//!
//! Every body carries `ok`. Errors render as `{ok: false, error, code}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use copy_agent::Provenance;
use landing_core::{
    AgentSettings, AgentVariantSuggestion, AnalyticsEvent, BucketStats, EventPage, LandingBuild,
    LandingPageSpec, PersonaPage, SimpleStats, Variant, VariantStats, Winner,
};
use serde::{Deserialize, Serialize};
use telemetry::{ComponentHealthReport, HealthStatus};
use tracing::error;

/// `POST /api/events`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub ok: bool,
    pub received: usize,
    pub ids: Vec<String>,
}

/// `GET /api/events`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub page: EventPage,
    /// Strict per-bucket totals over the whole window
    pub buckets: Vec<BucketStats>,
}

/// `GET /api/stats`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub ok: bool,
    pub stats: Vec<VariantStats>,
    pub buckets: Vec<BucketStats>,
    pub winner: Option<Winner>,
    pub rule: String,
    pub sessions: usize,
    pub window_size: usize,
    pub recent: Vec<AnalyticsEvent>,
}

/// `GET /api/agent`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub ok: bool,
    pub stats: Vec<SimpleStats>,
    pub suggestion: AgentVariantSuggestion,
    #[serde(flatten)]
    pub provenance: Provenance,
    /// Variant persisted by auto mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_variant: Option<Variant>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantsResponse {
    pub ok: bool,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantResponse {
    pub ok: bool,
    pub variant: Option<Variant>,
}

/// `POST /api/variants/promote`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteResponse {
    pub ok: bool,
    pub id: String,
    pub archived: usize,
}

/// `POST /api/variants/disable-live`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableLiveResponse {
    pub ok: bool,
    /// True when no variant was live and nothing was written
    pub noop: bool,
    pub disabled: usize,
}

/// `POST /api/landing/generate`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingGenerateResponse {
    pub ok: bool,
    pub slug: String,
    pub spec: LandingPageSpec,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// `POST /api/landing/promote`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPromoteResponse {
    pub ok: bool,
    pub slug: String,
    pub activated_at: String,
}

/// `GET /api/landing/active` and `GET /api/landing/:slug`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    pub ok: bool,
    pub slug: Option<String>,
    pub build: Option<LandingBuild>,
}

/// `POST /api/persona`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaGenerateResponse {
    pub ok: bool,
    pub slug: String,
    pub page: PersonaPage,
    #[serde(flatten)]
    pub provenance: Provenance,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaResponse {
    pub ok: bool,
    pub page: PersonaPage,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub ok: bool,
    pub settings: AgentSettings,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub store_backend: String,
    pub store_connected: bool,
    pub ai_configured: bool,
    pub components: Vec<ComponentHealthReport>,
}

/// Error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            code: code.into(),
        }
    }
}

/// API error with a status, a stable code and an optional `Retry-After`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
            retry_after: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "INPUT_002", msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "NOT_FOUND_001", msg)
    }

    pub fn rate_limited(msg: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            response: ErrorResponse::new(msg, "RATE_001"),
            retry_after,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_001", msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(retry_after) = self.retry_after {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert("Retry-After", value);
            }
        }

        response
    }
}

impl From<landing_core::Error> for ApiError {
    fn from(err: landing_core::Error) -> Self {
        use landing_core::Error;

        match &err {
            Error::Input { code, message, http_status } => {
                let status = StatusCode::from_u16(*http_status).unwrap_or(StatusCode::BAD_REQUEST);
                ApiError::with_code(status, *code, message)
            }
            Error::Store { code, message, http_status } => {
                error!(code = %code, "Store failure: {}", message);
                let status = StatusCode::from_u16(*http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                ApiError::with_code(status, *code, "document store operation failed")
            }
            Error::Validation(_) | Error::MissingField(_) => {
                ApiError::bad_request(err.to_string())
            }
            Error::NotFound(_) => ApiError::not_found(err.to_string()),
            Error::Conflict(_) => {
                ApiError::with_code(StatusCode::CONFLICT, "CONFLICT_001", err.to_string())
            }
            Error::Internal(msg) => {
                error!("Internal error: {}", msg);
                ApiError::internal("internal error")
            }
        }
    }
}
