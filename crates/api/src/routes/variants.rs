//! Persisted variants and promotion.

use axum::{extract::State, Json};
use chrono::Utc;
use doc_store::{disable_live_variants, insert_variant, list_variants, promote_variant};
use landing_core::{live_variant, DisableOutcome, NewVariant, VariantStatus};
use serde::Deserialize;
use tracing::info;

use crate::extractors::JsonBody;
use crate::response::{ApiError, DisableLiveResponse, PromoteResponse, VariantResponse, VariantsResponse};
use crate::state::AppState;

/// GET /api/variants - All variants, newest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<VariantsResponse>, ApiError> {
    let variants = list_variants(state.store.as_ref()).await?;
    Ok(Json(VariantsResponse { ok: true, variants }))
}

/// POST /api/variants - Save a suggestion as a `testing` variant.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewVariant>,
) -> Result<Json<VariantResponse>, ApiError> {
    let variant = body.into_variant(Utc::now())?;
    let saved = insert_variant(state.store.as_ref(), variant).await?;
    Ok(Json(VariantResponse {
        ok: true,
        variant: Some(saved),
    }))
}

/// GET /api/variants/live - The live variant, or `null`.
pub async fn live(State(state): State<AppState>) -> Result<Json<VariantResponse>, ApiError> {
    let variants = list_variants(state.store.as_ref()).await?;
    Ok(Json(VariantResponse {
        ok: true,
        variant: live_variant(&variants).cloned(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PromoteRequest {
    #[serde(default)]
    pub id: String,
}

/// POST /api/variants/promote - Make one variant live and archive the rest.
///
/// Answers 409 when concurrent status changes keep winning the race.
pub async fn promote(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PromoteRequest>,
) -> Result<Json<PromoteResponse>, ApiError> {
    let id = body.id.trim();
    let writes = promote_variant(state.store.as_ref(), id, Utc::now()).await?;
    let archived = writes
        .iter()
        .filter(|w| w.status == VariantStatus::Archived)
        .count();

    Ok(Json(PromoteResponse {
        ok: true,
        id: id.to_string(),
        archived,
    }))
}

/// POST /api/variants/disable-live - Archive whatever is live.
///
/// With nothing live this is a no-op and says so.
pub async fn disable_live(State(state): State<AppState>) -> Result<Json<DisableLiveResponse>, ApiError> {
    let response = match disable_live_variants(state.store.as_ref(), Utc::now()).await? {
        DisableOutcome::NoOp => {
            info!("No live variant to disable");
            DisableLiveResponse {
                ok: true,
                noop: true,
                disabled: 0,
            }
        }
        DisableOutcome::Archive(writes) => DisableLiveResponse {
            ok: true,
            noop: false,
            disabled: writes.len(),
        },
    };
    Ok(Json(response))
}
