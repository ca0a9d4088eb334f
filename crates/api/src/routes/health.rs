//! Health check and metrics endpoints.

use axum::{extract::State, http::StatusCode, Json};
use doc_store::health::check_connection;
use telemetry::{health, metrics, MetricsSnapshot};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - Full health check.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = health().report();

    Json(HealthResponse {
        status: report.status,
        store_backend: state.store.backend().to_string(),
        store_connected: health().store.is_healthy(),
        ai_configured: state.generator.has_credential(),
        components: report.components,
    })
}

/// GET /health/ready - Readiness probe, pings the store.
pub async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if check_connection(state.store.as_ref()).await && health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /metrics - In-process counters.
pub async fn metrics_handler() -> Json<MetricsSnapshot> {
    Json(metrics().snapshot())
}
