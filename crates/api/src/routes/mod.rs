//! API routes.

pub mod agent;
pub mod events;
pub mod health;
pub mod landing;
pub mod persona;
pub mod settings;
pub mod stats;
pub mod variants;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{rate_limit::limit_by_client, tracking::track_requests};
use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Only ingestion is rate limited; the layer covers the POST alone.
    let events_route = post(events::ingest)
        .layer(middleware::from_fn_with_state(state.clone(), limit_by_client))
        .get(events::list);

    let api = Router::new()
        .route("/events", events_route)
        .route("/stats", get(stats::stats))
        .route("/agent", get(agent::suggest))
        .route("/variants", get(variants::list).post(variants::create))
        .route("/variants/live", get(variants::live))
        .route("/variants/promote", post(variants::promote))
        .route("/variants/disable-live", post(variants::disable_live))
        .route("/landing/generate", post(landing::generate))
        .route("/landing/promote", post(landing::promote))
        .route("/landing/active", get(landing::active))
        .route("/landing/:slug", get(landing::get))
        .route("/persona", post(persona::generate))
        .route("/persona/:slug", get(persona::get))
        .route("/settings/agent", get(settings::get_agent).post(settings::set_agent));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/metrics", get(health::metrics_handler))
        .layer(middleware::from_fn(track_requests))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
