//! Agent suggestion endpoint.

use axum::{extract::State, Json};
use chrono::Utc;
use copy_agent::{suggest_variant, AiSource};
use doc_store::{agent_settings, insert_variant};
use landing_core::{aggregate_with_default, simple_stats, Error, NewVariant};
use telemetry::metrics;
use tracing::info;

use crate::response::{AgentResponse, ApiError};
use crate::state::AppState;

/// `createdBy` of variants saved by auto mode.
const AUTO_CREATOR: &str = "agent-auto";

/// GET /api/agent - Propose "Build C" from the current event window.
///
/// With auto mode on, the suggestion is also saved as a `testing` variant.
/// A failed auto save fails the request.
pub async fn suggest(State(state): State<AppState>) -> Result<Json<AgentResponse>, ApiError> {
    let window = state.event_window().await?;
    if window.is_empty() {
        return Err(Error::empty_window().into());
    }

    metrics().agent_runs.inc();
    let stats = simple_stats(&aggregate_with_default(&window));
    let generated = suggest_variant(state.generator.as_ref(), &stats, &state.weights()).await;

    info!(
        from_variant = %generated.value.from_variant,
        ai_used = generated.provenance.ai_used == AiSource::Ai,
        events = window.len(),
        "Agent produced suggestion"
    );

    let settings = agent_settings(state.store.as_ref()).await?;
    let saved_variant = if settings.auto_mode {
        let variant = NewVariant::from_suggestion(generated.value.clone(), AUTO_CREATOR).into_variant(Utc::now())?;
        let saved = insert_variant(state.store.as_ref(), variant).await?;
        metrics().auto_saved_variants.inc();
        Some(saved)
    } else {
        None
    };

    Ok(Json(AgentResponse {
        ok: true,
        stats,
        suggestion: generated.value,
        provenance: generated.provenance,
        saved_variant,
    }))
}
