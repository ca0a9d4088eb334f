//! Dashboard stats.

use axum::{extract::State, Json};
use landing_core::{aggregate_strict, aggregate_with_default, pick_winner, recent, simple_stats, summarize_sessions};

use crate::response::{ApiError, StatsResponse};
use crate::state::AppState;

/// GET /api/stats - Per-variant stats, strict buckets, winner and recent events.
///
/// An empty window is not an error here; the dashboard renders zeros.
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let window = state.event_window().await?;
    let weights = state.weights();

    let stats = aggregate_with_default(&window);
    let winner = pick_winner(&simple_stats(&stats), &weights);

    Ok(Json(StatsResponse {
        ok: true,
        buckets: aggregate_strict(&window),
        winner,
        rule: weights.rule(),
        sessions: summarize_sessions(&window).len(),
        window_size: window.len(),
        recent: recent(&window, state.agent.display_limit),
        stats,
    }))
}
