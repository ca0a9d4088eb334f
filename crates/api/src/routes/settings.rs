//! Agent settings.

use axum::{extract::State, Json};
use doc_store::{agent_settings, set_agent_settings};
use landing_core::AgentSettings;
use serde::Deserialize;
use tracing::info;

use crate::extractors::JsonBody;
use crate::response::{ApiError, SettingsResponse};
use crate::state::AppState;

/// GET /api/settings/agent
pub async fn get_agent(State(state): State<AppState>) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = agent_settings(state.store.as_ref()).await?;
    Ok(Json(SettingsResponse { ok: true, settings }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettingsRequest {
    pub auto_mode: bool,
}

/// POST /api/settings/agent - `{autoMode: bool}`
pub async fn set_agent(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AgentSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = AgentSettings {
        auto_mode: body.auto_mode,
    };
    set_agent_settings(state.store.as_ref(), &settings).await?;
    info!(auto_mode = settings.auto_mode, "Updated agent settings");
    Ok(Json(SettingsResponse { ok: true, settings }))
}
