//! Singleton settings documents and agent configuration.

use serde::{Deserialize, Serialize};

use crate::limits::{DEFAULT_CLICK_WEIGHT, DISPLAY_LIMIT, EVENT_WINDOW_LIMIT};
use crate::scoring::ScoringWeights;

/// Document id of the live-variant pointer in `settings`.
pub const LIVE_VARIANT_DOC: &str = "liveVariant";

/// Document id of the active landing page pointer in `settings`.
pub const LANDING_PAGE_DOC: &str = "landingPage";

/// Document id of the agent settings in `settings`.
pub const AGENT_DOC: &str = "agent";

/// `settings/agent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettings {
    /// Persist every agent suggestion as a `testing` variant
    #[serde(default)]
    pub auto_mode: bool,
}

/// `settings/liveVariant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveVariantPointer {
    pub variant_id: Option<String>,
    pub updated_at: String,
}

/// `settings/landingPage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLandingPointer {
    pub slug: String,
    pub updated_at: String,
}

/// Agent tuning, loaded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Click weight `W` of the scoring rule
    #[serde(default = "default_click_weight")]
    pub click_weight: f64,
    /// Events fetched per aggregation read
    #[serde(default = "default_event_window_limit")]
    pub event_window_limit: usize,
    /// Events shown in dashboard lists
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
}

fn default_click_weight() -> f64 {
    DEFAULT_CLICK_WEIGHT
}

fn default_event_window_limit() -> usize {
    EVENT_WINDOW_LIMIT
}

fn default_display_limit() -> usize {
    DISPLAY_LIMIT
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            click_weight: default_click_weight(),
            event_window_limit: default_event_window_limit(),
            display_limit: default_display_limit(),
        }
    }
}

impl AgentConfig {
    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights::new(self.click_weight)
    }
}
