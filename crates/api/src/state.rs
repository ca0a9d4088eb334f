//! Application state shared across handlers.

use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};
use copy_agent::TextGenerator;
use doc_store::{recent_events, DocumentStore};
use landing_core::{limits::clamp_display_limit, AgentConfig, AnalyticsEvent, Result, ScoringWeights};
use std::sync::Arc;
use std::time::Duration;

/// Idle time after which a client's rate limit bucket is dropped.
const RATE_LIMIT_IDLE: Duration = Duration::from_secs(600);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Document store (Firestore in production, in-memory in tests)
    pub store: Arc<dyn DocumentStore>,
    /// Copy generator
    pub generator: Arc<dyn TextGenerator>,
    pub agent: Arc<AgentConfig>,
    pub rate_limiter: SharedRateLimiter,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, generator: Arc<dyn TextGenerator>, agent: AgentConfig) -> Self {
        Self::with_rate_limit(store, generator, agent, RateLimitConfig::default())
    }

    /// Create with custom rate limit config. The display limit is clamped to its allowed range.
    pub fn with_rate_limit(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn TextGenerator>,
        mut agent: AgentConfig,
        rate_config: RateLimitConfig,
    ) -> Self {
        agent.display_limit = clamp_display_limit(agent.display_limit);
        Self {
            store,
            generator,
            agent: Arc::new(agent),
            rate_limiter: Arc::new(RateLimiter::new(rate_config)),
        }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.agent.weights()
    }

    /// The bounded event window every aggregation runs over, newest first.
    pub async fn event_window(&self) -> Result<Vec<AnalyticsEvent>> {
        recent_events(self.store.as_ref(), self.agent.event_window_limit).await
    }

    /// Start the rate limiter cleanup background task.
    pub fn start_rate_limiter_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let rate_limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                rate_limiter.cleanup(RATE_LIMIT_IDLE);
            }
        })
    }
}
