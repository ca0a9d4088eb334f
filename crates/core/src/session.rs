//! Per-session aggregation used by the landing and persona generators.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::events::{AnalyticsEvent, EventKind, VariantId};

/// Behavior summary for one visitor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    /// Variant of the first event seen for the session (unrecognized ids fold into `A`)
    pub variant_id: VariantId,
    pub events: u64,
    /// Running scroll depth, see [`summarize_sessions`]
    pub avg_scroll: Option<f64>,
    pub clicks: u64,
}

impl SessionSummary {
    fn new(event: &AnalyticsEvent) -> Self {
        Self {
            session_id: event.session_id.clone(),
            variant_id: event.variant_or_default(),
            events: 0,
            avg_scroll: None,
            clicks: 0,
        }
    }

    fn record(&mut self, event: &AnalyticsEvent) {
        self.events += 1;
        match event.kind() {
            EventKind::Scroll => {
                if let Some(percent) = event.scroll_percent() {
                    // Two-term update: the latest sample always carries half the weight.
                    self.avg_scroll = Some(match self.avg_scroll {
                        Some(prev) => (prev + percent) / 2.0,
                        None => percent,
                    });
                }
            }
            EventKind::Click => self.clicks += 1,
            EventKind::Pageview | EventKind::Other => {}
        }
    }
}

/// Summarize every session in the window, in order of first appearance.
///
/// Events are folded in window order. The scroll figure is a running
/// `(previous + sample) / 2`, seeded with the first numeric sample; it is not a
/// true mean.
pub fn summarize_sessions(events: &[AnalyticsEvent]) -> Vec<SessionSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<SessionSummary> = Vec::new();

    for event in events {
        let slot = *index.entry(event.session_id.as_str()).or_insert_with(|| {
            summaries.push(SessionSummary::new(event));
            summaries.len() - 1
        });
        summaries[slot].record(event);
    }

    summaries
}

/// Number of sessions attributed to each variant, in `A`, `B` order.
pub fn sessions_per_variant(summaries: &[SessionSummary]) -> Vec<(VariantId, u64)> {
    VariantId::ALL
        .iter()
        .map(|id| {
            let count = summaries.iter().filter(|s| s.variant_id == *id).count() as u64;
            (*id, count)
        })
        .collect()
}
