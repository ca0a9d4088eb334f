//! Per-variant aggregation over a bounded event window.
//!
//! Two views are exposed and both are computed from the same window:
//!
//! - [`aggregate_with_default`]: exactly the variants `A` and `B`; events with a
//!   missing or unrecognized `variantId` are counted under `A`. This feeds the
//!   dashboard headline numbers and the scorer.
//! - [`aggregate_strict`]: `A`, `B` and `unknown`; nothing is folded. This feeds
//!   the event-level filtering view.
//!
//! Stats are recomputed on every read and never cached.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::events::{AnalyticsEvent, EventKind, VariantBucket, VariantId};
use crate::limits::DISPLAY_LIMIT;

/// Aggregated statistics for one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantStats {
    pub variant_id: VariantId,
    pub total_events: u64,
    /// Distinct session ids
    pub sessions: u64,
    pub scroll_events: u64,
    /// Mean numeric `scrollPercent` over scroll events; `None` when there are none
    pub avg_scroll_percent: Option<f64>,
    pub click_events: u64,
}

/// Aggregated statistics for one strict bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStats {
    pub bucket: VariantBucket,
    pub total_events: u64,
    pub sessions: u64,
    pub scroll_events: u64,
    pub avg_scroll_percent: Option<f64>,
    pub click_events: u64,
}

/// Reduced view of [`VariantStats`] handed to the scorer and the AI prompt.
///
/// The id is a plain string so the scorer also works over dynamic variant keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleStats {
    pub variant_id: String,
    pub avg_scroll: Option<f64>,
    pub clicks: u64,
}

impl From<&VariantStats> for SimpleStats {
    fn from(stats: &VariantStats) -> Self {
        Self {
            variant_id: stats.variant_id.as_str().to_string(),
            avg_scroll: stats.avg_scroll_percent,
            clicks: stats.click_events,
        }
    }
}

/// Running totals for one bucket.
#[derive(Default)]
struct Accumulator<'a> {
    total: u64,
    sessions: HashSet<&'a str>,
    scroll_events: u64,
    scroll_sum: f64,
    scroll_samples: u64,
    clicks: u64,
}

impl<'a> Accumulator<'a> {
    fn push(&mut self, event: &'a AnalyticsEvent) {
        self.total += 1;
        self.sessions.insert(event.session_id.as_str());

        match event.kind() {
            EventKind::Scroll => {
                self.scroll_events += 1;
                if let Some(percent) = event.scroll_percent() {
                    self.scroll_sum += percent;
                    self.scroll_samples += 1;
                }
            }
            EventKind::Click => self.clicks += 1,
            EventKind::Pageview | EventKind::Other => {}
        }
    }

    fn avg_scroll(&self) -> Option<f64> {
        if self.scroll_samples == 0 {
            None
        } else {
            Some(self.scroll_sum / self.scroll_samples as f64)
        }
    }

    fn into_variant_stats(self, variant_id: VariantId) -> VariantStats {
        VariantStats {
            variant_id,
            total_events: self.total,
            sessions: self.sessions.len() as u64,
            scroll_events: self.scroll_events,
            avg_scroll_percent: self.avg_scroll(),
            click_events: self.clicks,
        }
    }

    fn into_bucket_stats(self, bucket: VariantBucket) -> BucketStats {
        BucketStats {
            bucket,
            total_events: self.total,
            sessions: self.sessions.len() as u64,
            scroll_events: self.scroll_events,
            avg_scroll_percent: self.avg_scroll(),
            click_events: self.clicks,
        }
    }
}

/// Stats for `A` and `B`, in that order, folding unrecognized ids into `A`.
///
/// Always returns both entries, zero/null-filled when the window is empty.
pub fn aggregate_with_default(events: &[AnalyticsEvent]) -> Vec<VariantStats> {
    let mut acc_a = Accumulator::default();
    let mut acc_b = Accumulator::default();

    for event in events {
        match event.variant_or_default() {
            VariantId::A => acc_a.push(event),
            VariantId::B => acc_b.push(event),
        }
    }

    vec![
        acc_a.into_variant_stats(VariantId::A),
        acc_b.into_variant_stats(VariantId::B),
    ]
}

/// Stats for `A`, `B` and `unknown`, in that order, without folding.
pub fn aggregate_strict(events: &[AnalyticsEvent]) -> Vec<BucketStats> {
    let mut accs: [Accumulator<'_>; 3] = Default::default();

    for event in events {
        let slot = match event.bucket() {
            VariantBucket::A => 0,
            VariantBucket::B => 1,
            VariantBucket::Unknown => 2,
        };
        accs[slot].push(event);
    }

    let [a, b, unknown] = accs;
    vec![
        a.into_bucket_stats(VariantBucket::A),
        b.into_bucket_stats(VariantBucket::B),
        unknown.into_bucket_stats(VariantBucket::Unknown),
    ]
}

/// Reduce full stats to the scorer's input.
pub fn simple_stats(stats: &[VariantStats]) -> Vec<SimpleStats> {
    stats.iter().map(SimpleStats::from).collect()
}

/// Filter applied by the event-level listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Strict bucket to keep; `None` keeps all
    pub bucket: Option<VariantBucket>,
    /// Exact event type to keep; `None` keeps all
    pub event_type: Option<String>,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
}

impl EventFilter {
    fn matches(&self, event: &AnalyticsEvent) -> bool {
        if let Some(bucket) = self.bucket {
            if event.bucket() != bucket {
                return false;
            }
        }
        match &self.event_type {
            Some(event_type) => &event.event_type == event_type,
            None => true,
        }
    }
}

/// One page of the filtered listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub events: Vec<AnalyticsEvent>,
    /// Matching events across all pages
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Apply the strict-bucket filter and paginate.
///
/// Page size is clamped to `1..=DISPLAY_LIMIT`, page to at least 1. A page past
/// the end comes back empty with the correct totals.
pub fn filter_events(events: &[AnalyticsEvent], filter: &EventFilter) -> EventPage {
    let page_size = filter.page_size.clamp(1, DISPLAY_LIMIT);
    let page = filter.page.max(1);

    let matching: Vec<&AnalyticsEvent> = events.iter().filter(|e| filter.matches(e)).collect();
    let total = matching.len();
    let total_pages = total.div_ceil(page_size);

    let events = matching
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    EventPage {
        events,
        total,
        page,
        page_size,
        total_pages,
    }
}

/// The most recent `limit` events of a window already ordered by `ts` descending.
pub fn recent(events: &[AnalyticsEvent], limit: usize) -> Vec<AnalyticsEvent> {
    events.iter().take(limit).cloned().collect()
}
