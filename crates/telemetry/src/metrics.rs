//! In-process metrics, exposed as a JSON snapshot on `/metrics`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records the time elapsed since `started`.
    pub fn observe_since(&self, started: Instant) {
        self.observe(started.elapsed().as_millis() as u64);
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        self.buckets[Self::BUCKET_BOUNDS.len() - 1].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Service metrics.
#[derive(Debug, Default)]
pub struct Metrics {
    // Event ingestion
    pub events_received: Counter,
    pub events_stored: Counter,
    pub events_failed_validation: Counter,
    pub batches_received: Counter,
    pub rate_limited_requests: Counter,

    // Document store
    pub event_windows_read: Counter,
    pub store_writes: Counter,
    pub store_errors: Counter,

    // Agent
    pub agent_runs: Counter,
    pub ai_calls: Counter,
    pub ai_failures: Counter,
    pub fallback_suggestions: Counter,
    pub auto_saved_variants: Counter,

    // Variant lifecycle
    pub variants_saved: Counter,
    pub promotions: Counter,
    pub live_disables: Counter,
    pub landing_builds: Counter,
    pub persona_pages: Counter,

    // Latency
    pub request_latency_ms: Histogram,
    pub store_latency_ms: Histogram,
    pub ai_latency_ms: Histogram,

    pub active_requests: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Point-in-time view of [`Metrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_received: u64,
    pub events_stored: u64,
    pub events_failed_validation: u64,
    pub batches_received: u64,
    pub rate_limited_requests: u64,
    pub event_windows_read: u64,
    pub store_writes: u64,
    pub store_errors: u64,
    pub agent_runs: u64,
    pub ai_calls: u64,
    pub ai_failures: u64,
    pub fallback_suggestions: u64,
    pub auto_saved_variants: u64,
    pub variants_saved: u64,
    pub promotions: u64,
    pub live_disables: u64,
    pub landing_builds: u64,
    pub persona_pages: u64,
    pub request_latency_mean_ms: f64,
    pub store_latency_mean_ms: f64,
    pub ai_latency_mean_ms: f64,
    pub active_requests: u64,
}

impl Metrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            events_received: self.events_received.get(),
            events_stored: self.events_stored.get(),
            events_failed_validation: self.events_failed_validation.get(),
            batches_received: self.batches_received.get(),
            rate_limited_requests: self.rate_limited_requests.get(),
            event_windows_read: self.event_windows_read.get(),
            store_writes: self.store_writes.get(),
            store_errors: self.store_errors.get(),
            agent_runs: self.agent_runs.get(),
            ai_calls: self.ai_calls.get(),
            ai_failures: self.ai_failures.get(),
            fallback_suggestions: self.fallback_suggestions.get(),
            auto_saved_variants: self.auto_saved_variants.get(),
            variants_saved: self.variants_saved.get(),
            promotions: self.promotions.get(),
            live_disables: self.live_disables.get(),
            landing_builds: self.landing_builds.get(),
            persona_pages: self.persona_pages.get(),
            request_latency_mean_ms: self.request_latency_ms.mean(),
            store_latency_mean_ms: self.store_latency_ms.mean(),
            ai_latency_mean_ms: self.ai_latency_ms.mean(),
            active_requests: self.active_requests.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

pub fn metrics() -> &'static Metrics {
    &METRICS
}
