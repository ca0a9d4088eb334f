//! Window sizes and request limits.
//!
//! Every read of the event log is bounded: the store query takes at most
//! `EVENT_WINDOW_LIMIT` events ordered by `ts` descending, and anything shown
//! on the dashboard is cut further to `DISPLAY_LIMIT`.

// === Event Window ===

/// Maximum events fetched from the store per aggregation read.
pub const EVENT_WINDOW_LIMIT: usize = 500;

/// Maximum events returned for display (recent list, filtered views).
pub const DISPLAY_LIMIT: usize = 200;

/// Smallest display cap a caller may configure.
pub const MIN_DISPLAY_LIMIT: usize = 100;

/// Default page size for the filtered event listing.
pub const DEFAULT_PAGE_SIZE: usize = 25;

// === Ingestion ===

/// Maximum events accepted by a single ingestion request.
pub const MAX_INGEST_BATCH: usize = 100;

/// Maximum serialized payload size for a single event (8KB).
pub const MAX_EVENT_PAYLOAD_BYTES: usize = 8 * 1024;

// === Scoring ===

/// Default click weight `W` in `score = avgScroll + W * clicks`.
pub const DEFAULT_CLICK_WEIGHT: f64 = 2.0;

// === Persona Clustering ===

/// Clicks at or above which a session counts as a high-intent clicker.
pub const HIGH_INTENT_CLICKS: u64 = 2;

/// Running scroll average at or above which a session counts as a deep reader.
pub const DEEP_READER_SCROLL: f64 = 60.0;

/// Clamp a requested display cap into `[MIN_DISPLAY_LIMIT, DISPLAY_LIMIT]`.
pub fn clamp_display_limit(requested: usize) -> usize {
    requested.clamp(MIN_DISPLAY_LIMIT, DISPLAY_LIMIT)
}
