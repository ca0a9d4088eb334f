//! Event ingestion and the event-level listing.
//!
//! Ingestion accepts the instrumentation's three body shapes:
//! 1. Array: `[event, event, ...]`
//! 2. Object with events: `{ "events": [...] }`
//! 3. Single event: `{ "sessionId": "...", "eventType": "...", ... }`

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use doc_store::append_events;
use landing_core::{
    aggregate_strict, filter_events, limits::DEFAULT_PAGE_SIZE, AnalyticsEvent, EventFilter,
    IngestBatch, VariantBucket,
};
use serde::Deserialize;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, info, warn};

use crate::response::{ApiError, EventsResponse, IngestResponse};
use crate::state::AppState;

/// POST /api/events - Record one or more analytics events.
///
/// The batch is all or nothing: one invalid event rejects the request.
pub async fn ingest(State(state): State<AppState>, body: Bytes) -> Result<Json<IngestResponse>, ApiError> {
    let start = Instant::now();
    metrics().batches_received.inc();

    debug!(payload_size = body.len(), "Received event batch");

    let batch = IngestBatch::parse(&body).map_err(|e| {
        warn!("Rejected event batch: {}", e);
        ApiError::from(e)
    })?;
    metrics().events_received.inc_by(batch.events.len() as u64);

    let now = Utc::now();
    let events = batch
        .events
        .into_iter()
        .enumerate()
        .map(|(i, event)| {
            event.into_event(now).map_err(|e| {
                metrics().events_failed_validation.inc();
                ApiError::bad_request(format!("event {}: {}", i, e))
            })
        })
        .collect::<Result<Vec<AnalyticsEvent>, ApiError>>()?;

    let ids = append_events(state.store.as_ref(), &events).await?;

    info!(
        received = ids.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Batch stored"
    );

    Ok(Json(IngestResponse {
        ok: true,
        received: ids.len(),
        ids,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// `A`, `B`, `unknown` or `all`
    pub variant: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListParams {
    fn into_filter(self, display_limit: usize) -> Result<EventFilter, ApiError> {
        let bucket = match self.variant.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(VariantBucket::parse(raw).ok_or_else(|| {
                ApiError::bad_request(format!(
                    "invalid variant '{}', expected A, B, unknown or all",
                    raw
                ))
            })?),
        };

        Ok(EventFilter {
            bucket,
            event_type: self.event_type.filter(|t| !t.trim().is_empty()),
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).min(display_limit),
        })
    }
}

/// GET /api/events - Filtered, paginated view of the event window.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<EventsResponse>, ApiError> {
    let filter = params.into_filter(state.agent.display_limit)?;
    let window = state.event_window().await?;

    Ok(Json(EventsResponse {
        ok: true,
        page: filter_events(&window, &filter),
        buckets: aggregate_strict(&window),
    }))
}
