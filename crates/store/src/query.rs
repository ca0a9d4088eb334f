//! Typed reads over the document store.

use std::time::Instant;

use landing_core::{
    ActiveLandingPointer, AgentSettings, AnalyticsEvent, LandingBuild, PersonaPage, Result,
    Variant, VariantStatus, AGENT_DOC, LANDING_PAGE_DOC,
};
use serde::de::DeserializeOwned;
use telemetry::metrics;
use tracing::debug;

use crate::document::{Collection, Direction, Document, Query};
use crate::store::DocumentStore;

/// Record latency and failures of one store call.
pub(crate) fn observe<T>(started: Instant, result: Result<T>) -> Result<T> {
    metrics().store_latency_ms.observe_since(started);
    if result.is_err() {
        metrics().store_errors.inc();
    }
    result
}

fn decode_all<T: DeserializeOwned>(docs: &[Document]) -> Result<Vec<T>> {
    docs.iter().map(Document::decode).collect()
}

async fn get_typed<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<Option<T>> {
    let started = Instant::now();
    let doc = observe(started, store.get(collection, id).await)?;
    doc.as_ref().map(Document::decode).transpose()
}

/// The most recent `limit` events, newest first.
pub async fn recent_events(store: &dyn DocumentStore, limit: usize) -> Result<Vec<AnalyticsEvent>> {
    let started = Instant::now();
    let query = Query::new().order_by("ts", Direction::Descending).limit(limit);
    let docs = observe(started, store.query(Collection::Events, &query).await)?;
    metrics().event_windows_read.inc();

    let mut events: Vec<AnalyticsEvent> = decode_all(&docs)?;
    for (event, doc) in events.iter_mut().zip(&docs) {
        event.id = Some(doc.id.clone());
    }
    debug!(count = events.len(), limit, "Read event window");
    Ok(events)
}

fn attach_ids(docs: &[Document]) -> Result<Vec<Variant>> {
    let mut variants: Vec<Variant> = decode_all(docs)?;
    for (variant, doc) in variants.iter_mut().zip(docs) {
        variant.id = Some(doc.id.clone());
    }
    Ok(variants)
}

/// All persisted variants, newest first.
pub async fn list_variants(store: &dyn DocumentStore) -> Result<Vec<Variant>> {
    let started = Instant::now();
    let query = Query::new().order_by("createdAt", Direction::Descending);
    let docs = observe(started, store.query(Collection::Variants, &query).await)?;
    attach_ids(&docs)
}

/// Variants currently marked `live`.
pub async fn live_variants(store: &dyn DocumentStore) -> Result<Vec<Variant>> {
    let started = Instant::now();
    let query = Query::new().where_eq("status", VariantStatus::Live.as_str());
    let docs = observe(started, store.query(Collection::Variants, &query).await)?;
    attach_ids(&docs)
}

pub async fn get_variant(store: &dyn DocumentStore, id: &str) -> Result<Option<Variant>> {
    let variant: Option<Variant> = get_typed(store, Collection::Variants, id).await?;
    Ok(variant.map(|mut v| {
        v.id = Some(id.to_string());
        v
    }))
}

pub async fn get_landing_build(store: &dyn DocumentStore, slug: &str) -> Result<Option<LandingBuild>> {
    get_typed(store, Collection::LandingPages, slug).await
}

pub async fn active_landing_pointer(store: &dyn DocumentStore) -> Result<Option<ActiveLandingPointer>> {
    get_typed(store, Collection::Settings, LANDING_PAGE_DOC).await
}

pub async fn get_persona_page(store: &dyn DocumentStore, slug: &str) -> Result<Option<PersonaPage>> {
    get_typed(store, Collection::PersonaPages, slug).await
}

/// Agent settings, defaulting to auto mode off when never written.
pub async fn agent_settings(store: &dyn DocumentStore) -> Result<AgentSettings> {
    let settings: Option<AgentSettings> = get_typed(store, Collection::Settings, AGENT_DOC).await?;
    Ok(settings.unwrap_or_default())
}
