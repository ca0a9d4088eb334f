//! Typed writes over the document store.

use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};
use landing_core::{
    plan_disable_live, plan_promotion, ActiveLandingPointer, AgentSettings,
    AnalyticsEvent, DisableOutcome, Error, LandingBuild, LiveVariantPointer, PersonaPage, Result,
    StatusWrite, Variant, AGENT_DOC, LANDING_PAGE_DOC, LIVE_VARIANT_DOC,
};
use serde_json::{Map, Value};
use telemetry::metrics;
use tracing::{info, warn};
use uuid::Uuid;

use crate::document::{encode, Collection, Precondition, WriteBatch};
use crate::query::{list_variants, live_variants, observe};
use crate::store::DocumentStore;

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Commit attempts for a status change before a moving live pointer is reported as a conflict.
const LIVE_POINTER_ATTEMPTS: usize = 3;

/// Append events and return their new ids.
///
/// Ids are generated up front and every event goes out in one batch, so a
/// failed request stores none of them.
pub async fn append_events(store: &dyn DocumentStore, events: &[AnalyticsEvent]) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(events.len());
    let mut batch = WriteBatch::new();
    for event in events {
        let id = Uuid::new_v4().simple().to_string();
        batch = batch.set(Collection::Events, id.clone(), encode(event)?);
        ids.push(id);
    }

    let started = Instant::now();
    observe(started, store.commit(batch).await)?;
    metrics().events_stored.inc_by(ids.len() as u64);
    metrics().store_writes.inc_by(ids.len() as u64);
    Ok(ids)
}

/// Persist a variant and return it with its new id.
pub async fn insert_variant(store: &dyn DocumentStore, variant: Variant) -> Result<Variant> {
    let data = encode(&variant)?;
    let started = Instant::now();
    let id = observe(started, store.add(Collection::Variants, data).await)?;
    metrics().store_writes.inc();
    metrics().variants_saved.inc();
    info!(variant_id = %id, created_by = %variant.created_by, "Saved variant");
    Ok(Variant {
        id: Some(id),
        ..variant
    })
}

fn status_fields(write: &StatusWrite, now: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("status".into(), Value::from(write.status.as_str()));
    fields.insert("updatedAt".into(), Value::from(now));
    fields
}

fn status_batch(writes: &[StatusWrite], now: &str) -> WriteBatch {
    writes.iter().fold(WriteBatch::new(), |batch, w| {
        batch.update(Collection::Variants, w.id.clone(), status_fields(w, now))
    })
}

/// Guard that `settings/liveVariant` is unchanged since this read.
///
/// Every promotion and disable rewrites the pointer, so two status changes
/// racing each other cannot both commit.
async fn live_pointer_guard(store: &dyn DocumentStore) -> Result<Precondition> {
    let started = Instant::now();
    let pointer = observe(started, store.get(Collection::Settings, LIVE_VARIANT_DOC).await)?;
    Ok(Precondition::unchanged(pointer.as_ref()))
}

fn live_pointer(variant_id: Option<&str>, updated_at: &str) -> Result<Map<String, Value>> {
    encode(&LiveVariantPointer {
        variant_id: variant_id.map(String::from),
        updated_at: updated_at.to_string(),
    })
}

/// Commit a status batch; `Ok(false)` means the live pointer moved and the
/// caller should re-read and retry.
async fn commit_status_change(store: &dyn DocumentStore, batch: WriteBatch, attempt: usize) -> Result<bool> {
    let started = Instant::now();
    match store.commit(batch).await {
        Ok(()) => {
            metrics().store_latency_ms.observe_since(started);
            Ok(true)
        }
        Err(Error::Conflict(reason)) if attempt < LIVE_POINTER_ATTEMPTS => {
            metrics().store_latency_ms.observe_since(started);
            warn!(attempt, reason = %reason, "Live pointer moved, retrying status change");
            Ok(false)
        }
        Err(e) => observe(started, Err(e)),
    }
}

/// Promote one variant to `live` and archive every other one.
///
/// All status changes and the `settings/liveVariant` pointer go out as a
/// single batch, guarded on the pointer revision read beforehand.
pub async fn promote_variant(
    store: &dyn DocumentStore,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<StatusWrite>> {
    let ts = timestamp(now);
    let mut attempt = 1;
    loop {
        let guard = live_pointer_guard(store).await?;
        let variants = list_variants(store).await?;
        let writes = plan_promotion(&variants, id)?;
        let batch = status_batch(&writes, &ts).set_guarded(
            Collection::Settings,
            LIVE_VARIANT_DOC,
            live_pointer(Some(id), &ts)?,
            guard,
        );

        if commit_status_change(store, batch, attempt).await? {
            metrics().store_writes.inc_by(writes.len() as u64 + 1);
            metrics().promotions.inc();
            info!(variant_id = %id, archived = writes.len() - 1, "Promoted variant");
            return Ok(writes);
        }
        attempt += 1;
    }
}

/// Archive every `live` variant and clear the live pointer.
pub async fn disable_live_variants(store: &dyn DocumentStore, now: DateTime<Utc>) -> Result<DisableOutcome> {
    let ts = timestamp(now);
    let mut attempt = 1;
    loop {
        let guard = live_pointer_guard(store).await?;
        let live = live_variants(store).await?;
        let writes = match plan_disable_live(&live) {
            DisableOutcome::NoOp => return Ok(DisableOutcome::NoOp),
            DisableOutcome::Archive(writes) => writes,
        };
        let batch = status_batch(&writes, &ts).set_guarded(
            Collection::Settings,
            LIVE_VARIANT_DOC,
            live_pointer(None, &ts)?,
            guard,
        );

        if commit_status_change(store, batch, attempt).await? {
            metrics().store_writes.inc_by(writes.len() as u64 + 1);
            metrics().live_disables.inc();
            info!(archived = writes.len(), "Disabled live variants");
            return Ok(DisableOutcome::Archive(writes));
        }
        attempt += 1;
    }
}

pub async fn save_landing_build(store: &dyn DocumentStore, build: &LandingBuild) -> Result<()> {
    let data = encode(build)?;
    let started = Instant::now();
    observe(started, store.set(Collection::LandingPages, &build.slug, data).await)?;
    metrics().store_writes.inc();
    Ok(())
}

/// Store the build (when given) and point `settings/landingPage` at it, in one batch.
pub async fn activate_landing(
    store: &dyn DocumentStore,
    slug: &str,
    build: Option<&LandingBuild>,
    now: DateTime<Utc>,
) -> Result<ActiveLandingPointer> {
    let pointer = ActiveLandingPointer {
        slug: slug.to_string(),
        updated_at: timestamp(now),
    };

    let mut batch = WriteBatch::new();
    if let Some(build) = build {
        batch = batch.set(Collection::LandingPages, slug, encode(build)?);
    }
    batch = batch.set(Collection::Settings, LANDING_PAGE_DOC, encode(&pointer)?);

    let writes = batch.len() as u64;
    let started = Instant::now();
    observe(started, store.commit(batch).await)?;
    metrics().store_writes.inc_by(writes);
    info!(slug = %slug, "Activated landing build");
    Ok(pointer)
}

pub async fn save_persona_page(store: &dyn DocumentStore, page: &PersonaPage) -> Result<()> {
    let data = encode(page)?;
    let started = Instant::now();
    observe(started, store.set(Collection::PersonaPages, &page.slug, data).await)?;
    metrics().store_writes.inc();
    Ok(())
}

pub async fn set_agent_settings(store: &dyn DocumentStore, settings: &AgentSettings) -> Result<()> {
    let data = encode(settings)?;
    let started = Instant::now();
    observe(started, store.set(Collection::Settings, AGENT_DOC, data).await)?;
    metrics().store_writes.inc();
    Ok(())
}
