//! Full landing page builds.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use copy_agent::generate_landing;
use doc_store::{activate_landing, active_landing_pointer, get_landing_build, save_landing_build};
use landing_core::{
    aggregate_with_default, cluster_sessions, is_valid_slug, new_build_slug, simple_stats,
    summarize_sessions, Error, LandingBuild, LandingPageSpec,
};
use serde::Deserialize;
use telemetry::metrics;
use tracing::info;

use crate::extractors::JsonBody;
use crate::response::{ApiError, LandingGenerateResponse, LandingPromoteResponse, LandingResponse};
use crate::state::AppState;

fn checked_slug(slug: &str) -> Result<&str, ApiError> {
    let slug = slug.trim();
    if is_valid_slug(slug) {
        Ok(slug)
    } else {
        Err(ApiError::bad_request(format!(
            "invalid slug '{}': use lowercase letters, digits and dashes",
            slug
        )))
    }
}

/// POST /api/landing/generate - Build a landing page and store it under a new slug.
///
/// Works on an empty window too; the fallback then yields the baseline build.
pub async fn generate(State(state): State<AppState>) -> Result<Json<LandingGenerateResponse>, ApiError> {
    let window = state.event_window().await?;
    let stats = if window.is_empty() {
        Vec::new()
    } else {
        simple_stats(&aggregate_with_default(&window))
    };
    let clusters = cluster_sessions(&summarize_sessions(&window));

    let generated = generate_landing(state.generator.as_ref(), &stats, &clusters, &state.weights()).await;

    let now = Utc::now();
    let slug = new_build_slug(now);
    let build = LandingBuild::new(slug.clone(), generated.value.clone(), now);
    save_landing_build(state.store.as_ref(), &build).await?;
    metrics().landing_builds.inc();

    info!(slug = %slug, events = window.len(), "Generated landing build");

    Ok(Json(LandingGenerateResponse {
        ok: true,
        slug,
        spec: generated.value,
        provenance: generated.provenance,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PromoteLandingRequest {
    #[serde(default)]
    pub slug: String,
    /// Spec to store under `slug` before activating it
    #[serde(default)]
    pub spec: Option<LandingPageSpec>,
}

/// POST /api/landing/promote - Make a build the active landing page.
///
/// With a `spec` the build is (re)written first; without one it must exist.
pub async fn promote(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PromoteLandingRequest>,
) -> Result<Json<LandingPromoteResponse>, ApiError> {
    if body.slug.trim().is_empty() {
        return Err(Error::missing_field("slug").into());
    }
    let slug = checked_slug(&body.slug)?;
    let now = Utc::now();

    let build = match body.spec {
        Some(spec) => {
            spec.content
                .check()
                .map_err(|e| ApiError::bad_request(format!("invalid spec: {}", e)))?;
            Some(LandingBuild::new(slug, spec, now))
        }
        None => {
            if get_landing_build(state.store.as_ref(), slug).await?.is_none() {
                return Err(Error::not_found(format!("landing build '{}'", slug)).into());
            }
            None
        }
    };

    let pointer = activate_landing(state.store.as_ref(), slug, build.as_ref(), now).await?;

    Ok(Json(LandingPromoteResponse {
        ok: true,
        slug: pointer.slug,
        activated_at: pointer.updated_at,
    }))
}

/// GET /api/landing/active - The active build, or nulls when none was promoted.
pub async fn active(State(state): State<AppState>) -> Result<Json<LandingResponse>, ApiError> {
    let Some(pointer) = active_landing_pointer(state.store.as_ref()).await? else {
        return Ok(Json(LandingResponse {
            ok: true,
            slug: None,
            build: None,
        }));
    };

    let build = get_landing_build(state.store.as_ref(), &pointer.slug).await?;
    Ok(Json(LandingResponse {
        ok: true,
        slug: Some(pointer.slug),
        build,
    }))
}

/// GET /api/landing/:slug - One stored build.
pub async fn get(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<LandingResponse>, ApiError> {
    let slug = checked_slug(&slug)?;
    let build = get_landing_build(state.store.as_ref(), slug)
        .await?
        .ok_or_else(|| Error::not_found(format!("landing build '{}'", slug)))?;

    Ok(Json(LandingResponse {
        ok: true,
        slug: Some(build.slug.clone()),
        build: Some(build),
    }))
}
