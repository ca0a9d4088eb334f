//! Persona pages.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use copy_agent::generate_persona;
use doc_store::{get_persona_page, save_persona_page};
use landing_core::{cluster_sessions, summarize_sessions, target_cluster, Error, Persona};
use serde::Deserialize;
use telemetry::metrics;
use tracing::info;

use crate::extractors::parse_optional_body;
use crate::response::{ApiError, PersonaGenerateResponse, PersonaResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PersonaRequest {
    /// Persona slug; the dominant cluster when absent
    #[serde(default)]
    pub persona: Option<String>,
}

fn requested_persona(raw: Option<&str>) -> Result<Option<Persona>, ApiError> {
    match raw.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(None),
        Some(slug) => Persona::parse(slug).map(Some).ok_or_else(|| {
            let known: Vec<&str> = Persona::ALL.iter().map(Persona::slug).collect();
            ApiError::bad_request(format!("unknown persona '{}', expected one of {}", slug, known.join(", ")))
        }),
    }
}

/// POST /api/persona - Generate and store the page for one visitor cluster.
///
/// The body is optional. Without a `persona` the dominant cluster is used.
pub async fn generate(State(state): State<AppState>, body: Bytes) -> Result<Json<PersonaGenerateResponse>, ApiError> {
    let request: PersonaRequest = parse_optional_body(&body)?;
    let requested = requested_persona(request.persona.as_deref())?;

    let window = state.event_window().await?;
    let clusters = cluster_sessions(&summarize_sessions(&window));
    let cluster = target_cluster(&clusters, requested);

    let generated = generate_persona(state.generator.as_ref(), &cluster).await;
    save_persona_page(state.store.as_ref(), &generated.value).await?;
    metrics().persona_pages.inc();

    info!(
        persona = %cluster.persona.slug(),
        sessions = cluster.sessions,
        "Generated persona page"
    );

    Ok(Json(PersonaGenerateResponse {
        ok: true,
        slug: generated.value.slug.clone(),
        page: generated.value,
        provenance: generated.provenance,
    }))
}

/// GET /api/persona/:slug
pub async fn get(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<PersonaResponse>, ApiError> {
    let persona = Persona::parse(slug.trim()).ok_or_else(|| Error::not_found(format!("persona '{}'", slug)))?;
    let page = get_persona_page(state.store.as_ref(), persona.slug())
        .await?
        .ok_or_else(|| Error::not_found(format!("persona page '{}'", persona.slug())))?;

    Ok(Json(PersonaResponse { ok: true, page }))
}
