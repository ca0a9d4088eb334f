//! AI-first generation with heuristic fallback.
//!
//! Every entry point returns a usable result. When the provider is missing,
//! fails, or answers with the wrong shape, the deterministic generator from
//! `landing_core` is used and the reason is reported in [`Provenance`].

use std::time::Instant;

use landing_core::{
    dominant_cluster, fallback_landing_spec, fallback_persona_page, fallback_suggestion,
    pick_winner, AgentVariantSuggestion, LandingContent, LandingMeta, LandingPageSpec,
    PersonaCluster, PersonaContent, PersonaMeta, PersonaPage, ScoringWeights, SimpleStats,
    SuggestionCopy, SuggestionMeta, VariantId,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use telemetry::{health, metrics};
use tracing::{info, warn};
use validator::Validate;

use crate::error::AiFailure;
use crate::generator::TextGenerator;
use crate::parse::parse_response;
use crate::prompt::{landing_prompt, persona_prompt, suggestion_prompt};

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiSource {
    Ai,
    Fallback,
}

/// How a result was produced, surfaced as `aiUsed` / `aiError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub ai_used: AiSource,
    pub ai_error: Option<String>,
}

impl Provenance {
    pub fn ai() -> Self {
        Self {
            ai_used: AiSource::Ai,
            ai_error: None,
        }
    }

    pub fn fallback(reason: &AiFailure) -> Self {
        Self {
            ai_used: AiSource::Fallback,
            ai_error: Some(reason.to_string()),
        }
    }
}

/// A generated value plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub provenance: Provenance,
}

/// Hero copy as the model returns it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiSuggestion {
    #[serde(default)]
    from_variant: Option<String>,
    #[serde(flatten)]
    copy: SuggestionCopy,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AiLanding {
    #[serde(flatten)]
    content: LandingContent,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AiPersona {
    #[serde(flatten)]
    content: PersonaContent,
    #[serde(default)]
    explanation: Option<String>,
}

/// Send one prompt and parse the answer, recording metrics and provider health.
async fn ask<T, F>(generator: &dyn TextGenerator, task: &'static str, prompt: &str, check: F) -> Result<T, AiFailure>
where
    T: DeserializeOwned,
    F: FnOnce(&T) -> Result<(), String>,
{
    if !generator.has_credential() {
        return Err(AiFailure::MissingCredential);
    }

    metrics().ai_calls.inc();
    let started = Instant::now();
    let raw = generator.generate(prompt).await;
    metrics().ai_latency_ms.observe_since(started);

    let result = raw
        .map_err(AiFailure::from)
        .and_then(|text| parse_response(&text, check));

    match &result {
        Ok(_) => {
            health().ai.set_healthy();
            info!(task, provider = generator.name(), "AI generation succeeded");
        }
        Err(failure) => {
            metrics().ai_failures.inc();
            if failure.is_provider_fault() {
                health().ai.set_unhealthy(failure.to_string());
            }
            match failure {
                AiFailure::InvalidShape { detail } => {
                    warn!(task, provider = generator.name(), detail = %detail, "AI response rejected")
                }
                other => warn!(task, provider = generator.name(), reason = %other, "AI call failed"),
            }
        }
    }
    result
}

fn fell_back<T>(value: T, failure: &AiFailure) -> Generated<T> {
    metrics().fallback_suggestions.inc();
    Generated {
        value,
        provenance: Provenance::fallback(failure),
    }
}

fn explanation_or(explanation: Option<String>, default: impl FnOnce() -> String) -> String {
    explanation
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(default)
}

/// Propose a new hero variant ("Build C") from per-variant stats.
pub async fn suggest_variant(
    generator: &dyn TextGenerator,
    stats: &[SimpleStats],
    weights: &ScoringWeights,
) -> Generated<AgentVariantSuggestion> {
    let prompt = suggestion_prompt(stats, weights);
    let answer: Result<AiSuggestion, AiFailure> =
        ask(generator, "suggestion", &prompt, |s: &AiSuggestion| {
            s.copy.validate().map_err(|e| e.to_string())
        })
        .await;

    match answer {
        Ok(ai) => {
            let winner = pick_winner(stats, weights);
            // The model may name its base variant; trust it only if it is one we measured.
            let based_on = ai
                .from_variant
                .as_deref()
                .and_then(|id| stats.iter().find(|s| s.variant_id == id).cloned())
                .or_else(|| winner.map(|w| w.stats));
            let from_variant = based_on
                .as_ref()
                .map(|s| s.variant_id.clone())
                .unwrap_or_else(|| VariantId::A.as_str().to_string());

            let explanation = explanation_or(ai.explanation, || {
                format!("AI rewrite of variant {} ({})", from_variant, weights.rule())
            });

            Generated {
                value: AgentVariantSuggestion {
                    from_variant,
                    copy: ai.copy,
                    meta: SuggestionMeta {
                        based_on,
                        explanation,
                    },
                },
                provenance: Provenance::ai(),
            }
        }
        Err(failure) => fell_back(fallback_suggestion(stats, weights), &failure),
    }
}

/// Build a full landing page from stats and session clusters.
pub async fn generate_landing(
    generator: &dyn TextGenerator,
    stats: &[SimpleStats],
    clusters: &[PersonaCluster],
    weights: &ScoringWeights,
) -> Generated<LandingPageSpec> {
    let prompt = landing_prompt(stats, clusters, weights);
    let answer: Result<AiLanding, AiFailure> =
        ask(generator, "landing", &prompt, |l: &AiLanding| l.content.check()).await;

    match answer {
        Ok(ai) => {
            let based_on = pick_winner(stats, weights).map(|w| w.stats);
            let persona = dominant_cluster(clusters).map(|c| c.persona);
            let explanation = explanation_or(ai.explanation, || {
                "AI build from current variant stats and visitor clusters".to_string()
            });

            Generated {
                value: LandingPageSpec {
                    content: ai.content,
                    meta: LandingMeta {
                        based_on,
                        persona,
                        explanation,
                    },
                },
                provenance: Provenance::ai(),
            }
        }
        Err(failure) => fell_back(fallback_landing_spec(stats, clusters, weights), &failure),
    }
}

/// Write a page for one visitor cluster.
pub async fn generate_persona(generator: &dyn TextGenerator, cluster: &PersonaCluster) -> Generated<PersonaPage> {
    let prompt = persona_prompt(cluster);
    let answer: Result<AiPersona, AiFailure> =
        ask(generator, "persona", &prompt, |p: &AiPersona| {
            p.content.validate().map_err(|e| e.to_string())
        })
        .await;

    match answer {
        Ok(ai) => {
            let explanation = explanation_or(ai.explanation, || {
                format!("AI page for {} ({} sessions)", cluster.persona.slug(), cluster.sessions)
            });
            Generated {
                value: PersonaPage::new(
                    cluster.persona,
                    ai.content,
                    PersonaMeta {
                        based_on: (cluster.sessions > 0).then(|| cluster.clone()),
                        explanation,
                    },
                ),
                provenance: Provenance::ai(),
            }
        }
        Err(failure) => fell_back(fallback_persona_page(cluster), &failure),
    }
}
