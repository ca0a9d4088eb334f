//! Landing-page builds.
//!
//! A build is a full page specification generated from the current stats.
//! Builds are stored under a slug in `landingPages`; the `settings/landingPage`
//! document points at the one being served.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::aggregate::SimpleStats;
use crate::persona::{dominant_cluster, Persona, PersonaCluster};
use crate::scoring::{pick_winner, ScoringWeights};

/// Hero block of a landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HeroBlock {
    #[validate(length(min = 1, max = 80))]
    pub eyebrow: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 500))]
    pub subtitle: String,
    #[validate(length(min = 1, max = 80))]
    pub primary_cta: String,
    #[validate(length(min = 1, max = 80))]
    pub secondary_cta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Pillar {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(min = 1, max = 600))]
    pub body: String,
}

/// A proposed edit with the reason behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditCard {
    #[validate(length(min = 1, max = 80))]
    pub area: String,
    #[validate(length(min = 1, max = 300))]
    pub change: String,
    #[validate(length(min = 1, max = 300))]
    pub reason: String,
}

/// Page content, as produced by the AI or the fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LandingContent {
    #[validate(nested)]
    pub hero: HeroBlock,
    #[validate(length(min = 1, max = 12))]
    pub system_labels: Vec<String>,
    #[validate(length(min = 1, max = 8))]
    #[validate(nested)]
    pub pillars: Vec<Pillar>,
    #[validate(length(min = 1, max = 12))]
    pub stack_points: Vec<String>,
    #[validate(length(min = 1, max = 8))]
    #[validate(nested)]
    pub edit_cards: Vec<EditCard>,
}

impl LandingContent {
    /// Full validation, including the non-empty strings inside the plain lists.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;
        if self.system_labels.iter().any(|l| l.trim().is_empty()) {
            return Err("systemLabels contains an empty entry".into());
        }
        if self.stack_points.iter().any(|p| p.trim().is_empty()) {
            return Err("stackPoints contains an empty entry".into());
        }
        Ok(())
    }
}

/// Provenance of a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingMeta {
    pub based_on: Option<SimpleStats>,
    pub persona: Option<Persona>,
    pub explanation: String,
}

/// A generated landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPageSpec {
    #[serde(flatten)]
    pub content: LandingContent,
    pub meta: LandingMeta,
}

/// A stored build: the spec plus its slug and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingBuild {
    pub slug: String,
    #[serde(flatten)]
    pub spec: LandingPageSpec,
    pub created_at: String,
}

impl LandingBuild {
    pub fn new(slug: impl Into<String>, spec: LandingPageSpec, now: DateTime<Utc>) -> Self {
        Self {
            slug: slug.into(),
            spec,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Slug for a freshly generated build, e.g. `build-20240501-100000-3f9a1c2e`.
pub fn new_build_slug(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("build-{}-{}", now.format("%Y%m%d-%H%M%S"), &suffix[..8])
}

/// Slugs are lowercase ASCII letters, digits and dashes, 1 to 64 long.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 64
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

const SYSTEM_LABELS: [&str; 4] = ["Measure", "Score", "Rewrite", "Promote"];

const STACK_POINTS: [&str; 4] = [
    "Scroll and click events logged per variant",
    "Per-session behavior summaries",
    "Heuristic scoring with an AI copy pass",
    "One-click promotion to live",
];

fn hero_for(winner: Option<&SimpleStats>, persona: Option<Persona>) -> HeroBlock {
    match (winner, persona) {
        (Some(w), Some(Persona::HighIntentClickers)) => HeroBlock {
            eyebrow: format!("Build C · from variant {}", w.variant_id),
            title: "Launch the page your visitors already click".into(),
            subtitle: "Most sessions act fast. This build puts the offer and the button above everything else.".into(),
            primary_cta: "Launch now".into(),
            secondary_cta: "Compare variants".into(),
        },
        (Some(w), Some(Persona::DeepReaders)) => HeroBlock {
            eyebrow: format!("Build C · from variant {}", w.variant_id),
            title: "The story your readers scroll for".into(),
            subtitle: "Most sessions read deep. This build opens with how it works and earns the click later.".into(),
            primary_cta: "Read how it works".into(),
            secondary_cta: "Start building".into(),
        },
        (Some(w), _) => HeroBlock {
            eyebrow: format!("Build C · from variant {}", w.variant_id),
            title: "Say it in one line".into(),
            subtitle: "Most sessions skim. This build trims the hero to one promise and one action.".into(),
            primary_cta: "Get started".into(),
            secondary_cta: "See it in action".into(),
        },
        (None, _) => HeroBlock {
            eyebrow: "Build C · baseline".into(),
            title: "A landing page that improves itself".into(),
            subtitle: "No visitor data yet. This baseline build balances story and action until events arrive.".into(),
            primary_cta: "Get started".into(),
            secondary_cta: "Learn more".into(),
        },
    }
}

fn edit_cards_for(winner: Option<&SimpleStats>, cluster: Option<&PersonaCluster>) -> Vec<EditCard> {
    let mut cards = Vec::new();

    if let Some(w) = winner {
        cards.push(EditCard {
            area: "Hero".into(),
            change: format!("Start from variant {} copy", w.variant_id),
            reason: match w.avg_scroll {
                Some(avg) => format!(
                    "Variant {} averages {:.0}% scroll depth with {} clicks",
                    w.variant_id, avg, w.clicks
                ),
                None => format!("Variant {} has {} clicks and no scroll data", w.variant_id, w.clicks),
            },
        });
    }

    if let Some(c) = cluster {
        cards.push(EditCard {
            area: "Layout".into(),
            change: match c.persona {
                Persona::HighIntentClickers => "Move the primary call to action above the fold".into(),
                Persona::DeepReaders => "Expand the how-it-works section".into(),
                Persona::Skimmers => "Cut the hero subtitle to one sentence".into(),
            },
            reason: format!("{} sessions classified as {}", c.sessions, c.persona.slug()),
        });
    }

    if cards.is_empty() {
        cards.push(EditCard {
            area: "Hero".into(),
            change: "Keep the baseline copy".into(),
            reason: "No events recorded yet".into(),
        });
    }

    cards
}

/// Deterministic landing build from variant stats and persona clusters.
pub fn fallback_landing_spec(
    stats: &[SimpleStats],
    clusters: &[PersonaCluster],
    weights: &ScoringWeights,
) -> LandingPageSpec {
    let winner = pick_winner(stats, weights);
    let cluster = dominant_cluster(clusters);
    let winner_stats = winner.as_ref().map(|w| &w.stats);

    let content = LandingContent {
        hero: hero_for(winner_stats, cluster.map(|c| c.persona)),
        system_labels: SYSTEM_LABELS.iter().map(|s| s.to_string()).collect(),
        pillars: vec![
            Pillar {
                title: "Learns from behavior".into(),
                body: "Every scroll and click is tied to the variant the visitor saw.".into(),
            },
            Pillar {
                title: "Explains its picks".into(),
                body: format!("Variants are ranked by {}.", weights.rule()),
            },
            Pillar {
                title: "You stay in control".into(),
                body: "Nothing goes live until an operator promotes it.".into(),
            },
        ],
        stack_points: STACK_POINTS.iter().map(|s| s.to_string()).collect(),
        edit_cards: edit_cards_for(winner_stats, cluster),
    };

    let explanation = match &winner {
        Some(w) => format!(
            "Heuristic fallback: built from variant {} ({}, {:.1}){}.",
            w.stats.variant_id,
            weights.rule(),
            w.score,
            cluster
                .map(|c| format!(" for {}", c.persona.slug()))
                .unwrap_or_default()
        ),
        None => "Heuristic fallback: no statistics available, using the baseline build.".to_string(),
    };

    LandingPageSpec {
        content,
        meta: LandingMeta {
            based_on: winner.map(|w| w.stats),
            persona: cluster.map(|c| c.persona),
            explanation,
        },
    }
}
