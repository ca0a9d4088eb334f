//! Visitor personas and persona-page generation.
//!
//! Sessions are clustered by behavior into three fixed personas. The
//! generators pick the dominant one (or the one requested) and build a page
//! targeted at it.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::limits::{DEEP_READER_SCROLL, HIGH_INTENT_CLICKS};
use crate::session::SessionSummary;

/// Behavior clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Persona {
    HighIntentClickers,
    DeepReaders,
    Skimmers,
}

impl Persona {
    /// Fixed iteration order, also the tie-break order.
    pub const ALL: [Persona; 3] = [Persona::HighIntentClickers, Persona::DeepReaders, Persona::Skimmers];

    /// Slug used as the `personaPages` document id.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::HighIntentClickers => "high-intent-clickers",
            Self::DeepReaders => "deep-readers",
            Self::Skimmers => "skimmers",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.slug() == raw)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HighIntentClickers => "High-intent clickers",
            Self::DeepReaders => "Deep readers",
            Self::Skimmers => "Skimmers",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::HighIntentClickers => "Visitors who click through quickly and act on calls to action.",
            Self::DeepReaders => "Visitors who scroll most of the page before deciding.",
            Self::Skimmers => "Visitors who glance at the hero and leave or wander.",
        }
    }

    /// Classify a single session. Clicking wins over reading.
    pub fn classify(session: &SessionSummary) -> Self {
        if session.clicks >= HIGH_INTENT_CLICKS {
            Self::HighIntentClickers
        } else if session.avg_scroll.is_some_and(|s| s >= DEEP_READER_SCROLL) {
            Self::DeepReaders
        } else {
            Self::Skimmers
        }
    }
}

/// Aggregate for one persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaCluster {
    pub persona: Persona,
    pub sessions: u64,
    /// Mean of the member sessions' running scroll figures
    pub avg_scroll: Option<f64>,
    pub clicks: u64,
}

/// Cluster sessions into all three personas, in [`Persona::ALL`] order.
pub fn cluster_sessions(sessions: &[SessionSummary]) -> Vec<PersonaCluster> {
    Persona::ALL
        .iter()
        .map(|persona| {
            let members: Vec<&SessionSummary> = sessions
                .iter()
                .filter(|s| Persona::classify(s) == *persona)
                .collect();

            let scrolls: Vec<f64> = members.iter().filter_map(|s| s.avg_scroll).collect();
            let avg_scroll = if scrolls.is_empty() {
                None
            } else {
                Some(scrolls.iter().sum::<f64>() / scrolls.len() as f64)
            };

            PersonaCluster {
                persona: *persona,
                sessions: members.len() as u64,
                avg_scroll,
                clicks: members.iter().map(|s| s.clicks).sum(),
            }
        })
        .collect()
}

/// The cluster with the most sessions; first in order on ties, `None` when empty.
pub fn dominant_cluster(clusters: &[PersonaCluster]) -> Option<&PersonaCluster> {
    let mut best: Option<&PersonaCluster> = None;
    for cluster in clusters.iter().filter(|c| c.sessions > 0) {
        if best.map_or(true, |b| cluster.sessions > b.sessions) {
            best = Some(cluster);
        }
    }
    best
}

/// Persona descriptor embedded in a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PersonaProfile {
    #[validate(length(min = 1))]
    pub key: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
}

/// A titled content section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PageSection {
    #[validate(length(min = 1, max = 200))]
    pub heading: String,
    #[validate(length(min = 1, max = 2000))]
    pub body: String,
}

/// Generated content of a persona page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PersonaContent {
    #[validate(length(min = 1, max = 200))]
    pub headline: String,
    #[validate(length(min = 1, max = 500))]
    pub subheadline: String,
    #[validate(length(min = 1, max = 12))]
    #[validate(nested)]
    pub sections: Vec<PageSection>,
    #[validate(length(min = 1, max = 80))]
    pub cta: String,
}

/// Provenance of a generated page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaMeta {
    pub based_on: Option<PersonaCluster>,
    pub explanation: String,
}

/// A persona page, stored under `slug` in `personaPages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaPage {
    pub slug: String,
    pub persona: PersonaProfile,
    #[serde(flatten)]
    pub content: PersonaContent,
    pub meta: PersonaMeta,
}

impl PersonaPage {
    pub fn new(persona: Persona, content: PersonaContent, meta: PersonaMeta) -> Self {
        Self {
            slug: persona.slug().to_string(),
            persona: PersonaProfile {
                key: persona.slug().to_string(),
                name: persona.name().to_string(),
                description: persona.description().to_string(),
            },
            content,
            meta,
        }
    }
}

/// Pick the persona to generate for: the requested one, else the dominant
/// cluster, else `Skimmers` as the neutral default.
pub fn target_cluster(clusters: &[PersonaCluster], requested: Option<Persona>) -> PersonaCluster {
    let persona = requested
        .or_else(|| dominant_cluster(clusters).map(|c| c.persona))
        .unwrap_or(Persona::Skimmers);

    clusters
        .iter()
        .find(|c| c.persona == persona)
        .cloned()
        .unwrap_or(PersonaCluster {
            persona,
            sessions: 0,
            avg_scroll: None,
            clicks: 0,
        })
}

fn persona_content(persona: Persona) -> PersonaContent {
    match persona {
        Persona::HighIntentClickers => PersonaContent {
            headline: "Ready when you are".into(),
            subheadline: "Skip the tour. Launch a self-optimizing page in minutes.".into(),
            sections: vec![
                PageSection {
                    heading: "One click to launch".into(),
                    body: "Pick a starting variant and go live. The agent keeps testing in the background.".into(),
                },
                PageSection {
                    heading: "Pricing up front".into(),
                    body: "Plans are listed right here so there is nothing between you and the button.".into(),
                },
            ],
            cta: "Launch now".into(),
        },
        Persona::DeepReaders => PersonaContent {
            headline: "How the page learns from every visit".into(),
            subheadline: "A walk through the loop: measure, score, rewrite, promote.".into(),
            sections: vec![
                PageSection {
                    heading: "Measure".into(),
                    body: "Scroll depth and clicks are logged per variant and per session.".into(),
                },
                PageSection {
                    heading: "Score".into(),
                    body: "Each variant gets one number from its reading depth and clicks.".into(),
                },
                PageSection {
                    heading: "Rewrite and promote".into(),
                    body: "The agent drafts Build C from the winner; you decide when it goes live.".into(),
                },
            ],
            cta: "Read the full walkthrough".into(),
        },
        Persona::Skimmers => PersonaContent {
            headline: "A landing page that improves itself".into(),
            subheadline: "Real visitor behavior in, better copy out.".into(),
            sections: vec![PageSection {
                heading: "In short".into(),
                body: "Split traffic, watch what works, ship the winner.".into(),
            }],
            cta: "See it in action".into(),
        },
    }
}

/// Deterministic persona page for the target cluster.
pub fn fallback_persona_page(cluster: &PersonaCluster) -> PersonaPage {
    let explanation = if cluster.sessions == 0 {
        format!(
            "Heuristic fallback: no sessions matched, using the {} template.",
            cluster.persona.slug()
        )
    } else {
        format!(
            "Heuristic fallback: {} sessions classified as {}.",
            cluster.sessions,
            cluster.persona.slug()
        )
    };

    PersonaPage::new(
        cluster.persona,
        persona_content(cluster.persona),
        PersonaMeta {
            based_on: (cluster.sessions > 0).then(|| cluster.clone()),
            explanation,
        },
    )
}
