//! Hero-copy suggestions ("Build C") and the deterministic fallback generator.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::aggregate::SimpleStats;
use crate::events::VariantId;
use crate::scoring::{pick_winner, ScoringWeights, Winner};

/// The copy fields every suggestion must carry, all non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionCopy {
    #[validate(length(min = 1, max = 200))]
    pub hero_title: String,
    #[validate(length(min = 1, max = 500))]
    pub hero_subtitle: String,
    #[validate(length(min = 1, max = 80))]
    pub primary_cta: String,
    #[validate(length(min = 1, max = 80))]
    pub secondary_cta: String,
    #[validate(length(min = 1, max = 80))]
    pub badge: String,
}

/// Provenance attached to a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionMeta {
    /// Stats of the variant the suggestion builds on; `None` for the neutral template
    pub based_on: Option<SimpleStats>,
    pub explanation: String,
}

/// A proposed new hero variant, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentVariantSuggestion {
    pub from_variant: String,
    #[serde(flatten)]
    pub copy: SuggestionCopy,
    pub meta: SuggestionMeta,
}

/// Which signal dominated the winning score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Angle {
    Depth,
    Action,
}

fn angle(winner: &Winner, weights: &ScoringWeights) -> Angle {
    let scroll = winner.stats.avg_scroll.unwrap_or(0.0);
    let clicks = weights.click_weight * winner.stats.clicks as f64;
    if clicks > scroll {
        Angle::Action
    } else {
        Angle::Depth
    }
}

/// Copy used when there is no behavior data at all.
pub fn neutral_copy() -> SuggestionCopy {
    SuggestionCopy {
        hero_title: "Your landing page, tuned by real visitors".into(),
        hero_subtitle: "There is not enough behavior data yet. Build C starts from a balanced baseline and adapts as events arrive.".into(),
        primary_cta: "Get started".into(),
        secondary_cta: "Learn more".into(),
        badge: "Build C · baseline".into(),
    }
}

fn winner_copy(winner: &Winner, weights: &ScoringWeights) -> SuggestionCopy {
    let id = &winner.stats.variant_id;
    match angle(winner, weights) {
        Angle::Depth => SuggestionCopy {
            hero_title: "The landing page that rewrites itself".into(),
            hero_subtitle: format!(
                "Visitors on variant {} read {:.0}% of the page. Build C leads with the story they keep scrolling for.",
                id,
                winner.stats.avg_scroll.unwrap_or(0.0)
            ),
            primary_cta: "Start building".into(),
            secondary_cta: "See how it works".into(),
            badge: "Build C · depth-led".into(),
        },
        Angle::Action => SuggestionCopy {
            hero_title: "Ship copy that converts while you sleep".into(),
            hero_subtitle: format!(
                "Variant {} drew {} clicks in the current window. Build C puts the call to action first.",
                id, winner.stats.clicks
            ),
            primary_cta: "Launch your page".into(),
            secondary_cta: "Watch the demo".into(),
            badge: "Build C · action-led".into(),
        },
    }
}

/// Deterministic suggestion from aggregated stats.
///
/// Picks the winner with [`pick_winner`] and fills fixed templates. An empty
/// input yields the neutral template built on the control variant `A`, with
/// `basedOn: null`.
pub fn fallback_suggestion(stats: &[SimpleStats], weights: &ScoringWeights) -> AgentVariantSuggestion {
    match pick_winner(stats, weights) {
        Some(winner) => AgentVariantSuggestion {
            from_variant: winner.stats.variant_id.clone(),
            copy: winner_copy(&winner, weights),
            meta: SuggestionMeta {
                explanation: format!(
                    "Heuristic fallback: variant {} wins with {} ({:.1}).",
                    winner.stats.variant_id,
                    weights.rule(),
                    winner.score
                ),
                based_on: Some(winner.stats),
            },
        },
        None => AgentVariantSuggestion {
            from_variant: VariantId::A.as_str().to_string(),
            copy: neutral_copy(),
            meta: SuggestionMeta {
                based_on: None,
                explanation: format!(
                    "Heuristic fallback: no variant statistics available, using the neutral baseline ({}).",
                    weights.rule()
                ),
            },
        },
    }
}
