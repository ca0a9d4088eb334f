//! Heuristic variant scoring.
//!
//! `score = (avgScroll or 0) + W * clicks`, with a single click weight `W`
//! shared by every generator.

use serde::{Deserialize, Serialize};

use crate::aggregate::SimpleStats;
use crate::limits::DEFAULT_CLICK_WEIGHT;

/// Scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    /// Weight `W` applied to the click count
    pub click_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            click_weight: DEFAULT_CLICK_WEIGHT,
        }
    }
}

impl ScoringWeights {
    pub fn new(click_weight: f64) -> Self {
        Self { click_weight }
    }

    /// Score a single variant.
    pub fn score(&self, stats: &SimpleStats) -> f64 {
        stats.avg_scroll.unwrap_or(0.0) + self.click_weight * stats.clicks as f64
    }

    /// Human-readable form of the rule, used in suggestion explanations.
    pub fn rule(&self) -> String {
        format!("score = avgScroll + {} * clicks", self.click_weight)
    }
}

/// A winning variant with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub stats: SimpleStats,
    pub score: f64,
}

/// Pick the highest-scoring variant.
///
/// Ties go to the first maximum in iteration order. Returns `None` only for
/// an empty input.
pub fn pick_winner(stats: &[SimpleStats], weights: &ScoringWeights) -> Option<Winner> {
    let mut best: Option<Winner> = None;

    for candidate in stats {
        let score = weights.score(candidate);
        let better = match &best {
            Some(current) => score > current.score,
            None => true,
        };
        if better {
            best = Some(Winner {
                stats: candidate.clone(),
                score,
            });
        }
    }

    best
}
