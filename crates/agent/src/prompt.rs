//! Prompt templates.
//!
//! Each prompt embeds the JSON-encoded statistics and the exact JSON shape
//! the answer must have.

use landing_core::{PersonaCluster, ScoringWeights, SimpleStats};
use serde::Serialize;

const SUGGESTION_SCHEMA: &str = r#"{
  "fromVariant": "A" | "B",
  "heroTitle": string,
  "heroSubtitle": string,
  "primaryCta": string,
  "secondaryCta": string,
  "badge": string,
  "explanation": string
}"#;

const LANDING_SCHEMA: &str = r#"{
  "hero": {
    "eyebrow": string,
    "title": string,
    "subtitle": string,
    "primaryCta": string,
    "secondaryCta": string
  },
  "systemLabels": string[],
  "pillars": [{ "title": string, "body": string }],
  "stackPoints": string[],
  "editCards": [{ "area": string, "change": string, "reason": string }],
  "explanation": string
}"#;

const PERSONA_SCHEMA: &str = r#"{
  "headline": string,
  "subheadline": string,
  "sections": [{ "heading": string, "body": string }],
  "cta": string,
  "explanation": string
}"#;

const RULES: &str = "Answer with a single JSON object and nothing else. \
Every string must be non-empty. Do not wrap the answer in markdown.";

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// Prompt for a new hero variant ("Build C").
pub fn suggestion_prompt(stats: &[SimpleStats], weights: &ScoringWeights) -> String {
    format!(
        "You optimize the hero section of a landing page running an A/B test.\n\
         Per-variant statistics from the latest events (avgScroll is the mean scroll depth \
         in percent, null when unknown; clicks is the click count):\n\
         {stats}\n\n\
         Variants are ranked by {rule}. Start from the stronger variant and write a new \
         hero variant called Build C that should beat both.\n\n\
         {RULES}\n\
         Shape:\n{SUGGESTION_SCHEMA}\n",
        stats = to_json(stats),
        rule = weights.rule(),
    )
}

/// Prompt for a full landing page build.
pub fn landing_prompt(
    stats: &[SimpleStats],
    clusters: &[PersonaCluster],
    weights: &ScoringWeights,
) -> String {
    format!(
        "You design landing pages from visitor behavior.\n\
         Per-variant statistics:\n{stats}\n\n\
         Visitor clusters (sessions grouped by behavior):\n{clusters}\n\n\
         Variants are ranked by {rule}. Write a complete landing page aimed at the largest \
         cluster, building on the stronger variant. editCards explain each change and the \
         data behind it.\n\n\
         {RULES}\n\
         Shape:\n{LANDING_SCHEMA}\n",
        stats = to_json(stats),
        clusters = to_json(clusters),
        rule = weights.rule(),
    )
}

/// Prompt for a page aimed at one visitor cluster.
pub fn persona_prompt(cluster: &PersonaCluster) -> String {
    format!(
        "You write landing pages for one audience segment.\n\
         Segment: {name} ({description}).\n\
         Segment statistics:\n{cluster}\n\n\
         Write a short page for this segment with 1 to 6 sections.\n\n\
         {RULES}\n\
         Shape:\n{PERSONA_SCHEMA}\n",
        name = cluster.persona.name(),
        description = cluster.persona.description(),
        cluster = to_json(cluster),
    )
}
