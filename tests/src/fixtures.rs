//! Test fixtures and event builders.

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

/// A fresh session id.
pub fn session_id() -> String {
    format!("sess-{}", Uuid::new_v4().simple())
}

/// Fixed timestamp `offset_secs` after a base instant, so window order is predictable.
pub fn ts(offset_secs: i64) -> String {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).single().unwrap_or_else(Utc::now);
    (base + Duration::seconds(offset_secs)).to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn pageview(session: &str, variant: Option<&str>) -> Value {
    event(session, variant, "pageview", json!({}))
}

pub fn click(session: &str, variant: Option<&str>) -> Value {
    event(session, variant, "click", json!({ "target": "primary-cta" }))
}

pub fn scroll(session: &str, variant: Option<&str>, percent: f64) -> Value {
    event(session, variant, "scroll", json!({ "scrollPercent": percent }))
}

/// An event body as the page instrumentation posts it.
pub fn event(session: &str, variant: Option<&str>, event_type: &str, payload: Value) -> Value {
    let mut event = json!({
        "sessionId": session,
        "eventType": event_type,
        "payload": payload,
    });
    if let Some(variant) = variant {
        event["variantId"] = json!(variant);
    }
    event
}

/// Stamp events with increasing timestamps in list order.
pub fn timed(events: Vec<Value>) -> Vec<Value> {
    events
        .into_iter()
        .enumerate()
        .map(|(i, mut e)| {
            e["ts"] = json!(ts(i as i64));
            e
        })
        .collect()
}

/// A = scroll 40, scroll 60, click; B = scroll 90.
///
/// A averages 50 with one click and scores 52 at a click weight of 2; B scores 90 and wins.
pub fn reference_window() -> Vec<Value> {
    timed(vec![
        scroll("sess-a", Some("A"), 40.0),
        scroll("sess-a", Some("A"), 60.0),
        click("sess-a", Some("A")),
        scroll("sess-b", Some("B"), 90.0),
    ])
}

/// A well-formed model answer for the variant suggestion prompt.
pub fn ai_suggestion_json(from_variant: &str) -> String {
    json!({
        "fromVariant": from_variant,
        "heroTitle": "Pages that learn while you sleep",
        "heroSubtitle": "Every scroll teaches the next headline.",
        "primaryCta": "Try it free",
        "secondaryCta": "See the data",
        "badge": "Build C · AI",
        "explanation": "Deep scrolling on B suggests a story-led hero."
    })
    .to_string()
}

/// A well-formed model answer for the landing prompt.
pub fn ai_landing_json() -> String {
    json!({
        "hero": {
            "eyebrow": "Build C",
            "title": "The page that rewrites itself",
            "subtitle": "Visitors vote with their scroll wheel.",
            "primaryCta": "Start now",
            "secondaryCta": "How it works"
        },
        "systemLabels": ["Measure", "Score", "Rewrite", "Promote"],
        "pillars": [
            { "title": "Measured", "body": "Every event is tied to a variant." }
        ],
        "stackPoints": ["Events", "Scoring", "AI copy"],
        "editCards": [
            { "area": "Hero", "change": "Lead with the story", "reason": "B readers scroll deep" }
        ],
        "explanation": "B readers scroll deep."
    })
    .to_string()
}

/// A well-formed model answer for the persona prompt.
pub fn ai_persona_json() -> String {
    json!({
        "headline": "For people who read to the end",
        "subheadline": "The whole loop, explained.",
        "sections": [
            { "heading": "Measure", "body": "We log scroll depth per variant." }
        ],
        "cta": "Read more",
        "explanation": "Deep readers dominate."
    })
    .to_string()
}
