//! Landing builds and persona pages.

use axum::http::StatusCode;
use doc_store::Collection;
use integration_tests::{
    fixtures,
    mocks::MockGenerator,
    setup::{seed_events, TestContext},
};
use serde_json::{json, Value};

fn deep_reader_window() -> Vec<Value> {
    fixtures::timed(vec![
        fixtures::scroll("r1", Some("B"), 80.0),
        fixtures::scroll("r1", Some("B"), 90.0),
        fixtures::scroll("r2", Some("B"), 75.0),
        fixtures::pageview("k1", Some("A")),
    ])
}

#[tokio::test]
async fn test_generate_landing_with_ai() {
    let ctx = TestContext::new();
    ctx.generator.answer(fixtures::ai_landing_json());
    let server = ctx.server();
    seed_events(&server, fixtures::reference_window()).await;

    let response = server.post("/api/landing/generate").await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["ok"], true);
    assert_eq!(body["aiUsed"], "ai");
    assert_eq!(body["spec"]["hero"]["title"], "The page that rewrites itself");
    assert_eq!(body["spec"]["meta"]["basedOn"]["variantId"], "B");

    let slug = body["slug"].as_str().unwrap_or_default().to_string();
    assert!(slug.starts_with("build-"), "got slug '{}'", slug);
    assert_eq!(ctx.store.count(Collection::LandingPages), 1);

    let stored: Value = server.get(&format!("/api/landing/{}", slug)).await.json();
    assert_eq!(stored["build"]["slug"], slug.as_str());
    assert_eq!(stored["build"]["hero"]["title"], "The page that rewrites itself");
}

#[tokio::test]
async fn test_generate_landing_fallback_on_empty_window() {
    let ctx = TestContext::with_generator(MockGenerator::without_credential());
    let server = ctx.server();

    let body: Value = server.post("/api/landing/generate").await.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["aiUsed"], "fallback");
    assert!(body["spec"]["meta"]["basedOn"].is_null());
    assert!(!body["spec"]["hero"]["title"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_promote_landing_existing_build() {
    let ctx = TestContext::with_generator(MockGenerator::without_credential());
    let server = ctx.server();

    let before: Value = server.get("/api/landing/active").await.json();
    assert_eq!(before["ok"], true);
    assert!(before["slug"].is_null());

    let generated: Value = server.post("/api/landing/generate").await.json();
    let slug = generated["slug"].as_str().unwrap_or_default().to_string();

    let response = server.post("/api/landing/promote").json(&json!({ "slug": slug })).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["slug"], slug.as_str());
    assert!(body["activatedAt"].is_string());

    let active: Value = server.get("/api/landing/active").await.json();
    assert_eq!(active["slug"], slug.as_str());
    assert_eq!(active["build"]["slug"], slug.as_str());
}

#[tokio::test]
async fn test_promote_landing_with_spec_saves_it() {
    let ctx = TestContext::with_generator(MockGenerator::without_credential());
    let server = ctx.server();

    let generated: Value = server.post("/api/landing/generate").await.json();
    let mut spec = generated["spec"].clone();
    spec["hero"]["title"] = json!("Edited by hand");

    let response = server
        .post("/api/landing/promote")
        .json(&json!({ "slug": "spring-launch", "spec": spec }))
        .await;
    response.assert_status_ok();

    let active: Value = server.get("/api/landing/active").await.json();
    assert_eq!(active["slug"], "spring-launch");
    assert_eq!(active["build"]["hero"]["title"], "Edited by hand");
}

#[tokio::test]
async fn test_promote_landing_errors() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/api/landing/promote")
        .json(&json!({ "slug": "missing-build" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post("/api/landing/promote")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/landing/promote")
        .json(&json!({ "slug": "Bad Slug!" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .get("/api/landing/nothing-here")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_persona_targets_dominant_cluster() {
    let ctx = TestContext::with_generator(MockGenerator::without_credential());
    let server = ctx.server();
    seed_events(&server, deep_reader_window()).await;

    let response = server.post("/api/persona").await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["ok"], true);
    assert_eq!(body["slug"], "deep-readers");
    assert_eq!(body["aiUsed"], "fallback");
    assert_eq!(body["page"]["persona"]["key"], "deep-readers");
    assert_eq!(body["page"]["meta"]["basedOn"]["sessions"], 2);

    let stored: Value = server.get("/api/persona/deep-readers").await.json();
    assert_eq!(stored["page"]["slug"], "deep-readers");
}

#[tokio::test]
async fn test_persona_requested_with_ai() {
    let ctx = TestContext::new();
    ctx.generator.answer(fixtures::ai_persona_json());
    let server = ctx.server();
    seed_events(&server, deep_reader_window()).await;

    let body: Value = server
        .post("/api/persona")
        .json(&json!({ "persona": "skimmers" }))
        .await
        .json();

    assert_eq!(body["slug"], "skimmers");
    assert_eq!(body["aiUsed"], "ai");
    assert_eq!(body["page"]["headline"], "For people who read to the end");
}

#[tokio::test]
async fn test_persona_errors() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/api/persona")
        .json(&json!({ "persona": "lurkers" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .get("/api/persona/skimmers")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
