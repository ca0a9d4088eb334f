//! End-to-end tests for the agent suggestion flow.
//!
//! GET /api/agent → event window → stats → MockGenerator (or fallback)
//! → suggestion, optionally persisted by auto mode.

use axum::http::StatusCode;
use copy_agent::GenerationError;
use doc_store::Collection;
use integration_tests::{
    fixtures,
    mocks::MockGenerator,
    setup::{seed_events, TestContext},
};
use serde_json::{json, Value};

#[tokio::test]
async fn test_agent_empty_window_is_400() {
    let ctx = TestContext::new();
    let response = ctx.server().get("/api/agent").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], "INPUT_001");
    assert_eq!(ctx.generator.call_count(), 0);
}

#[tokio::test]
async fn test_agent_uses_ai_answer() {
    let ctx = TestContext::new();
    ctx.generator.answer(format!("```json\n{}\n```", fixtures::ai_suggestion_json("B")));
    let server = ctx.server();
    seed_events(&server, fixtures::reference_window()).await;

    let response = server.get("/api/agent").await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["ok"], true);
    assert_eq!(body["aiUsed"], "ai");
    assert!(body["aiError"].is_null());
    assert_eq!(body["suggestion"]["fromVariant"], "B");
    assert_eq!(body["suggestion"]["heroTitle"], "Pages that learn while you sleep");
    assert_eq!(body["suggestion"]["meta"]["basedOn"]["variantId"], "B");
    assert!(body.get("savedVariant").is_none(), "auto mode is off by default");

    let prompts = ctx.generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("heroTitle"), "prompt should describe the schema");
}

#[tokio::test]
async fn test_agent_falls_back_on_missing_field() {
    let ctx = TestContext::new();
    ctx.generator.answer(json!({ "heroSubtitle": "no title here" }).to_string());
    let server = ctx.server();
    seed_events(&server, fixtures::reference_window()).await;

    let body: Value = server.get("/api/agent").await.json();

    assert_eq!(body["ok"], true);
    assert_eq!(body["aiUsed"], "fallback");
    assert_eq!(body["aiError"], "invalid response shape");
    // Heuristic winner with W = 2: B (90) beats A (52).
    assert_eq!(body["suggestion"]["fromVariant"], "B");
    assert!(!body["suggestion"]["heroTitle"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_agent_falls_back_on_provider_failure() {
    let ctx = TestContext::new();
    ctx.generator.fail(GenerationError::Timeout(30));
    let server = ctx.server();
    seed_events(&server, fixtures::reference_window()).await;

    let body: Value = server.get("/api/agent").await.json();

    assert_eq!(body["aiUsed"], "fallback");
    let reason = body["aiError"].as_str().unwrap_or_default();
    assert!(reason.starts_with("call failed"), "got '{}'", reason);
}

#[tokio::test]
async fn test_agent_without_credential_skips_call() {
    let ctx = TestContext::with_generator(MockGenerator::without_credential());
    let server = ctx.server();
    seed_events(&server, fixtures::reference_window()).await;

    let body: Value = server.get("/api/agent").await.json();

    assert_eq!(body["aiUsed"], "fallback");
    assert_eq!(body["aiError"], "missing credential");
    assert_eq!(ctx.generator.call_count(), 0);
}

#[tokio::test]
async fn test_agent_is_deterministic_on_fallback() {
    let ctx = TestContext::with_generator(MockGenerator::without_credential());
    let server = ctx.server();
    seed_events(&server, fixtures::reference_window()).await;

    let first: Value = server.get("/api/agent").await.json();
    let second: Value = server.get("/api/agent").await.json();
    assert_eq!(first["suggestion"], second["suggestion"]);
}

#[tokio::test]
async fn test_auto_mode_saves_testing_variant() {
    let ctx = TestContext::with_generator(MockGenerator::without_credential());
    let server = ctx.server();
    seed_events(&server, fixtures::reference_window()).await;

    server
        .post("/api/settings/agent")
        .json(&json!({ "autoMode": true }))
        .await
        .assert_status_ok();

    let body: Value = server.get("/api/agent").await.json();
    assert_eq!(body["savedVariant"]["status"], "testing");
    assert_eq!(body["savedVariant"]["createdBy"], "agent-auto");
    assert!(body["savedVariant"]["id"].is_string());
    assert_eq!(ctx.store.count(Collection::Variants), 1);

    let settings: Value = server.get("/api/settings/agent").await.json();
    assert_eq!(settings["settings"]["autoMode"], true);
}

#[tokio::test]
async fn test_settings_rejects_bad_body() {
    let ctx = TestContext::new();
    let response = ctx
        .server()
        .post("/api/settings/agent")
        .json(&json!({ "autoMode": "yes" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
}
