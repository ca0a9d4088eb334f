//! Variant persistence, promotion and disable-live.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::setup::TestContext;
use serde_json::{json, Value};

fn new_variant(title: &str) -> Value {
    json!({
        "fromVariant": "B",
        "heroTitle": title,
        "heroSubtitle": "Subtitle",
        "primaryCta": "Go",
        "secondaryCta": "Later",
        "badge": "Build C"
    })
}

async fn save(server: &TestServer, title: &str) -> String {
    let response = server.post("/api/variants").json(&new_variant(title)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["variant"]["id"].as_str().unwrap_or_default().to_string()
}

fn statuses(body: &Value) -> Vec<(String, String)> {
    body["variants"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|v| {
            (
                v["id"].as_str().unwrap_or_default().to_string(),
                v["status"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_save_variant_defaults() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.post("/api/variants").json(&new_variant("Hello")).await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["ok"], true);
    assert_eq!(body["variant"]["status"], "testing");
    assert_eq!(body["variant"]["createdBy"], "operator");
    assert_eq!(body["variant"]["heroTitle"], "Hello");
    assert!(body["variant"]["createdAt"].is_string());
}

#[tokio::test]
async fn test_save_variant_missing_field_is_400() {
    let ctx = TestContext::new();
    let mut body = new_variant("Hello");
    if let Some(fields) = body.as_object_mut() {
        fields.remove("heroTitle");
    }

    let response = ctx.server().post("/api/variants").json(&body).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["ok"], false);
}

#[tokio::test]
async fn test_save_variant_empty_field_is_400() {
    let ctx = TestContext::new();
    let response = ctx.server().post("/api/variants").json(&new_variant("")).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_promote_leaves_exactly_one_live() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let first = save(&server, "One").await;
    let second = save(&server, "Two").await;
    let third = save(&server, "Three").await;

    server
        .post("/api/variants/promote")
        .json(&json!({ "id": first }))
        .await
        .assert_status_ok();

    let response = server.post("/api/variants/promote").json(&json!({ "id": second })).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], second.as_str());
    assert_eq!(body["archived"], 2);

    let listed: Value = server.get("/api/variants").await.json();
    let all = statuses(&listed);
    assert_eq!(all.len(), 3);
    let live: Vec<_> = all.iter().filter(|(_, s)| s == "live").collect();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].0, second);
    assert!(all
        .iter()
        .filter(|(id, _)| *id != second)
        .all(|(_, s)| s == "archived"));
    assert!(all.iter().any(|(id, _)| *id == third));

    let current: Value = server.get("/api/variants/live").await.json();
    assert_eq!(current["variant"]["id"], second.as_str());
}

#[tokio::test]
async fn test_promote_unknown_id_is_404() {
    let ctx = TestContext::new();
    let server = ctx.server();
    save(&server, "One").await;

    let response = server.post("/api/variants/promote").json(&json!({ "id": "nope" })).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let listed: Value = server.get("/api/variants").await.json();
    assert!(statuses(&listed).iter().all(|(_, s)| s == "testing"));
}

#[tokio::test]
async fn test_promote_without_id_is_400() {
    let ctx = TestContext::new();
    let response = ctx.server().post("/api/variants/promote").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disable_live_noop_then_archive() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let id = save(&server, "One").await;

    let noop: Value = server.post("/api/variants/disable-live").await.json();
    assert_eq!(noop["ok"], true);
    assert_eq!(noop["noop"], true);
    assert_eq!(noop["disabled"], 0);

    let listed: Value = server.get("/api/variants").await.json();
    assert_eq!(statuses(&listed), vec![(id.clone(), "testing".to_string())]);

    server
        .post("/api/variants/promote")
        .json(&json!({ "id": id }))
        .await
        .assert_status_ok();

    let disabled: Value = server.post("/api/variants/disable-live").await.json();
    assert_eq!(disabled["noop"], false);
    assert_eq!(disabled["disabled"], 1);

    let current: Value = server.get("/api/variants/live").await.json();
    assert!(current["variant"].is_null());
}

#[tokio::test]
async fn test_live_is_null_initially() {
    let ctx = TestContext::new();
    let body: Value = ctx.server().get("/api/variants/live").await.json();
    assert_eq!(body["ok"], true);
    assert!(body["variant"].is_null());
}
