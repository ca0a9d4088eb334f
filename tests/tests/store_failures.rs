//! Store failures surface as 500s with the error body and no leaked detail.
//!
//! Kept in its own binary: store failures flip the process-wide health registry.

use axum::http::StatusCode;
use axum_test::TestServer;
use doc_store::Collection;
use integration_tests::{fixtures, mocks::FailingStore, mocks::MockGenerator, setup::build_router};
use serde_json::{json, Value};
use std::sync::Arc;

fn failing_server() -> (Arc<FailingStore>, TestServer) {
    let store = Arc::new(FailingStore::new());
    let router = build_router(store.clone(), MockGenerator::without_credential());
    let server = TestServer::new(router).expect("Failed to create test server");
    (store, server)
}

#[tokio::test]
async fn test_reads_fail_with_500() {
    let (store, server) = failing_server();
    store.set_failing(true);

    for path in ["/api/stats", "/api/agent", "/api/variants", "/api/events"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["ok"], false, "{} should render the error body", path);
        assert_eq!(body["code"], "STORE_001");
        assert!(!body["error"].as_str().unwrap_or_default().contains("mock"));
    }
}

#[tokio::test]
async fn test_ingest_fails_with_500() {
    let (store, server) = failing_server();
    store.set_failing(true);

    let response = server
        .post("/api/events")
        .json(&fixtures::pageview("s1", Some("A")))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_ingest_batch_is_all_or_nothing() {
    let (store, server) = failing_server();
    store.allow_writes(1);

    let batch = json!([
        fixtures::pageview("s1", Some("A")),
        fixtures::click("s1", Some("A")),
        fixtures::scroll("s2", Some("B"), 50.0),
    ]);
    server.post("/api/events").json(&batch).await.assert_status_ok();
    assert_eq!(store.count(Collection::Events), 3);

    server
        .post("/api/events")
        .json(&batch)
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.count(Collection::Events), 3);
}

#[tokio::test]
async fn test_failed_promotion_changes_nothing() {
    let (store, server) = failing_server();

    let saved: Value = server
        .post("/api/variants")
        .json(&json!({
            "fromVariant": "A",
            "heroTitle": "T",
            "heroSubtitle": "S",
            "primaryCta": "P",
            "secondaryCta": "Q",
            "badge": "B"
        }))
        .await
        .json();
    let id = saved["variant"]["id"].as_str().unwrap_or_default().to_string();

    store.set_failing(true);
    server
        .post("/api/variants/promote")
        .json(&json!({ "id": id }))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    store.set_failing(false);
    let listed: Value = server.get("/api/variants").await.json();
    assert_eq!(listed["variants"][0]["status"], "testing");
}

#[tokio::test]
async fn test_ready_reports_store_down() {
    let (store, server) = failing_server();
    store.set_failing(true);
    server.get("/health/ready").await.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    store.set_failing(false);
    server.get("/health/ready").await.assert_status_ok();
}
