//! Tests for health check and metrics endpoints.

use axum::http::StatusCode;
use integration_tests::{fixtures, setup::seed_events, setup::TestContext};
use serde_json::Value;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let response = ctx.server().get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    for field in ["status", "storeBackend", "storeConnected", "aiConfigured", "components"] {
        assert!(body.get(field).is_some(), "Response should have '{}' field", field);
    }
    assert_eq!(body["storeBackend"], "memory");
    assert_eq!(body["aiConfigured"], true);

    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "degraded" || status == "unhealthy",
        "Status should be 'healthy', 'degraded', or 'unhealthy', got '{}'",
        status
    );
}

/// The memory store always answers its ping.
#[tokio::test]
async fn test_ready_endpoint() {
    let ctx = TestContext::new();
    ctx.server().get("/health/ready").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_live_endpoint() {
    let ctx = TestContext::new();
    ctx.server().get("/health/live").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_count_ingested_events() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let before: Value = server.get("/metrics").await.json();
    seed_events(&server, fixtures::reference_window()).await;
    let after: Value = server.get("/metrics").await.json();

    let received = |m: &Value| m["eventsReceived"].as_u64().unwrap_or(0);
    assert!(
        received(&after) >= received(&before) + 4,
        "eventsReceived should grow by the batch size"
    );
}
