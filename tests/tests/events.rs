//! Event ingestion, listing and dashboard stats.

use axum::http::StatusCode;
use doc_store::Collection;
use integration_tests::{
    fixtures,
    setup::{seed_events, TestContext},
};
use serde_json::{json, Value};

#[tokio::test]
async fn test_ingest_single_event_stamps_ts() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/events")
        .json(&fixtures::pageview("sess-1", Some("A")))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["received"], 1);
    assert_eq!(body["ids"].as_array().map(Vec::len), Some(1));
    assert_eq!(ctx.store.count(Collection::Events), 1);

    let listed: Value = server.get("/api/events").await.json();
    let ts = listed["events"][0]["ts"].as_str().unwrap_or_default();
    assert!(ts.ends_with('Z'), "server should stamp an ISO timestamp, got '{}'", ts);
}

#[tokio::test]
async fn test_client_timestamps_list_newest_first() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let with_ts = |session: &str, ts: &str| {
        let mut event = fixtures::pageview(session, Some("A"));
        event["ts"] = json!(ts);
        event
    };
    seed_events(
        &server,
        vec![
            with_ts("offset-0700z", "2024-05-01T12:00:00+05:00"),
            with_ts("utc-0900z", "2024-05-01T09:00:00Z"),
            with_ts("whole-second", "2024-05-01T10:00:00Z"),
            with_ts("half-second", "2024-05-01T10:00:00.500Z"),
        ],
    )
    .await;

    let listed: Value = server.get("/api/events").await.json();
    let order: Vec<&str> = listed["events"]
        .as_array()
        .map(|events| events.iter().filter_map(|e| e["sessionId"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(order, vec!["half-second", "whole-second", "utc-0900z", "offset-0700z"]);
    assert_eq!(listed["events"][3]["ts"], "2024-05-01T07:00:00.000Z");
}

#[tokio::test]
async fn test_ingest_object_and_array_formats() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/events")
        .json(&json!({ "events": [fixtures::pageview("s1", Some("A")), fixtures::click("s1", Some("A"))] }))
        .await;
    response.assert_status_ok();

    seed_events(&server, vec![fixtures::scroll("s2", Some("B"), 75.0)]).await;
    assert_eq!(ctx.store.count(Collection::Events), 3);
}

#[tokio::test]
async fn test_ingest_rejects_missing_session() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/events")
        .json(&json!({ "sessionId": "", "eventType": "click" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert!(body["error"].is_string());
    assert_eq!(ctx.store.count(Collection::Events), 0, "batch is all or nothing");
}

#[tokio::test]
async fn test_ingest_rejects_oversized_batch() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let events: Vec<Value> = (0..101).map(|_| fixtures::pageview("s", Some("A"))).collect();
    let response = server.post("/api/events").json(&events).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(ctx.store.count(Collection::Events), 0);
}

#[tokio::test]
async fn test_ingest_rejects_malformed_json() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/events")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_strict_buckets_and_filter() {
    let ctx = TestContext::new();
    let server = ctx.server();

    seed_events(
        &server,
        fixtures::timed(vec![
            fixtures::pageview("s1", Some("A")),
            fixtures::pageview("s2", Some("B")),
            fixtures::pageview("s3", None),
            fixtures::click("s4", Some("Z")),
        ]),
    )
    .await;

    let body: Value = server.get("/api/events").add_query_param("variant", "unknown").await.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["total"], 2, "missing and unrecognized ids are unknown");

    let buckets = body["buckets"].as_array().cloned().unwrap_or_default();
    let unknown = buckets.iter().find(|b| b["bucket"] == "unknown");
    assert!(unknown.is_some(), "strict view should report the unknown bucket: {:?}", buckets);

    let clicks: Value = server.get("/api/events").add_query_param("type", "click").await.json();
    assert_eq!(clicks["total"], 1);
    assert_eq!(clicks["events"][0]["sessionId"], "s4");
}

#[tokio::test]
async fn test_list_pagination() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let events = (0..7).map(|i| fixtures::pageview(&format!("s{}", i), Some("A"))).collect();
    seed_events(&server, fixtures::timed(events)).await;

    let body: Value = server
        .get("/api/events")
        .add_query_param("page", 2)
        .add_query_param("pageSize", 3)
        .await
        .json();

    assert_eq!(body["total"], 7);
    assert_eq!(body["page"], 2);
    assert_eq!(body["pageSize"], 3);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["events"].as_array().map(Vec::len), Some(3));
    // Newest first: s6 s5 s4 | s3 s2 s1 | s0
    assert_eq!(body["events"][0]["sessionId"], "s3");
}

#[tokio::test]
async fn test_list_rejects_bad_variant() {
    let ctx = TestContext::new();
    let response = ctx.server().get("/api/events").add_query_param("variant", "C").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_reference_window() {
    let ctx = TestContext::new();
    let server = ctx.server();
    seed_events(&server, fixtures::reference_window()).await;

    let response = server.get("/api/stats").await;
    response.assert_status_ok();
    let body: Value = response.json();

    let stats = body["stats"].as_array().cloned().unwrap_or_default();
    let a = stats.iter().find(|s| s["variantId"] == "A").cloned().unwrap_or_default();
    let b = stats.iter().find(|s| s["variantId"] == "B").cloned().unwrap_or_default();

    assert_eq!(a["avgScrollPercent"], 50.0);
    assert_eq!(a["clickEvents"], 1);
    assert_eq!(a["totalEvents"], 3);
    assert_eq!(b["avgScrollPercent"], 90.0);
    assert_eq!(b["clickEvents"], 0);
    assert_eq!(b["totalEvents"], 1);

    assert_eq!(body["winner"]["stats"]["variantId"], "B");
    assert_eq!(body["winner"]["score"], 90.0);
    assert_eq!(body["windowSize"], 4);
    assert_eq!(body["sessions"], 2);
    assert_eq!(body["recent"][0]["variantId"], "B", "recent events are newest first");
}

#[tokio::test]
async fn test_stats_empty_window() {
    let ctx = TestContext::new();
    let response = ctx.server().get("/api/stats").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["windowSize"], 0);
    assert_eq!(body["recent"], json!([]));
}

#[tokio::test]
async fn test_avg_scroll_null_without_scroll_events() {
    let ctx = TestContext::new();
    let server = ctx.server();
    seed_events(&server, vec![fixtures::click("s1", Some("B"))]).await;

    let body: Value = server.get("/api/stats").await.json();
    let stats = body["stats"].as_array().cloned().unwrap_or_default();
    let b = stats.iter().find(|s| s["variantId"] == "B").cloned().unwrap_or_default();
    assert!(b["avgScrollPercent"].is_null());
}
