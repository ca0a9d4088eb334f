//! Request latency and in-flight tracking.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use telemetry::metrics;

pub async fn track_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    metrics().active_requests.inc();

    let response = next.run(request).await;

    metrics().active_requests.dec();
    metrics().request_latency_ms.observe_since(started);
    response
}
