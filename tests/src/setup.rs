//! Common test setup functions.

use api::{router, AppState};
use axum::Router;
use axum_test::TestServer;
use doc_store::{DocumentStore, MemoryStore};
use landing_core::AgentConfig;
use serde_json::Value;
use std::sync::Arc;

use crate::mocks::MockGenerator;

/// Test context: the real router with all middleware over an in-memory store
/// and a scripted generator.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub generator: MockGenerator,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_generator(MockGenerator::new())
    }

    pub fn with_generator(generator: MockGenerator) -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = build_router(store.clone(), generator.clone());
        Self {
            store,
            generator,
            router,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Router over any store, for failure injection.
pub fn build_router(store: Arc<dyn DocumentStore>, generator: MockGenerator) -> Router {
    router(AppState::new(store, Arc::new(generator), AgentConfig::default()))
}

/// POST events and assert they were all stored.
pub async fn seed_events(server: &TestServer, events: Vec<Value>) {
    let count = events.len();
    let response = server.post("/api/events").json(&Value::Array(events)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["received"], count, "all seeded events should be stored");
}
