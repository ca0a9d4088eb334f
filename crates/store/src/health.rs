//! Store health checks.

use telemetry::health;
use tracing::{debug, error};

use crate::store::DocumentStore;

/// Ping the store and record the result in the health registry.
pub async fn check_connection(store: &dyn DocumentStore) -> bool {
    match store.ping().await {
        Ok(()) => {
            debug!(backend = store.backend(), "Store connection healthy");
            health().store.set_healthy();
            true
        }
        Err(e) => {
            error!(backend = store.backend(), "Store health check failed: {}", e);
            health().store.set_unhealthy(e.to_string());
            false
        }
    }
}
