//! Backend selection.

use std::sync::Arc;

use landing_core::Result;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};
use crate::firestore::FirestoreStore;
use crate::memory::MemoryStore;
use crate::store::DocumentStore;

/// Build the configured store backend.
pub fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Firestore => Arc::new(FirestoreStore::new(config)?),
    };
    info!(backend = store.backend(), "Document store ready");
    Ok(store)
}
