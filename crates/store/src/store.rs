//! The document store seam.

use async_trait::async_trait;
use landing_core::Result;
use serde_json::{Map, Value};

use crate::document::{Collection, Document, Query, WriteBatch};

/// A schemaless document database with atomic write batches.
///
/// Lists come back in backend iteration order unless the query orders them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health reports.
    fn backend(&self) -> &'static str;

    async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>>;

    /// Store a new document under a generated id and return the id.
    async fn add(&self, collection: Collection, data: Map<String, Value>) -> Result<String>;

    /// Apply every write or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<()>;

    /// Cheap round trip used by health checks.
    async fn ping(&self) -> Result<()>;

    /// Create or replace one document.
    async fn set(&self, collection: Collection, id: &str, data: Map<String, Value>) -> Result<()> {
        self.commit(WriteBatch::new().set(collection, id, data)).await
    }
}
