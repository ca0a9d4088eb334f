//! Document store for the adaptive landing service.
//!
//! [`DocumentStore`] is the seam: an in-memory backend for development and
//! tests, and Firestore over REST for deployments. The `query` and `write`
//! modules hold the typed operations the API calls.

pub mod client;
pub mod config;
pub mod document;
pub mod firestore;
pub mod health;
pub mod memory;
pub mod query;
pub mod store;
pub mod value;
pub mod write;

pub use client::*;
pub use config::*;
pub use document::*;
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use query::*;
pub use store::DocumentStore;
pub use write::*;
