//! Shared harness for the end-to-end tests.
//!
//! Everything runs in-process: the real router over a [`doc_store::MemoryStore`]
//! and a scripted [`mocks::MockGenerator`] in place of the AI provider.

pub mod fixtures;
pub mod mocks;
pub mod setup;
