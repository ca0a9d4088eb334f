//! Mock implementations for testing.

use async_trait::async_trait;
use copy_agent::{GenerationError, TextGenerator};
use doc_store::{Collection, Document, DocumentStore, MemoryStore, Query, WriteBatch};
use landing_core::{Error, Result};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Generator that replays scripted answers and records every prompt.
///
/// Implements the same `TextGenerator` trait as the Gemini client. When the
/// script runs out it answers with `Unavailable`.
#[derive(Clone)]
pub struct MockGenerator {
    answers: Arc<Mutex<VecDeque<std::result::Result<String, GenerationError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    credential: bool,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            answers: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            credential: true,
        }
    }

    /// A generator with no API key; the agent never calls it.
    pub fn without_credential() -> Self {
        Self {
            credential: false,
            ..Self::new()
        }
    }

    /// Queue a raw text answer.
    pub fn answer(&self, text: impl Into<String>) -> &Self {
        self.answers.lock().push_back(Ok(text.into()));
        self
    }

    /// Queue a provider failure.
    pub fn fail(&self, error: GenerationError) -> &Self {
        self.answers.lock().push_back(Err(error));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        self.prompts.lock().push(prompt.to_string());
        self.answers
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Unavailable("no scripted answer".into())))
    }
}

/// Memory store that can be switched into failing reads and writes.
pub struct FailingStore {
    inner: MemoryStore,
    failing: AtomicBool,
    /// Write calls (`add`/`commit`) still accepted
    writes_left: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: AtomicBool::new(false),
            writes_left: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Accept `n` more write calls, then fail every write after them.
    pub fn allow_writes(&self, n: usize) {
        self.writes_left.store(n, Ordering::SeqCst);
    }

    pub fn count(&self, collection: Collection) -> usize {
        self.inner.count(collection)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Error::store_failed("mock store failure"))
        } else {
            Ok(())
        }
    }

    fn check_write(&self) -> Result<()> {
        self.check()?;
        self.writes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| Error::store_failed("mock store write failure"))
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
        self.check()?;
        self.inner.query(collection, query).await
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        self.check()?;
        self.inner.get(collection, id).await
    }

    async fn add(&self, collection: Collection, data: Map<String, Value>) -> Result<String> {
        self.check_write()?;
        self.inner.add(collection, data).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        self.check_write()?;
        self.inner.commit(batch).await
    }

    async fn ping(&self) -> Result<()> {
        self.check()?;
        self.inner.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_replays_script() {
        let mock = MockGenerator::new();
        mock.answer("first").fail(GenerationError::Timeout(5));

        assert_eq!(mock.generate("p1").await.unwrap(), "first");
        assert!(matches!(mock.generate("p2").await, Err(GenerationError::Timeout(5))));
        assert!(matches!(mock.generate("p3").await, Err(GenerationError::Unavailable(_))));
        assert_eq!(mock.prompts(), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_failing_store_toggles() {
        let store = FailingStore::new();
        assert!(store.ping().await.is_ok());
        store.set_failing(true);
        assert!(store.ping().await.is_err());
        assert!(store.add(Collection::Events, Map::new()).await.is_err());
        assert_eq!(store.count(Collection::Events), 0);
    }

    #[tokio::test]
    async fn test_failing_store_write_allowance() {
        let store = FailingStore::new();
        store.allow_writes(1);
        assert!(store.add(Collection::Events, Map::new()).await.is_ok());
        assert!(store.add(Collection::Events, Map::new()).await.is_err());
        assert!(store.ping().await.is_ok());
        assert_eq!(store.count(Collection::Events), 1);
    }
}
