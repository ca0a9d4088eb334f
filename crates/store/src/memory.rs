//! In-memory document store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use landing_core::{Error, Result};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::document::{
    compare_values, Collection, Direction, Document, Precondition, Query, Write, WriteBatch,
};
use crate::store::DocumentStore;

type Collections = HashMap<Collection, Vec<Document>>;

/// Process-local store. Documents keep insertion order per collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    /// Last revision handed out; bumped on every document write
    revision: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .get(&collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn next_revision(&self) -> String {
        (self.revision.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

fn find<'a>(guard: &'a Collections, collection: Collection, id: &str) -> Option<&'a Document> {
    guard
        .get(&collection)
        .and_then(|docs| docs.iter().find(|d| d.id == id))
}

fn upsert(docs: &mut Vec<Document>, id: &str, data: Map<String, Value>, revision: String) {
    match docs.iter_mut().find(|d| d.id == id) {
        Some(doc) => {
            doc.data = data;
            doc.revision = Some(revision);
        }
        None => docs.push(Document {
            id: id.to_string(),
            data,
            revision: Some(revision),
        }),
    }
}

/// Check one write against the current contents without applying it.
fn check(guard: &Collections, write: &Write) -> Result<()> {
    match write {
        Write::Update { collection, id, .. } => match find(guard, *collection, id) {
            Some(_) => Ok(()),
            None => Err(Error::store_failed(format!(
                "no document '{}' in {} to update",
                id, collection
            ))),
        },
        Write::Set {
            collection,
            id,
            precondition: Some(precondition),
            ..
        } => {
            let current = find(guard, *collection, id);
            let holds = match precondition {
                Precondition::Missing => current.is_none(),
                Precondition::Revision(expected) => {
                    current.and_then(|d| d.revision.as_ref()) == Some(expected)
                }
            };
            if holds {
                Ok(())
            } else {
                Err(Error::conflict(format!("{}/{} changed since it was read", collection, id)))
            }
        }
        Write::Set { .. } => Ok(()),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
        let guard = self.collections.read();
        let mut docs: Vec<Document> = guard
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| query.matches(&d.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(guard);

        if let Some(order) = &query.order_by {
            docs.sort_by(|a, b| {
                let ord = compare_values(a.data.get(&order.field), b.data.get(&order.field));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }

        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        Ok(find(&self.collections.read(), collection, id).cloned())
    }

    async fn add(&self, collection: Collection, data: Map<String, Value>) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        let mut guard = self.collections.write();
        let revision = self.next_revision();
        guard.entry(collection).or_default().push(Document {
            id: id.clone(),
            data,
            revision: Some(revision),
        });
        Ok(id)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut guard = self.collections.write();

        // Every check runs before any write so a rejected batch leaves nothing behind.
        for write in &batch.writes {
            check(&guard, write)?;
        }

        for write in batch.writes {
            let revision = self.next_revision();
            match write {
                Write::Set {
                    collection,
                    id,
                    data,
                    ..
                } => upsert(guard.entry(collection).or_default(), &id, data, revision),
                Write::Update {
                    collection,
                    id,
                    fields,
                } => {
                    if let Some(doc) = guard
                        .get_mut(&collection)
                        .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                    {
                        doc.data.extend(fields);
                        doc.revision = Some(revision);
                    }
                }
            }
        }

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_add_then_query_ordered() {
        let store = MemoryStore::new();
        store.add(Collection::Events, fields(json!({"ts": "2024-01-02", "n": 2}))).await.unwrap();
        store.add(Collection::Events, fields(json!({"ts": "2024-01-03", "n": 3}))).await.unwrap();
        store.add(Collection::Events, fields(json!({"ts": "2024-01-01", "n": 1}))).await.unwrap();

        let docs = store
            .query(
                Collection::Events,
                &Query::new().order_by("ts", Direction::Descending).limit(2),
            )
            .await
            .unwrap();
        let ns: Vec<i64> = docs.iter().map(|d| d.data["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_unordered_query_keeps_insertion_order() {
        let store = MemoryStore::new();
        for n in 0..3 {
            store.add(Collection::Variants, fields(json!({"n": n}))).await.unwrap();
        }
        let docs = store.query(Collection::Variants, &Query::new()).await.unwrap();
        let ns: Vec<i64> = docs.iter().map(|d| d.data["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_failed_batch_applies_nothing() {
        let store = MemoryStore::new();
        let id = store
            .add(Collection::Variants, fields(json!({"status": "testing"})))
            .await
            .unwrap();

        let batch = WriteBatch::new()
            .update(Collection::Variants, &id, fields(json!({"status": "live"})))
            .update(Collection::Variants, "missing", fields(json!({"status": "archived"})));
        assert!(store.commit(batch).await.is_err());

        let doc = store.get(Collection::Variants, &id).await.unwrap().unwrap();
        assert_eq!(doc.data["status"], "testing");
    }

    #[tokio::test]
    async fn test_guarded_set_rejects_stale_revision() {
        let store = MemoryStore::new();
        let pointer = fields(json!({"variantId": "v1"}));

        store
            .commit(WriteBatch::new().set_guarded(
                Collection::Settings,
                "liveVariant",
                pointer.clone(),
                Precondition::Missing,
            ))
            .await
            .unwrap();
        let read = store.get(Collection::Settings, "liveVariant").await.unwrap();
        let stale = Precondition::unchanged(read.as_ref());

        // A concurrent writer moves the pointer after our read.
        store
            .set(Collection::Settings, "liveVariant", fields(json!({"variantId": "v2"})))
            .await
            .unwrap();

        let id = store
            .add(Collection::Variants, fields(json!({"status": "testing"})))
            .await
            .unwrap();
        let batch = WriteBatch::new()
            .update(Collection::Variants, &id, fields(json!({"status": "live"})))
            .set_guarded(Collection::Settings, "liveVariant", pointer, stale);
        let err = store.commit(batch).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let doc = store.get(Collection::Variants, &id).await.unwrap().unwrap();
        assert_eq!(doc.data["status"], "testing");
        let pointer = store.get(Collection::Settings, "liveVariant").await.unwrap().unwrap();
        assert_eq!(pointer.data["variantId"], "v2");

        let missing_guard = WriteBatch::new().set_guarded(
            Collection::Settings,
            "liveVariant",
            Map::new(),
            Precondition::Missing,
        );
        assert!(matches!(store.commit(missing_guard).await, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_writes_bump_revision() {
        let store = MemoryStore::new();
        store.set(Collection::Settings, "agent", fields(json!({"autoMode": false}))).await.unwrap();
        let first = store.get(Collection::Settings, "agent").await.unwrap().unwrap().revision;
        store.set(Collection::Settings, "agent", fields(json!({"autoMode": true}))).await.unwrap();
        let second = store.get(Collection::Settings, "agent").await.unwrap().unwrap().revision;
        assert!(first.is_some());
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_update_merges_and_set_replaces() {
        let store = MemoryStore::new();
        store
            .set(Collection::Settings, "agent", fields(json!({"autoMode": false, "extra": 1})))
            .await
            .unwrap();
        store
            .commit(WriteBatch::new().update(
                Collection::Settings,
                "agent",
                fields(json!({"autoMode": true})),
            ))
            .await
            .unwrap();
        let doc = store.get(Collection::Settings, "agent").await.unwrap().unwrap();
        assert_eq!(doc.data["autoMode"], true);
        assert_eq!(doc.data["extra"], 1);

        store
            .set(Collection::Settings, "agent", fields(json!({"autoMode": false})))
            .await
            .unwrap();
        let doc = store.get(Collection::Settings, "agent").await.unwrap().unwrap();
        assert!(doc.data.get("extra").is_none());
        assert_eq!(store.count(Collection::Settings), 1);
    }
}
