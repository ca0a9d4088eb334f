//! Collections, documents, queries and write batches.

use std::cmp::Ordering;

use landing_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// The collections the service uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Events,
    Variants,
    LandingPages,
    PersonaPages,
    Settings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Variants => "variants",
            Self::LandingPages => "landingPages",
            Self::PersonaPages => "personaPages",
            Self::Settings => "settings",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document: its id plus its JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
    /// Backend revision of the stored fields (Firestore `updateTime`)
    pub revision: Option<String>,
}

impl Document {
    /// Deserialize the fields into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.data.clone())).map_err(|e| {
            Error::store_failed(format!("malformed document '{}': {}", self.id, e))
        })
    }
}

/// Serialize a record into document fields.
pub fn encode<T: Serialize>(record: &T) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(record)
        .map_err(|e| Error::internal(format!("failed to encode document: {}", e)))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::internal(format!(
            "expected a JSON object for a document, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Equality filter on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

/// A filtered, ordered, limited list read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document's fields pass every filter.
    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        self.filters
            .iter()
            .all(|f| data.get(&f.field) == Some(&f.value))
    }
}

/// Rank of a JSON type in the cross-type ordering: missing, null, bool,
/// number, string, array, object.
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_)) => 5,
        Some(Value::Object(_)) => 6,
    }
}

/// Total order over optional JSON values, used for `order_by`.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Condition a guarded write checks before the batch applies.
///
/// A failed condition rejects the whole batch with `Error::Conflict`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// The document must not exist
    Missing,
    /// The document must still be at this revision
    Revision(String),
}

impl Precondition {
    /// The document is still as it was when read: absent, or at the same revision.
    pub fn unchanged(read: Option<&Document>) -> Self {
        match read.and_then(|doc| doc.revision.clone()) {
            Some(revision) => Self::Revision(revision),
            None => Self::Missing,
        }
    }
}

/// A single write inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Create or replace the whole document
    Set {
        collection: Collection,
        id: String,
        data: Map<String, Value>,
        precondition: Option<Precondition>,
    },
    /// Merge fields into an existing document; the batch fails if it is missing
    Update {
        collection: Collection,
        id: String,
        fields: Map<String, Value>,
    },
}

/// Writes applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, collection: Collection, id: impl Into<String>, data: Map<String, Value>) -> Self {
        self.writes.push(Write::Set {
            collection,
            id: id.into(),
            data,
            precondition: None,
        });
        self
    }

    /// Like `set`, but the batch only applies while `precondition` holds.
    pub fn set_guarded(
        mut self,
        collection: Collection,
        id: impl Into<String>,
        data: Map<String, Value>,
        precondition: Precondition,
    ) -> Self {
        self.writes.push(Write::Set {
            collection,
            id: id.into(),
            data,
            precondition: Some(precondition),
        });
        self
    }

    pub fn update(
        mut self,
        collection: Collection,
        id: impl Into<String>,
        fields: Map<String, Value>,
    ) -> Self {
        self.writes.push(Write::Update {
            collection,
            id: id.into(),
            fields,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}
