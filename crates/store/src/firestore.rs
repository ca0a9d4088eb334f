//! Firestore backend over the REST API.

use std::time::Duration;

use async_trait::async_trait;
use landing_core::{Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::StoreConfig;
use crate::document::{Collection, Direction, Document, Precondition, Query, Write, WriteBatch};
use crate::store::DocumentStore;
use crate::value::{decode_fields, encode_fields, encode_value};

/// Firestore document as returned by the REST API.
#[derive(Debug, Deserialize)]
struct RestDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(default, rename = "updateTime")]
    update_time: Option<String>,
}

impl RestDocument {
    fn into_document(self) -> Document {
        let id = self.name.rsplit('/').next().unwrap_or_default().to_string();
        Document {
            id,
            data: decode_fields(&self.fields),
            revision: self.update_time,
        }
    }
}

fn current_document(precondition: &Precondition) -> Value {
    match precondition {
        Precondition::Missing => json!({ "exists": false }),
        Precondition::Revision(update_time) => json!({ "updateTime": update_time }),
    }
}

/// Map a rejected request to an error. Failed preconditions are conflicts.
fn rejection(op: &str, status: StatusCode, body: &str) -> Error {
    let precondition_failed = status == StatusCode::CONFLICT
        || body.contains("FAILED_PRECONDITION")
        || body.contains("ALREADY_EXISTS");
    if precondition_failed {
        Error::conflict(format!("firestore {} precondition failed", op))
    } else {
        Error::store_failed(format!("firestore {} returned {}: {}", op, status, body))
    }
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<RestDocument>,
}

/// Firestore client bound to one project database.
#[derive(Clone)]
pub struct FirestoreStore {
    http: Client,
    /// `projects/{p}/databases/{d}/documents`
    root: String,
    /// `{base_url}/{root}`
    documents_url: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl FirestoreStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let project_id = config
            .project_id
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::internal("store.project_id is required for the firestore backend"))?;

        let base = Url::parse(&config.base_url)
            .map_err(|e| Error::internal(format!("invalid store.base_url '{}': {}", config.base_url, e)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {}", e)))?;

        let root = format!("projects/{}/databases/{}/documents", project_id, config.database);
        let documents_url = format!("{}/{}", base.as_str().trim_end_matches('/'), root);

        info!(
            project_id = %project_id,
            database = %config.database,
            "Created Firestore store"
        );

        Ok(Self {
            http,
            root,
            documents_url,
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        match &self.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        }
    }

    fn document_name(&self, collection: Collection, id: &str) -> String {
        format!("{}/{}/{}", self.root, collection, id)
    }

    async fn send(&self, request: RequestBuilder, op: &str) -> Result<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Error::store_failed(format!("firestore {} failed: {}", op, e)))?;
        Ok(response)
    }

    async fn expect_success(response: Response, op: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(op, status = %status, body = %body, "Firestore request rejected");
        Err(rejection(op, status, &body))
    }

    fn structured_query(collection: Collection, query: &Query) -> Value {
        let mut structured = json!({ "from": [{ "collectionId": collection.as_str() }] });

        let filters: Vec<Value> = query
            .filters
            .iter()
            .map(|f| {
                json!({
                    "fieldFilter": {
                        "field": { "fieldPath": f.field },
                        "op": "EQUAL",
                        "value": encode_value(&f.value),
                    }
                })
            })
            .collect();
        match filters.len() {
            0 => {}
            1 => structured["where"] = filters[0].clone(),
            _ => {
                structured["where"] = json!({
                    "compositeFilter": { "op": "AND", "filters": filters }
                })
            }
        }

        if let Some(order) = &query.order_by {
            let direction = match order.direction {
                Direction::Ascending => "ASCENDING",
                Direction::Descending => "DESCENDING",
            };
            structured["orderBy"] = json!([{
                "field": { "fieldPath": order.field },
                "direction": direction,
            }]);
        }

        if let Some(limit) = query.limit {
            structured["limit"] = json!(limit);
        }

        json!({ "structuredQuery": structured })
    }

    fn write_body(&self, write: &Write) -> Value {
        match write {
            Write::Set {
                collection,
                id,
                data,
                precondition,
            } => {
                let mut body = json!({
                    "update": {
                        "name": self.document_name(*collection, id),
                        "fields": encode_fields(data),
                    }
                });
                if let Some(precondition) = precondition {
                    body["currentDocument"] = current_document(precondition);
                }
                body
            }
            Write::Update {
                collection,
                id,
                fields,
            } => json!({
                "update": {
                    "name": self.document_name(*collection, id),
                    "fields": encode_fields(fields),
                },
                "updateMask": { "fieldPaths": fields.keys().collect::<Vec<_>>() },
                "currentDocument": { "exists": true },
            }),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn backend(&self) -> &'static str {
        "firestore"
    }

    async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
        let url = format!("{}:runQuery", self.documents_url);
        let body = Self::structured_query(collection, query);
        let response = self.send(self.http.post(&url).json(&body), "runQuery").await?;
        let items: Vec<RunQueryItem> = Self::expect_success(response, "runQuery")
            .await?
            .json()
            .await
            .map_err(|e| Error::store_failed(format!("firestore runQuery decode failed: {}", e)))?;

        let docs: Vec<Document> = items
            .into_iter()
            .filter_map(|item| item.document.map(RestDocument::into_document))
            .collect();
        debug!(collection = %collection, count = docs.len(), "Firestore query");
        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let url = format!("{}/{}/{}", self.documents_url, collection, id);
        let response = self.send(self.http.get(&url), "get").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let doc: RestDocument = Self::expect_success(response, "get")
            .await?
            .json()
            .await
            .map_err(|e| Error::store_failed(format!("firestore get decode failed: {}", e)))?;
        Ok(Some(doc.into_document()))
    }

    async fn add(&self, collection: Collection, data: Map<String, Value>) -> Result<String> {
        let url = format!("{}/{}", self.documents_url, collection);
        let body = json!({ "fields": encode_fields(&data) });
        let response = self.send(self.http.post(&url).json(&body), "create").await?;
        let doc: RestDocument = Self::expect_success(response, "create")
            .await?
            .json()
            .await
            .map_err(|e| Error::store_failed(format!("firestore create decode failed: {}", e)))?;
        Ok(doc.into_document().id)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let url = format!("{}:commit", self.documents_url);
        let writes: Vec<Value> = batch.writes.iter().map(|w| self.write_body(w)).collect();
        let body = json!({ "writes": writes });
        let response = self.send(self.http.post(&url).json(&body), "commit").await?;
        Self::expect_success(response, "commit").await?;
        debug!(writes = batch.len(), "Firestore commit");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let url = format!("{}/{}", self.documents_url, Collection::Settings);
        let response = self
            .send(self.http.get(&url).query(&[("pageSize", "1")]), "ping")
            .await?;
        Self::expect_success(response, "ping").await?;
        Ok(())
    }
}
