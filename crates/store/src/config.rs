//! Document store configuration.

use serde::{Deserialize, Serialize};

/// Which backend to connect to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store, lost on restart
    #[default]
    Memory,
    /// Hosted Firestore over its REST API
    Firestore,
}

/// Document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Firestore project id
    pub project_id: Option<String>,
    /// Firestore database id
    #[serde(default = "default_database")]
    pub database: String,
    /// Web API key (sent as `?key=`)
    pub api_key: Option<String>,
    /// OAuth access token (sent as a bearer token)
    pub access_token: Option<String>,
    /// REST endpoint root
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            project_id: None,
            database: default_database(),
            api_key: None,
            access_token: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
