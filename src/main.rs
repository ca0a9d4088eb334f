//! Adaptive landing service
//!
//! Backend for a self-optimizing landing page:
//! - Analytics event ingestion and A/B aggregation
//! - Heuristic variant scoring with an AI copy pass and deterministic fallback
//! - Variant promotion, landing builds and persona pages over a document store

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState};
use copy_agent::{AiConfig, GeminiClient, TextGenerator};
use doc_store::{health::check_connection, StoreBackend, StoreConfig};
use landing_core::AgentConfig;
use telemetry::{health, init_tracing_from_env};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    agent: AgentConfig,

    #[serde(default)]
    store: StoreConfig,

    #[serde(default)]
    ai: AiConfig,

    /// Limits for event ingestion
    #[serde(default)]
    rate_limit: RateLimitConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            agent: AgentConfig::default(),
            store: StoreConfig::default(),
            ai: AiConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting adaptive landing service v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        backend = ?config.store.backend,
        project = config.store.project_id.as_deref().unwrap_or("none"),
        click_weight = config.agent.click_weight,
        window = config.agent.event_window_limit,
        "Loaded config"
    );

    let store = doc_store::connect(&config.store).context("Failed to create document store")?;

    if check_connection(store.as_ref()).await {
        info!("Store connection: healthy");
    } else {
        // Keep serving; readiness reports the store until it recovers.
        error!("Store connection: unhealthy");
    }

    let generator: Arc<dyn TextGenerator> =
        Arc::new(GeminiClient::new(config.ai.clone()).context("Failed to create AI client")?);

    if generator.has_credential() {
        health().ai.set_healthy();
        info!(model = %config.ai.model, "AI provider configured");
    } else {
        health().ai.set_unhealthy("no API key configured, using heuristic fallback");
        warn!("No AI API key configured; every suggestion will use the heuristic fallback");
    }

    let state = AppState::with_rate_limit(store, generator, config.agent.clone(), config.rate_limit.clone());

    let _rate_limiter_cleanup = state.start_rate_limiter_cleanup();
    info!("Started rate limiter cleanup task (every 5 minutes)");

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("LANDING")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Conventional names for secrets and the port, as set by hosting platforms
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        config.ai.api_key = Some(key);
    }
    if let Ok(port) = std::env::var("PORT") {
        config.port = port.parse().context("PORT must be a port number")?;
    }

    // Manual overrides for nested store config
    if let Ok(backend) = std::env::var("LANDING_STORE_BACKEND") {
        config.store.backend = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "firestore" => StoreBackend::Firestore,
            other => anyhow::bail!("Unknown store backend '{}'", other),
        };
    }
    if let Ok(project_id) = std::env::var("LANDING_STORE_PROJECT_ID") {
        config.store.project_id = Some(project_id);
    }
    if let Ok(api_key) = std::env::var("LANDING_STORE_API_KEY") {
        config.store.api_key = Some(api_key);
    }
    if let Ok(token) = std::env::var("LANDING_STORE_ACCESS_TOKEN") {
        config.store.access_token = Some(token);
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
