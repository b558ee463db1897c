mod chat;
mod clock;
mod config;
mod errors;
mod llm_client;
mod models;
mod notifications;
mod onboarding;
mod profile;
mod relationships;
mod routes;
mod state;
mod store;
mod tracking;
mod usage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clock::SystemClock;
use crate::config::{Config, StoreBackend};
use crate::llm_client::GeminiClient;
use crate::notifications::LogNotifier;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{FileStore, KvStore, MemoryStore, RedisStore};
use crate::usage::UsageLimits;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sona API v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config.store).await?;

    let llm = GeminiClient::new(config.gemini_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let limits = UsageLimits {
        max_daily_tokens: config.max_daily_tokens,
        max_messages_per_minute: config.max_messages_per_minute,
    };

    let state = Arc::new(AppState::new(
        store,
        Arc::new(llm),
        Arc::new(LogNotifier),
        Arc::new(SystemClock),
        limits,
        &config.default_language,
    ));
    state.load().await;

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_store(backend: &StoreBackend) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match backend {
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::File(path) => {
            info!("Using file store at {}", path.display());
            Arc::new(FileStore::open(path.clone()).await?)
        }
        StoreBackend::Redis { url, namespace } => {
            info!("Using Redis store (namespace: {namespace})");
            Arc::new(RedisStore::connect(url, namespace).await?)
        }
    };
    Ok(store)
}
