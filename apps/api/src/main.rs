mod assistant;
mod config;
mod cv;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::service::ChatService;
use crate::config::Config;
use crate::cv::service::CvService;
use crate::llm_client::{CompletionBackend, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{CvStore, MemoryCvStore, RedisCvStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Assistant API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize CV store
    let store: Arc<dyn CvStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisCvStore::connect(url, &config.storage_key).await?),
        None => {
            info!("REDIS_URL not set, keeping the CV in memory");
            Arc::new(MemoryCvStore::new())
        }
    };
    let cv = Arc::new(CvService::load(store).await?);

    // Initialize LLM client; the assistant stays disabled without a provider
    let backend: Option<Arc<dyn CompletionBackend>> = match &config.ai_provider {
        Ok(provider) => {
            let llm = LlmClient::new(provider)?;
            info!("LLM client initialized (model: {})", llm.model());
            let backend: Arc<dyn CompletionBackend> = Arc::new(llm);
            Some(backend)
        }
        Err(e) => {
            warn!("{e}; chat assistant disabled");
            None
        }
    };

    let state = AppState {
        chat: Arc::new(ChatService::new(cv.clone(), backend)),
        cv,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS once the editor origin is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
