mod analysis;
mod cache;
mod config;
mod errors;
mod llm_client;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::{MemoryProfileCache, ProfileCache, RedisProfileCache};
use crate::config::Config;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing Gemini key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS Optimizer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (credential checked here, never mid-retry)
    let llm = LlmClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
        config.llm_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let retry = RetryPolicy::new(config.llm_max_attempts, config.llm_retry_base);
    info!(
        "Retry policy: {} attempts, {}ms linear backoff",
        retry.max_attempts,
        retry.base_delay.as_millis()
    );

    let cache = build_cache(&config).await;

    let state = AppState {
        llm: Arc::new(llm),
        cache,
        retry,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // browser front-end is served from another origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when REDIS_URL is set and reachable, otherwise an in-process cache.
async fn build_cache(config: &Config) -> Arc<dyn ProfileCache> {
    if let Some(url) = &config.redis_url {
        match RedisProfileCache::connect(url).await {
            Ok(cache) => return Arc::new(cache),
            Err(e) => warn!("Redis unavailable ({e}); falling back to in-memory profile cache"),
        }
    }
    info!("Using in-memory profile cache");
    Arc::new(MemoryProfileCache::new())
}
