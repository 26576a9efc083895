mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod rate_limit;
mod retry;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::remote::RemoteExtractor;
use crate::extraction::service::ExtractionService;
use crate::llm_client::LlmClient;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::routes::build_router;
use crate::state::AppState;

/// Base delay between attempts against an unavailable AI provider.
const AI_RETRY_DELAY: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; malformed values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.together_api_key.clone(),
        config.together_model.clone(),
        config.together_base_url.clone(),
        config.ai_timeout(),
    )
    .context("failed to build Together.ai HTTP client")?;
    let remote_enabled = config.together_api_key.is_some();
    if remote_enabled {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        warn!("TOGETHER_API_KEY is not set; AI extraction is disabled");
    }

    let limiter = RateLimiter::with_system_clock(
        config.ai_rate_limit_max_requests,
        config.ai_rate_limit_window(),
    );
    info!(
        "AI rate limit: {} requests per {}s",
        config.ai_rate_limit_max_requests, config.ai_rate_limit_window_secs
    );

    let remote = RemoteExtractor::new(Arc::new(llm), Arc::new(limiter));
    let extraction = ExtractionService::new(
        remote,
        remote_enabled,
        config.ai_fallback_threshold,
        RetryPolicy::new(config.ai_max_attempts, AI_RETRY_DELAY),
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        extraction,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor front-end has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
