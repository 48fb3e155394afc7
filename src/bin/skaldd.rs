//! skaldd — Skald daemon.
//!
//! Serves the translate/explain, chat, and frame surfaces over HTTP,
//! wiring the upstream clients, result cache, and frame rate limiter
//! behind one [router](skald::server::router).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use skald::SkaldError;
use skald::cache::{CacheConfig, CacheStore, MemoryCache, NoopCache};
use skald::limiter::{RateLimitConfig, RateLimiter};
use skald::providers::{CastClient, GeminiClient};
use skald::retry::RetryConfig;
use skald::server::config::{Config, Secrets};
use skald::server::{AppState, router};

/// Skald daemon — cast translation and explanation gateway.
#[derive(Parser)]
#[command(name = "skaldd")]
#[command(version)]
#[command(about = "Skald cast translation gateway daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    let state = build_state(&config, &secrets)?;

    // Parse address
    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .map_err(|e| SkaldError::Configuration(format!("Invalid address: {e}")))?;

    info!(version = env!("CARGO_PKG_VERSION"), %addr, "skaldd starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(Arc::new(state))).await?;

    Ok(())
}

/// Build the shared [`AppState`] from configuration.
fn build_state(config: &Config, secrets: &Secrets) -> Result<AppState, SkaldError> {
    let cast_key = secrets.api_key("casts").ok_or_else(|| {
        SkaldError::Configuration(
            "No content API key. Set CAST_API_KEY or add [casts] to secrets.toml".to_string(),
        )
    })?;
    let gemini_key = secrets.api_key("gemini").ok_or_else(|| {
        SkaldError::Configuration(
            "No model API key. Set GEMINI_API_KEY or add [gemini] to secrets.toml".to_string(),
        )
    })?;

    let retry = RetryConfig::new()
        .max_attempts(config.retry.max_attempts)
        .base_delay(Duration::from_secs(config.retry.base_delay_secs));

    let casts = CastClient::with_base_url(cast_key, config.upstream.casts.base_url.as_str());
    let model = GeminiClient::with_base_url(gemini_key, config.upstream.gemini.base_url.as_str())
        .model(config.upstream.gemini.model.as_str())
        .retry(retry);

    let cache: Arc<dyn CacheStore> = if config.cache.enabled {
        Arc::new(MemoryCache::new(
            &CacheConfig::new().max_entries(config.cache.max_entries),
        ))
    } else {
        info!("cache disabled; every lookup will miss");
        Arc::new(NoopCache)
    };

    let limiter = RateLimiter::new(
        RateLimitConfig::new()
            .limit(config.rate_limit.limit)
            .window(Duration::from_secs(config.rate_limit.window_secs)),
    );

    Ok(AppState {
        casts: Arc::new(casts),
        model: Arc::new(model),
        cache,
        limiter,
        public_url: config.server.public_url.trim_end_matches('/').to_string(),
        target_lang: config.server.target_lang.clone(),
    })
}
