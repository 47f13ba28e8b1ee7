// Authord - Main Entry Point
//
// Rate-limited, cacheable authors REST service over an in-memory store.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use authord::api::{self, AppState, EndpointPolicies};
use authord::config::Config;
use authord::metrics;
use authord::rate_limit::RateLimiter;
use authord::store::AuthorStore;

/// Authord: rate-limited authors REST service
#[derive(Parser, Debug)]
#[command(name = "authord")]
#[command(author = "Authord Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Rate-limited, cacheable authors REST service", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to the configuration file (defaults to the XDG location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    // Initialize tracing
    let filter = if args.verbose {
        Level::DEBUG
    } else {
        config.log_level()?
    };
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(filter.into())
                .from_env_lossy(),
        )
        .init();

    info!("authord v0.1.0 starting...");

    metrics::init().context("Failed to initialize metrics")?;

    let store = AuthorStore::new();
    metrics::STORED_AUTHORS.set(store.count().await as i64);

    let limiter = if config.rate_limit.enabled {
        RateLimiter::new()
    } else {
        info!("Rate limiting disabled by configuration");
        RateLimiter::disabled()
    };

    let state = AppState::new(store, limiter, EndpointPolicies::from_config(&config.rate_limit));
    let app = api::router(state);

    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Serving authors API on http://{}", addr);
    info!(
        "Default quota: {}/second per client; reset quota: {}/hour",
        config.rate_limit.default_per_second, config.rate_limit.reset_per_hour
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
