// =============================================================================
// ETF Lab - Main Entry Point
// =============================================================================
//
// Loads `etf_lab.json` (writing the defaults on first run), applies
// `ETFLAB_*` environment overrides and serves the dashboard API until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod analysis;
mod api;
mod app_state;
mod calculators;
mod config;
mod favorites;
mod indicators;
mod insight_log;
mod market_data;
mod regime;
mod signals;
mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::auth::ADMIN_TOKEN_ENV;
use crate::app_state::AppState;
use crate::config::{AppConfig, CONFIG_FILE};
use crate::market_data::YahooClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("ETF Lab starting up");

    let mut config = if Path::new(CONFIG_FILE).exists() {
        AppConfig::load(CONFIG_FILE).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        })
    } else {
        let config = AppConfig::default();
        if let Err(e) = config.save(CONFIG_FILE) {
            error!(error = %e, "Failed to write default config");
        }
        config
    };
    config.apply_env(|key| std::env::var(key).ok())?;

    if let Some(as_of) = config.as_of {
        warn!(%as_of, "Clock pinned; caches and logs are keyed to this date");
    }

    // ── 2. Build shared state ────────────────────────────────────────────
    let source = YahooClient::new(config.quote_base_url.clone(), config.history_range.clone())?;

    let admin_token = std::env::var(ADMIN_TOKEN_ENV).ok();
    if admin_token.as_deref().map_or(true, str::is_empty) {
        warn!("{ADMIN_TOKEN_ENV} not set; favorites are read-only");
    }

    let bind_addr = config.bind_addr.clone();
    info!(
        data_dir = %config.data_dir.display(),
        history_range = %config.history_range,
        "Configured data sources"
    );
    let state = Arc::new(AppState::new(config, source, admin_token));

    // ── 3. Start the API server ──────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received, stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("ETF Lab shut down complete.");
    Ok(())
}
