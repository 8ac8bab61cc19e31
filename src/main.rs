//! Powerwall exporter - Prometheus metrics for a Tesla energy site
//!
//! Polls the Fleet API live status endpoint on every scrape and keeps the
//! OAuth2 credentials fresh without manual re-authentication.

mod api;
mod auth;
mod config;
mod error;
mod metrics;
mod models;
mod server;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::FleetClient;
use crate::auth::{CredentialManager, FileTokenStore, SystemClock};
use crate::config::Config;
use crate::server::AppState;

#[derive(Parser)]
#[command(name = "powerwall-exporter")]
#[command(about = "Prometheus exporter for Tesla Powerwall live status", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = cli.config;
    tracing::info!("Starting Powerwall exporter on {}", config.socket_addr());
    tracing::info!("Site ID: {}", config.site_id);
    tracing::debug!("{:?}", config);

    let store = FileTokenStore::new(&config.refresh_token_file);
    let credentials = Arc::new(CredentialManager::new(
        &config.auth_config(),
        store,
        SystemClock,
    )?);

    let fleet = FleetClient::new(
        &config.api_base,
        &config.site_id,
        config.request_timeout(),
        credentials,
    )?;

    server::serve(config.socket_addr(), AppState::new(fleet)).await
}
