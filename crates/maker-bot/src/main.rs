//! Sequenced-LOB market maker - entry point.
//!
//! Reconstructs the live book from the exchange diff stream, publishes
//! per-message analytics ticks, and quotes both sides with an
//! inventory-aware Avellaneda-Stoikov strategy.

use anyhow::Result;
use clap::Parser;
use maker_bot::{ApiCredentials, AppConfig, Application};
use tracing::info;

/// Sequenced-LOB market maker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via MAKER_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    maker_ws::init_crypto();

    let args = Args::parse();

    maker_bot::init_logging();

    info!("Starting maker-bot v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var("MAKER_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = AppConfig::from_file(&config_path)?;
    info!(pair = %config.pair, ws_url = %config.ws_url, "Configuration loaded");

    let credentials = ApiCredentials::from_env()?;

    let app = Application::new(config, credentials);
    app.run().await?;

    Ok(())
}
