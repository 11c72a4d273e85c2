//! Application configuration.
//!
//! Parameters load from a TOML file; credentials come from the environment
//! only and are never written to config files.

use crate::error::{AppError, AppResult};
use maker_analytics::AnalyticsConfig;
use maker_quote::QuoteConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the API key id.
pub const ENV_API_KEY_ID: &str = "MAKER_API_KEY_ID";
/// Environment variable holding the API key secret.
pub const ENV_API_KEY_SECRET: &str = "MAKER_API_KEY_SECRET";

/// Analytics section with serde defaults, converted into the engine config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSection {
    /// Consolidated levels per side feeding VAMP and imbalance.
    #[serde(default = "default_depth_levels")]
    pub depth_levels: usize,
    /// VAMP samples in the volatility window.
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
    /// Trade buffer retention in seconds.
    #[serde(default = "default_trade_window_s")]
    pub trade_window_s: u64,
    /// Minimum observation time before intensity calibration, in seconds.
    #[serde(default = "default_min_observation_s")]
    pub min_observation_s: u64,
}

fn default_depth_levels() -> usize {
    10
}

fn default_volatility_window() -> usize {
    200
}

fn default_trade_window_s() -> u64 {
    600
}

fn default_min_observation_s() -> u64 {
    600
}

impl Default for AnalyticsSection {
    fn default() -> Self {
        Self {
            depth_levels: default_depth_levels(),
            volatility_window: default_volatility_window(),
            trade_window_s: default_trade_window_s(),
            min_observation_s: default_min_observation_s(),
        }
    }
}

impl From<AnalyticsSection> for AnalyticsConfig {
    fn from(section: AnalyticsSection) -> Self {
        Self {
            depth_levels: section.depth_levels,
            volatility_window: section.volatility_window,
            trade_window_ms: section.trade_window_s as i64 * 1000,
            min_observation_ms: section.min_observation_s as i64 * 1000,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Trading pair symbol, e.g. "XBTMYR".
    pub pair: String,
    /// Base asset of the pair, e.g. "XBT".
    pub base_asset: String,
    /// Quote asset of the pair, e.g. "MYR".
    pub quote_asset: String,
    /// Streaming endpoint; the pair symbol is appended per connection.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// REST endpoint for balances and order placement.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Seconds between explicit balance queries on the strategy task.
    #[serde(default = "default_balance_refresh_s")]
    pub balance_refresh_s: u64,
    /// Capacity of the in-process tick/trade publish channels.
    #[serde(default = "default_publish_capacity")]
    pub publish_capacity: usize,
    #[serde(default)]
    pub analytics: AnalyticsSection,
    pub quote: QuoteConfig,
}

fn default_ws_url() -> String {
    "wss://ws.luno.com/api/1/stream".to_string()
}

fn default_api_url() -> String {
    "https://api.luno.com".to_string()
}

fn default_balance_refresh_s() -> u64 {
    60
}

fn default_publish_capacity() -> usize {
    1000
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&raw)?)
    }

    /// Stream URL for this pair.
    pub fn stream_url(&self) -> String {
        format!("{}/{}", self.ws_url, self.pair)
    }
}

/// API credentials, environment-only.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub key_id: String,
    pub key_secret: String,
}

impl ApiCredentials {
    pub fn from_env() -> AppResult<Self> {
        let key_id = std::env::var(ENV_API_KEY_ID)
            .map_err(|_| AppError::Config(format!("{ENV_API_KEY_ID} not set")))?;
        let key_secret = std::env::var(ENV_API_KEY_SECRET)
            .map_err(|_| AppError::Config(format!("{ENV_API_KEY_SECRET} not set")))?;
        Ok(Self { key_id, key_secret })
    }
}
