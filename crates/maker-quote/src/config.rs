//! Quoting configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Static parameters of the quoting strategy for one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Inventory risk aversion.
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// Order-size skew exponent. Negative values shrink the side that
    /// would grow the inventory imbalance.
    #[serde(default = "default_eta")]
    pub eta: f64,
    /// Base order size in base units.
    #[serde(default = "default_order_size")]
    pub order_size: Decimal,
    /// Exchange minimum order size.
    pub min_order_size: Decimal,
    /// Price grid (tick size).
    pub price_tick: Decimal,
    /// Size grid (lot size).
    pub size_quantum: Decimal,
    /// Remaining-horizon fraction; 1 for a market with no close.
    #[serde(default = "default_time_left_fraction")]
    pub time_left_fraction: f64,
    /// Quotes older than this are cancelled and replaced.
    #[serde(default = "default_order_refresh_rate_s")]
    pub order_refresh_rate_s: u64,
    /// Declared but not enforced by the refresh policy.
    #[serde(default)]
    pub max_order_age_s: Option<u64>,
}

fn default_gamma() -> f64 {
    1.0
}

fn default_eta() -> f64 {
    -0.005
}

fn default_order_size() -> Decimal {
    Decimal::ONE
}

fn default_time_left_fraction() -> f64 {
    1.0
}

fn default_order_refresh_rate_s() -> u64 {
    60
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            gamma: default_gamma(),
            eta: default_eta(),
            order_size: default_order_size(),
            min_order_size: dec!(0.0005),
            price_tick: dec!(0.01),
            size_quantum: dec!(0.0001),
            time_left_fraction: default_time_left_fraction(),
            order_refresh_rate_s: default_order_refresh_rate_s(),
            max_order_age_s: None,
        }
    }
}
