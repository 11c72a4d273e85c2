//! Published analytics shapes.
//!
//! `Tick` is the per-book-update analytics snapshot and `TradeRecord` the
//! per-trade event, both published downstream as JSON. All numeric fields
//! serialize as strings to preserve precision across the wire; float fields
//! that are not yet available serialize as `"NaN"`.

use crate::{Price, Side, Volume};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Serde helper: `Option<f64>` as a string, `None` as `"NaN"`.
pub mod f64_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => ser.serialize_str(&v.to_string()),
            None => ser.serialize_str("NaN"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
        let s = String::deserialize(de)?;
        if s.eq_ignore_ascii_case("nan") {
            return Ok(None);
        }
        s.parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

/// Analytics snapshot published once per processed book update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Wall-clock timestamp in unix milliseconds.
    pub ts: i64,
    pub mid_price: Price,
    pub spread: Price,
    pub best_bid: Price,
    pub best_ask: Price,
    pub best_bid_size: Volume,
    pub best_ask_size: Volume,
    /// Volume-adjusted mid price over the top book levels.
    pub vamp: Price,
    /// Bid volume share over the top levels, in `[0, 1]`.
    pub order_imbalance: Decimal,
    /// True once both trade buffers hold at least one record and the
    /// minimum observation duration has elapsed.
    pub buffer_ready: bool,
    /// Realized volatility in percent; absent until the window wraps.
    #[serde(with = "f64_string")]
    pub volatility: Option<f64>,
    /// Trade-intensity scale parameter; absent until calibrated.
    #[serde(with = "f64_string")]
    pub alpha: Option<f64>,
    /// Trade-intensity decay parameter; absent until calibrated.
    #[serde(with = "f64_string")]
    pub kappa: Option<f64>,
}

impl Tick {
    /// Calibration parameters are usable for quoting: both present and
    /// kappa strictly nonzero.
    pub fn calibration_ready(&self) -> bool {
        matches!((self.alpha, self.kappa), (Some(_), Some(k)) if k != 0.0)
    }
}

/// A trade against a resting order, published per event and buffered for
/// intensity calibration.
///
/// `side` names the bucket the trade is recorded into, not the resting
/// book it depleted: a trade that consumed a resting bid carries
/// `Side::Ask` and vice versa (aggressor-side tagging).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Wall-clock timestamp in unix milliseconds.
    pub ts: i64,
    pub price: Price,
    /// Traded base amount.
    pub amount: Volume,
    /// Mid price at the time of the trade.
    pub mid_price: Price,
    /// Absolute distance of the trade price from mid.
    pub distance: Decimal,
    #[serde(rename = "bidask")]
    pub side: Side,
}
