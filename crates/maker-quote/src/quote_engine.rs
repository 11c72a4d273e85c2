//! Avellaneda-Stoikov quote computation.
//!
//! Converts one analytics tick plus the current inventory deviation into a
//! reservation price, optimal spread, and tick/lot-quantized order prices
//! and sizes:
//!
//! ```text
//! r      = mid - q * gamma * vol * T
//! spread = gamma * vol * T + (2/gamma) * ln(1 + gamma/kappa)
//! ask    = floor_to_tick(r + spread/2)     bid = floor_to_tick(r - spread/2)
//! ```
//!
//! Sizes lean against inventory: the side that would grow the imbalance is
//! scaled by `e^(eta*q)` (eta negative), floored to the lot grid, and
//! clamped to the exchange minimum.

use crate::config::QuoteConfig;
use crate::error::{QuoteError, QuoteResult};
use maker_core::{Price, Tick, Volume};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// One computed two-sided quote.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub bid_price: Price,
    pub ask_price: Price,
    pub bid_size: Volume,
    pub ask_size: Volume,
    /// Unquantized inventory-adjusted fair price.
    pub reservation_price: f64,
    /// Unquantized optimal spread.
    pub optimal_spread: f64,
}

fn to_decimal(value: f64, what: &str) -> QuoteResult<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| QuoteError::Numeric(format!("{what} = {value}")))
}

/// Compute a quote from a tick and the signed inventory deviation `q`.
///
/// Preconditions: the trade buffers are ready and volatility, alpha, and a
/// nonzero kappa have all been calibrated; otherwise the cycle must be
/// skipped and no orders touched.
pub fn compute_quote(tick: &Tick, q: Decimal, config: &QuoteConfig) -> QuoteResult<Quote> {
    if !tick.buffer_ready {
        return Err(QuoteError::CalibrationNotReady(
            "trade buffers not ready".to_string(),
        ));
    }
    let volatility = tick
        .volatility
        .ok_or_else(|| QuoteError::CalibrationNotReady("volatility not ready".to_string()))?;
    let kappa = match (tick.alpha, tick.kappa) {
        (Some(_), Some(k)) if k != 0.0 => k,
        _ => {
            return Err(QuoteError::CalibrationNotReady(
                "alpha/kappa undefined or kappa zero".to_string(),
            ))
        }
    };

    let mid = tick
        .mid_price
        .inner()
        .to_f64()
        .ok_or_else(|| QuoteError::Numeric("mid price".to_string()))?;
    let q_f = q
        .to_f64()
        .ok_or_else(|| QuoteError::Numeric("inventory deviation".to_string()))?;
    let gamma = config.gamma;
    let horizon = config.time_left_fraction;

    let reservation_price = mid - q_f * gamma * volatility * horizon;
    let optimal_spread =
        gamma * volatility * horizon + 2.0 * (1.0 + gamma / kappa).ln() / gamma;

    let ask_raw = to_decimal(reservation_price + optimal_spread / 2.0, "ask price")?;
    let bid_raw = to_decimal(reservation_price - optimal_spread / 2.0, "bid price")?;
    let tick_size = Price::new(config.price_tick);
    let ask_price = Price::new(ask_raw).quantize(tick_size);
    let bid_price = Price::new(bid_raw).quantize(tick_size);

    let order_size = config
        .order_size
        .to_f64()
        .ok_or_else(|| QuoteError::Numeric("order size".to_string()))?;
    let ask_size_raw = if q_f > 0.0 {
        order_size
    } else {
        order_size * (config.eta * q_f).exp()
    };
    let bid_size_raw = if q_f < 0.0 {
        order_size
    } else {
        order_size * (-config.eta * q_f).exp()
    };

    let lot = Volume::new(config.size_quantum);
    let min_size = Volume::new(config.min_order_size);
    let ask_size = Volume::new(to_decimal(ask_size_raw, "ask size")?)
        .quantize(lot)
        .max(min_size);
    let bid_size = Volume::new(to_decimal(bid_size_raw, "bid size")?)
        .quantize(lot)
        .max(min_size);

    Ok(Quote {
        bid_price,
        ask_price,
        bid_size,
        ask_size,
        reservation_price,
        optimal_spread,
    })
}
