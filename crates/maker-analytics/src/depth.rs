//! Depth-derived prices: VWAP, VAMP, and order imbalance over the top
//! levels of the consolidated book.

use crate::error::{AnalyticsError, AnalyticsResult};
use maker_core::{Price, PriceLevel};
use rust_decimal::Decimal;

/// Volume-weighted average price over the top `levels` entries of one side.
///
/// Zero aggregate volume is undefined input and fails loudly rather than
/// producing a NaN-propagating result.
pub fn vwap(side: &[PriceLevel], levels: usize, label: &'static str) -> AnalyticsResult<Price> {
    let top = &side[..side.len().min(levels)];
    if top.is_empty() {
        return Err(AnalyticsError::EmptyBook(label));
    }
    let total: Decimal = top.iter().map(|l| l.volume.inner()).sum();
    if total.is_zero() {
        return Err(AnalyticsError::ZeroDepth(label));
    }
    let weighted: Decimal = top.iter().map(|l| l.price.inner() * l.volume.inner()).sum();
    Ok(Price::new(weighted / total))
}

/// Volume-adjusted mid price: the average of both sides' VWAPs over the top
/// `levels` entries.
pub fn vamp(bids: &[PriceLevel], asks: &[PriceLevel], levels: usize) -> AnalyticsResult<Price> {
    let bid_vwap = vwap(bids, levels, "bid")?;
    let ask_vwap = vwap(asks, levels, "ask")?;
    Ok(Price::new(
        (bid_vwap.inner() + ask_vwap.inner()) / Decimal::TWO,
    ))
}

/// Order imbalance `Q_bid / (Q_bid + Q_ask)` over the top `levels` entries.
///
/// Ranges over `[0, 1]`; values above 0.5 indicate buy pressure.
pub fn order_imbalance(
    bids: &[PriceLevel],
    asks: &[PriceLevel],
    levels: usize,
) -> AnalyticsResult<Decimal> {
    let q_bid: Decimal = bids[..bids.len().min(levels)]
        .iter()
        .map(|l| l.volume.inner())
        .sum();
    let q_ask: Decimal = asks[..asks.len().min(levels)]
        .iter()
        .map(|l| l.volume.inner())
        .sum();
    let total = q_bid + q_ask;
    if total.is_zero() {
        return Err(AnalyticsError::ZeroDepth("bid+ask"));
    }
    Ok(q_bid / total)
}
