//! Per-message analytics pipeline.
//!
//! Runs after every successfully applied book message: consumes the freshly
//! consolidated levels, updates the volatility window and trade buffers,
//! recalibrates trade intensity once warmed up, and produces one `Tick`.

use crate::depth::{order_imbalance, vwap};
use crate::error::AnalyticsResult;
use crate::intensity::{fit_intensity, Calibration};
use crate::trades::TradeHistory;
use crate::volatility::VampWindow;
use maker_book::TradeEvent;
use maker_core::{Price, PriceLevel, Tick, TradeRecord};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Analytics configuration.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Consolidated levels per side feeding VAMP and imbalance.
    pub depth_levels: usize,
    /// VAMP samples in the volatility window.
    pub volatility_window: usize,
    /// Trade buffer retention in milliseconds.
    pub trade_window_ms: i64,
    /// Minimum observation time before intensity calibration starts.
    pub min_observation_ms: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            depth_levels: 10,
            volatility_window: 200,
            trade_window_ms: 10 * 60 * 1000,
            min_observation_ms: 10 * 60 * 1000,
        }
    }
}

/// Analytics state for one pair, owned by the feed task.
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    vol_window: VampWindow,
    trades: TradeHistory,
    started_at_ms: i64,
    last_mid: Price,
    volatility: Option<f64>,
    calibration: Option<Calibration>,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig, started_at_ms: i64) -> Self {
        let vol_window = VampWindow::new(config.volatility_window);
        let trades = TradeHistory::new(config.trade_window_ms);
        Self {
            config,
            vol_window,
            trades,
            started_at_ms,
            last_mid: Price::ZERO,
            volatility: None,
            calibration: None,
        }
    }

    /// Mid price of the most recent completed cycle. Zero before the first
    /// tick, which trades arriving ahead of any book analytics inherit.
    pub fn last_mid(&self) -> Price {
        self.last_mid
    }

    /// Record a trade from the book into its side bucket.
    ///
    /// The record is stamped with the mid from the previous cycle — a trade
    /// is classified against the book it executed into, not the book that
    /// results from its own message.
    pub fn on_trade(&mut self, ts: i64, event: &TradeEvent) -> TradeRecord {
        let mid = self.last_mid;
        let record = TradeRecord {
            ts,
            price: event.price,
            amount: event.amount,
            mid_price: mid,
            distance: (event.price.inner() - mid.inner()).abs(),
            side: event.side,
        };
        self.trades.record(record.clone());
        record
    }

    /// Produce the tick for one applied message from the consolidated book.
    pub fn on_book_update(
        &mut self,
        ts: i64,
        bids: &[PriceLevel],
        asks: &[PriceLevel],
    ) -> AnalyticsResult<Tick> {
        let levels = self.config.depth_levels;
        let bid_vwap = vwap(bids, levels, "bid")?;
        let ask_vwap = vwap(asks, levels, "ask")?;
        let vamp = Price::new((bid_vwap.inner() + ask_vwap.inner()) / Decimal::TWO);
        let imbalance = order_imbalance(bids, asks, levels)?;

        let best_bid = bids[0];
        let best_ask = asks[0];
        let mid = Price::new((best_bid.price.inner() + best_ask.price.inner()) / Decimal::TWO);
        let spread = best_ask.price - best_bid.price;
        self.last_mid = mid;

        if let Some(vol) = self
            .vol_window
            .push(vamp.inner().to_f64().unwrap_or(f64::NAN))
        {
            self.volatility = Some(vol);
        }

        let warmed_up = ts >= self.started_at_ms + self.config.min_observation_ms;
        let buffer_ready = warmed_up && self.trades.both_sides_populated();
        if buffer_ready {
            match fit_intensity(self.trades.combined()) {
                Ok(calibration) => {
                    debug!(
                        alpha = calibration.alpha,
                        kappa = calibration.kappa,
                        "Intensity recalibrated"
                    );
                    self.calibration = Some(calibration);
                }
                // Keep the previous estimate; the quote layer independently
                // refuses to act on a missing or zero kappa.
                Err(e) => warn!(error = %e, "Intensity calibration failed, keeping previous"),
            }
        }

        Ok(Tick {
            ts,
            mid_price: mid,
            spread,
            best_bid: best_bid.price,
            best_ask: best_ask.price,
            best_bid_size: best_bid.volume,
            best_ask_size: best_ask.volume,
            vamp,
            order_imbalance: imbalance,
            buffer_ready,
            volatility: self.volatility,
            alpha: self.calibration.map(|c| c.alpha),
            kappa: self.calibration.map(|c| c.kappa),
        })
    }
}
