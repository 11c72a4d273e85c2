//! Strategy task: consumes published ticks, maintains inventory, and
//! executes maker actions against the trading client.
//!
//! Inventory is owned exclusively by this task and refreshed only by
//! explicit balance queries on a fixed interval. Exchange rejections leave
//! the tracked-order set consistent with what was actually acknowledged:
//! a rejected placement is never tracked, a failed cancel stays tracked
//! and is retried on the next refresh cycle.

use crate::error::AppResult;
use maker_core::Tick;
use maker_gateway::{OrderUpdate, TradingClient};
use maker_quote::{MakerAction, PendingOrder, QuoteManager};
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// Quoting strategy driver for one pair.
pub struct StrategyRunner<C: TradingClient> {
    client: C,
    manager: QuoteManager,
    pair: String,
    base_asset: String,
    quote_asset: String,
    balance_refresh_ms: u64,
    last_balance_refresh_ms: Option<u64>,
}

impl<C: TradingClient> StrategyRunner<C> {
    pub fn new(
        client: C,
        manager: QuoteManager,
        pair: String,
        base_asset: String,
        quote_asset: String,
        balance_refresh_s: u64,
    ) -> Self {
        Self {
            client,
            manager,
            pair,
            base_asset,
            quote_asset,
            balance_refresh_ms: balance_refresh_s * 1000,
            last_balance_refresh_ms: None,
        }
    }

    /// Run until the tick stream ends or shutdown is requested.
    pub async fn run(
        mut self,
        mut tick_rx: mpsc::Receiver<Tick>,
        mut update_rx: mpsc::Receiver<OrderUpdate>,
        shutdown: CancellationToken,
    ) -> AppResult<()> {
        self.refresh_balances(now_ms()).await;
        info!(pair = %self.pair, "Strategy running");

        let mut updates_open = true;
        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    info!("Strategy shutdown requested");
                    return Ok(());
                }
                update = update_rx.recv(), if updates_open => {
                    match update {
                        Some(update) => self.on_order_update(update),
                        None => updates_open = false,
                    }
                }
                tick = tick_rx.recv() => {
                    let Some(tick) = tick else {
                        info!("Tick stream ended, stopping strategy");
                        return Ok(());
                    };
                    self.handle_tick(tick, now_ms()).await;
                }
            }
        }
    }

    /// Process one tick at the given wall-clock time.
    async fn handle_tick(&mut self, tick: Tick, now_ms: u64) {
        if self.balance_refresh_due(now_ms) {
            self.refresh_balances(now_ms).await;
        }

        match self.manager.on_tick(&tick, now_ms) {
            Ok(Some(action)) => self.execute(action, now_ms).await,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Quote cycle skipped"),
        }
    }

    fn balance_refresh_due(&self, now_ms: u64) -> bool {
        match self.last_balance_refresh_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.balance_refresh_ms,
        }
    }

    async fn refresh_balances(&mut self, now_ms: u64) {
        let assets = vec![self.base_asset.clone(), self.quote_asset.clone()];
        match self.client.get_balances(&assets).await {
            Ok(balances) => {
                let base = balances
                    .get(&self.base_asset)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                let quote = balances
                    .get(&self.quote_asset)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                debug!(%base, %quote, "Balances refreshed");
                self.manager.update_balances(base, quote);
                self.last_balance_refresh_ms = Some(now_ms);
            }
            Err(e) => warn!(error = %e, "Balance refresh failed"),
        }
    }

    async fn execute(&mut self, action: MakerAction, now_ms: u64) {
        match action {
            MakerAction::Place(orders) => self.place_all(orders, now_ms).await,
            MakerAction::CancelAndReplace { cancels, orders } => {
                for cancel in cancels {
                    match self.client.cancel_order(&cancel.id).await {
                        Ok(()) => self.manager.record_cancelled(&cancel.id),
                        // Still tracked; retried on the next refresh cycle.
                        Err(e) => warn!(error = %e, order_id = %cancel.id, "Cancel failed"),
                    }
                }
                self.place_all(orders, now_ms).await;
            }
        }
    }

    async fn place_all(&mut self, orders: Vec<PendingOrder>, now_ms: u64) {
        for order in orders {
            let result = self
                .client
                .place_limit_order(
                    &self.pair,
                    order.price,
                    order.side,
                    order.volume,
                    &order.id,
                    order.post_only,
                )
                .await;
            match result {
                Ok(()) => self.manager.record_placed(&order, now_ms),
                Err(e) => {
                    warn!(error = %e, side = %order.side, "Placement rejected, not tracked");
                }
            }
        }
    }

    fn on_order_update(&mut self, update: OrderUpdate) {
        if let Some(id) = update.closes_order() {
            self.manager.on_order_closed(id);
        }
        // Balance events are informational; authoritative balances come
        // from the periodic query.
    }
}
