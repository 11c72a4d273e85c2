//! Quote lifecycle management.
//!
//! Converts each published tick into maker actions under the refresh
//! policy: place both sides immediately if nothing was ever placed, cancel
//! and replace once the newest placement is older than the refresh rate,
//! and otherwise leave the fresh quotes alone. Cancel-then-place is not
//! atomic; a fill racing the replacement is absorbed by the next cycle's
//! balance refresh.

use crate::config::QuoteConfig;
use crate::error::{QuoteError, QuoteResult};
use crate::inventory::InventoryState;
use crate::quote_engine::{compute_quote, Quote};
use crate::tracker::OrderTracker;
use maker_core::{ClientOrderId, Price, Side, Tick, Volume};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// An order to submit, carrying its pre-assigned client order id.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub id: ClientOrderId,
    pub side: Side,
    pub price: Price,
    pub volume: Volume,
    pub post_only: bool,
}

/// A cancel to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCancel {
    pub id: ClientOrderId,
}

/// Actions the executor should perform for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum MakerAction {
    /// Place fresh quotes.
    Place(Vec<PendingOrder>),
    /// Cancel stale quotes, then place fresh ones.
    CancelAndReplace {
        cancels: Vec<PendingCancel>,
        orders: Vec<PendingOrder>,
    },
}

/// Quoting state machine for one pair.
pub struct QuoteManager {
    config: QuoteConfig,
    tracker: OrderTracker,
    inventory: InventoryState,
}

impl QuoteManager {
    pub fn new(config: QuoteConfig) -> Self {
        Self {
            config,
            tracker: OrderTracker::new(),
            inventory: InventoryState::new(),
        }
    }

    pub fn inventory(&self) -> &InventoryState {
        &self.inventory
    }

    pub fn tracker(&self) -> &OrderTracker {
        &self.tracker
    }

    /// Refresh balances from an explicit balance query.
    pub fn update_balances(&mut self, base: Decimal, quote: Decimal) {
        self.inventory.update_balances(base, quote);
    }

    /// Process one tick and decide this cycle's actions.
    ///
    /// `Ok(None)` means the cycle is skipped: either calibration is not
    /// ready yet or the outstanding quotes are still fresh. The inventory
    /// target is captured on the very first tick regardless, so the
    /// strategy's reference point predates its first order.
    pub fn on_tick(&mut self, tick: &Tick, now_ms: u64) -> QuoteResult<Option<MakerAction>> {
        let q = self.inventory.deviation(tick.mid_price)?;

        if !(tick.buffer_ready && tick.calibration_ready() && tick.volatility.is_some()) {
            debug!("Calibration not ready, skipping quote cycle");
            return Ok(None);
        }
        let quote = compute_quote(tick, q, &self.config)?;

        match self.tracker.last_order_time_ms() {
            None => {
                info!(
                    bid = %quote.bid_price,
                    ask = %quote.ask_price,
                    "Placing initial quotes"
                );
                Ok(Some(MakerAction::Place(self.build_orders(&quote))))
            }
            Some(last) => {
                let refresh_after_ms = self.config.order_refresh_rate_s * 1000;
                if now_ms.saturating_sub(last) > refresh_after_ms {
                    let cancels: Vec<PendingCancel> = self
                        .tracker
                        .active_orders()
                        .map(|o| PendingCancel { id: o.id.clone() })
                        .collect();
                    info!(
                        stale = cancels.len(),
                        bid = %quote.bid_price,
                        ask = %quote.ask_price,
                        "Refreshing quotes"
                    );
                    Ok(Some(MakerAction::CancelAndReplace {
                        cancels,
                        orders: self.build_orders(&quote),
                    }))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn build_orders(&self, quote: &Quote) -> Vec<PendingOrder> {
        vec![
            PendingOrder {
                id: ClientOrderId::new(),
                side: Side::Bid,
                price: quote.bid_price,
                volume: quote.bid_size,
                post_only: true,
            },
            PendingOrder {
                id: ClientOrderId::new(),
                side: Side::Ask,
                price: quote.ask_price,
                volume: quote.ask_size,
                post_only: true,
            },
        ]
    }

    /// Record an exchange-acknowledged placement. Rejected placements must
    /// not be recorded, keeping the tracked set consistent with what the
    /// exchange actually accepted.
    pub fn record_placed(&mut self, order: &PendingOrder, now_ms: u64) {
        self.tracker.add_order(order.id.clone(), order.side, now_ms);
    }

    /// Record an acknowledged cancel.
    pub fn record_cancelled(&mut self, id: &ClientOrderId) {
        self.tracker.remove_order(id);
    }

    /// Retire a tracked order on a fill or cancel event from the user
    /// stream.
    pub fn on_order_closed(&mut self, id: &ClientOrderId) {
        if self.tracker.remove_order(id) {
            debug!(order_id = %id, "Tracked order retired");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ready_tick() -> Tick {
        Tick {
            ts: 0,
            mid_price: Price::new(dec!(100)),
            spread: Price::new(dec!(1)),
            best_bid: Price::new(dec!(99.5)),
            best_ask: Price::new(dec!(100.5)),
            best_bid_size: Volume::new(dec!(1)),
            best_ask_size: Volume::new(dec!(1)),
            vamp: Price::new(dec!(100)),
            order_imbalance: dec!(0.5),
            buffer_ready: true,
            volatility: Some(0.02),
            alpha: Some(1.0),
            kappa: Some(1.0),
        }
    }

    fn manager() -> QuoteManager {
        let mut manager = QuoteManager::new(QuoteConfig::default());
        manager.update_balances(dec!(1), dec!(100));
        manager
    }

    #[test]
    fn test_first_cycle_places_both_sides() {
        let mut manager = manager();
        let action = manager.on_tick(&ready_tick(), 1000).unwrap().unwrap();
        match action {
            MakerAction::Place(orders) => {
                assert_eq!(orders.len(), 2);
                assert_eq!(orders[0].side, Side::Bid);
                assert_eq!(orders[1].side, Side::Ask);
                assert!(orders.iter().all(|o| o.post_only));
                assert_ne!(orders[0].id, orders[1].id);
            }
            other => panic!("expected Place, got {other:?}"),
        }
    }

    #[test]
    fn test_unready_tick_skips_but_captures_target() {
        let mut manager = manager();
        let mut tick = ready_tick();
        tick.buffer_ready = false;
        tick.alpha = None;
        tick.kappa = None;

        let action = manager.on_tick(&tick, 1000).unwrap();
        assert!(action.is_none());
        // The inventory target is pinned by the first tick even when no
        // quote is computed.
        assert_eq!(manager.inventory().q_target(), Some(dec!(0.5)));
    }

    #[test]
    fn test_refresh_gating() {
        let mut manager = manager();
        let tick = ready_tick();

        // Place at t=0 and acknowledge.
        let action = manager.on_tick(&tick, 0).unwrap().unwrap();
        let MakerAction::Place(orders) = action else {
            panic!("expected Place");
        };
        for order in &orders {
            manager.record_placed(order, 0);
        }

        // t=30s: orders still fresh, nothing to do.
        assert!(manager.on_tick(&tick, 30_000).unwrap().is_none());

        // t=61s: stale; cancel both and replace.
        let action = manager.on_tick(&tick, 61_000).unwrap().unwrap();
        match action {
            MakerAction::CancelAndReplace { cancels, orders } => {
                assert_eq!(cancels.len(), 2);
                assert_eq!(orders.len(), 2);
            }
            other => panic!("expected CancelAndReplace, got {other:?}"),
        }
    }

    #[test]
    fn test_rejected_placement_not_tracked() {
        let mut manager = manager();
        let tick = ready_tick();

        let action = manager.on_tick(&tick, 0).unwrap().unwrap();
        let MakerAction::Place(orders) = action else {
            panic!("expected Place");
        };
        // Only the bid is acknowledged; the ask was rejected.
        manager.record_placed(&orders[0], 0);

        assert_eq!(manager.tracker().active_orders().count(), 1);
        assert!(manager.tracker().no_orders_at_ask());
    }

    #[test]
    fn test_fill_ack_retires_order() {
        let mut manager = manager();
        let tick = ready_tick();

        let action = manager.on_tick(&tick, 0).unwrap().unwrap();
        let MakerAction::Place(orders) = action else {
            panic!("expected Place");
        };
        for order in &orders {
            manager.record_placed(order, 0);
        }

        manager.on_order_closed(&orders[0].id);
        assert_eq!(manager.tracker().active_orders().count(), 1);
        // Unknown ids are ignored.
        manager.on_order_closed(&ClientOrderId::new());
        assert_eq!(manager.tracker().active_orders().count(), 1);
    }

    #[test]
    fn test_cancel_ack_removes_tracked_order() {
        let mut manager = manager();
        let tick = ready_tick();

        let action = manager.on_tick(&tick, 0).unwrap().unwrap();
        let MakerAction::Place(orders) = action else {
            panic!("expected Place");
        };
        for order in &orders {
            manager.record_placed(order, 0);
        }
        manager.record_cancelled(&orders[0].id);
        manager.record_cancelled(&orders[1].id);
        assert!(manager.tracker().no_orders());
    }
}
