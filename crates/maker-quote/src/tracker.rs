//! Outstanding-order tracking.
//!
//! Holds the client order ids of live quotes per side, in placement order,
//! together with the most recent placement timestamp that drives the
//! refresh policy. Orders are recorded only once the exchange acknowledges
//! the placement and removed on cancel or fill acknowledgment.

use maker_core::{ClientOrderId, Side};
use std::collections::VecDeque;

/// One live tracked order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOrder {
    pub id: ClientOrderId,
    pub side: Side,
    pub placed_at_ms: u64,
}

/// Per-side collections of outstanding orders.
#[derive(Debug, Default)]
pub struct OrderTracker {
    bids: VecDeque<TrackedOrder>,
    asks: VecDeque<TrackedOrder>,
    last_order_time_ms: Option<u64>,
}

impl OrderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an acknowledged placement.
    pub fn add_order(&mut self, id: ClientOrderId, side: Side, now_ms: u64) {
        let order = TrackedOrder {
            id,
            side,
            placed_at_ms: now_ms,
        };
        match side {
            Side::Bid => self.bids.push_back(order),
            Side::Ask => self.asks.push_back(order),
        }
        self.last_order_time_ms = Some(now_ms);
    }

    /// Remove an order by id from whichever side holds it.
    /// Returns false if the id is not tracked.
    pub fn remove_order(&mut self, id: &ClientOrderId) -> bool {
        if let Some(pos) = self.bids.iter().position(|o| &o.id == id) {
            self.bids.remove(pos);
            return true;
        }
        if let Some(pos) = self.asks.iter().position(|o| &o.id == id) {
            self.asks.remove(pos);
            return true;
        }
        false
    }

    pub fn no_orders_at_bid(&self) -> bool {
        self.bids.is_empty()
    }

    pub fn no_orders_at_ask(&self) -> bool {
        self.asks.is_empty()
    }

    pub fn no_orders(&self) -> bool {
        self.no_orders_at_bid() && self.no_orders_at_ask()
    }

    /// Timestamp of the most recent acknowledged placement.
    pub fn last_order_time_ms(&self) -> Option<u64> {
        self.last_order_time_ms
    }

    /// All live orders, bids first.
    pub fn active_orders(&self) -> impl Iterator<Item = &TrackedOrder> {
        self.bids.iter().chain(self.asks.iter())
    }
}
