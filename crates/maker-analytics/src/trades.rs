//! Time-windowed trade buffers, one per side label.
//!
//! Records are appended in arrival order; on each append, records older
//! than the window are evicted from the front of that side's buffer.
//! Readiness requires at least one record on both sides.

use maker_core::{Side, TradeRecord};
use std::collections::VecDeque;

/// Per-side trade history with bounded age.
#[derive(Debug)]
pub struct TradeHistory {
    bid: VecDeque<TradeRecord>,
    ask: VecDeque<TradeRecord>,
    window_ms: i64,
}

impl TradeHistory {
    pub fn new(window_ms: i64) -> Self {
        Self {
            bid: VecDeque::new(),
            ask: VecDeque::new(),
            window_ms,
        }
    }

    /// Append a record to its side's buffer and evict aged records.
    pub fn record(&mut self, record: TradeRecord) {
        let cutoff = record.ts - self.window_ms;
        let buffer = match record.side {
            Side::Bid => &mut self.bid,
            Side::Ask => &mut self.ask,
        };
        buffer.push_back(record);
        while buffer.front().is_some_and(|r| r.ts < cutoff) {
            buffer.pop_front();
        }
    }

    /// Both sides hold at least one record.
    pub fn both_sides_populated(&self) -> bool {
        !self.bid.is_empty() && !self.ask.is_empty()
    }

    pub fn bid_count(&self) -> usize {
        self.bid.len()
    }

    pub fn ask_count(&self) -> usize {
        self.ask.len()
    }

    /// All buffered records across both sides.
    pub fn combined(&self) -> impl Iterator<Item = &TradeRecord> {
        self.bid.iter().chain(self.ask.iter())
    }
}
