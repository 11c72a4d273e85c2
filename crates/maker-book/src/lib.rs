//! Limit order book reconstruction.
//!
//! Owns the live book for one pair: populated from a full snapshot,
//! mutated in place by sequenced create/delete/trade deltas, discarded and
//! rebuilt on any sequence gap.

pub mod book;
pub mod error;

pub use book::{consolidate, BookEntry, OrderBook, TradeEvent};
pub use error::{BookError, BookResult};
