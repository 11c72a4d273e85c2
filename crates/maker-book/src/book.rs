//! Live order book state machine.
//!
//! The book is keyed by exchange order id on each side and mutated in place
//! by sequenced deltas. The sequence check precedes all mutation: a delta
//! whose sequence is not exactly `sequence + 1` leaves the book untouched
//! and signals a resync, after which the owner reconnects for a fresh
//! snapshot.

use crate::error::{BookError, BookResult};
use maker_core::{Price, PriceLevel, Side, Volume};
use maker_ws::{CreateUpdate, DeleteUpdate, DeltaMessage, SnapshotMessage, TradeUpdate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

/// One resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookEntry {
    pub price: Price,
    pub volume: Volume,
}

/// A trade applied against a resting order.
///
/// `side` is the bucket label: a trade that depleted a resting bid is
/// labeled `Ask`, one that depleted a resting ask is labeled `Bid`
/// (aggressor-side tagging, preserved from the exchange contract).
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub side: Side,
    pub price: Price,
    pub amount: Volume,
    pub maker_order_id: String,
}

/// In-memory limit order book for one pair.
#[derive(Debug, Default)]
pub struct OrderBook {
    bids: HashMap<String, BookEntry>,
    asks: HashMap<String, BookEntry>,
    sequence: u64,
}

impl OrderBook {
    /// Build a fresh book from a full snapshot, replacing any prior state.
    pub fn from_snapshot(snapshot: &SnapshotMessage) -> Self {
        let to_entries = |orders: &[maker_ws::SnapshotOrder]| -> HashMap<String, BookEntry> {
            orders
                .iter()
                .map(|o| {
                    (
                        o.id.clone(),
                        BookEntry {
                            price: o.price,
                            volume: o.volume,
                        },
                    )
                })
                .collect()
        };
        Self {
            bids: to_entries(&snapshot.bids),
            asks: to_entries(&snapshot.asks),
            sequence: snapshot.sequence,
        }
    }

    /// Sequence of the last successfully applied message.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_count(&self) -> usize {
        self.asks.len()
    }

    /// Apply one delta, returning the trades it carried.
    ///
    /// Update kinds are processed in delete, create, trade order. On a
    /// sequence gap no mutation is performed and `SequenceGap` is returned;
    /// the caller must discard the book and resync.
    pub fn apply_delta(&mut self, delta: &DeltaMessage) -> BookResult<Vec<TradeEvent>> {
        let expected = self.sequence + 1;
        if delta.sequence != expected {
            warn!(
                expected,
                got = delta.sequence,
                "Sequence gap detected, resync required"
            );
            return Err(BookError::SequenceGap {
                expected,
                got: delta.sequence,
            });
        }
        self.sequence = delta.sequence;

        if let Some(delete) = &delta.delete_update {
            self.apply_delete(delete);
        }
        if let Some(create) = &delta.create_update {
            self.apply_create(create);
        }
        let mut trades = Vec::new();
        if let Some(updates) = &delta.trade_updates {
            for update in updates {
                if let Some(event) = self.apply_trade(update) {
                    trades.push(event);
                }
            }
        }
        Ok(trades)
    }

    /// The delete update only carries an order id, so both sides are tried.
    fn apply_delete(&mut self, delete: &DeleteUpdate) {
        if self.bids.remove(&delete.order_id).is_none() {
            self.asks.remove(&delete.order_id);
        }
    }

    fn apply_create(&mut self, create: &CreateUpdate) {
        let entry = BookEntry {
            price: create.price,
            volume: create.volume,
        };
        match create.side {
            Side::Bid => self.bids.insert(create.order_id.clone(), entry),
            Side::Ask => self.asks.insert(create.order_id.clone(), entry),
        };
    }

    /// Deplete the resting order named by `maker_order_id` and classify the
    /// trade. A maker id found in neither book belongs to an order already
    /// consumed earlier in the message; the trade is dropped.
    fn apply_trade(&mut self, update: &TradeUpdate) -> Option<TradeEvent> {
        if update.base.is_zero() {
            warn!(order_id = %update.order_id, "Trade with zero base amount dropped");
            return None;
        }
        let price = Price::new(update.counter / update.base.inner());

        let side = if self.bids.contains_key(&update.maker_order_id) {
            Self::deplete(&mut self.bids, &update.maker_order_id, update.base);
            Side::Ask
        } else if self.asks.contains_key(&update.maker_order_id) {
            Self::deplete(&mut self.asks, &update.maker_order_id, update.base);
            Side::Bid
        } else {
            debug!(maker_order_id = %update.maker_order_id, "Trade for unknown maker dropped");
            return None;
        };

        Some(TradeEvent {
            side,
            price,
            amount: update.base,
            maker_order_id: update.maker_order_id.clone(),
        })
    }

    /// Reduce a resting order's volume, removing the entry once nothing
    /// positive remains.
    fn deplete(book: &mut HashMap<String, BookEntry>, order_id: &str, amount: Volume) {
        if let Some(entry) = book.get_mut(order_id) {
            let remaining = entry.volume - amount;
            if remaining.is_positive() {
                entry.volume = remaining;
            } else {
                book.remove(order_id);
            }
        }
    }

    /// Consolidated bid levels, best (highest) price first.
    pub fn consolidated_bids(&self) -> Vec<PriceLevel> {
        consolidate(self.bids.values(), true)
    }

    /// Consolidated ask levels, best (lowest) price first.
    pub fn consolidated_asks(&self) -> Vec<PriceLevel> {
        consolidate(self.asks.values(), false)
    }
}

/// Group resting orders by price, sum volume, round both fields to the
/// consolidation precision, and sort by price (descending for bids).
pub fn consolidate<'a, I>(entries: I, descending: bool) -> Vec<PriceLevel>
where
    I: IntoIterator<Item = &'a BookEntry>,
{
    let mut by_price: HashMap<Decimal, Decimal> = HashMap::new();
    for entry in entries {
        *by_price.entry(entry.price.inner()).or_default() += entry.volume.inner();
    }

    let mut levels: Vec<PriceLevel> = by_price
        .into_iter()
        .map(|(price, volume)| {
            PriceLevel::new(
                Price::new(price).consolidated(),
                Volume::new(volume).consolidated(),
            )
        })
        .collect();

    levels.sort_by(|a, b| {
        if descending {
            b.price.cmp(&a.price)
        } else {
            a.price.cmp(&b.price)
        }
    });
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(sequence: u64) -> SnapshotMessage {
        serde_json::from_str(&format!(
            r#"{{
                "sequence": {sequence},
                "bids": [{{"id": "b1", "price": "100", "volume": "1"}}],
                "asks": [{{"id": "a1", "price": "101", "volume": "1"}}]
            }}"#
        ))
        .unwrap()
    }

    fn delta(json: &str) -> DeltaMessage {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_snapshot_initializes_book() {
        let book = OrderBook::from_snapshot(&snapshot(5));
        assert_eq!(book.sequence(), 5);
        assert_eq!(book.bid_count(), 1);
        assert_eq!(book.ask_count(), 1);
    }

    #[test]
    fn test_sequence_gap_leaves_book_untouched() {
        let mut book = OrderBook::from_snapshot(&snapshot(5));
        let gap = delta(
            r#"{"sequence": 7,
                "delete_update": {"order_id": "b1"},
                "create_update": {"order_id": "b2", "type": "BID", "price": "99", "volume": "2"}}"#,
        );

        let err = book.apply_delta(&gap).unwrap_err();
        match err {
            BookError::SequenceGap { expected, got } => {
                assert_eq!(expected, 6);
                assert_eq!(got, 7);
            }
        }
        // No partial mutation: the delete and create were not applied.
        assert_eq!(book.sequence(), 5);
        assert_eq!(book.bid_count(), 1);
        assert_eq!(book.consolidated_bids()[0].price.inner(), dec!(100));
    }

    #[test]
    fn test_create_then_delete() {
        let mut book = OrderBook::from_snapshot(&snapshot(5));

        let create = delta(
            r#"{"sequence": 6,
                "create_update": {"order_id": "b2", "type": "BID", "price": "99.5", "volume": "3"}}"#,
        );
        book.apply_delta(&create).unwrap();
        assert_eq!(book.bid_count(), 2);

        let remove = delta(r#"{"sequence": 7, "delete_update": {"order_id": "b2"}}"#);
        book.apply_delta(&remove).unwrap();
        assert_eq!(book.bid_count(), 1);
        assert_eq!(book.sequence(), 7);
    }

    #[test]
    fn test_delete_unknown_order_is_noop() {
        let mut book = OrderBook::from_snapshot(&snapshot(5));
        let remove = delta(r#"{"sequence": 6, "delete_update": {"order_id": "nope"}}"#);
        book.apply_delta(&remove).unwrap();
        assert_eq!(book.bid_count(), 1);
        assert_eq!(book.ask_count(), 1);
    }

    #[test]
    fn test_trade_against_bid_labeled_ask() {
        let mut book = OrderBook::from_snapshot(&snapshot(5));
        let trade = delta(
            r#"{"sequence": 6,
                "trade_updates": [{"maker_order_id": "b1", "taker_order_id": "t1",
                                   "order_id": "b1", "base": "0.4", "counter": "40"}]}"#,
        );

        let events = book.apply_delta(&trade).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].side, Side::Ask);
        assert_eq!(events[0].price.inner(), dec!(100));
        assert_eq!(events[0].amount.inner(), dec!(0.4));
        // Resting bid reduced by the traded base amount.
        assert_eq!(book.consolidated_bids()[0].volume.inner(), dec!(0.6));
    }

    #[test]
    fn test_trade_against_ask_labeled_bid() {
        let mut book = OrderBook::from_snapshot(&snapshot(5));
        let trade = delta(
            r#"{"sequence": 6,
                "trade_updates": [{"maker_order_id": "a1", "taker_order_id": "t1",
                                   "order_id": "a1", "base": "0.25", "counter": "25.25"}]}"#,
        );

        let events = book.apply_delta(&trade).unwrap();
        assert_eq!(events[0].side, Side::Bid);
        assert_eq!(events[0].price.inner(), dec!(101));
        assert_eq!(book.consolidated_asks()[0].volume.inner(), dec!(0.75));
    }

    #[test]
    fn test_trade_consuming_full_volume_removes_entry() {
        let mut book = OrderBook::from_snapshot(&snapshot(5));
        let trade = delta(
            r#"{"sequence": 6,
                "trade_updates": [{"maker_order_id": "b1", "taker_order_id": "t1",
                                   "order_id": "b1", "base": "1", "counter": "100"}]}"#,
        );

        book.apply_delta(&trade).unwrap();
        assert_eq!(book.bid_count(), 0);
    }

    #[test]
    fn test_trade_for_unknown_maker_dropped() {
        let mut book = OrderBook::from_snapshot(&snapshot(5));
        let trade = delta(
            r#"{"sequence": 6,
                "trade_updates": [{"maker_order_id": "gone", "taker_order_id": "t1",
                                   "order_id": "gone", "base": "1", "counter": "100"}]}"#,
        );

        let events = book.apply_delta(&trade).unwrap();
        assert!(events.is_empty());
        assert_eq!(book.sequence(), 6);
    }

    #[test]
    fn test_all_update_kinds_processed_in_order() {
        let mut book = OrderBook::from_snapshot(&snapshot(5));
        // Delete a1, create a replacement ask, then trade against the bid.
        let combined = delta(
            r#"{"sequence": 6,
                "delete_update": {"order_id": "a1"},
                "create_update": {"order_id": "a2", "type": "ASK", "price": "102", "volume": "2"},
                "trade_updates": [{"maker_order_id": "b1", "taker_order_id": "t1",
                                   "order_id": "b1", "base": "1", "counter": "100"}]}"#,
        );

        let events = book.apply_delta(&combined).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(book.ask_count(), 1);
        assert_eq!(book.consolidated_asks()[0].price.inner(), dec!(102));
        assert_eq!(book.bid_count(), 0);
    }

    #[test]
    fn test_remaining_volumes_strictly_positive() {
        let mut book = OrderBook::from_snapshot(&snapshot(5));
        // Trade for more than the resting volume: entry removed, never negative.
        let trade = delta(
            r#"{"sequence": 6,
                "trade_updates": [{"maker_order_id": "a1", "taker_order_id": "t1",
                                   "order_id": "a1", "base": "1.5", "counter": "151.5"}]}"#,
        );
        book.apply_delta(&trade).unwrap();
        assert_eq!(book.ask_count(), 0);
    }

    #[test]
    fn test_consolidate_groups_and_sorts() {
        let entries = vec![
            BookEntry {
                price: Price::new(dec!(100)),
                volume: Volume::new(dec!(1)),
            },
            BookEntry {
                price: Price::new(dec!(100)),
                volume: Volume::new(dec!(2)),
            },
            BookEntry {
                price: Price::new(dec!(99)),
                volume: Volume::new(dec!(5)),
            },
        ];

        let bids = consolidate(entries.iter(), true);
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[0].price.inner(), dec!(100));
        assert_eq!(bids[0].volume.inner(), dec!(3));
        assert_eq!(bids[1].price.inner(), dec!(99));

        let asks = consolidate(entries.iter(), false);
        assert_eq!(asks[0].price.inner(), dec!(99));
    }

    #[test]
    fn test_consolidate_rounds_to_four_places() {
        let entries = vec![BookEntry {
            price: Price::new(dec!(100.123456)),
            volume: Volume::new(dec!(0.987654)),
        }];
        let levels = consolidate(entries.iter(), false);
        assert_eq!(levels[0].price.inner(), dec!(100.1235));
        assert_eq!(levels[0].volume.inner(), dec!(0.9877));
    }

    #[test]
    fn test_consolidate_idempotent() {
        let entries = vec![
            BookEntry {
                price: Price::new(dec!(100.12)),
                volume: Volume::new(dec!(1.5)),
            },
            BookEntry {
                price: Price::new(dec!(99.5)),
                volume: Volume::new(dec!(2)),
            },
        ];
        let once = consolidate(entries.iter(), true);
        let as_entries: Vec<BookEntry> = once
            .iter()
            .map(|l| BookEntry {
                price: l.price,
                volume: l.volume,
            })
            .collect();
        let twice = consolidate(as_entries.iter(), true);
        assert_eq!(once, twice);
    }
}
