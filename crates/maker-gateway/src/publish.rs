//! Tick and trade publishing boundary.
//!
//! The feed task publishes one `Tick` per applied message and one
//! `TradeRecord` per trade event; consumers subscribe through whatever
//! transport sits behind `TickPublisher`. In-process, the transport is a
//! pair of tokio channels; a process-external pub/sub can be swapped in at
//! this seam without touching the feed task.

use crate::error::{GatewayError, GatewayResult};
use maker_core::{Tick, TradeRecord};
use std::future::Future;
use tokio::sync::mpsc;

/// Outbound analytics publisher.
pub trait TickPublisher: Send + Sync {
    fn publish_tick(&self, tick: Tick) -> impl Future<Output = GatewayResult<()>> + Send;

    fn publish_trade(&self, trade: TradeRecord)
        -> impl Future<Output = GatewayResult<()>> + Send;
}

/// In-process publisher backed by tokio mpsc channels.
pub struct ChannelPublisher {
    tick_tx: mpsc::Sender<Tick>,
    trade_tx: mpsc::Sender<TradeRecord>,
}

impl ChannelPublisher {
    /// Create a publisher and the receiving halves for the consumer task.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Tick>, mpsc::Receiver<TradeRecord>) {
        let (tick_tx, tick_rx) = mpsc::channel(capacity);
        let (trade_tx, trade_rx) = mpsc::channel(capacity);
        (Self { tick_tx, trade_tx }, tick_rx, trade_rx)
    }
}

impl TickPublisher for ChannelPublisher {
    async fn publish_tick(&self, tick: Tick) -> GatewayResult<()> {
        self.tick_tx
            .send(tick)
            .await
            .map_err(|e| GatewayError::ChannelClosed(e.to_string()))
    }

    async fn publish_trade(&self, trade: TradeRecord) -> GatewayResult<()> {
        self.trade_tx
            .send(trade)
            .await
            .map_err(|e| GatewayError::ChannelClosed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maker_core::{Price, Side, Volume};
    use rust_decimal_macros::dec;

    fn tick() -> Tick {
        Tick {
            ts: 1,
            mid_price: Price::new(dec!(100.5)),
            spread: Price::new(dec!(1)),
            best_bid: Price::new(dec!(100)),
            best_ask: Price::new(dec!(101)),
            best_bid_size: Volume::new(dec!(2)),
            best_ask_size: Volume::new(dec!(1)),
            vamp: Price::new(dec!(100.6)),
            order_imbalance: dec!(0.5),
            buffer_ready: false,
            volatility: None,
            alpha: None,
            kappa: None,
        }
    }

    #[tokio::test]
    async fn test_publish_tick_roundtrip() {
        let (publisher, mut tick_rx, _trade_rx) = ChannelPublisher::new(8);
        publisher.publish_tick(tick()).await.unwrap();
        let received = tick_rx.recv().await.unwrap();
        assert_eq!(received.mid_price.inner(), dec!(100.5));
    }

    #[tokio::test]
    async fn test_publish_trade_roundtrip() {
        let (publisher, _tick_rx, mut trade_rx) = ChannelPublisher::new(8);
        let trade = TradeRecord {
            ts: 2,
            price: Price::new(dec!(101)),
            amount: Volume::new(dec!(0.5)),
            mid_price: Price::new(dec!(100.5)),
            distance: dec!(0.5),
            side: Side::Ask,
        };
        publisher.publish_trade(trade.clone()).await.unwrap();
        assert_eq!(trade_rx.recv().await.unwrap(), trade);
    }

    #[tokio::test]
    async fn test_publish_to_dropped_consumer_errors() {
        let (publisher, tick_rx, _trade_rx) = ChannelPublisher::new(8);
        drop(tick_rx);
        assert!(publisher.publish_tick(tick()).await.is_err());
    }
}
