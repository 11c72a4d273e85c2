//! Feed task: one task owns the connection, the book, and the analytics
//! for one pair.
//!
//! Messages are processed strictly in arrival order; the sequence check,
//! book mutation, consolidation, and tick production for one message all
//! complete before the next receive. A sequence gap or transport error
//! discards the book and reconnects for a fresh snapshot; analytics state
//! (trade buffers, volatility window, calibration) survives reconnects.

use crate::error::AppResult;
use maker_analytics::{AnalyticsConfig, AnalyticsEngine};
use maker_book::OrderBook;
use maker_gateway::TickPublisher;
use maker_ws::{FeedConnection, WsError};
use tracing::{info, warn};

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Run the market data pipeline until shutdown.
pub async fn run_feed<P: TickPublisher>(
    mut connection: FeedConnection,
    analytics_config: AnalyticsConfig,
    publisher: P,
) -> AppResult<()> {
    let mut analytics = AnalyticsEngine::new(analytics_config, now_ms());

    'reconnect: loop {
        if connection.is_shutdown() {
            return Ok(());
        }
        let snapshot = match connection.connect().await {
            Ok(snapshot) => snapshot,
            Err(WsError::Shutdown) => return Ok(()),
            Err(e) => {
                warn!(error = %e, "Connect failed, retrying");
                continue 'reconnect;
            }
        };
        let mut book = OrderBook::from_snapshot(&snapshot);
        info!(sequence = book.sequence(), "Streaming starts");

        loop {
            let delta = match connection.recv().await {
                Ok(Some(delta)) => delta,
                Ok(None) => continue,
                Err(WsError::Shutdown) => return Ok(()),
                Err(e) => {
                    warn!(error = %e, "Transport error, reconnecting");
                    continue 'reconnect;
                }
            };

            let trades = match book.apply_delta(&delta) {
                Ok(trades) => trades,
                // Gap already logged by the book; the stale book is dropped
                // with the connection.
                Err(_) => continue 'reconnect,
            };

            let ts = now_ms();
            for event in &trades {
                let record = analytics.on_trade(ts, event);
                if publisher.publish_trade(record).await.is_err() {
                    warn!("Trade consumer gone, stopping feed");
                    return Ok(());
                }
            }

            let bids = book.consolidated_bids();
            let asks = book.consolidated_asks();
            match analytics.on_book_update(ts, &bids, &asks) {
                Ok(tick) => {
                    if publisher.publish_tick(tick).await.is_err() {
                        warn!("Tick consumer gone, stopping feed");
                        return Ok(());
                    }
                }
                // No tick is published for a failed cycle; the stream
                // continues with the next message.
                Err(e) => warn!(error = %e, "Analytics cycle skipped"),
            }
        }
    }
}
