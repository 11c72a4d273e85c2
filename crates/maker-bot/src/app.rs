//! Application orchestration.
//!
//! Two independent roles share no mutable state and communicate only
//! through published messages: the feed task (connection + book +
//! analytics) and the strategy task (quoting + order tracking). Shutdown
//! is propagated through a cancellation token on Ctrl-C.

use crate::config::{ApiCredentials, AppConfig};
use crate::error::AppResult;
use crate::feed::run_feed;
use crate::strategy::StrategyRunner;
use maker_gateway::{ChannelPublisher, OrderUpdate, RestClient};
use maker_quote::QuoteManager;
use maker_ws::{FeedConfig, FeedConnection};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Main application for one trading pair.
pub struct Application {
    config: AppConfig,
    credentials: ApiCredentials,
    shutdown: CancellationToken,
    /// Inbound user-stream boundary. A deployment wires the exchange's
    /// user stream into this sender; fills and terminal status updates
    /// retire tracked orders on the strategy task.
    user_stream_tx: mpsc::Sender<OrderUpdate>,
    user_stream_rx: Option<mpsc::Receiver<OrderUpdate>>,
}

impl Application {
    pub fn new(config: AppConfig, credentials: ApiCredentials) -> Self {
        let (user_stream_tx, user_stream_rx) = mpsc::channel(256);
        Self {
            config,
            credentials,
            shutdown: CancellationToken::new(),
            user_stream_tx,
            user_stream_rx: Some(user_stream_rx),
        }
    }

    /// Sender half of the user-stream boundary.
    pub fn user_stream_sender(&self) -> mpsc::Sender<OrderUpdate> {
        self.user_stream_tx.clone()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run both tasks until shutdown or a fatal error.
    pub async fn run(mut self) -> AppResult<()> {
        info!(pair = %self.config.pair, "Starting application");

        let (publisher, tick_rx, mut trade_rx) =
            ChannelPublisher::new(self.config.publish_capacity);

        // Feed task: connection + book + analytics.
        let feed_config = FeedConfig::new(
            self.config.stream_url(),
            self.credentials.key_id.clone(),
            self.credentials.key_secret.clone(),
        );
        let connection = FeedConnection::new(feed_config, self.shutdown.child_token());
        let analytics_config = self.config.analytics.clone().into();
        let feed_handle =
            tokio::spawn(async move { run_feed(connection, analytics_config, publisher).await });

        // Published trades flow outward; this process only logs them.
        let trade_handle = tokio::spawn(async move {
            while let Some(trade) = trade_rx.recv().await {
                debug!(
                    side = %trade.side,
                    price = %trade.price,
                    amount = %trade.amount,
                    distance = %trade.distance,
                    "Trade published"
                );
            }
        });

        // Strategy task: quoting + order tracking.
        let client = RestClient::new(
            self.config.api_url.clone(),
            self.credentials.key_id.clone(),
            self.credentials.key_secret.clone(),
        )?;
        let manager = QuoteManager::new(self.config.quote.clone());
        let runner = StrategyRunner::new(
            client,
            manager,
            self.config.pair.clone(),
            self.config.base_asset.clone(),
            self.config.quote_asset.clone(),
            self.config.balance_refresh_s,
        );
        let update_rx = self
            .user_stream_rx
            .take()
            .expect("user stream receiver consumed twice");
        let strategy_shutdown = self.shutdown.clone();
        let strategy_handle =
            tokio::spawn(async move { runner.run(tick_rx, update_rx, strategy_shutdown).await });

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down");
                self.shutdown.cancel();
            }
            result = feed_handle => {
                match result? {
                    Ok(()) => info!("Feed task finished"),
                    Err(e) => warn!(error = %e, "Feed task failed"),
                }
                self.shutdown.cancel();
            }
        }

        match strategy_handle.await? {
            Ok(()) => info!("Strategy task finished"),
            Err(e) => warn!(error = %e, "Strategy task failed"),
        }
        trade_handle.abort();
        info!("Application stopped");
        Ok(())
    }
}
