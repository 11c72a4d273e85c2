//! Feed connection state machine.
//!
//! Lifecycle: `Disconnected → Connecting → AwaitingSnapshot → Streaming`.
//! A sequence gap or transport error sends the connection back to
//! `Disconnected`; the owner reconnects and receives a fresh snapshot.
//! Reconnects are retried indefinitely — a connection attempt started less
//! than `min_reconnect_interval` after the previous attempt is deferred by
//! sleeping that interval first, never rejected.

use crate::error::{WsError, WsResult};
use crate::message::{is_keepalive, Credentials, DeltaMessage, SnapshotMessage};
use futures_util::{SinkExt, StreamExt};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Feed connection configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket URL for the pair stream.
    pub url: String,
    /// API credentials sent as the authentication payload.
    pub api_key_id: String,
    pub api_key_secret: String,
    /// Minimum spacing between connection attempts.
    pub min_reconnect_interval: Duration,
}

impl FeedConfig {
    pub fn new(url: String, api_key_id: String, api_key_secret: String) -> Self {
        Self {
            url,
            api_key_id,
            api_key_secret,
            min_reconnect_interval: Duration::from_secs(10),
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Disconnected,
    Connecting,
    AwaitingSnapshot,
    Streaming,
}

/// Whether a new attempt must be deferred given the time since the last one.
pub(crate) fn backoff_required(elapsed: Duration, min_interval: Duration) -> bool {
    elapsed < min_interval
}

/// WebSocket connection to the sequenced book stream.
pub struct FeedConnection {
    config: FeedConfig,
    ws: Option<WsStream>,
    state: FeedState,
    last_attempt: Option<Instant>,
    attempt_count: u64,
    shutdown: CancellationToken,
}

impl FeedConnection {
    pub fn new(config: FeedConfig, shutdown: CancellationToken) -> Self {
        Self {
            config,
            ws: None,
            state: FeedState::Disconnected,
            last_attempt: None,
            attempt_count: 0,
            shutdown,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> FeedState {
        self.state
    }

    /// Total connection attempts so far. Logged so an operator can alert on
    /// reconnect churn externally; there is no internal retry cap.
    pub fn attempt_count(&self) -> u64 {
        self.attempt_count
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Connect, authenticate, and receive the initial snapshot.
    ///
    /// Closes any existing socket first. The book owner must discard its
    /// state and rebuild from the returned snapshot.
    pub async fn connect(&mut self) -> WsResult<SnapshotMessage> {
        if let Some(mut ws) = self.ws.take() {
            let _ = ws.close(None).await;
        }
        self.state = FeedState::Connecting;

        if let Some(last) = self.last_attempt {
            let elapsed = last.elapsed();
            if backoff_required(elapsed, self.config.min_reconnect_interval) {
                debug!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Reconnect attempted too soon, deferring"
                );
                tokio::select! {
                    () = tokio::time::sleep(self.config.min_reconnect_interval) => {}
                    () = self.shutdown.cancelled() => {
                        self.state = FeedState::Disconnected;
                        return Err(WsError::Shutdown);
                    }
                }
            }
        }
        self.last_attempt = Some(Instant::now());
        self.attempt_count += 1;

        info!(url = %self.config.url, attempt = self.attempt_count, "Connecting to feed");
        let (mut ws, _response) = connect_async(&self.config.url).await?;

        let auth = Credentials {
            api_key_id: self.config.api_key_id.clone(),
            api_key_secret: self.config.api_key_secret.clone(),
        };
        ws.send(Message::Text(serde_json::to_string(&auth)?)).await?;

        self.state = FeedState::AwaitingSnapshot;
        let snapshot = Self::await_snapshot(&mut ws).await?;
        info!(
            sequence = snapshot.sequence,
            bids = snapshot.bids.len(),
            asks = snapshot.asks.len(),
            "Snapshot received"
        );

        self.ws = Some(ws);
        self.state = FeedState::Streaming;
        Ok(snapshot)
    }

    /// The first data frame on a fresh connection is always a full snapshot.
    async fn await_snapshot(ws: &mut WsStream) -> WsResult<SnapshotMessage> {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    if is_keepalive(&text) {
                        continue;
                    }
                    return Ok(serde_json::from_str(&text)?);
                }
                Some(Ok(Message::Ping(data))) => {
                    ws.send(Message::Pong(data)).await?;
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (f.code.into(), f.reason.to_string()))
                        .unwrap_or((1000, "Closed before snapshot".to_string()));
                    return Err(WsError::ConnectionClosed { code, reason });
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Err(WsError::SnapshotMissing),
            }
        }
    }

    /// Receive the next delta.
    ///
    /// Returns `Ok(None)` for keepalive no-ops and transport pings. Any
    /// close or transport error is returned to the caller, which answers
    /// with an unconditional reconnect.
    pub async fn recv(&mut self) -> WsResult<Option<DeltaMessage>> {
        let ws = self
            .ws
            .as_mut()
            .ok_or_else(|| WsError::ConnectionFailed("not connected".to_string()))?;

        tokio::select! {
            () = self.shutdown.cancelled() => {
                let _ = ws.send(Message::Close(None)).await;
                self.state = FeedState::Disconnected;
                Err(WsError::Shutdown)
            }
            msg = ws.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if is_keepalive(&text) {
                        return Ok(None);
                    }
                    Ok(Some(serde_json::from_str(&text)?))
                }
                Some(Ok(Message::Ping(data))) => {
                    debug!("Received ping, sending pong");
                    ws.send(Message::Pong(data)).await?;
                    Ok(None)
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (f.code.into(), f.reason.to_string()))
                        .unwrap_or((1000, "Normal close".to_string()));
                    warn!(code, %reason, "Feed closed by server");
                    self.state = FeedState::Disconnected;
                    Err(WsError::ConnectionClosed { code, reason })
                }
                Some(Ok(_)) => Ok(None),
                Some(Err(e)) => {
                    self.state = FeedState::Disconnected;
                    Err(e.into())
                }
                None => {
                    self.state = FeedState::Disconnected;
                    Err(WsError::ConnectionClosed {
                        code: 1006,
                        reason: "Stream ended".to_string(),
                    })
                }
            }
        }
    }
}
