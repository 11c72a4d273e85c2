//! WebSocket client for the sequenced order book stream.
//!
//! Provides:
//! - Connection lifecycle with authentication handshake and snapshot-first
//!   protocol
//! - Deferred backoff on rapid reconnects (10 s spacing, always proceeds)
//! - Keepalive no-op handling
//! - Typed wire messages for snapshot and delta updates

pub mod connection;
pub mod error;
pub mod message;

pub use connection::{FeedConfig, FeedConnection, FeedState};
pub use error::{WsError, WsResult};
pub use message::{
    is_keepalive, CreateUpdate, Credentials, DeleteUpdate, DeltaMessage, SnapshotMessage,
    SnapshotOrder, TradeUpdate,
};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
