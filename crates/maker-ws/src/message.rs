//! Wire message types for the sequenced book stream.
//!
//! The feed sends one full snapshot immediately after authentication, then
//! sequence-numbered deltas. A delta may carry any combination of a delete,
//! a create, and a batch of trades. All numerics arrive as JSON strings;
//! sequence numbers are accepted as either strings or integers.

use maker_core::{Price, Side, Volume};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Credentials sent as the authentication payload on connect.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub api_key_id: String,
    pub api_key_secret: String,
}

fn de_sequence<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrInt {
        Str(String),
        Int(u64),
    }
    match StrOrInt::deserialize(de)? {
        StrOrInt::Str(s) => s.parse().map_err(serde::de::Error::custom),
        StrOrInt::Int(n) => Ok(n),
    }
}

/// One resting order in the snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotOrder {
    pub id: String,
    pub price: Price,
    pub volume: Volume,
}

/// Full book snapshot, always the first message on a connection.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotMessage {
    #[serde(deserialize_with = "de_sequence")]
    pub sequence: u64,
    pub asks: Vec<SnapshotOrder>,
    pub bids: Vec<SnapshotOrder>,
}

/// Removal of a resting order. Only the id is sent; the book has to look
/// the order up on both sides.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteUpdate {
    pub order_id: String,
}

/// A new resting order entering the book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUpdate {
    pub order_id: String,
    #[serde(rename = "type")]
    pub side: Side,
    pub price: Price,
    pub volume: Volume,
}

/// A trade against a resting order. `base` is the traded base amount,
/// `counter` the quote amount; price is `counter / base`.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeUpdate {
    pub maker_order_id: String,
    pub taker_order_id: String,
    pub order_id: String,
    pub base: Volume,
    pub counter: Decimal,
}

/// Sequence-numbered incremental update.
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaMessage {
    #[serde(deserialize_with = "de_sequence")]
    pub sequence: u64,
    #[serde(default)]
    pub delete_update: Option<DeleteUpdate>,
    #[serde(default)]
    pub create_update: Option<CreateUpdate>,
    #[serde(default)]
    pub trade_updates: Option<Vec<TradeUpdate>>,
}

/// The feed's keepalive is a literal empty-string payload.
pub fn is_keepalive(payload: &str) -> bool {
    payload.is_empty() || payload == "\"\""
}
