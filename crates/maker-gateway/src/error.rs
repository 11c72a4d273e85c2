//! Gateway error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(String),

    /// The exchange rejected the request outright.
    #[error("Exchange rejected request ({code}): {message}")]
    Rejected { code: String, message: String },

    /// Placement rejected for insufficient funds. The order tracker must
    /// not record an order for this placement.
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Publish channel closed: {0}")]
    ChannelClosed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
