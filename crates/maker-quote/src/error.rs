//! Quoting error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    /// Calibration inputs are missing or degenerate; the quoting cycle is
    /// skipped without placing or replacing orders.
    #[error("Calibration not ready: {0}")]
    CalibrationNotReady(String),

    /// Inventory cannot be normalized (zero mid price or zero holdings).
    #[error("Invalid inventory state: {0}")]
    InvalidInventory(String),

    /// A computed price or size does not convert to a decimal.
    #[error("Numeric conversion failed: {0}")]
    Numeric(String),
}

pub type QuoteResult<T> = Result<T, QuoteError>;
