//! Core domain types for the sequenced-LOB market maker.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Price`, `Volume`: precision-safe decimal newtypes with floor quantization
//! - `PriceLevel`: consolidated book level
//! - `Side`, `ClientOrderId`: trading primitives
//! - `Tick`, `TradeRecord`: published analytics shapes

pub mod decimal;
pub mod error;
pub mod order;
pub mod tick;

pub use decimal::{Price, PriceLevel, Volume, CONSOLIDATION_DP};
pub use error::{CoreError, Result};
pub use order::{ClientOrderId, Side};
pub use tick::{Tick, TradeRecord};
