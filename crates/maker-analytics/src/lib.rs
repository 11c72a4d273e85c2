//! Microstructure analytics for the sequenced-LOB market maker.
//!
//! Computes, per applied book message:
//! - best bid/ask, mid price, spread
//! - VAMP (volume-adjusted mid over top levels) and order imbalance
//! - realized volatility over a fixed VAMP-sample window
//! - trade-intensity calibration (alpha, kappa) from windowed trade buffers

pub mod depth;
pub mod engine;
pub mod error;
pub mod intensity;
pub mod trades;
pub mod volatility;

pub use depth::{order_imbalance, vamp, vwap};
pub use engine::{AnalyticsConfig, AnalyticsEngine};
pub use error::{AnalyticsError, AnalyticsResult};
pub use intensity::{fit_intensity, Calibration};
pub use trades::TradeHistory;
pub use volatility::VampWindow;
