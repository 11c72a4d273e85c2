//! Analytics error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A book side has no consolidated levels; no tick can be produced.
    #[error("Empty {0} side, analytics cycle skipped")]
    EmptyBook(&'static str),

    /// Zero aggregate volume over the inspected depth. Failing loudly here
    /// keeps NaN out of published ticks.
    #[error("Zero aggregate volume on {0} side over top levels")]
    ZeroDepth(&'static str),

    /// Not enough distinct observations to fit the intensity model.
    #[error("Degenerate intensity calibration: {0}")]
    DegenerateCalibration(String),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
