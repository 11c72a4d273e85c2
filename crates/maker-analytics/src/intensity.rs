//! Trade-intensity calibration.
//!
//! Fits `amount(distance) = alpha * exp(-kappa * distance)` to the buffered
//! trade history: amounts are summed per exact distance-from-mid, then the
//! parameters are estimated by least squares on the log-linear form
//! `ln(amount) = ln(alpha) - kappa * distance`. Both parameters are
//! constrained to be nonnegative. The calibrated kappa sizes the optimal
//! spread downstream, so degenerate input is reported as an error rather
//! than fitted.

use crate::error::{AnalyticsError, AnalyticsResult};
use maker_core::TradeRecord;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Fitted intensity parameters, both nonnegative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub alpha: f64,
    pub kappa: f64,
}

/// Fit the exponential intensity model over the combined trade buffers.
///
/// Records at the same exact distance are summed before fitting; distinct
/// trades therefore reinforce their distance bucket rather than appearing
/// as duplicate observations.
pub fn fit_intensity<'a, I>(trades: I) -> AnalyticsResult<Calibration>
where
    I: IntoIterator<Item = &'a TradeRecord>,
{
    let mut by_distance: HashMap<Decimal, Decimal> = HashMap::new();
    for trade in trades {
        *by_distance.entry(trade.distance).or_default() += trade.amount.inner();
    }

    let points: Vec<(f64, f64)> = by_distance
        .into_iter()
        .filter_map(|(distance, amount)| {
            let d = distance.to_f64()?;
            let a = amount.to_f64()?;
            (a > 0.0).then(|| (d, a.ln()))
        })
        .collect();

    if points.len() < 2 {
        return Err(AnalyticsError::DegenerateCalibration(format!(
            "{} distinct distance buckets, need at least 2",
            points.len()
        )));
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let ss_xx: f64 = points.iter().map(|(x, _)| (x - mean_x) * (x - mean_x)).sum();
    let ss_xy: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    if ss_xx.abs() < f64::EPSILON {
        return Err(AnalyticsError::DegenerateCalibration(
            "no variance in trade distances".to_string(),
        ));
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let kappa = (-slope).max(0.0);
    let alpha = intercept.exp().max(0.0);
    Ok(Calibration { alpha, kappa })
}

#[cfg(test)]
mod tests {
    use super::*;
    use maker_core::{Price, Side, Volume};
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal_macros::dec;

    fn record(distance: Decimal, amount: Decimal, side: Side) -> TradeRecord {
        TradeRecord {
            ts: 0,
            price: Price::new(dec!(100)),
            amount: Volume::new(amount),
            mid_price: Price::new(dec!(100)),
            distance,
            side,
        }
    }

    #[test]
    fn test_fit_recovers_exponential_parameters() {
        let alpha = 2.0_f64;
        let kappa = 0.5_f64;
        let records: Vec<TradeRecord> = (0..6)
            .map(|i| {
                let d = i as f64;
                let amount = alpha * (-kappa * d).exp();
                record(
                    Decimal::from_f64(d).unwrap(),
                    Decimal::from_f64(amount).unwrap(),
                    if i % 2 == 0 { Side::Bid } else { Side::Ask },
                )
            })
            .collect();

        let fit = fit_intensity(records.iter()).unwrap();
        assert!((fit.alpha - alpha).abs() < 1e-6, "alpha = {}", fit.alpha);
        assert!((fit.kappa - kappa).abs() < 1e-6, "kappa = {}", fit.kappa);
    }

    #[test]
    fn test_same_distance_amounts_summed() {
        // Two trades at distance 1 sum to the same bucket as a single trade
        // of their combined amount.
        let split = vec![
            record(dec!(0), dec!(2), Side::Bid),
            record(dec!(1), dec!(0.5), Side::Bid),
            record(dec!(1), dec!(0.7136), Side::Ask),
        ];
        let merged = vec![
            record(dec!(0), dec!(2), Side::Bid),
            record(dec!(1), dec!(1.2136), Side::Ask),
        ];

        let a = fit_intensity(split.iter()).unwrap();
        let b = fit_intensity(merged.iter()).unwrap();
        assert!((a.kappa - b.kappa).abs() < 1e-12);
        assert!((a.alpha - b.alpha).abs() < 1e-12);
    }

    #[test]
    fn test_single_bucket_degenerate() {
        let records = vec![
            record(dec!(1), dec!(2), Side::Bid),
            record(dec!(1), dec!(3), Side::Ask),
        ];
        assert!(matches!(
            fit_intensity(records.iter()),
            Err(AnalyticsError::DegenerateCalibration(_))
        ));
    }

    #[test]
    fn test_empty_history_degenerate() {
        assert!(fit_intensity(std::iter::empty()).is_err());
    }

    #[test]
    fn test_kappa_clamped_nonnegative() {
        // Amounts growing with distance imply a negative decay; the
        // constraint clamps kappa to zero.
        let records = vec![
            record(dec!(0), dec!(1), Side::Bid),
            record(dec!(1), dec!(2), Side::Ask),
            record(dec!(2), dec!(4), Side::Bid),
        ];
        let fit = fit_intensity(records.iter()).unwrap();
        assert_eq!(fit.kappa, 0.0);
        assert!(fit.alpha > 0.0);
    }
}
