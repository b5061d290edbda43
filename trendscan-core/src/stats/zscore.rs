//! Z-score normalization over the finite values of a series.
//!
//! z[t] = (x[t] - mean) / std, with the sample standard deviation (n - 1).
//! Missing (non-finite) positions stay `NaN` and do not enter the moments.

use crate::error::CriterionError;

/// Standard deviations below this fraction of the largest magnitude are
/// treated as floating-point noise around a constant.
pub const DEGENERATE_RELATIVE_STD: f64 = 1e-12;

/// Sample mean and standard deviation of the finite values.
///
/// Returns `None` when fewer than two finite values are present.
pub fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((mean, var.sqrt()))
}

/// Z-score a series, preserving positions.
///
/// Fails with `DegenerateSignal` when fewer than two finite values remain or
/// when their spread is zero (within the noise floor).
pub fn zscore(values: &[f64]) -> Result<Vec<f64>, CriterionError> {
    let (mean, std) = mean_and_std(values).ok_or(CriterionError::DegenerateSignal)?;

    let max_abs = values
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    if !std.is_finite() || std == 0.0 || std <= DEGENERATE_RELATIVE_STD * max_abs {
        return Err(CriterionError::DegenerateSignal);
    }

    Ok(values
        .iter()
        .map(|&v| {
            if v.is_finite() {
                (v - mean) / std
            } else {
                f64::NAN
            }
        })
        .collect())
}
