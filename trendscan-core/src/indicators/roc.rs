//! Fractional change and first difference.
//!
//! pct_change[t] = (x[t] - x[t-period]) / x[t-period]
//! diff[t] = x[t] - x[t-1]
//! Lookback: period (respectively 1).

/// Fractional change over `period` positions.
///
/// `NaN` for the first `period` positions, when either endpoint is missing, or
/// when the base value is zero.
pub fn pct_change(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    for i in period..n {
        let prev = values[i - period];
        let curr = values[i];
        if prev.is_finite() && curr.is_finite() && prev != 0.0 {
            result[i] = (curr - prev) / prev;
        }
    }

    result
}

/// First difference. `NaN` at index 0 and wherever either operand is missing.
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        let (prev, curr) = (values[i - 1], values[i]);
        if prev.is_finite() && curr.is_finite() {
            result[i] = curr - prev;
        }
    }
    result
}
