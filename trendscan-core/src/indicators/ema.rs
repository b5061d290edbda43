//! Exponential Moving Average (EMA), unadjusted.
//!
//! Recursive: EMA[t] = EMA[t-1] + alpha * (x[t] - EMA[t-1]), alpha = 2 / (span + 1).
//! Seed: EMA at the first finite input equals that input.
//! Lookback: none beyond leading missing values.

/// Smoothing factor for a span.
pub fn alpha_for_span(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Compute the unadjusted EMA of a series.
///
/// Output has the same length as `values`. Positions before the first finite
/// input are `NaN`. A missing input after the seed yields `NaN` at that
/// position and leaves the running average untouched.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if span == 0 {
        return result;
    }

    let alpha = alpha_for_span(span);
    let mut prev: Option<f64> = None;

    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        // prev + alpha * (v - prev) keeps a constant input exactly constant
        let ema = match prev {
            None => v,
            Some(p) => p + alpha * (v - p),
        };
        result[i] = ema;
        prev = Some(ema);
    }

    result
}
