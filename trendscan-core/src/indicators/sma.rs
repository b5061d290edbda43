//! Moving averages over raw `f64` series.
//!
//! - `rolling_mean`: trailing window with a minimum observation count; missing
//!   values inside the window are skipped.
//! - `centered_moving_average`: two-sided filter used by classical
//!   decomposition; `NaN` where the window does not fit.

/// Trailing rolling mean over `window` positions.
///
/// A position gets a value when its window holds at least `min_periods`
/// finite observations; missing values do not count and are skipped.
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 {
        return result;
    }
    let min_periods = min_periods.max(1);

    for i in 0..n {
        let start = (i + 1).saturating_sub(window);
        let (sum, count) = values[start..=i]
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        if count >= min_periods {
            result[i] = sum / count as f64;
        }
    }

    result
}

/// Centered moving average of length `period`.
///
/// Odd periods use equal weights over `period` positions. Even periods use a
/// `period + 1` filter with half weights at both ends, so the average stays
/// centered. The first and last `period / 2` positions are `NaN`, as is any
/// position whose window contains a missing value.
pub fn centered_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    let half = period / 2;
    if n < 2 * half + 1 {
        return result;
    }

    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0; period + 1];
        w[0] = 0.5;
        w[period] = 0.5;
        w.iter().map(|x| x / period as f64).collect()
    } else {
        vec![1.0 / period as f64; period]
    };

    for i in half..(n - half) {
        let window = &values[(i - half)..=(i + half)];
        if window.iter().any(|v| !v.is_finite()) {
            continue;
        }
        result[i] = window.iter().zip(&weights).map(|(v, w)| v * w).sum();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rolling_mean_min_periods_1_starts_immediately() {
        let result = rolling_mean(&[2.0, 4.0, 6.0, 8.0, 10.0], 4, 1);
        assert_approx(result[0], 2.0, DEFAULT_EPSILON);
        assert_approx(result[1], 3.0, DEFAULT_EPSILON);
        assert_approx(result[2], 4.0, DEFAULT_EPSILON);
        assert_approx(result[3], 5.0, DEFAULT_EPSILON);
        // mean(4,6,8,10)
        assert_approx(result[4], 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_skips_missing() {
        let result = rolling_mean(&[f64::NAN, 2.0, f64::NAN, 4.0], 2, 1);
        assert!(result[0].is_nan());
        assert_approx(result[1], 2.0, DEFAULT_EPSILON);
        assert_approx(result[2], 2.0, DEFAULT_EPSILON);
        assert_approx(result[3], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_full_window_required() {
        let result = rolling_mean(&[1.0, 2.0, 3.0], 3, 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn centered_even_period_uses_half_weights() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let result = centered_moving_average(&values, 4);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // (0.5*1 + 2 + 3 + 4 + 0.5*5) / 4 = 3.0
        assert_approx(result[2], 3.0, DEFAULT_EPSILON);
        assert_approx(result[5], 6.0, DEFAULT_EPSILON);
        assert!(result[6].is_nan());
        assert!(result[7].is_nan());
    }

    #[test]
    fn centered_odd_period() {
        let result = centered_moving_average(&[3.0, 6.0, 9.0, 12.0], 3);
        assert!(result[0].is_nan());
        assert_approx(result[1], 6.0, DEFAULT_EPSILON);
        assert_approx(result[2], 9.0, DEFAULT_EPSILON);
        assert!(result[3].is_nan());
    }

    #[test]
    fn centered_too_short_is_all_nan() {
        assert!(centered_moving_average(&[1.0, 2.0, 3.0, 4.0], 4)
            .iter()
            .all(|v| v.is_nan()));
    }
}
