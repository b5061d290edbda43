//! Series primitives shared by the criteria and the zone localizer.
//!
//! All functions take a raw `f64` slice and return a vector of the same
//! length, with `NaN` where a value is undefined (warmup, boundaries, missing
//! inputs).

pub mod ema;
pub mod roc;
pub mod sma;

pub use ema::{alpha_for_span, ema_of_series};
pub use roc::{diff, pct_change};
pub use sma::{centered_moving_average, rolling_mean};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
