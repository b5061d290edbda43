//! Statistics helpers: z-score normalization and simplex minimization.

pub mod nelder_mead;
pub mod zscore;

pub use nelder_mead::{minimize, NelderMeadOptions, NelderMeadResult};
pub use zscore::{mean_and_std, zscore, DEGENERATE_RELATIVE_STD};
