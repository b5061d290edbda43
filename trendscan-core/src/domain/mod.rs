//! Domain types: quarter labels and quarterly time series.

pub mod quarter;
pub mod series;

pub use quarter::Quarter;
pub use series::TimeSeries;

use thiserror::Error;

/// Errors raised while building a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("series is empty")]
    Empty,
    #[error("length mismatch: {quarters} quarters but {values} values")]
    LengthMismatch { quarters: usize, values: usize },
    #[error("quarters not strictly increasing: {previous} followed by {next}")]
    NotIncreasing { previous: Quarter, next: Quarter },
    #[error("duplicate quarter: {0}")]
    DuplicateQuarter(Quarter),
    #[error("invalid quarter label: '{0}'")]
    InvalidQuarter(String),
}
