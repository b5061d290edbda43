//! Error kinds raised by criteria and configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a criterion produced no activation signal.
///
/// A criterion failure is isolated: it is reported alongside the other
/// criteria's results and contributes zero votes.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CriterionError {
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("model fit did not converge: {reason}")]
    FitDivergence { reason: String },
    #[error("degenerate signal: fewer than two distinct finite values, z-score undefined")]
    DegenerateSignal,
    #[error("multiplicative model requires strictly positive observations")]
    NonPositiveData,
    #[error("series contains missing values")]
    MissingValues,
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}

impl CriterionError {
    pub fn fit_divergence(reason: impl Into<String>) -> Self {
        Self::FitDivergence {
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}

/// Errors from loading or validating a detection config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
