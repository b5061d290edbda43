//! Criterion trait, derived signals and the criterion factory.
//!
//! A criterion is a pure function: quarterly series in, derived numeric series
//! out. The thresholder turns the derived series into an activation map, and
//! the consensus aggregator counts activations across criteria.
//!
//! Every derived series has exactly the length of the input series, with
//! `NaN` where the criterion is undefined (warmup, decomposition boundaries).

pub mod exp_smoothing;
pub mod macd;
pub mod percent_change;
pub mod seasonal_decomposition;

pub use exp_smoothing::{ExpSmoothing, HoltWintersFit};
pub use macd::{Macd, MacdLines};
pub use percent_change::PercentChange;
pub use seasonal_decomposition::{Decomposition, SeasonalDecomposition};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DetectionConfig;
use crate::domain::{Quarter, TimeSeries};
use crate::error::CriterionError;

/// Residuals smaller than this fraction of the mean absolute observation are
/// floating-point noise and are snapped to zero.
pub const RESIDUAL_NOISE_FLOOR: f64 = 1e-9;

/// The four criterion families, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    PercentChange,
    Macd,
    ExpSmoothing,
    SeasonalDecomposition,
}

impl CriterionKind {
    pub const ALL: [CriterionKind; 4] = [
        CriterionKind::PercentChange,
        CriterionKind::Macd,
        CriterionKind::ExpSmoothing,
        CriterionKind::SeasonalDecomposition,
    ];

    /// Short column label used in vote tables.
    pub fn label(&self) -> &'static str {
        match self {
            CriterionKind::PercentChange => "pct_change",
            CriterionKind::Macd => "macd_hist",
            CriterionKind::ExpSmoothing => "exp_smooth",
            CriterionKind::SeasonalDecomposition => "seasonal",
        }
    }
}

impl fmt::Display for CriterionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Future values extrapolated from a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub quarters: Vec<Quarter>,
    pub values: Vec<f64>,
}

/// A criterion's output series, aligned with the input series.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSignal {
    pub values: Vec<f64>,
    /// Side output of model-based criteria; never used for voting.
    pub forecast: Option<Forecast>,
}

impl DerivedSignal {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            forecast: None,
        }
    }

    pub fn with_forecast(mut self, forecast: Option<Forecast>) -> Self {
        self.forecast = forecast;
        self
    }

    /// Number of defined (finite) entries.
    pub fn defined_len(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }
}

/// Trait for trend criteria.
///
/// Implementations must return a signal of the same length as the input and
/// must not keep state between calls.
pub trait Criterion: Send + Sync {
    fn kind(&self) -> CriterionKind;

    /// Human-readable name including parameters (e.g., "pct_change_4").
    fn name(&self) -> &str;

    /// Activation threshold in standard deviations.
    fn threshold(&self) -> f64;

    /// Compute the derived signal for the whole series.
    fn derive(&self, series: &TimeSeries) -> Result<DerivedSignal, CriterionError>;
}

/// Build the enabled criteria, in `CriterionKind::ALL` order.
pub fn build_criteria(config: &DetectionConfig) -> Vec<Box<dyn Criterion>> {
    let mut criteria: Vec<Box<dyn Criterion>> = Vec::with_capacity(4);

    if config.percent_change.enabled {
        criteria.push(Box::new(PercentChange::from_config(&config.percent_change)));
    }
    if config.macd.enabled {
        criteria.push(Box::new(Macd::from_config(&config.macd)));
    }
    if config.exp_smoothing.enabled {
        criteria.push(Box::new(ExpSmoothing::from_config(&config.exp_smoothing)));
    }
    if config.seasonal_decomposition.enabled {
        criteria.push(Box::new(SeasonalDecomposition::from_config(
            &config.seasonal_decomposition,
        )));
    }

    criteria
}

/// Zero out residuals that are rounding noise relative to the series scale.
pub(crate) fn snap_noise(residuals: &mut [f64], scale: f64) {
    let floor = RESIDUAL_NOISE_FLOOR * scale;
    for r in residuals.iter_mut() {
        if r.is_finite() && r.abs() <= floor {
            *r = 0.0;
        }
    }
}
