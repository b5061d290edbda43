//! MACD histogram criterion.
//!
//! MACD = EMA(fast) - EMA(slow)
//! Signal = EMA(MACD, signal_period)
//! Histogram = MACD - Signal
//!
//! All EMAs are seeded with the first observation, so the histogram is defined
//! from the first quarter on.

use crate::config::MacdConfig;
use crate::domain::TimeSeries;
use crate::error::CriterionError;
use crate::indicators::ema_of_series;

use super::{Criterion, CriterionKind, DerivedSignal};

/// The three MACD lines, each aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub threshold: f64,
    name: String,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize, threshold: f64) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
            threshold,
            name: format!("macd_{fast_period}_{slow_period}_{signal_period}"),
        }
    }

    pub fn from_config(config: &MacdConfig) -> Self {
        Self::new(
            config.fast_period,
            config.slow_period,
            config.signal_period,
            config.threshold,
        )
    }

    /// Compute all three lines.
    pub fn lines(&self, values: &[f64]) -> Result<MacdLines, CriterionError> {
        if self.fast_period == 0 || self.slow_period == 0 || self.signal_period == 0 {
            return Err(CriterionError::invalid_parameter(
                "MACD periods must be >= 1",
            ));
        }

        let fast = ema_of_series(values, self.fast_period);
        let slow = ema_of_series(values, self.slow_period);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_of_series(&macd, self.signal_period);
        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        Ok(MacdLines {
            macd,
            signal,
            histogram,
        })
    }
}

impl Criterion for Macd {
    fn kind(&self) -> CriterionKind {
        CriterionKind::Macd
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn derive(&self, series: &TimeSeries) -> Result<DerivedSignal, CriterionError> {
        let lines = self.lines(series.values())?;
        Ok(DerivedSignal::new(lines.histogram))
    }
}
