//! Percent-change criterion.
//!
//! signal[t] = (x[t] - x[t-period]) / x[t-period]
//! The first `period` quarters are undefined.

use crate::config::PercentChangeConfig;
use crate::domain::TimeSeries;
use crate::error::CriterionError;
use crate::indicators::pct_change;

use super::{Criterion, CriterionKind, DerivedSignal};

#[derive(Debug, Clone)]
pub struct PercentChange {
    pub period: usize,
    pub threshold: f64,
    name: String,
}

impl PercentChange {
    pub fn new(period: usize, threshold: f64) -> Self {
        Self {
            period,
            threshold,
            name: format!("pct_change_{period}"),
        }
    }

    pub fn from_config(config: &PercentChangeConfig) -> Self {
        Self::new(config.period, config.threshold)
    }
}

impl Criterion for PercentChange {
    fn kind(&self) -> CriterionKind {
        CriterionKind::PercentChange
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn derive(&self, series: &TimeSeries) -> Result<DerivedSignal, CriterionError> {
        if self.period == 0 {
            return Err(CriterionError::invalid_parameter(
                "percent change period must be >= 1",
            ));
        }
        if series.len() <= self.period {
            return Err(CriterionError::InsufficientData {
                required: self.period + 1,
                actual: series.len(),
            });
        }
        Ok(DerivedSignal::new(pct_change(series.values(), self.period)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quarter;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::consecutive(Quarter::new(2015, 1).unwrap(), values).unwrap()
    }

    #[test]
    fn constant_series_is_zero() {
        let signal = PercentChange::new(4, 2.0).derive(&series(vec![100.0; 12])).unwrap();
        assert_eq!(signal.values.len(), 12);
        assert!(signal.values[..4].iter().all(|v| v.is_nan()));
        assert!(signal.values[4..].iter().all(|&v| v == 0.0));
        assert_eq!(signal.defined_len(), 8);
    }

    #[test]
    fn jump_shows_up_at_its_quarter() {
        let mut values = vec![100.0; 12];
        values[6] = 200.0;
        let signal = PercentChange::new(1, 1.0).derive(&series(values)).unwrap();
        assert_approx(signal.values[6], 1.0, DEFAULT_EPSILON);
        assert_approx(signal.values[7], -0.5, DEFAULT_EPSILON);
        assert_approx(signal.values[5], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn too_short_series_is_insufficient() {
        let err = PercentChange::new(4, 2.0).derive(&series(vec![1.0; 4])).unwrap_err();
        assert_eq!(
            err,
            CriterionError::InsufficientData {
                required: 5,
                actual: 4
            }
        );
    }

    #[test]
    fn name_includes_period() {
        assert_eq!(PercentChange::new(4, 2.0).name(), "pct_change_4");
    }
}
