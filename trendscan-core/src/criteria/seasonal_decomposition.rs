//! Classical seasonal-decomposition criterion.
//!
//! trend    = centered moving average over one period
//! seasonal = per-phase mean of the detrended series, centered
//! residual = y - trend - seasonal        (additive)
//!          = y / (trend * seasonal)      (multiplicative)
//!
//! The residual is `NaN` on the `period / 2` boundary quarters at each end,
//! where the centered average is undefined.

use crate::config::{DecompositionModel, SeasonalDecompositionConfig};
use crate::domain::TimeSeries;
use crate::error::CriterionError;
use crate::indicators::centered_moving_average;

use super::{snap_noise, Criterion, CriterionKind, DerivedSignal, RESIDUAL_NOISE_FLOOR};

/// Trend, seasonal and residual components aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    /// One seasonal figure per phase; phase `i` covers positions `i, i + period, ...`.
    pub figures: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct SeasonalDecomposition {
    pub model: DecompositionModel,
    pub period: usize,
    pub threshold: f64,
    name: String,
}

impl SeasonalDecomposition {
    pub fn new(model: DecompositionModel, period: usize, threshold: f64) -> Self {
        let tag = match model {
            DecompositionModel::Additive => "add",
            DecompositionModel::Multiplicative => "mul",
        };
        Self {
            model,
            period,
            threshold,
            name: format!("seasonal_decomposition_{tag}_{period}"),
        }
    }

    pub fn from_config(config: &SeasonalDecompositionConfig) -> Self {
        Self::new(config.model, config.period, config.threshold)
    }

    pub fn decompose(&self, values: &[f64]) -> Result<Decomposition, CriterionError> {
        let period = self.period;
        if period < 2 {
            return Err(CriterionError::invalid_parameter(
                "decomposition period must be >= 2",
            ));
        }
        if values.len() < 2 * period {
            return Err(CriterionError::InsufficientData {
                required: 2 * period,
                actual: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CriterionError::MissingValues);
        }
        let multiplicative = self.model == DecompositionModel::Multiplicative;
        if multiplicative && values.iter().any(|&v| v <= 0.0) {
            return Err(CriterionError::NonPositiveData);
        }

        let trend = centered_moving_average(values, period);
        let detrended: Vec<f64> = values
            .iter()
            .zip(&trend)
            .map(|(y, t)| if multiplicative { y / t } else { y - t })
            .collect();

        let mut figures: Vec<f64> = (0..period)
            .map(|phase| {
                let (sum, count) = detrended
                    .iter()
                    .skip(phase)
                    .step_by(period)
                    .filter(|v| v.is_finite())
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            })
            .collect();

        let center = figures.iter().sum::<f64>() / period as f64;
        for f in figures.iter_mut() {
            if multiplicative {
                *f /= center;
            } else {
                *f -= center;
            }
        }

        let seasonal: Vec<f64> = (0..values.len()).map(|i| figures[i % period]).collect();
        let mut residual: Vec<f64> = values
            .iter()
            .zip(trend.iter().zip(&seasonal))
            .map(|(y, (t, s))| if multiplicative { y / (t * s) } else { y - t - s })
            .collect();

        if multiplicative {
            for r in residual.iter_mut() {
                if r.is_finite() && (*r - 1.0).abs() <= RESIDUAL_NOISE_FLOOR {
                    *r = 1.0;
                }
            }
        } else {
            let scale = values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64;
            snap_noise(&mut residual, scale);
        }

        Ok(Decomposition {
            trend,
            seasonal,
            residual,
            figures,
        })
    }
}

impl Criterion for SeasonalDecomposition {
    fn kind(&self) -> CriterionKind {
        CriterionKind::SeasonalDecomposition
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn derive(&self, series: &TimeSeries) -> Result<DerivedSignal, CriterionError> {
        let decomposition = self.decompose(series.values())?;
        Ok(DerivedSignal::new(decomposition.residual))
    }
}
