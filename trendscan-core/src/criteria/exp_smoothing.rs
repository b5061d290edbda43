//! Holt-Winters exponential-smoothing criterion.
//!
//! Fits level, optional trend and optional seasonal components by least
//! squares on one-step-ahead errors; the derived signal is
//! `observed - fitted`.
//!
//! Recursions (additive shown; multiplicative components replace `+`/`-` with
//! `*`/`/`):
//!
//! ```text
//! yhat[t] = l[t-1] + b[t-1] + s[t-m]
//! l[t]    = alpha * (y[t] - s[t-m]) + (1 - alpha) * (l[t-1] + b[t-1])
//! b[t]    = beta  * (l[t] - l[t-1]) + (1 - beta)  * b[t-1]
//! s[t]    = gamma * (y[t] - l[t-1] - b[t-1]) + (1 - gamma) * s[t-m]
//! ```
//!
//! Smoothing parameters live in `[0, 1]` and are searched through the map
//! `p = (1 - cos u) / 2`, which keeps boundary optima stationary in `u`.

use tracing::debug;

use crate::config::{ExpSmoothingConfig, SeasonalMode, TrendMode};
use crate::domain::TimeSeries;
use crate::error::CriterionError;
use crate::stats::{minimize, NelderMeadOptions};

use super::{snap_noise, Criterion, CriterionKind, DerivedSignal, Forecast};

const START_ALPHA: f64 = 0.5;
const START_BETA: f64 = 0.1;
const START_GAMMA: f64 = 0.1;

/// Result of a Holt-Winters fit. All per-quarter vectors are aligned with the
/// input series and hold the state after observing that quarter.
#[derive(Debug, Clone, PartialEq)]
pub struct HoltWintersFit {
    pub alpha: f64,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
    pub fitted: Vec<f64>,
    pub level: Vec<f64>,
    pub trend: Option<Vec<f64>>,
    pub season: Option<Vec<f64>>,
    pub residuals: Vec<f64>,
    /// Sum of squared one-step-ahead errors on the original scale.
    pub sse: f64,
    /// Simplex iterations spent on the parameter search.
    pub iterations: usize,
    pub forecast: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ExpSmoothing {
    pub trend: TrendMode,
    pub seasonal: SeasonalMode,
    pub seasonal_period: usize,
    pub threshold: f64,
    pub forecast_periods: usize,
    /// Simplex settings for the parameter search.
    pub search: NelderMeadOptions,
    name: String,
}

#[derive(Debug, Clone)]
struct InitialStates {
    level: f64,
    trend: f64,
    season: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Smoothing {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

#[derive(Debug, Default)]
struct FilterRun {
    fitted: Vec<f64>,
    level: Vec<f64>,
    trend: Vec<f64>,
    season: Vec<f64>,
    final_level: f64,
    final_trend: f64,
    /// Latest seasonal figure per phase, indexed by `t % m`.
    final_season: Vec<f64>,
    sse: f64,
}

impl ExpSmoothing {
    pub fn new(trend: TrendMode, seasonal: SeasonalMode, seasonal_period: usize, threshold: f64) -> Self {
        let name = format!(
            "exp_smoothing_{}_{}_{}",
            mode_tag(trend),
            mode_tag_seasonal(seasonal),
            seasonal_period
        );
        Self {
            trend,
            seasonal,
            seasonal_period,
            threshold,
            forecast_periods: 4,
            search: NelderMeadOptions::default(),
            name,
        }
    }

    pub fn with_forecast_periods(mut self, periods: usize) -> Self {
        self.forecast_periods = periods;
        self
    }

    pub fn with_search(mut self, search: NelderMeadOptions) -> Self {
        self.search = search;
        self
    }

    pub fn from_config(config: &ExpSmoothingConfig) -> Self {
        Self::new(
            config.trend,
            config.seasonal,
            config.seasonal_period,
            config.threshold,
        )
        .with_forecast_periods(config.forecast_periods)
        .with_search(NelderMeadOptions {
            max_iterations_per_dim: config.max_iterations_per_dim,
            ..NelderMeadOptions::default()
        })
    }

    fn has_trend(&self) -> bool {
        self.trend != TrendMode::None
    }

    fn has_season(&self) -> bool {
        self.seasonal != SeasonalMode::None
    }

    /// Shortest series the model can be initialized from.
    pub fn min_len(&self) -> usize {
        if self.has_season() {
            2 * self.seasonal_period
        } else if self.has_trend() {
            3
        } else {
            2
        }
    }

    fn check_input(&self, values: &[f64]) -> Result<(), CriterionError> {
        if self.has_season() && self.seasonal_period < 2 {
            return Err(CriterionError::invalid_parameter(
                "seasonal period must be >= 2",
            ));
        }
        if values.len() < self.min_len() {
            return Err(CriterionError::InsufficientData {
                required: self.min_len(),
                actual: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CriterionError::MissingValues);
        }
        let multiplicative =
            self.trend == TrendMode::Multiplicative || self.seasonal == SeasonalMode::Multiplicative;
        if multiplicative && values.iter().any(|&v| v <= 0.0) {
            return Err(CriterionError::NonPositiveData);
        }
        Ok(())
    }

    /// Heuristic initial states, chosen so the first one-step prediction
    /// reproduces the first observation.
    fn initial_states(&self, y: &[f64]) -> InitialStates {
        let m = self.seasonal_period;

        if self.has_season() {
            let first = mean(&y[..m]);
            let second = mean(&y[m..2 * m]);
            let trend = match self.trend {
                TrendMode::None => 0.0,
                TrendMode::Additive => (second - first) / m as f64,
                TrendMode::Multiplicative => (second / first).powf(1.0 / m as f64),
            };
            let season = y[..m]
                .iter()
                .map(|&v| match self.seasonal {
                    SeasonalMode::Multiplicative => v / first,
                    _ => v - first,
                })
                .collect();
            InitialStates {
                level: step_back(self.trend, first, trend),
                trend,
                season,
            }
        } else {
            let trend = match self.trend {
                TrendMode::None => 0.0,
                TrendMode::Additive => y[1] - y[0],
                TrendMode::Multiplicative => y[1] / y[0],
            };
            InitialStates {
                level: step_back(self.trend, y[0], trend),
                trend,
                season: Vec::new(),
            }
        }
    }

    /// Run the recursions once. Returns `None` when a state leaves the valid
    /// domain (non-finite, or a non-positive level under multiplicative trend).
    fn filter(&self, y: &[f64], init: &InitialStates, p: Smoothing, keep_trace: bool) -> Option<FilterRun> {
        let m = init.season.len();
        let mut level = init.level;
        let mut trend = init.trend;
        let mut season = init.season.clone();

        let mut run = FilterRun::default();
        if keep_trace {
            run.fitted.reserve(y.len());
            run.level.reserve(y.len());
            run.trend.reserve(y.len());
            run.season.reserve(y.len());
        }

        for (t, &obs) in y.iter().enumerate() {
            let base = project(self.trend, level, trend, 1.0);
            let s_prev = if m > 0 { season[t % m] } else { 0.0 };
            let fitted = reseason(self.seasonal, base, s_prev);

            let new_level = p.alpha * deseason(self.seasonal, obs, s_prev) + (1.0 - p.alpha) * base;
            let new_trend = match self.trend {
                TrendMode::None => trend,
                TrendMode::Additive => p.beta * (new_level - level) + (1.0 - p.beta) * trend,
                TrendMode::Multiplicative => p.beta * (new_level / level) + (1.0 - p.beta) * trend,
            };
            let new_season = match self.seasonal {
                SeasonalMode::None => s_prev,
                SeasonalMode::Additive => p.gamma * (obs - base) + (1.0 - p.gamma) * s_prev,
                SeasonalMode::Multiplicative => p.gamma * (obs / base) + (1.0 - p.gamma) * s_prev,
            };

            if !(fitted.is_finite()
                && new_level.is_finite()
                && new_trend.is_finite()
                && new_season.is_finite())
            {
                return None;
            }
            if self.trend == TrendMode::Multiplicative && new_level <= 0.0 {
                return None;
            }

            let err = obs - fitted;
            run.sse += err * err;

            level = new_level;
            trend = new_trend;
            if m > 0 {
                season[t % m] = new_season;
            }

            if keep_trace {
                run.fitted.push(fitted);
                run.level.push(level);
                run.trend.push(trend);
                run.season.push(new_season);
            }
        }

        run.final_level = level;
        run.final_trend = trend;
        run.final_season = season;
        Some(run)
    }

    fn pack(&self, p: Smoothing) -> Vec<f64> {
        let mut u = vec![from_unit(p.alpha)];
        if self.has_trend() {
            u.push(from_unit(p.beta));
        }
        if self.has_season() {
            u.push(from_unit(p.gamma));
        }
        u
    }

    fn unpack(&self, u: &[f64]) -> Smoothing {
        let mut it = u.iter().map(|&x| to_unit(x));
        let alpha = it.next().unwrap_or(START_ALPHA);
        let beta = if self.has_trend() {
            it.next().unwrap_or(START_BETA)
        } else {
            0.0
        };
        let gamma = if self.has_season() {
            it.next().unwrap_or(START_GAMMA)
        } else {
            0.0
        };
        Smoothing { alpha, beta, gamma }
    }

    /// Fit the model to the whole series and extrapolate `forecast_periods`
    /// quarters past its end.
    pub fn fit(&self, values: &[f64]) -> Result<HoltWintersFit, CriterionError> {
        self.check_input(values)?;

        // Search on a unit-scale copy so the tolerances do not depend on the
        // magnitude of the frequencies.
        let scale = mean_abs(values);
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let scaled: Vec<f64> = values.iter().map(|v| v / scale).collect();
        let scaled_init = self.initial_states(&scaled);

        let objective = |u: &[f64]| {
            self.filter(&scaled, &scaled_init, self.unpack(u), false)
                .map_or(f64::INFINITY, |run| run.sse)
        };
        let start = self.pack(Smoothing {
            alpha: START_ALPHA,
            beta: START_BETA,
            gamma: START_GAMMA,
        });
        let result = minimize(objective, &start, &self.search);

        if !result.fx.is_finite() {
            return Err(CriterionError::fit_divergence(
                "no parameters keep the smoothing recursions finite",
            ));
        }
        if !result.converged {
            return Err(CriterionError::fit_divergence(format!(
                "parameter search did not converge after {} iterations",
                result.iterations
            )));
        }

        let params = self.unpack(&result.x);
        let init = self.initial_states(values);
        let run = self.filter(values, &init, params, true).ok_or_else(|| {
            CriterionError::fit_divergence("smoothing recursions diverged at the optimum")
        })?;

        let mut residuals: Vec<f64> = values.iter().zip(&run.fitted).map(|(y, f)| y - f).collect();
        snap_noise(&mut residuals, scale);

        let m = run.final_season.len();
        let n = values.len();
        let forecast = (1..=self.forecast_periods)
            .map(|h| {
                let base = project(self.trend, run.final_level, run.final_trend, h as f64);
                let s = if m > 0 { run.final_season[(n + h - 1) % m] } else { 0.0 };
                reseason(self.seasonal, base, s)
            })
            .collect();

        debug!(
            criterion = %self.name,
            alpha = params.alpha,
            beta = params.beta,
            gamma = params.gamma,
            sse = run.sse,
            iterations = result.iterations,
            "holt-winters fit"
        );

        Ok(HoltWintersFit {
            alpha: params.alpha,
            beta: self.has_trend().then_some(params.beta),
            gamma: self.has_season().then_some(params.gamma),
            fitted: run.fitted,
            level: run.level,
            trend: self.has_trend().then_some(run.trend),
            season: self.has_season().then_some(run.season),
            residuals,
            sse: run.sse,
            iterations: result.iterations,
            forecast,
        })
    }
}

impl Criterion for ExpSmoothing {
    fn kind(&self) -> CriterionKind {
        CriterionKind::ExpSmoothing
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn derive(&self, series: &TimeSeries) -> Result<DerivedSignal, CriterionError> {
        let fit = self.fit(series.values())?;
        let forecast = (self.forecast_periods > 0).then(|| Forecast {
            quarters: series.last_quarter().successors(self.forecast_periods),
            values: fit.forecast.clone(),
        });
        Ok(DerivedSignal::new(fit.residuals).with_forecast(forecast))
    }
}

fn mode_tag(mode: TrendMode) -> &'static str {
    match mode {
        TrendMode::None => "none",
        TrendMode::Additive => "add",
        TrendMode::Multiplicative => "mul",
    }
}

fn mode_tag_seasonal(mode: SeasonalMode) -> &'static str {
    match mode {
        SeasonalMode::None => "none",
        SeasonalMode::Additive => "add",
        SeasonalMode::Multiplicative => "mul",
    }
}

/// Level and trend projected `h` steps ahead.
fn project(mode: TrendMode, level: f64, trend: f64, h: f64) -> f64 {
    match mode {
        TrendMode::None => level,
        TrendMode::Additive => level + h * trend,
        TrendMode::Multiplicative => level * trend.powf(h),
    }
}

/// Level one step before `level`, so that projecting it forward lands on `level`.
fn step_back(mode: TrendMode, level: f64, trend: f64) -> f64 {
    match mode {
        TrendMode::None => level,
        TrendMode::Additive => level - trend,
        TrendMode::Multiplicative => level / trend,
    }
}

fn reseason(mode: SeasonalMode, base: f64, s: f64) -> f64 {
    match mode {
        SeasonalMode::None => base,
        SeasonalMode::Additive => base + s,
        SeasonalMode::Multiplicative => base * s,
    }
}

fn deseason(mode: SeasonalMode, obs: f64, s: f64) -> f64 {
    match mode {
        SeasonalMode::None => obs,
        SeasonalMode::Additive => obs - s,
        SeasonalMode::Multiplicative => obs / s,
    }
}

fn to_unit(u: f64) -> f64 {
    (1.0 - u.cos()) / 2.0
}

fn from_unit(p: f64) -> f64 {
    (1.0 - 2.0 * p).clamp(-1.0, 1.0).acos()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_abs(values: &[f64]) -> f64 {
    values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quarter;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::consecutive(Quarter::new(2015, 1).unwrap(), values).unwrap()
    }

    fn default_model() -> ExpSmoothing {
        ExpSmoothing::from_config(&ExpSmoothingConfig::default())
    }

    #[test]
    fn parameter_map_roundtrip() {
        for p in [0.0, 0.1, 0.5, 0.9, 1.0] {
            assert_approx(to_unit(from_unit(p)), p, 1e-12);
        }
    }

    #[test]
    fn constant_series_fits_exactly() {
        let fit = default_model().fit(&[100.0; 12]).unwrap();
        assert!(fit.residuals.iter().all(|&r| r == 0.0));
        assert_eq!(fit.forecast.len(), 4);
        for f in &fit.forecast {
            assert_approx(*f, 100.0, 1e-9);
        }
    }

    #[test]
    fn repeating_pattern_fits_and_forecasts_the_pattern() {
        let pattern = [10.0, 20.0, 30.0, 40.0];
        let values: Vec<f64> = pattern.iter().cycle().take(16).copied().collect();
        let model = ExpSmoothing::new(TrendMode::None, SeasonalMode::Additive, 4, 2.0);
        let fit = model.fit(&values).unwrap();

        assert!(fit.residuals.iter().all(|&r| r == 0.0));
        assert!(fit.beta.is_none());
        for (f, p) in fit.forecast.iter().zip(pattern) {
            assert_approx(*f, p, 1e-9);
        }
    }

    #[test]
    fn forecast_quarters_roll_over_year_end() {
        let pattern = [10.0, 20.0, 30.0, 40.0];
        let values: Vec<f64> = pattern.iter().cycle().take(16).copied().collect();
        let signal = default_model().derive(&series(values)).unwrap();
        let forecast = signal.forecast.unwrap();
        let labels: Vec<String> = forecast.quarters.iter().map(|q| q.to_string()).collect();
        assert_eq!(labels, vec!["2019Q1", "2019Q2", "2019Q3", "2019Q4"]);
        assert_eq!(forecast.values.len(), 4);
    }

    #[test]
    fn zero_forecast_periods_has_no_forecast() {
        let model = default_model().with_forecast_periods(0);
        let signal = model.derive(&series(vec![100.0; 12])).unwrap();
        assert!(signal.forecast.is_none());
    }

    #[test]
    fn spike_has_largest_residual() {
        let pattern = [100.0, 110.0, 120.0, 105.0];
        let mut values: Vec<f64> = pattern.iter().cycle().take(20).copied().collect();
        values[12] += 100.0;
        let model = ExpSmoothing::new(TrendMode::None, SeasonalMode::Additive, 4, 2.0);
        let fit = model.fit(&values).unwrap();

        let (argmax, max) = fit
            .residuals
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |acc, (i, &r)| if r.abs() > acc.1 { (i, r.abs()) } else { acc });
        assert_eq!(argmax, 12);
        assert!(fit.residuals[12] > 50.0, "residual {max}");
    }

    #[test]
    fn linear_trend_without_season_fits_exactly() {
        let values: Vec<f64> = (0..10).map(|i| 50.0 + 5.0 * i as f64).collect();
        let model = ExpSmoothing::new(TrendMode::Additive, SeasonalMode::None, 4, 2.0);
        let fit = model.fit(&values).unwrap();
        for r in &fit.residuals {
            assert_approx(*r, 0.0, 1e-6);
        }
        assert_approx(fit.forecast[0], 100.0, 1e-6);
        assert!(fit.season.is_none());
    }

    #[test]
    fn short_series_is_insufficient() {
        let err = default_model().fit(&[1.0; 7]).unwrap_err();
        assert_eq!(
            err,
            CriterionError::InsufficientData {
                required: 8,
                actual: 7
            }
        );
        let level_only = ExpSmoothing::new(TrendMode::None, SeasonalMode::None, 4, 2.0);
        assert!(level_only.fit(&[1.0, 2.0]).is_ok());
    }

    #[test]
    fn multiplicative_rejects_non_positive() {
        let model = ExpSmoothing::new(TrendMode::Multiplicative, SeasonalMode::None, 4, 2.0);
        let err = model.fit(&[1.0, 2.0, 0.0, 3.0]).unwrap_err();
        assert_eq!(err, CriterionError::NonPositiveData);
    }

    #[test]
    fn missing_values_are_rejected() {
        let mut values = vec![1.0; 12];
        values[0] = f64::NAN;
        assert_eq!(
            default_model().fit(&values).unwrap_err(),
            CriterionError::MissingValues
        );
    }

    #[test]
    fn seasonal_period_below_two_is_invalid() {
        let model = ExpSmoothing::new(TrendMode::Additive, SeasonalMode::Additive, 1, 2.0);
        assert!(matches!(
            model.fit(&[1.0; 12]),
            Err(CriterionError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn multiplicative_season_on_positive_data() {
        let pattern = [80.0, 100.0, 120.0, 100.0];
        let values: Vec<f64> = pattern.iter().cycle().take(16).copied().collect();
        let model = ExpSmoothing::new(TrendMode::None, SeasonalMode::Multiplicative, 4, 2.0);
        let fit = model.fit(&values).unwrap();
        for r in &fit.residuals {
            assert_approx(*r, 0.0, 1e-6);
        }
        assert_approx(fit.forecast[1], 100.0, 1e-6);
        assert_approx(fit.alpha.clamp(0.0, 1.0), fit.alpha, DEFAULT_EPSILON);
    }

    #[test]
    fn exhausted_search_budget_is_fit_divergence() {
        let mut values = vec![100.0; 12];
        values[6] = 200.0;
        let model = default_model().with_search(NelderMeadOptions {
            max_iterations_per_dim: 1,
            ..NelderMeadOptions::default()
        });
        match model.fit(&values) {
            Err(CriterionError::FitDivergence { reason }) => {
                assert!(reason.contains("did not converge"), "{reason}");
            }
            other => panic!("expected FitDivergence, got {other:?}"),
        }
        // the default budget converges on the same series
        assert!(default_model().fit(&values).is_ok());
    }

    #[test]
    fn name_reflects_modes() {
        assert_eq!(default_model().name(), "exp_smoothing_add_add_4");
    }
}
