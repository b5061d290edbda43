//! Detection configuration: one typed section per criterion plus zone settings.
//!
//! Every field has a default, so a partial TOML file (or an empty one) yields a
//! complete config:
//!
//! ```toml
//! [percent_change]
//! period = 1
//! threshold = 1.0
//!
//! [exp_smoothing]
//! enabled = false
//!
//! [zones]
//! threshold = 0.3
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Lowest accepted zone expansion threshold.
pub const MIN_ZONE_THRESHOLD: f64 = 0.01;
/// Highest accepted zone expansion threshold.
pub const MAX_ZONE_THRESHOLD: f64 = 1.0;

/// Trend component of an exponential-smoothing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMode {
    None,
    #[default]
    #[serde(alias = "add")]
    Additive,
    #[serde(alias = "mul")]
    Multiplicative,
}

/// Seasonal component of an exponential-smoothing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalMode {
    None,
    #[default]
    #[serde(alias = "add")]
    Additive,
    #[serde(alias = "mul")]
    Multiplicative,
}

/// Classical decomposition model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionModel {
    #[default]
    #[serde(alias = "add")]
    Additive,
    #[serde(alias = "mul")]
    Multiplicative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentChangeConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Number of quarters to compare across.
    #[serde(default = "default_pct_change_period")]
    pub period: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_macd_fast")]
    pub fast_period: usize,
    #[serde(default = "default_macd_slow")]
    pub slow_period: usize,
    #[serde(default = "default_macd_signal")]
    pub signal_period: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpSmoothingConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub trend: TrendMode,
    #[serde(default)]
    pub seasonal: SeasonalMode,
    /// Quarters per seasonal cycle; ignored when `seasonal` is `none`.
    #[serde(default = "default_season_length")]
    pub seasonal_period: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Quarters to forecast past the end of the series (0 disables).
    #[serde(default = "default_forecast_periods")]
    pub forecast_periods: usize,
    /// Parameter-search budget, in simplex iterations per smoothing parameter.
    #[serde(default = "default_search_iterations")]
    pub max_iterations_per_dim: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalDecompositionConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub model: DecompositionModel,
    #[serde(default = "default_season_length")]
    pub period: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Minimum z-scored smoothed derivative for a neighbour to join a zone.
    #[serde(default = "default_zone_threshold")]
    pub threshold: f64,
}

/// Complete per-request detection configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub percent_change: PercentChangeConfig,
    #[serde(default)]
    pub macd: MacdConfig,
    #[serde(default)]
    pub exp_smoothing: ExpSmoothingConfig,
    #[serde(default)]
    pub seasonal_decomposition: SeasonalDecompositionConfig,
    #[serde(default)]
    pub zones: ZoneConfig,
}

fn default_enabled() -> bool {
    true
}
fn default_threshold() -> f64 {
    2.0
}
fn default_pct_change_period() -> usize {
    4
}
fn default_macd_fast() -> usize {
    4
}
fn default_macd_slow() -> usize {
    8
}
fn default_macd_signal() -> usize {
    3
}
fn default_season_length() -> usize {
    4
}
fn default_forecast_periods() -> usize {
    4
}
fn default_search_iterations() -> usize {
    1000
}
fn default_zone_threshold() -> f64 {
    0.1
}

impl Default for PercentChangeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            period: default_pct_change_period(),
            threshold: default_threshold(),
        }
    }
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            fast_period: default_macd_fast(),
            slow_period: default_macd_slow(),
            signal_period: default_macd_signal(),
            threshold: default_threshold(),
        }
    }
}

impl Default for ExpSmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            trend: TrendMode::default(),
            seasonal: SeasonalMode::default(),
            seasonal_period: default_season_length(),
            threshold: default_threshold(),
            forecast_periods: default_forecast_periods(),
            max_iterations_per_dim: default_search_iterations(),
        }
    }
}

impl Default for SeasonalDecompositionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            model: DecompositionModel::default(),
            period: default_season_length(),
            threshold: default_threshold(),
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            threshold: default_zone_threshold(),
        }
    }
}

impl DetectionConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Config with every criterion disabled. Useful as a base for enabling a
    /// single criterion.
    pub fn all_disabled() -> Self {
        let mut config = Self::default();
        config.percent_change.enabled = false;
        config.macd.enabled = false;
        config.exp_smoothing.enabled = false;
        config.seasonal_decomposition.enabled = false;
        config
    }

    /// Number of enabled criteria.
    pub fn enabled_count(&self) -> usize {
        [
            self.percent_change.enabled,
            self.macd.enabled,
            self.exp_smoothing.enabled,
            self.seasonal_decomposition.enabled,
        ]
        .iter()
        .filter(|&&e| e)
        .count()
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.percent_change.period < 1 {
            return invalid("percent_change.period must be >= 1".into());
        }
        let macd = &self.macd;
        if macd.fast_period < 1 || macd.slow_period < 1 || macd.signal_period < 1 {
            return invalid("macd periods must be >= 1".into());
        }
        if macd.fast_period >= macd.slow_period {
            tracing::warn!(
                fast = macd.fast_period,
                slow = macd.slow_period,
                "macd fast period is not below the slow period"
            );
        }
        if self.exp_smoothing.seasonal != SeasonalMode::None
            && self.exp_smoothing.seasonal_period < 2
        {
            return invalid("exp_smoothing.seasonal_period must be >= 2".into());
        }
        if self.exp_smoothing.max_iterations_per_dim < 1 {
            return invalid("exp_smoothing.max_iterations_per_dim must be >= 1".into());
        }
        if self.seasonal_decomposition.period < 2 {
            return invalid("seasonal_decomposition.period must be >= 2".into());
        }

        for (name, threshold) in [
            ("percent_change.threshold", self.percent_change.threshold),
            ("macd.threshold", self.macd.threshold),
            ("exp_smoothing.threshold", self.exp_smoothing.threshold),
            (
                "seasonal_decomposition.threshold",
                self.seasonal_decomposition.threshold,
            ),
        ] {
            if !threshold.is_finite() {
                return invalid(format!("{name} must be finite"));
            }
        }

        let zone = self.zones.threshold;
        if !(MIN_ZONE_THRESHOLD..=MAX_ZONE_THRESHOLD).contains(&zone) {
            return invalid(format!(
                "zones.threshold must be within [{MIN_ZONE_THRESHOLD}, {MAX_ZONE_THRESHOLD}], got {zone}"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = DetectionConfig::default();
        assert_eq!(c.percent_change.period, 4);
        assert_eq!(c.percent_change.threshold, 2.0);
        assert_eq!(
            (c.macd.fast_period, c.macd.slow_period, c.macd.signal_period),
            (4, 8, 3)
        );
        assert_eq!(c.exp_smoothing.trend, TrendMode::Additive);
        assert_eq!(c.exp_smoothing.seasonal, SeasonalMode::Additive);
        assert_eq!(c.exp_smoothing.seasonal_period, 4);
        assert_eq!(c.seasonal_decomposition.model, DecompositionModel::Additive);
        assert_eq!(c.seasonal_decomposition.period, 4);
        assert_eq!(c.zones.threshold, 0.1);
        assert_eq!(c.enabled_count(), 4);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        let c = DetectionConfig::from_toml("").unwrap();
        assert_eq!(c, DetectionConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let c = DetectionConfig::from_toml(
            r#"
            [percent_change]
            period = 1
            threshold = 1.0

            [exp_smoothing]
            trend = "mul"
            seasonal = "none"

            [seasonal_decomposition]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(c.percent_change.period, 1);
        assert!(c.percent_change.enabled);
        assert_eq!(c.exp_smoothing.trend, TrendMode::Multiplicative);
        assert_eq!(c.exp_smoothing.seasonal, SeasonalMode::None);
        assert!(!c.seasonal_decomposition.enabled);
        assert_eq!(c.macd, MacdConfig::default());
        assert_eq!(c.enabled_count(), 3);
    }

    #[test]
    fn toml_roundtrip() {
        let mut c = DetectionConfig::default();
        c.zones.threshold = 0.35;
        c.seasonal_decomposition.model = DecompositionModel::Multiplicative;
        let text = c.to_toml().unwrap();
        let back = DetectionConfig::from_toml(&text).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn zone_threshold_out_of_range_is_rejected() {
        let err = DetectionConfig::from_toml("[zones]\nthreshold = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = DetectionConfig::from_toml("[zones]\nthreshold = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_periods_are_rejected() {
        let mut c = DetectionConfig::default();
        c.percent_change.period = 0;
        assert!(c.validate().is_err());

        let mut c = DetectionConfig::default();
        c.seasonal_decomposition.period = 1;
        assert!(c.validate().is_err());

        let mut c = DetectionConfig::default();
        c.exp_smoothing.seasonal_period = 1;
        assert!(c.validate().is_err());
        c.exp_smoothing.seasonal = SeasonalMode::None;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_search_budget_is_rejected() {
        let err = DetectionConfig::from_toml("[exp_smoothing]\nmax_iterations_per_dim = 0").unwrap_err();
        assert!(err.to_string().contains("max_iterations_per_dim"));
        let c = DetectionConfig::from_toml("[exp_smoothing]\nmax_iterations_per_dim = 5").unwrap();
        assert_eq!(c.exp_smoothing.max_iterations_per_dim, 5);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = DetectionConfig::from_toml("[exp_smoothing]\ntrend = \"quadratic\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn all_disabled_has_no_criteria() {
        assert_eq!(DetectionConfig::all_disabled().enabled_count(), 0);
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detect.toml");
        std::fs::write(&path, "[macd]\nfast_period = 3\nslow_period = 6").unwrap();
        let c = DetectionConfig::from_file(&path).unwrap();
        assert_eq!(c.macd.fast_period, 3);
        assert_eq!(c.macd.slow_period, 6);
    }
}
