//! Trendscan Core: hot-trend detection on quarterly n-gram frequency series.
//!
//! This crate contains the detection pipeline:
//! - Domain types (quarter labels, quarterly series)
//! - Series primitives (EMA, rolling and centered means, differences)
//! - Four trend criteria (percent change, MACD, Holt-Winters, classical decomposition)
//! - Z-score thresholding and majority consensus
//! - Trend-zone localization along a smoothed derivative
//! - Typed configuration and cache fingerprints
//!
//! Everything here is synchronous and stateless between calls.

pub mod analysis;
pub mod config;
pub mod criteria;
pub mod detection;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod stats;

pub use analysis::{analyze_trends, evaluate_criterion, CriterionOutcome, CriterionReport, TrendAnalysis};
pub use config::DetectionConfig;
pub use domain::{Quarter, SeriesError, TimeSeries};
pub use error::{ConfigError, CriterionError};
pub use fingerprint::AnalysisFingerprint;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a batch worker touches is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Quarter>();
        require_sync::<domain::Quarter>();
        require_send::<domain::TimeSeries>();
        require_sync::<domain::TimeSeries>();

        // Configuration
        require_send::<config::DetectionConfig>();
        require_sync::<config::DetectionConfig>();

        // Results
        require_send::<analysis::TrendAnalysis>();
        require_sync::<analysis::TrendAnalysis>();
        require_send::<detection::ConsensusOutcome>();
        require_sync::<detection::ConsensusOutcome>();
        require_send::<detection::ZoneOutcome>();
        require_sync::<detection::ZoneOutcome>();
        require_send::<fingerprint::AnalysisFingerprint>();
        require_sync::<fingerprint::AnalysisFingerprint>();

        // Criterion trait objects
        require_send::<Box<dyn criteria::Criterion>>();
        require_sync::<Box<dyn criteria::Criterion>>();
    }

    /// Architecture contract: criteria see only the series.
    ///
    /// `derive()` takes `&TimeSeries` and nothing else, so a criterion cannot
    /// read another criterion's output or any shared state.
    #[test]
    fn criterion_trait_takes_only_the_series() {
        fn _check_trait_object_builds(
            criterion: &dyn criteria::Criterion,
            series: &domain::TimeSeries,
        ) -> Result<criteria::DerivedSignal, error::CriterionError> {
            criterion.derive(series)
        }
    }
}
