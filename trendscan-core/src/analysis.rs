//! Single-request analysis: criteria, thresholds, consensus, zones.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::DetectionConfig;
use crate::criteria::{build_criteria, Criterion, CriterionKind, Forecast};
use crate::detection::{aggregate, localize_trend_zones, threshold_signal, ConsensusOutcome, ZoneOutcome};
use crate::domain::{Quarter, TimeSeries};
use crate::error::CriterionError;

/// Outcome of one criterion for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CriterionOutcome {
    Evaluated {
        /// Z-scored derived signal (`null` where undefined).
        zscores: Vec<f64>,
        activated: Vec<bool>,
        activated_count: usize,
    },
    Failed {
        error: CriterionError,
    },
}

impl CriterionOutcome {
    pub fn activation(&self) -> Option<&[bool]> {
        match self {
            CriterionOutcome::Evaluated { activated, .. } => Some(activated),
            CriterionOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&CriterionError> {
        match self {
            CriterionOutcome::Evaluated { .. } => None,
            CriterionOutcome::Failed { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionReport {
    pub kind: CriterionKind,
    pub name: String,
    pub threshold: f64,
    pub outcome: CriterionOutcome,
}

impl CriterionReport {
    pub fn is_failed(&self) -> bool {
        self.outcome.error().is_some()
    }

    /// Whether this criterion voted for the quarter at `position`.
    pub fn voted_at(&self, position: usize) -> bool {
        self.outcome
            .activation()
            .and_then(|a| a.get(position).copied())
            .unwrap_or(false)
    }
}

/// Everything one analysis produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub quarters: Vec<Quarter>,
    pub reports: Vec<CriterionReport>,
    pub consensus: ConsensusOutcome,
    pub zones: ZoneOutcome,
    /// Exponential-smoothing forecast, when that criterion produced one.
    pub forecast: Option<Forecast>,
    pub zone_threshold: f64,
}

impl TrendAnalysis {
    pub fn failed_criteria(&self) -> impl Iterator<Item = &CriterionReport> {
        self.reports.iter().filter(|r| r.is_failed())
    }

    pub fn consensus_quarters(&self) -> &[Quarter] {
        self.consensus.quarters()
    }

    pub fn trendy_quarters(&self) -> &[Quarter] {
        &self.zones.trendy_quarters
    }

    pub fn is_trendy(&self, quarter: Quarter) -> bool {
        self.zones.trendy_quarters.binary_search(&quarter).is_ok()
    }
}

/// Derive, z-score and threshold one criterion. Failures are captured in the
/// report. The second element is the criterion's forecast, if any, which is
/// kept even when thresholding fails.
pub fn evaluate_criterion(criterion: &dyn Criterion, series: &TimeSeries) -> (CriterionReport, Option<Forecast>) {
    let (outcome, forecast) = match criterion.derive(series) {
        Ok(signal) => {
            let outcome = match threshold_signal(&signal.values, criterion.threshold()) {
                Ok(activation) => {
                    let activated_count = activation.activated_count();
                    CriterionOutcome::Evaluated {
                        zscores: activation.zscores,
                        activated: activation.activated,
                        activated_count,
                    }
                }
                Err(error) => CriterionOutcome::Failed { error },
            };
            (outcome, signal.forecast)
        }
        Err(error) => (CriterionOutcome::Failed { error }, None),
    };

    match &outcome {
        CriterionOutcome::Evaluated { activated_count, .. } => {
            debug!(criterion = criterion.name(), activated = activated_count, "criterion evaluated");
        }
        CriterionOutcome::Failed { error } => {
            warn!(criterion = criterion.name(), %error, "criterion failed; excluded from voting");
        }
    }

    let report = CriterionReport {
        kind: criterion.kind(),
        name: criterion.name().to_string(),
        threshold: criterion.threshold(),
        outcome,
    };
    (report, forecast)
}

/// Run the whole detection pipeline on one series.
///
/// Every enabled criterion counts toward the majority denominator, including
/// criteria that fail on this series.
pub fn analyze_trends(series: &TimeSeries, config: &DetectionConfig) -> TrendAnalysis {
    let criteria = build_criteria(config);
    let active_criteria = criteria.len();

    let mut reports = Vec::with_capacity(active_criteria);
    let mut forecast = None;
    for criterion in &criteria {
        let (report, criterion_forecast) = evaluate_criterion(criterion.as_ref(), series);
        if criterion_forecast.is_some() {
            forecast = criterion_forecast;
        }
        reports.push(report);
    }

    let activations: Vec<&[bool]> = reports.iter().filter_map(|r| r.outcome.activation()).collect();
    let consensus = aggregate(series.quarters(), active_criteria, &activations);

    let zones = localize_trend_zones(series, consensus.points(), config.zones.threshold);

    debug!(
        quarters = series.len(),
        active_criteria,
        consensus_points = consensus.points().len(),
        zones = zones.zones.len(),
        "trend analysis complete"
    );

    TrendAnalysis {
        quarters: series.quarters().to_vec(),
        reports,
        consensus,
        zones,
        forecast,
        zone_threshold: config.zones.threshold,
    }
}
