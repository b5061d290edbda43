//! Trend-zone localization along a smoothed, z-scored derivative.
//!
//! derivative = mean4(diff(mean4(series)))
//! zDeriv     = zscore(derivative)
//!
//! Both moving averages are trailing with a minimum of one observation. Zones
//! grow outward from each consensus point while the neighbouring quarter has
//! `zDeriv >= tau` and no earlier zone has claimed it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::domain::{Quarter, TimeSeries};
use crate::indicators::{diff, rolling_mean};
use crate::stats::zscore;

/// Window of both moving averages in the derivative curve.
pub const DERIVATIVE_WINDOW: usize = 4;

/// A contiguous run of quarters anchored at one consensus point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendZone {
    pub anchor: Quarter,
    /// Chronological; always contains `anchor`.
    pub quarters: Vec<Quarter>,
}

impl TrendZone {
    pub fn start(&self) -> Quarter {
        self.quarters.first().copied().unwrap_or(self.anchor)
    }

    pub fn end(&self) -> Quarter {
        self.quarters.last().copied().unwrap_or(self.anchor)
    }

    pub fn len(&self) -> usize {
        self.quarters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneOutcome {
    pub zones: Vec<TrendZone>,
    /// Every quarter in any zone, sorted and deduplicated.
    pub trendy_quarters: Vec<Quarter>,
    /// The derivative curve had no spread; zones could not grow past their
    /// anchors.
    pub degenerate_derivative: bool,
}

impl ZoneOutcome {
    pub fn empty() -> Self {
        Self {
            zones: Vec::new(),
            trendy_quarters: Vec::new(),
            degenerate_derivative: false,
        }
    }
}

/// Smoothed first derivative of a series, aligned with it.
///
/// Position 0 is always `NaN` (no difference); later positions are `NaN` only
/// when every value in their windows is missing.
pub fn smoothed_derivative(values: &[f64]) -> Vec<f64> {
    let smoothed = rolling_mean(values, DERIVATIVE_WINDOW, 1);
    let slope = diff(&smoothed);
    rolling_mean(&slope, DERIVATIVE_WINDOW, 1)
}

/// Grow one zone per consensus point.
///
/// `consensus_points` are series positions, processed in the given order.
/// Points outside the derivative's domain (positions where it is undefined)
/// and points already claimed by an earlier zone are skipped. Expansion walks
/// the derivative's domain: quarters with an undefined derivative are stepped
/// over, never join a zone, and do not stop its growth.
pub fn localize_trend_zones(series: &TimeSeries, consensus_points: &[usize], tau: f64) -> ZoneOutcome {
    if consensus_points.is_empty() {
        return ZoneOutcome::empty();
    }

    let derivative = smoothed_derivative(series.values());
    let domain: Vec<usize> = derivative
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_finite())
        .map(|(i, _)| i)
        .collect();

    let (z, degenerate_derivative) = match zscore(&derivative) {
        Ok(z) => (z, false),
        Err(_) => (vec![f64::NAN; derivative.len()], true),
    };

    let mut claimed = vec![false; series.len()];
    let open = |pos: usize, claimed: &[bool]| !claimed[pos] && z[pos] >= tau;

    let quarters = series.quarters();
    let mut zones = Vec::new();

    for &cp in consensus_points {
        if cp >= series.len() || claimed[cp] {
            continue;
        }
        let Ok(anchor) = domain.binary_search(&cp) else {
            continue;
        };

        let mut first = anchor;
        while first > 0 && open(domain[first - 1], &claimed) {
            first -= 1;
        }
        let mut last = anchor;
        while last + 1 < domain.len() && open(domain[last + 1], &claimed) {
            last += 1;
        }

        let members = &domain[first..=last];
        for &pos in members {
            claimed[pos] = true;
        }

        let zone = TrendZone {
            anchor: quarters[cp],
            quarters: members.iter().map(|&pos| quarters[pos]).collect(),
        };
        debug!(
            anchor = %zone.anchor,
            start = %zone.start(),
            end = %zone.end(),
            len = zone.len(),
            "trend zone"
        );
        zones.push(zone);
    }

    let trendy_quarters: BTreeSet<Quarter> = zones.iter().flat_map(|z| z.quarters.iter().copied()).collect();

    ZoneOutcome {
        zones,
        trendy_quarters: trendy_quarters.into_iter().collect(),
        degenerate_derivative,
    }
}
