//! Quarterly time series: ordered (quarter, value) pairs.
//!
//! Quarters are unique and strictly increasing. Values may be `NaN` (missing),
//! typically at the leading positions of an n-gram that did not exist yet.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Quarter, SeriesError};

/// An immutable quarterly series.
///
/// Deserialization goes through [`TimeSeries::new`], so a decoded series
/// satisfies the same invariants as a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct TimeSeries {
    quarters: Vec<Quarter>,
    values: Vec<f64>,
}

/// Wire shape of a series; missing values travel as `null`.
#[derive(Deserialize)]
struct RawSeries {
    quarters: Vec<Quarter>,
    values: Vec<Option<f64>>,
}

impl TryFrom<RawSeries> for TimeSeries {
    type Error = SeriesError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        let values = raw.values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        Self::new(raw.quarters, values)
    }
}

impl TimeSeries {
    /// Build a series from parallel vectors.
    ///
    /// Rejects empty input, length mismatch and quarters that are not strictly
    /// increasing.
    pub fn new(quarters: Vec<Quarter>, values: Vec<f64>) -> Result<Self, SeriesError> {
        if quarters.is_empty() {
            return Err(SeriesError::Empty);
        }
        if quarters.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                quarters: quarters.len(),
                values: values.len(),
            });
        }
        for pair in quarters.windows(2) {
            if pair[1] <= pair[0] {
                return Err(SeriesError::NotIncreasing {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(Self { quarters, values })
    }

    /// Build a series from ordered (quarter, value) pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Quarter, f64)>) -> Result<Self, SeriesError> {
        let (quarters, values) = pairs.into_iter().unzip();
        Self::new(quarters, values)
    }

    /// Build a series from a label → value map. Labels are parsed and sorted;
    /// `None` values become `NaN`.
    pub fn from_labels<'a>(
        labels: impl IntoIterator<Item = (&'a str, Option<f64>)>,
    ) -> Result<Self, SeriesError> {
        let mut sorted = BTreeMap::new();
        for (label, value) in labels {
            let quarter: Quarter = label.parse()?;
            if sorted.insert(quarter, value.unwrap_or(f64::NAN)).is_some() {
                return Err(SeriesError::DuplicateQuarter(quarter));
            }
        }
        Self::from_pairs(sorted)
    }

    /// Consecutive quarters starting at `start`, one per value.
    pub fn consecutive(start: Quarter, values: Vec<f64>) -> Result<Self, SeriesError> {
        let mut quarters = Vec::with_capacity(values.len());
        if !values.is_empty() {
            quarters.push(start);
            quarters.extend(start.successors(values.len() - 1));
        }
        Self::new(quarters, values)
    }

    pub fn quarters(&self) -> &[Quarter] {
        &self.quarters
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_quarter(&self) -> Quarter {
        self.quarters[0]
    }

    pub fn last_quarter(&self) -> Quarter {
        self.quarters[self.quarters.len() - 1]
    }

    /// Position of a quarter in the series, if present.
    pub fn position(&self, quarter: Quarter) -> Option<usize> {
        self.quarters.binary_search(&quarter).ok()
    }

    /// True if any value is missing.
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Mean absolute value over finite observations, or 0.0 if none.
    pub fn mean_abs(&self) -> f64 {
        let (sum, count) = self
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(s, c), v| (s + v.abs(), c + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}
