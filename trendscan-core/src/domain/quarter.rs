//! Quarter labels: `"<year>Q<quarter>"`.
//!
//! Quarters are totally ordered by (year, quarter), so sorting parsed labels is
//! the same as sorting chronologically. Serialized as the label string.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::SeriesError;

/// A calendar quarter such as `2019Q3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quarter {
    year: i32,
    quarter: u8,
}

impl Quarter {
    /// Build a quarter. `quarter` must be in `1..=4`.
    pub fn new(year: i32, quarter: u8) -> Result<Self, SeriesError> {
        if !(1..=4).contains(&quarter) {
            return Err(SeriesError::InvalidQuarter(format!("{year}Q{quarter}")));
        }
        Ok(Self { year, quarter })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    /// The following quarter; `Q4` rolls into `Q1` of the next year.
    pub fn next(&self) -> Self {
        if self.quarter == 4 {
            Self {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }

    /// The `n` quarters following this one, in order.
    pub fn successors(&self, n: usize) -> Vec<Quarter> {
        let mut out = Vec::with_capacity(n);
        let mut current = *self;
        for _ in 0..n {
            current = current.next();
            out.push(current);
        }
        out
    }

    /// Quarter containing the given calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: ((date.month() - 1) / 3 + 1) as u8,
        }
    }

    /// First calendar day of the quarter.
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, u32::from(self.quarter - 1) * 3 + 1, 1)
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

impl FromStr for Quarter {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SeriesError::InvalidQuarter(s.to_string());
        let (year, quarter) = s.trim().split_once(['Q', 'q']).ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let quarter: u8 = quarter.parse().map_err(|_| invalid())?;
        Self::new(year, quarter).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Quarter {
    type Error = SeriesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Quarter> for String {
    fn from(q: Quarter) -> Self {
        q.to_string()
    }
}
