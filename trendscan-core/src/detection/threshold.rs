//! Signal thresholder: z-score a derived signal and flag large positive
//! deviations.

use crate::error::CriterionError;
use crate::stats::zscore;

/// A z-scored signal and its activation map, both aligned with the series.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub zscores: Vec<f64>,
    pub activated: Vec<bool>,
}

impl Activation {
    pub fn activated_count(&self) -> usize {
        self.activated.iter().filter(|&&a| a).count()
    }
}

/// `activated[t] = zscore[t] > k`. Missing entries are never activated.
///
/// Fails with `DegenerateSignal` when the signal has no spread.
pub fn threshold_signal(values: &[f64], k: f64) -> Result<Activation, CriterionError> {
    let zscores = zscore(values)?;
    let activated = zscores.iter().map(|&z| z > k).collect();
    Ok(Activation { zscores, activated })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_values_above_threshold_activate() {
        let values = [0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0];
        let activation = threshold_signal(&values, 2.0).unwrap();
        assert_eq!(activation.activated_count(), 1);
        assert!(activation.activated[5]);
    }

    #[test]
    fn equal_to_threshold_does_not_activate() {
        let values = [-1.0, 1.0];
        let z = zscore(&values).unwrap();
        let activation = threshold_signal(&values, z[1]).unwrap();
        assert!(!activation.activated[1]);
        let activation = threshold_signal(&values, z[1] - 1e-9).unwrap();
        assert!(activation.activated[1]);
    }

    #[test]
    fn missing_entries_are_not_activated() {
        let values = [f64::NAN, 1.0, 2.0, 50.0, f64::NAN];
        let activation = threshold_signal(&values, 1.0).unwrap();
        assert_eq!(activation.activated, vec![false, false, false, true, false]);
        assert!(activation.zscores[0].is_nan());
    }

    #[test]
    fn negative_deviations_never_activate() {
        let values = [0.0, 0.0, 0.0, 0.0, -10.0, 0.0];
        let activation = threshold_signal(&values, 1.0).unwrap();
        assert_eq!(activation.activated_count(), 0);
    }

    #[test]
    fn constant_signal_is_degenerate() {
        assert_eq!(
            threshold_signal(&[0.0; 6], 2.0).unwrap_err(),
            CriterionError::DegenerateSignal
        );
    }
}
