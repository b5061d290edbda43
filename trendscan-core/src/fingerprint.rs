//! Analysis fingerprinting: deterministic cache keys for derived results.
//!
//! A fingerprint hashes `{operation, shape, values_hash, params}` as canonical
//! JSON (object keys sorted) with BLAKE3. The series content hash is part of
//! the key, so two series of the same shape never collide.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use crate::domain::TimeSeries;

/// Hex-encoded BLAKE3 digest identifying one (operation, series, params) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnalysisFingerprint(pub String);

impl AnalysisFingerprint {
    pub fn new<P: Serialize + ?Sized>(
        operation: &str,
        series: &TimeSeries,
        params: &P,
    ) -> Result<Self, serde_json::Error> {
        let canonical = json!({
            "operation": operation,
            "shape": {
                "len": series.len(),
                "first": series.first_quarter().to_string(),
                "last": series.last_quarter().to_string(),
            },
            "values_hash": values_hash(series),
            "params": serde_json::to_value(params)?,
        });
        let digest = blake3::hash(canonical.to_string().as_bytes());
        Ok(Self(digest.to_hex().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content hash of a series: quarter labels and value bits, with every
/// missing value mapped to one canonical NaN.
pub fn values_hash(series: &TimeSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for (q, v) in series.quarters().iter().zip(series.values()) {
        hasher.update(q.to_string().as_bytes());
        let bits = if v.is_finite() { v.to_bits() } else { f64::NAN.to_bits() };
        hasher.update(&bits.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionConfig;
    use crate::domain::Quarter;

    fn series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::consecutive(Quarter::new(2015, 1).unwrap(), values).unwrap()
    }

    #[test]
    fn fingerprint_deterministic() {
        let s = series(vec![1.0, 2.0, 3.0]);
        let config = DetectionConfig::default();
        let a = AnalysisFingerprint::new("analyze_trends", &s, &config).unwrap();
        let b = AnalysisFingerprint::new("analyze_trends", &s, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn fingerprint_changes_with_each_input() {
        let s = series(vec![1.0, 2.0, 3.0]);
        let config = DetectionConfig::default();
        let base = AnalysisFingerprint::new("analyze_trends", &s, &config).unwrap();

        let other_op = AnalysisFingerprint::new("exp_smoothing", &s, &config).unwrap();
        assert_ne!(base, other_op);

        let other_values = AnalysisFingerprint::new("analyze_trends", &series(vec![1.0, 2.0, 4.0]), &config).unwrap();
        assert_ne!(base, other_values, "same shape, different content");

        let mut tweaked = config.clone();
        tweaked.zones.threshold = 0.5;
        let other_params = AnalysisFingerprint::new("analyze_trends", &s, &tweaked).unwrap();
        assert_ne!(base, other_params);
    }

    #[test]
    fn missing_values_hash_consistently() {
        let a = series(vec![1.0, f64::NAN, 3.0]);
        let b = series(vec![1.0, -f64::NAN, 3.0]);
        assert_eq!(values_hash(&a), values_hash(&b));
    }
}
