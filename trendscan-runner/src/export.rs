//! Reporting and export: JSON and CSV artifacts.
//!
//! Provides:
//! - **JSON**: the full `TrendAnalysis`, missing values as `null`
//! - **CSV**: per-quarter vote table, zone list, and hotness leaderboard
//! - **Artifact bundle**: one directory per n-gram with a manifest

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trendscan_core::TrendAnalysis;

use crate::leaderboard::HotnessLeaderboard;
use crate::runner::NgramAnalysis;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `TrendAnalysis` to pretty JSON.
pub fn export_json(analysis: &TrendAnalysis) -> Result<String> {
    serde_json::to_string_pretty(analysis).context("failed to serialize TrendAnalysis to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the vote table: one row per quarter.
///
/// Columns: quarter, one column per criterion (`1` activated, `0` not, empty
/// when the criterion failed), votes, consensus, trendy.
pub fn export_votes_csv(analysis: &TrendAnalysis) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["quarter".to_string()];
    header.extend(analysis.reports.iter().map(|r| r.kind.label().to_string()));
    header.extend(["votes", "consensus", "trendy"].map(String::from));
    wtr.write_record(&header)?;

    let consensus = analysis.consensus_quarters();
    for (i, quarter) in analysis.quarters.iter().enumerate() {
        let mut row = vec![quarter.to_string()];
        for report in &analysis.reports {
            let cell = match report.outcome.activation() {
                Some(_) if report.voted_at(i) => "1",
                Some(_) => "0",
                None => "",
            };
            row.push(cell.to_string());
        }
        row.push(analysis.consensus.votes_at(i).to_string());
        row.push(consensus.contains(quarter).to_string());
        row.push(analysis.is_trendy(*quarter).to_string());
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export trend zones with zone, anchor, start, end and length columns.
pub fn export_zones_csv(analysis: &TrendAnalysis) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["zone", "anchor", "start", "end", "length"])?;
    for (i, zone) in analysis.zones.zones.iter().enumerate() {
        wtr.write_record([
            &(i + 1).to_string(),
            &zone.anchor.to_string(),
            &zone.start().to_string(),
            &zone.end().to_string(),
            &zone.len().to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export a leaderboard, hottest first.
pub fn export_leaderboard_csv(board: &HotnessLeaderboard) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "rank",
        "ngram",
        "trendy_quarters",
        "consensus_points",
        "peak_votes",
        "first_trendy",
        "last_trendy",
    ])?;
    for (i, entry) in board.entries().iter().enumerate() {
        wtr.write_record([
            &(i + 1).to_string(),
            &entry.ngram,
            &entry.score.trendy_quarters.to_string(),
            &entry.score.consensus_points.to_string(),
            &entry.score.peak_votes.to_string(),
            &entry.first_trendy.map(|q| q.to_string()).unwrap_or_default(),
            &entry.last_trendy.map(|q| q.to_string()).unwrap_or_default(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Describes the files written for one n-gram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub schema_version: u32,
    pub ngram: String,
    pub fingerprint: String,
    pub generated_at: DateTime<Utc>,
    pub files: Vec<String>,
}

/// Save the full artifact set for one analysis.
///
/// Creates a directory named after the n-gram under `output_dir` containing:
/// - `manifest.json`: an `ArtifactManifest`
/// - `analysis.json`: the full `TrendAnalysis`
/// - `votes.csv`: per-quarter vote table
/// - `zones.csv`: trend zones
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &NgramAnalysis, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(slug(&result.ngram));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("analysis.json", export_json(&result.analysis)?),
        ("votes.csv", export_votes_csv(&result.analysis)?),
        ("zones.csv", export_zones_csv(&result.analysis)?),
    ];
    for (name, content) in &files {
        std::fs::write(run_dir.join(name), content)
            .with_context(|| format!("failed to write {name}"))?;
    }

    let manifest = ArtifactManifest {
        schema_version: SCHEMA_VERSION,
        ngram: result.ngram.clone(),
        fingerprint: result.fingerprint.to_string(),
        generated_at: Utc::now(),
        files: files.iter().map(|(name, _)| name.to_string()).collect(),
    };
    let manifest_json =
        serde_json::to_string_pretty(&manifest).context("failed to serialize manifest")?;
    std::fs::write(run_dir.join("manifest.json"), manifest_json)
        .context("failed to write manifest.json")?;

    Ok(run_dir)
}

/// Read a manifest back, rejecting unknown schema versions.
pub fn load_manifest(dir: &Path) -> Result<ArtifactManifest> {
    let path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: ArtifactManifest =
        serde_json::from_str(&json).context("failed to deserialize manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        anyhow::bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

/// Filesystem-safe directory name for an n-gram.
fn slug(ngram: &str) -> String {
    let slug: String = ngram
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if slug.is_empty() {
        "ngram".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trendscan_core::config::DetectionConfig;
    use trendscan_core::domain::{Quarter, TimeSeries};
    use trendscan_core::{analyze_trends, AnalysisFingerprint};

    use crate::leaderboard::HotnessEntry;

    /// Jump at 2016Q3 with three agreeing criteria.
    fn sample_result() -> NgramAnalysis {
        let mut values = vec![100.0; 12];
        values[6] = 200.0;
        let series = TimeSeries::consecutive(Quarter::new(2015, 1).unwrap(), values).unwrap();
        let mut config = DetectionConfig::default();
        config.percent_change.period = 1;
        config.percent_change.threshold = 1.0;
        config.macd.threshold = 1.0;
        config.seasonal_decomposition.threshold = 1.0;
        config.exp_smoothing.enabled = false;

        NgramAnalysis {
            ngram: "Large Language Model".to_string(),
            fingerprint: AnalysisFingerprint::new("analyze_trends", &series, &config).unwrap(),
            analysis: Arc::new(analyze_trends(&series, &config)),
            cached: false,
        }
    }

    #[test]
    fn json_has_null_for_missing_zscores() {
        let result = sample_result();
        let json = export_json(&result.analysis).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        // percent change is undefined for the first quarter
        assert!(value["reports"][0]["outcome"]["zscores"][0].is_null());
        assert_eq!(value["consensus"]["quarters"][0], "2016Q3");
    }

    #[test]
    fn votes_csv_columns_and_rows() {
        let csv = export_votes_csv(&sample_result().analysis).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "quarter,pct_change,macd_hist,seasonal,votes,consensus,trendy"
        );
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[7], "2016Q3,1,1,1,3,true,true");
        assert!(lines[1].starts_with("2015Q1,0,0,0,0,false"));
    }

    #[test]
    fn failed_criteria_leave_empty_cells() {
        let series = TimeSeries::consecutive(Quarter::new(2015, 1).unwrap(), vec![100.0; 12]).unwrap();
        let analysis = analyze_trends(&series, &DetectionConfig::default());
        let csv = export_votes_csv(&analysis).unwrap();
        let second = csv.lines().nth(1).unwrap();
        assert_eq!(second, "2015Q1,,,,,0,false,false");
    }

    #[test]
    fn zones_csv_lists_each_zone() {
        let csv = export_zones_csv(&sample_result().analysis).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "zone,anchor,start,end,length");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("1,2016Q3,"));
    }

    #[test]
    fn leaderboard_csv_ranks() {
        let result = sample_result();
        let mut board = HotnessLeaderboard::new(5);
        board.insert(HotnessEntry::new(result.ngram.clone(), &result.analysis));
        let csv = export_leaderboard_csv(&board).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("1,Large Language Model,"));
    }

    #[test]
    fn save_artifacts_writes_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample_result();
        let run_dir = save_artifacts(&result, dir.path()).unwrap();

        assert_eq!(run_dir.file_name().unwrap(), "large_language_model");
        for name in ["manifest.json", "analysis.json", "votes.csv", "zones.csv"] {
            assert!(run_dir.join(name).exists(), "{name} missing");
        }
        let manifest = load_manifest(&run_dir).unwrap();
        assert_eq!(manifest.ngram, "Large Language Model");
        assert_eq!(manifest.fingerprint, result.fingerprint.to_string());
        assert_eq!(manifest.files.len(), 3);
    }

    #[test]
    fn manifest_rejects_future_schema() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = ArtifactManifest {
            schema_version: SCHEMA_VERSION + 1,
            ngram: "x".into(),
            fingerprint: "f".into(),
            generated_at: Utc::now(),
            files: vec![],
        };
        std::fs::write(
            dir.path().join("manifest.json"),
            serde_json::to_string(&manifest).unwrap(),
        )
        .unwrap();
        assert!(load_manifest(dir.path()).is_err());
    }
}
