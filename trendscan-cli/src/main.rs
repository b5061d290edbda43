//! TrendScan CLI: analyze, leaderboard, and config commands.
//!
//! Commands:
//! - `analyze`: run the detection pipeline on one n-gram and print a summary
//! - `leaderboard`: analyze every n-gram in a series file and rank the hottest
//! - `config`: print the default detection config as TOML

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::prelude::*;

use trendscan_core::config::DetectionConfig;
use trendscan_core::{CriterionOutcome, TrendAnalysis};
use trendscan_runner::export::{export_json, export_leaderboard_csv};
use trendscan_runner::{
    save_artifacts, BatchAnalysis, HotnessLeaderboard, InMemoryProvider, NgramAnalysis, Runner,
};

#[derive(Parser)]
#[command(
    name = "trendscan",
    version,
    about = "TrendScan CLI: hot-trend detection for quarterly n-gram series"
)]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one n-gram.
    Analyze {
        /// JSON file mapping n-grams to `{ "<year>Q<q>": value }` objects.
        #[arg(long)]
        series: PathBuf,

        /// N-gram to analyze (case-insensitive).
        #[arg(long)]
        ngram: String,

        /// Path to a TOML detection config. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for artifacts (analysis.json, votes.csv, zones.csv).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the full analysis as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Analyze every n-gram in a series file and rank by hotness.
    Leaderboard {
        /// JSON file mapping n-grams to `{ "<year>Q<q>": value }` objects.
        #[arg(long)]
        series: PathBuf,

        /// Path to a TOML detection config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of n-grams to keep.
        #[arg(long, default_value_t = 20)]
        top: usize,

        /// Run sequentially instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Print the leaderboard as CSV.
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
    /// Print the default detection config as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.log_format, cli.verbose);

    match cli.command {
        Commands::Analyze {
            series,
            ngram,
            config,
            output,
            json,
        } => run_analyze(&series, &ngram, config.as_deref(), output.as_deref(), json),
        Commands::Leaderboard {
            series,
            config,
            top,
            sequential,
            csv,
        } => run_leaderboard(&series, config.as_deref(), top, sequential, csv),
        Commands::Config => {
            print!("{}", DetectionConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn setup_tracing(format: LogFormat, verbose: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            tracing_subscriber::EnvFilter::new("trendscan_core=debug,trendscan_runner=debug,info")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DetectionConfig> {
    match path {
        Some(path) => DetectionConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(DetectionConfig::default()),
    }
}

fn build_runner(series: &Path, config: Option<&Path>) -> Result<Runner> {
    let provider = InMemoryProvider::from_file(series)
        .with_context(|| format!("failed to load series from {}", series.display()))?;
    tracing::info!(ngrams = provider.len(), "loaded series file");
    Ok(Runner::new(Arc::new(provider), load_config(config)?)?)
}

fn run_analyze(
    series: &Path,
    ngram: &str,
    config: Option<&Path>,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let runner = build_runner(series, config)?;
    let result = runner.run(ngram)?;

    if json {
        println!("{}", export_json(&result.analysis)?);
    } else {
        print_summary(&result);
    }

    if let Some(dir) = output {
        let run_dir = save_artifacts(&result, dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_leaderboard(
    series: &Path,
    config: Option<&Path>,
    top: usize,
    sequential: bool,
    csv: bool,
) -> Result<()> {
    let runner = build_runner(series, config)?;
    let results = BatchAnalysis::new(runner)
        .with_parallelism(!sequential)
        .run_all();
    for (ngram, err) in results.failures() {
        eprintln!("Error for {ngram}: {err}");
    }

    let board = results.leaderboard(top);
    if csv {
        print!("{}", export_leaderboard_csv(&board)?);
    } else {
        print_leaderboard(&board, results.len());
    }
    Ok(())
}

fn print_summary(result: &NgramAnalysis) {
    let analysis: &TrendAnalysis = &result.analysis;
    println!();
    println!("=== Trend Analysis ===");
    println!("N-gram:         {}", result.ngram);
    if let (Some(first), Some(last)) = (analysis.quarters.first(), analysis.quarters.last()) {
        println!(
            "Period:         {first} to {last} ({} quarters)",
            analysis.quarters.len()
        );
    }
    println!("Fingerprint:    {}", result.fingerprint);
    println!();
    println!("--- Criteria ---");
    for report in &analysis.reports {
        match &report.outcome {
            CriterionOutcome::Evaluated {
                activated_count, ..
            } => println!(
                "{:<32} k={:<5} activated {}",
                report.name, report.threshold, activated_count
            ),
            CriterionOutcome::Failed { error } => {
                println!("{:<32} k={:<5} FAILED: {error}", report.name, report.threshold)
            }
        }
    }
    println!();
    println!("--- Consensus ---");
    let consensus = analysis.consensus_quarters();
    if consensus.is_empty() {
        println!("No consensus points");
    } else {
        let labels: Vec<String> = consensus.iter().map(|q| q.to_string()).collect();
        println!("Points:         {}", labels.join(", "));
    }
    println!("Max Votes:      {}", analysis.consensus.max_votes());
    println!();
    println!("--- Trend Zones (tau = {}) ---", analysis.zone_threshold);
    for zone in &analysis.zones.zones {
        println!(
            "{} anchored: {} to {} ({} quarters)",
            zone.anchor,
            zone.start(),
            zone.end(),
            zone.len()
        );
    }
    if analysis.zones.degenerate_derivative {
        println!("WARNING: flat derivative, zones hold only their anchors");
    }
    if let Some(forecast) = &analysis.forecast {
        println!();
        println!("--- Forecast ---");
        for (quarter, value) in forecast.quarters.iter().zip(&forecast.values) {
            println!("{quarter}:        {value:.3}");
        }
    }
    if result.cached {
        println!();
        println!("(served from cache)");
    }
    println!();
}

fn print_leaderboard(board: &HotnessLeaderboard, analyzed: usize) {
    println!();
    println!("=== Hotness Leaderboard ({} of {analyzed} n-grams) ===", board.len());
    if board.is_empty() {
        println!("No trendy n-grams");
    }
    for (rank, entry) in board.entries().iter().enumerate() {
        let span = match (entry.first_trendy, entry.last_trendy) {
            (Some(first), Some(last)) => format!("{first}..{last}"),
            _ => String::new(),
        };
        println!(
            "{:>3}. {:<32} trendy {:>3}  points {:>3}  peak {}  {span}",
            rank + 1,
            entry.ngram,
            entry.score.trendy_quarters,
            entry.score.consensus_points,
            entry.score.peak_votes
        );
    }
    println!();
}
