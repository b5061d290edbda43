//! Batch analysis over many n-grams, optionally in parallel.
//!
//! Every query is independent and reads only shared immutable data, so the
//! parallel path needs no locking beyond the result cache.

use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::leaderboard::{HotnessEntry, HotnessLeaderboard};
use crate::runner::{NgramAnalysis, RunError, Runner};

/// Batch executor.
pub struct BatchAnalysis {
    runner: Runner,
    parallel: bool,
}

impl BatchAnalysis {
    /// Creates a batch executor with the given runner (parallel by default).
    pub fn new(runner: Runner) -> Self {
        Self {
            runner,
            parallel: true,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Analyze every n-gram the provider knows.
    pub fn run_all(&self) -> BatchResults {
        let queries = self.runner.provider().ngrams();
        self.run(&queries)
    }

    /// Analyze the given queries. Failures are collected, never fatal.
    pub fn run(&self, queries: &[String]) -> BatchResults {
        self.run_with_progress(queries, |_, _, _| {})
    }

    /// Analyze with progress reporting.
    ///
    /// The callback is invoked after each query completes with:
    /// - Current index (0-based, in query order)
    /// - Total number of queries
    /// - The query's outcome
    pub fn run_with_progress<F>(&self, queries: &[String], progress_callback: F) -> BatchResults
    where
        F: Fn(usize, usize, &Result<NgramAnalysis, RunError>) + Send + Sync,
    {
        let started = Instant::now();
        let total = queries.len();
        let analyze = |(idx, query): (usize, &String)| {
            let outcome = self.runner.run(query);
            progress_callback(idx, total, &outcome);
            (query.clone(), outcome)
        };

        let outcomes: Vec<(String, Result<NgramAnalysis, RunError>)> = if self.parallel {
            queries.par_iter().enumerate().map(analyze).collect()
        } else {
            queries.iter().enumerate().map(analyze).collect()
        };

        let results = BatchResults::new(outcomes);
        info!(
            queries = total,
            analyzed = results.len(),
            failed = results.failures().len(),
            parallel = self.parallel,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch complete"
        );
        results
    }
}

/// Results from a batch, in query order.
#[derive(Debug)]
pub struct BatchResults {
    results: Vec<NgramAnalysis>,
    failures: Vec<(String, RunError)>,
    by_ngram: HashMap<String, usize>,
}

impl BatchResults {
    fn new(outcomes: Vec<(String, Result<NgramAnalysis, RunError>)>) -> Self {
        let mut results = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (query, outcome) in outcomes {
            match outcome {
                Ok(analysis) => results.push(analysis),
                Err(err) => {
                    warn!(%query, error = %err, "analysis failed");
                    failures.push((query, err));
                }
            }
        }
        let by_ngram = results
            .iter()
            .enumerate()
            .map(|(i, r)| (r.ngram.clone(), i))
            .collect();

        Self {
            results,
            failures,
            by_ngram,
        }
    }

    /// Returns all successful results.
    pub fn all(&self) -> &[NgramAnalysis] {
        &self.results
    }

    /// Queries that failed, with their errors.
    pub fn failures(&self) -> &[(String, RunError)] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Gets a result by resolved n-gram name.
    pub fn get(&self, ngram: &str) -> Option<&NgramAnalysis> {
        self.by_ngram.get(ngram).map(|&i| &self.results[i])
    }

    /// Rank the analyzed n-grams by hotness, keeping the top `max_size`.
    pub fn leaderboard(&self, max_size: usize) -> HotnessLeaderboard {
        let mut board = HotnessLeaderboard::new(max_size);
        for result in &self.results {
            board.insert(HotnessEntry::new(result.ngram.clone(), &result.analysis));
        }
        board
    }
}
