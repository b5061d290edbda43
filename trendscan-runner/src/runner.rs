//! Single-request runner: look up an n-gram, analyze it, optionally cache.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use trendscan_core::config::DetectionConfig;
use trendscan_core::domain::TimeSeries;
use trendscan_core::error::ConfigError;
use trendscan_core::{analyze_trends, AnalysisFingerprint, TrendAnalysis};

use crate::cache::ResultCache;
use crate::provider::{NgramLookup, SeriesProvider};

/// Operation name recorded in cache fingerprints.
pub const ANALYZE_OPERATION: &str = "analyze_trends";

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("n-gram '{query}' not found{}", format_suggestions(.suggestions))]
    NotFound {
        query: String,
        suggestions: Vec<String>,
    },
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("; did you mean: {}", suggestions.join(", "))
    }
}

/// Analysis of one n-gram.
#[derive(Debug, Clone)]
pub struct NgramAnalysis {
    pub ngram: String,
    pub fingerprint: AnalysisFingerprint,
    pub analysis: Arc<TrendAnalysis>,
    /// Served from the cache rather than recomputed.
    pub cached: bool,
}

/// Runs analyses against a provider with one validated configuration.
#[derive(Clone)]
pub struct Runner {
    provider: Arc<dyn SeriesProvider>,
    config: DetectionConfig,
    cache: Option<Arc<ResultCache>>,
}

impl Runner {
    /// Creates a runner. The configuration is validated once here.
    pub fn new(provider: Arc<dyn SeriesProvider>, config: DetectionConfig) -> Result<Self, RunError> {
        config.validate()?;
        Ok(Self {
            provider,
            config,
            cache: None,
        })
    }

    /// Enables result caching.
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn provider(&self) -> &dyn SeriesProvider {
        self.provider.as_ref()
    }

    pub fn cache(&self) -> Option<&Arc<ResultCache>> {
        self.cache.as_ref()
    }

    /// Look up `query` and analyze it.
    pub fn run(&self, query: &str) -> Result<NgramAnalysis, RunError> {
        match self.provider.lookup(query) {
            NgramLookup::Found { ngram, series } => self.analyze_series(ngram, &series),
            NgramLookup::NotFound { suggestions } => Err(RunError::NotFound {
                query: query.to_string(),
                suggestions,
            }),
        }
    }

    /// Analyze a series directly, bypassing the provider.
    pub fn analyze_series(&self, ngram: impl Into<String>, series: &TimeSeries) -> Result<NgramAnalysis, RunError> {
        let ngram = ngram.into();
        let fingerprint = AnalysisFingerprint::new(ANALYZE_OPERATION, series, &self.config)?;

        if let Some(cache) = &self.cache {
            if let Some(analysis) = cache.get(&fingerprint) {
                debug!(%ngram, %fingerprint, "cache hit");
                return Ok(NgramAnalysis {
                    ngram,
                    fingerprint,
                    analysis,
                    cached: true,
                });
            }
        }

        let analysis = Arc::new(analyze_trends(series, &self.config));
        if let Some(cache) = &self.cache {
            cache.put(fingerprint.clone(), Arc::clone(&analysis));
        }

        Ok(NgramAnalysis {
            ngram,
            fingerprint,
            analysis,
            cached: false,
        })
    }
}
