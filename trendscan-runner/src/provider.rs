//! Series provider: n-gram lookup over a read-only collection of series.
//!
//! Lookup is case-insensitive exact match first; when nothing matches, the
//! caller gets every n-gram whose name contains the query as suggestions.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use trendscan_core::domain::{SeriesError, TimeSeries};

/// Errors from building a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("read series file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse series JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid series for n-gram '{ngram}': {source}")]
    Series {
        ngram: String,
        #[source]
        source: SeriesError,
    },
}

/// Result of looking up one n-gram.
#[derive(Debug, Clone, PartialEq)]
pub enum NgramLookup {
    Found { ngram: String, series: TimeSeries },
    /// No exact match. `suggestions` are partial matches, sorted.
    NotFound { suggestions: Vec<String> },
}

/// Source of quarterly series by n-gram.
pub trait SeriesProvider: Send + Sync {
    fn lookup(&self, query: &str) -> NgramLookup;

    /// All known n-grams, sorted.
    fn ngrams(&self) -> Vec<String>;
}

/// Provider backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: BTreeMap<String, TimeSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ngram: impl Into<String>, series: TimeSeries) {
        self.series.insert(ngram.into(), series);
    }

    /// Load from a JSON file shaped `{ "<ngram>": { "<year>Q<q>": value | null } }`.
    pub fn from_file(path: &Path) -> Result<Self, ProviderError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ProviderError> {
        let raw: BTreeMap<String, BTreeMap<String, Option<f64>>> = serde_json::from_str(content)?;
        let mut provider = Self::new();
        for (ngram, points) in raw {
            let series = TimeSeries::from_labels(points.iter().map(|(k, v)| (k.as_str(), *v)))
                .map_err(|source| ProviderError::Series {
                    ngram: ngram.clone(),
                    source,
                })?;
            provider.insert(ngram, series);
        }
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<(String, TimeSeries)> for InMemoryProvider {
    fn from_iter<I: IntoIterator<Item = (String, TimeSeries)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

impl SeriesProvider for InMemoryProvider {
    fn lookup(&self, query: &str) -> NgramLookup {
        let needle = query.trim().to_lowercase();

        if let Some((ngram, series)) = self
            .series
            .iter()
            .find(|(name, _)| name.to_lowercase() == needle)
        {
            return NgramLookup::Found {
                ngram: ngram.clone(),
                series: series.clone(),
            };
        }

        let suggestions = if needle.is_empty() {
            Vec::new()
        } else {
            self.series
                .keys()
                .filter(|name| name.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        };
        NgramLookup::NotFound { suggestions }
    }

    fn ngrams(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }
}
