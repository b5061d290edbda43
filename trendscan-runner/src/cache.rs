//! In-memory result cache keyed by analysis fingerprint.
//!
//! Thread-safe; shared between batch workers behind an `Arc`. Results are
//! identical with or without the cache, it only skips recomputation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use trendscan_core::{AnalysisFingerprint, TrendAnalysis};

/// Hit and miss counters since creation (or the last `clear`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<AnalysisFingerprint, Arc<TrendAnalysis>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a result is cached for the fingerprint.
    pub fn contains(&self, key: &AnalysisFingerprint) -> bool {
        self.read().contains_key(key)
    }

    /// Retrieves a cached result, counting the hit or miss.
    pub fn get(&self, key: &AnalysisFingerprint) -> Option<Arc<TrendAnalysis>> {
        let found = self.read().get(key).cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Stores a result, replacing any previous one for the same key.
    pub fn put(&self, key: AnalysisFingerprint, analysis: Arc<TrendAnalysis>) {
        self.write().insert(key, analysis);
    }

    pub fn remove(&self, key: &AnalysisFingerprint) -> Option<Arc<TrendAnalysis>> {
        self.write().remove(key)
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&self) {
        self.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned lock is still usable.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<AnalysisFingerprint, Arc<TrendAnalysis>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<AnalysisFingerprint, Arc<TrendAnalysis>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
