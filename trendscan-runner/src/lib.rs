//! TrendScan Runner: n-gram lookup, cached and parallel analysis, leaderboards.
//!
//! This crate builds on `trendscan-core` to provide:
//! - Series providers keyed by n-gram, with suggestions for near misses
//! - Single-request runner with fingerprint-keyed result caching
//! - Batch analysis across every known n-gram (rayon)
//! - Hotness leaderboard ranking n-grams by trendy quarters
//! - JSON/CSV export and per-n-gram artifact bundles

pub mod batch;
pub mod cache;
pub mod export;
pub mod leaderboard;
pub mod provider;
pub mod runner;

pub use batch::{BatchAnalysis, BatchResults};
pub use cache::{CacheStats, ResultCache};
pub use export::{save_artifacts, ArtifactManifest};
pub use leaderboard::{HotnessEntry, HotnessLeaderboard, HotnessScore, InsertResult};
pub use provider::{InMemoryProvider, NgramLookup, ProviderError, SeriesProvider};
pub use runner::{NgramAnalysis, RunError, Runner};
