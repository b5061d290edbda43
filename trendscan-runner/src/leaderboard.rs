//! Hotness leaderboard: bounded, deduplicated, sorted by trend strength.
//!
//! Ranking key, best first: number of trendy quarters, then number of
//! consensus points, then peak vote count. Ties go to the alphabetically
//! first n-gram. N-grams without any trendy quarter are not hot and are
//! skipped.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use trendscan_core::domain::Quarter;
use trendscan_core::TrendAnalysis;

/// Trend strength of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HotnessScore {
    pub trendy_quarters: usize,
    pub consensus_points: usize,
    pub peak_votes: u32,
}

impl HotnessScore {
    pub fn from_analysis(analysis: &TrendAnalysis) -> Self {
        Self {
            trendy_quarters: analysis.trendy_quarters().len(),
            consensus_points: analysis.consensus_quarters().len(),
            peak_votes: analysis.consensus.max_votes(),
        }
    }

    pub fn is_hot(&self) -> bool {
        self.trendy_quarters > 0
    }
}

impl Ord for HotnessScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.trendy_quarters
            .cmp(&other.trendy_quarters)
            .then(self.consensus_points.cmp(&other.consensus_points))
            .then(self.peak_votes.cmp(&other.peak_votes))
    }
}

impl PartialOrd for HotnessScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A single entry in the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotnessEntry {
    pub ngram: String,
    pub score: HotnessScore,
    /// First quarter of the earliest zone.
    pub first_trendy: Option<Quarter>,
    /// Last quarter of the latest zone.
    pub last_trendy: Option<Quarter>,
}

impl HotnessEntry {
    pub fn new(ngram: impl Into<String>, analysis: &TrendAnalysis) -> Self {
        let trendy = analysis.trendy_quarters();
        Self {
            ngram: ngram.into(),
            score: HotnessScore::from_analysis(analysis),
            first_trendy: trendy.first().copied(),
            last_trendy: trendy.last().copied(),
        }
    }
}

/// Outcome of an insert operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// New entry added to the leaderboard.
    Inserted,
    /// Replaced an existing entry for the same n-gram (better score).
    Replaced,
    /// Skipped: not hot, duplicate with worse or equal score, or below the cut.
    Skipped,
}

/// Top-N hottest n-grams.
#[derive(Debug, Clone)]
pub struct HotnessLeaderboard {
    entries: Vec<HotnessEntry>,
    max_size: usize,
}

impl HotnessLeaderboard {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Insert an entry. Returns the outcome.
    ///
    /// - Rejects entries with no trendy quarter.
    /// - Deduplicates by n-gram: replaces if better, skips otherwise.
    /// - After insert, trims to `max_size` by dropping the coldest entry.
    pub fn insert(&mut self, entry: HotnessEntry) -> InsertResult {
        if !entry.score.is_hot() {
            return InsertResult::Skipped;
        }

        if let Some(idx) = self.entries.iter().position(|e| e.ngram == entry.ngram) {
            if entry.score > self.entries[idx].score {
                self.entries[idx] = entry;
                self.sort_entries();
                return InsertResult::Replaced;
            }
            return InsertResult::Skipped;
        }

        if self.entries.len() < self.max_size {
            self.entries.push(entry);
            self.sort_entries();
            InsertResult::Inserted
        } else if let Some(coldest) = self.entries.last() {
            if rank(&entry, coldest) == Ordering::Less {
                self.entries.pop();
                self.entries.push(entry);
                self.sort_entries();
                InsertResult::Inserted
            } else {
                InsertResult::Skipped
            }
        } else {
            // max_size 0
            InsertResult::Skipped
        }
    }

    pub fn entries(&self) -> &[HotnessEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// 1-based rank of an n-gram, if present.
    pub fn rank_of(&self, ngram: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.ngram == ngram).map(|i| i + 1)
    }

    fn sort_entries(&mut self) {
        self.entries.sort_by(rank);
    }
}

/// Hotter first; alphabetical among equals.
fn rank(a: &HotnessEntry, b: &HotnessEntry) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.ngram.cmp(&b.ngram))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ngram: &str, trendy: usize, points: usize, votes: u32) -> HotnessEntry {
        HotnessEntry {
            ngram: ngram.to_string(),
            score: HotnessScore {
                trendy_quarters: trendy,
                consensus_points: points,
                peak_votes: votes,
            },
            first_trendy: None,
            last_trendy: None,
        }
    }

    fn names(board: &HotnessLeaderboard) -> Vec<&str> {
        board.entries().iter().map(|e| e.ngram.as_str()).collect()
    }

    #[test]
    fn sorted_by_score_then_name() {
        let mut board = HotnessLeaderboard::new(10);
        board.insert(entry("b", 3, 1, 3));
        board.insert(entry("a", 3, 1, 3));
        board.insert(entry("c", 5, 1, 3));
        board.insert(entry("d", 3, 2, 3));
        board.insert(entry("e", 3, 1, 4));
        assert_eq!(names(&board), vec!["c", "d", "e", "a", "b"]);
        assert_eq!(board.rank_of("c"), Some(1));
        assert_eq!(board.rank_of("zzz"), None);
    }

    #[test]
    fn cold_entries_are_skipped() {
        let mut board = HotnessLeaderboard::new(10);
        assert_eq!(board.insert(entry("cold", 0, 0, 2)), InsertResult::Skipped);
        assert!(board.is_empty());
    }

    #[test]
    fn bounded_to_max_size() {
        let mut board = HotnessLeaderboard::new(2);
        assert_eq!(board.insert(entry("a", 1, 1, 3)), InsertResult::Inserted);
        assert_eq!(board.insert(entry("b", 2, 1, 3)), InsertResult::Inserted);
        assert_eq!(board.insert(entry("c", 3, 1, 3)), InsertResult::Inserted);
        assert_eq!(board.insert(entry("d", 1, 1, 3)), InsertResult::Skipped);
        assert_eq!(names(&board), vec!["c", "b"]);
    }

    #[test]
    fn duplicates_replace_only_when_better() {
        let mut board = HotnessLeaderboard::new(5);
        board.insert(entry("a", 2, 1, 3));
        assert_eq!(board.insert(entry("a", 1, 1, 3)), InsertResult::Skipped);
        assert_eq!(board.insert(entry("a", 4, 1, 3)), InsertResult::Replaced);
        assert_eq!(board.len(), 1);
        assert_eq!(board.entries()[0].score.trendy_quarters, 4);
    }

    #[test]
    fn zero_capacity_accepts_nothing() {
        let mut board = HotnessLeaderboard::new(0);
        assert_eq!(board.insert(entry("a", 9, 9, 4)), InsertResult::Skipped);
    }
}
