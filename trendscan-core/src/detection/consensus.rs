//! Consensus aggregation across criteria.
//!
//! Votes are counted per quarter. A quarter is a consensus point when its
//! vote count strictly exceeds `ceil(active / 2)`, so exactly half never
//! qualifies and a single active criterion can never reach consensus alone.

use serde::{Deserialize, Serialize};

use crate::domain::Quarter;

/// Vote table for one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Enabled criteria, including ones that failed.
    pub active_criteria: usize,
    /// `ceil(active_criteria / 2)`; consensus needs strictly more votes.
    pub vote_threshold: usize,
    /// Votes per series position.
    pub votes: Vec<u32>,
    /// Consensus positions in chronological order.
    pub points: Vec<usize>,
    pub quarters: Vec<Quarter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConsensusOutcome {
    /// No criterion is enabled. This is a valid, empty outcome.
    NoActiveCriteria,
    Votes(ConsensusResult),
}

impl ConsensusOutcome {
    pub fn points(&self) -> &[usize] {
        match self {
            ConsensusOutcome::NoActiveCriteria => &[],
            ConsensusOutcome::Votes(result) => &result.points,
        }
    }

    pub fn quarters(&self) -> &[Quarter] {
        match self {
            ConsensusOutcome::NoActiveCriteria => &[],
            ConsensusOutcome::Votes(result) => &result.quarters,
        }
    }

    /// Vote count at a series position (0 when there is no vote table).
    pub fn votes_at(&self, position: usize) -> u32 {
        match self {
            ConsensusOutcome::NoActiveCriteria => 0,
            ConsensusOutcome::Votes(result) => result.votes.get(position).copied().unwrap_or(0),
        }
    }

    pub fn max_votes(&self) -> u32 {
        match self {
            ConsensusOutcome::NoActiveCriteria => 0,
            ConsensusOutcome::Votes(result) => result.votes.iter().copied().max().unwrap_or(0),
        }
    }
}

/// Count votes over `quarters`.
///
/// `activations` holds the maps of the criteria that produced a signal;
/// positions beyond a map's end count as not activated. `active_criteria` is
/// the majority denominator and may exceed `activations.len()` when some
/// enabled criteria failed.
pub fn aggregate(quarters: &[Quarter], active_criteria: usize, activations: &[&[bool]]) -> ConsensusOutcome {
    if active_criteria == 0 {
        return ConsensusOutcome::NoActiveCriteria;
    }

    let votes: Vec<u32> = (0..quarters.len())
        .map(|i| {
            activations
                .iter()
                .filter(|map| map.get(i).copied().unwrap_or(false))
                .count() as u32
        })
        .collect();

    let vote_threshold = active_criteria.div_ceil(2);
    let points: Vec<usize> = votes
        .iter()
        .enumerate()
        .filter(|(_, v)| **v as usize > vote_threshold)
        .map(|(i, _)| i)
        .collect();
    let consensus_quarters = points.iter().map(|&i| quarters[i]).collect();

    ConsensusOutcome::Votes(ConsensusResult {
        active_criteria,
        vote_threshold,
        votes,
        points,
        quarters: consensus_quarters,
    })
}
