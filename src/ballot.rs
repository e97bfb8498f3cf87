use crate::candidate::{CandidateId, CandidateInfo};
use crate::error::{Error, Result};
use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique id used to identify a ballot.
pub type BallotId = u64;

/// A ranked ballot: rank position (1-based) to candidate id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub id: BallotId,
    pub preferences: BTreeMap<u32, CandidateId>,
}

impl Ballot {
    #[inline]
    pub fn new(id: BallotId, preferences: BTreeMap<u32, CandidateId>) -> Self {
        Ballot { id, preferences }
    }

    /// Creates a ballot ranking `candidates` from 1 in the given order.
    pub fn ranked<I, S>(id: BallotId, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CandidateId>,
    {
        let preferences = candidates
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i as u32 + 1, c.into()))
            .collect();
        Ballot { id, preferences }
    }

    /// Indicates whether the ballot ranks no candidate at all.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.preferences.is_empty()
    }

    /// Checks the ballot's structure and resolves its preferences to candidate indices
    /// in rank order.
    ///
    /// Rank keys must run 1, 2, 3, ... without gaps, and no candidate may appear twice.
    pub(crate) fn resolve(&self, candidate_index: &FxHashMap<CandidateId, usize>) -> Result<Vec<usize>> {
        let mut ranked = Vec::with_capacity(self.preferences.len());
        let mut seen = FxHashSet::default();

        // BTreeMap iterates in ascending rank order.
        for (expected, (rank, candidate_id)) in (1u32..).zip(self.preferences.iter()) {
            if *rank != expected {
                return Err(Error::InvalidBallot(format!(
                    "ballot({}) has rank {} where rank {} was expected: ranks must be contiguous from 1",
                    self.id, rank, expected
                )));
            }
            let index = match candidate_index.get(candidate_id) {
                Some(index) => *index,
                None => {
                    return Err(Error::InvalidBallot(format!(
                        "ballot({}) ranks unknown candidate({}) at rank {}",
                        self.id, candidate_id, rank
                    )))
                }
            };
            if !seen.insert(index) {
                return Err(Error::InvalidBallot(format!(
                    "ballot({}) ranks candidate({}) more than once",
                    self.id, candidate_id
                )));
            }
            ranked.push(index);
        }

        Ok(ranked)
    }
}

/// Generator of synthetic ranked ballots for simulations and tests.
pub struct BallotGenerator {
    rng: fastrand::Rng,
    next_id: BallotId,
}

impl BallotGenerator {
    /// Creates a generator drawing from the given random source.
    #[inline]
    pub fn new(rng: fastrand::Rng) -> Self {
        BallotGenerator { rng, next_id: 1 }
    }

    /// Creates a generator whose output is reproducible from `seed`.
    #[inline]
    pub fn with_seed(seed: u64) -> Self {
        BallotGenerator::new(fastrand::Rng::with_seed(seed))
    }

    /// Generates `count` ballots over `candidates`.
    ///
    /// Each ballot ranks a random number (at least one) of candidates, taken from the front
    /// of a uniformly shuffled permutation. Ballot ids continue across calls.
    pub fn generate(&mut self, candidates: &[CandidateInfo], count: usize) -> Vec<Ballot> {
        let mut ballots = Vec::with_capacity(count);
        let mut order: Vec<&CandidateId> = candidates.iter().map(|c| &c.id).collect();

        for _ in 0..count {
            let id = self.next_id;
            self.next_id += 1;

            if order.is_empty() {
                ballots.push(Ballot::new(id, BTreeMap::new()));
                continue;
            }

            let length = self.rng.usize(1..=order.len());
            self.rng.shuffle(&mut order);
            ballots.push(Ballot::ranked(id, order[..length].iter().map(|c| (*c).clone())));
        }

        ballots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<CandidateInfo> {
        vec![
            CandidateInfo::new("a", "Alice", "Red"),
            CandidateInfo::new("b", "Bob", "Blue"),
            CandidateInfo::new("c", "Carol", ""),
            CandidateInfo::new("d", "Dan", "Green"),
        ]
    }

    fn index() -> FxHashMap<CandidateId, usize> {
        candidates().into_iter().enumerate().map(|(i, c)| (c.id, i)).collect()
    }

    #[test]
    fn test_resolve_in_rank_order() {
        let ballot = Ballot::ranked(1, ["c", "a", "d"]);
        assert_eq!(ballot.resolve(&index()).unwrap(), vec![2, 0, 3]);
    }

    #[test]
    fn test_resolve_blank_ballot() {
        let ballot = Ballot::new(1, BTreeMap::new());
        assert!(ballot.is_blank());
        assert!(ballot.resolve(&index()).unwrap().is_empty());
    }

    #[test]
    fn test_reject_duplicate_candidate() {
        let ballot = Ballot::ranked(7, ["a", "b", "a"]);
        let err = ballot.resolve(&index()).unwrap_err();
        assert!(matches!(err, Error::InvalidBallot(_)));
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_reject_rank_gap() {
        let mut preferences = BTreeMap::new();
        preferences.insert(1, "a".to_string());
        preferences.insert(3, "b".to_string());
        let err = Ballot::new(2, preferences).resolve(&index()).unwrap_err();
        assert!(err.to_string().contains("contiguous"));
    }

    #[test]
    fn test_reject_rank_zero() {
        let mut preferences = BTreeMap::new();
        preferences.insert(0, "a".to_string());
        let err = Ballot::new(3, preferences).resolve(&index()).unwrap_err();
        assert!(matches!(err, Error::InvalidBallot(_)));
    }

    #[test]
    fn test_reject_unknown_candidate() {
        let ballot = Ballot::ranked(4, ["a", "z"]);
        let err = ballot.resolve(&index()).unwrap_err();
        assert!(err.to_string().contains("unknown candidate(z)"));
    }

    #[test]
    fn test_generated_ballots_are_well_formed() {
        let candidates = candidates();
        let mut generator = BallotGenerator::with_seed(42);
        let ballots = generator.generate(&candidates, 200);
        assert_eq!(ballots.len(), 200);

        let index = index();
        for ballot in &ballots {
            let ranked = ballot.resolve(&index).unwrap();
            assert!(!ranked.is_empty());
            assert!(ranked.len() <= candidates.len());
        }

        let mut ids: Vec<_> = ballots.iter().map(|b| b.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_generator_is_reproducible() {
        let candidates = candidates();
        let first = BallotGenerator::with_seed(9).generate(&candidates, 50);
        let second = BallotGenerator::with_seed(9).generate(&candidates, 50);
        assert_eq!(first, second);
    }

    #[test]
    fn test_generator_ids_continue() {
        let candidates = candidates();
        let mut generator = BallotGenerator::with_seed(1);
        let first = generator.generate(&candidates, 3);
        let second = generator.generate(&candidates, 2);
        assert_eq!(first.last().unwrap().id, 3);
        assert_eq!(second[0].id, 4);
    }

    #[test]
    fn test_generator_without_candidates() {
        let ballots = BallotGenerator::with_seed(1).generate(&[], 3);
        assert_eq!(ballots.len(), 3);
        assert!(ballots.iter().all(Ballot::is_blank));
    }
}
