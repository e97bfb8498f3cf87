use crate::ballot::{Ballot, BallotGenerator, BallotId};
use crate::candidate::{CandidateId, CandidateInfo, CandidateState, Status};
use crate::core::elimination::Elimination;
use crate::core::final_fill::FinalFill;
use crate::core::first_count::FirstCount;
use crate::core::surplus::SurplusDistribution;
use crate::error::{Error, Result};
use crate::report::{CandidateStanding, CountOutcome, ElectedCandidate, ElectionResult, EliminatedCandidate, Summary};
use crate::snapshot::{round_votes, CandidateSnapshot, CountSnapshot};
use crate::{Event, EventHandler, Options, TieBreak};
use fxhash::FxHashMap;
use std::sync::Arc;

mod elimination;
mod final_fill;
mod first_count;
mod surplus;

/// Computes the Droop quota: `floor(total_valid_votes / (seats + 1)) + 1`.
#[inline]
pub fn droop_quota(total_valid_votes: u64, seats: usize) -> u64 {
    total_valid_votes / (seats as u64 + 1) + 1
}

/// The stage of the count.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Stage {
    /// No count has been made yet.
    Pending,
    /// The first count has been made and further counts may follow.
    Counting,
    /// No further counts will be made.
    Complete,
}

/// A ballot paper or a transfer copy of one, credited to at most one candidate.
#[derive(Debug, Copy, Clone)]
struct Paper {
    /// Index into the ballot arena.
    ballot: usize,
    value: f64,
}

/// A validated ballot with its preferences resolved to candidate indices, in rank order.
#[derive(Debug, Clone)]
struct RankedBallot {
    id: BallotId,
    ranked: Vec<usize>,
}

#[derive(Debug, Copy, Clone)]
struct ElectedRecord {
    candidate: usize,
    count: u32,
    without_quota: bool,
}

#[derive(Debug, Copy, Clone)]
struct EliminatedRecord {
    candidate: usize,
    count: u32,
}

/// The PR-STV counter.
///
/// A counter owns every candidate, ballot and transfer copy of a single count. Cross references
/// are indices into its arenas, so candidates and ballots are never shared between counters.
pub struct Counter {
    options: Options,
    seats: usize,

    candidates: Vec<CandidateState>,
    candidate_index: FxHashMap<CandidateId, usize>,
    ballots: Vec<RankedBallot>,
    ballot_index: FxHashMap<BallotId, usize>,
    papers: Vec<Paper>,

    stage: Stage,
    quota: u64,
    current_count: u32,
    elected: Vec<ElectedRecord>,
    eliminated: Vec<EliminatedRecord>,
    non_transferable: f64,
    counts: Vec<CountSnapshot>,

    tie_rng: Option<fastrand::Rng>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl Counter {
    /// Creates a counter with default options.
    #[inline]
    pub fn new(candidates: Vec<CandidateInfo>, seats: usize) -> Result<Self> {
        Counter::with_options(candidates, seats, Options::default())
    }

    /// Creates a counter for `seats` seats among `candidates`.
    ///
    /// More seats than candidates is permitted: every candidate ends up elected.
    pub fn with_options(candidates: Vec<CandidateInfo>, seats: usize, options: Options) -> Result<Self> {
        if seats < 1 {
            return Err(Error::InvalidSeats(format!(
                "seats({}) is invalid: at least one seat must be filled",
                seats
            )));
        }
        if candidates.is_empty() {
            return Err(Error::InvalidCandidates(String::from(
                "candidate list is empty: at least one candidate must stand",
            )));
        }

        let mut candidate_index = FxHashMap::default();
        for (i, candidate) in candidates.iter().enumerate() {
            if candidate_index.insert(candidate.id.clone(), i).is_some() {
                return Err(Error::InvalidCandidates(format!(
                    "candidate id({}) appears more than once",
                    candidate.id
                )));
            }
        }

        let tie_rng = match options.tie_break() {
            TieBreak::ListOrder => None,
            TieBreak::Lot { seed } => Some(fastrand::Rng::with_seed(seed)),
        };

        Ok(Counter {
            options,
            seats,
            candidates: candidates.into_iter().map(CandidateState::new).collect(),
            candidate_index,
            ballots: Vec::new(),
            ballot_index: FxHashMap::default(),
            papers: Vec::new(),
            stage: Stage::Pending,
            quota: 0,
            current_count: 0,
            elected: Vec::new(),
            eliminated: Vec::new(),
            non_transferable: 0.0,
            counts: Vec::new(),
            tie_rng,
            event_handler: None,
        })
    }

    /// Sets the handler receiving an event for every election, elimination and transfer.
    #[inline]
    pub fn set_event_handler(&mut self, event_handler: Arc<dyn EventHandler>) {
        self.event_handler = Some(event_handler);
    }

    /// Replaces the ballot set.
    ///
    /// Every ballot is checked before any is accepted; a single malformed ballot rejects the
    /// whole set.
    pub fn set_ballots(&mut self, ballots: Vec<Ballot>) -> Result<()> {
        if self.stage != Stage::Pending {
            return Err(Error::NotAllowed(format!(
                "can't replace ballots in {:?} stage",
                self.stage
            )));
        }

        let mut ranked_ballots = Vec::with_capacity(ballots.len());
        let mut ballot_index = FxHashMap::default();
        for (i, ballot) in ballots.iter().enumerate() {
            if ballot_index.insert(ballot.id, i).is_some() {
                return Err(Error::InvalidBallot(format!("ballot id({}) appears more than once", ballot.id)));
            }
            ranked_ballots.push(RankedBallot {
                id: ballot.id,
                ranked: ballot.resolve(&self.candidate_index)?,
            });
        }

        debug!("accepted {} ballots for {} seats", ranked_ballots.len(), self.seats);
        self.ballots = ranked_ballots;
        self.ballot_index = ballot_index;
        Ok(())
    }

    /// Generates `count` synthetic ballots over this counter's candidates and uses them as the
    /// ballot set.
    pub fn generate_ballots(&mut self, count: usize, generator: &mut BallotGenerator) -> Result<()> {
        let infos: Vec<CandidateInfo> = self.candidates.iter().map(|c| c.info.clone()).collect();
        let ballots = generator.generate(&infos, count);
        self.set_ballots(ballots)
    }

    /// Computes the quota for this counter's seats.
    #[inline]
    pub fn compute_quota(&self, total_valid_votes: u64) -> u64 {
        droop_quota(total_valid_votes, self.seats)
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[inline]
    pub fn seats(&self) -> usize {
        self.seats
    }

    /// The quota fixed at the first count, 0 before it.
    #[inline]
    pub fn quota(&self) -> u64 {
        self.quota
    }

    #[inline]
    pub fn current_count(&self) -> u32 {
        self.current_count
    }

    #[inline]
    pub fn ballot_count(&self) -> usize {
        self.ballots.len()
    }

    /// Every count snapshot recorded so far, in order.
    #[inline]
    pub fn counts(&self) -> &[CountSnapshot] {
        &self.counts
    }

    #[inline]
    pub fn seats_remaining(&self) -> usize {
        self.seats.saturating_sub(self.elected.len())
    }

    /// Resolves the first candidate on ballot `ballot_id` still able to receive its vote.
    ///
    /// With `exclude_elected` unset, elected candidates are valid targets as at the first count.
    /// Returns `None` for an unknown ballot or when the ballot is non-transferable.
    pub fn current_preference(&self, ballot_id: BallotId, exclude_elected: bool) -> Option<&CandidateInfo> {
        let ballot = *self.ballot_index.get(&ballot_id)?;
        self.next_preference(ballot, exclude_elected)
            .map(|c| &self.candidates[c].info)
    }

    /// Indicates whether every seat is filled or every continuing candidate can take a seat.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.elected.len() >= self.seats || self.active_count() <= self.seats_remaining()
    }

    /// Makes the first count, resetting any previous count.
    pub fn first_count(&mut self) -> ElectionResult {
        FirstCount::new(self).run()
    }

    /// Distributes the surplus of elected candidate `candidate_id` as a new count.
    pub fn distribute_surplus(&mut self, candidate_id: &str) -> Result<ElectionResult> {
        self.check_counting("distribute surplus")?;
        let candidate = self.lookup(candidate_id)?;
        Ok(SurplusDistribution::new(self, candidate).run())
    }

    /// Eliminates the continuing candidate with the lowest tally as a new count.
    pub fn eliminate_lowest(&mut self) -> Result<ElectionResult> {
        self.check_counting("eliminate")?;
        Ok(Elimination::new(self).run())
    }

    /// Applies the next count and returns the results after it, or `None` once the count is
    /// complete.
    pub fn step(&mut self) -> Option<ElectionResult> {
        match self.stage {
            Stage::Pending => Some(self.first_count()),
            Stage::Counting => {
                if !self.is_complete() && self.current_count < self.options.max_rounds() {
                    return match self.surplus_holder() {
                        Some(candidate) => Some(SurplusDistribution::new(self, candidate).run()),
                        None => Some(Elimination::new(self).run()),
                    };
                }

                if !self.is_complete() {
                    warn!(
                        "[Count({})][Quota({})] stop transferring after reaching max rounds({})",
                        self.current_count,
                        self.quota,
                        self.options.max_rounds()
                    );
                }

                let result = if self.seats_remaining() > 0 && self.active_count() > 0 {
                    Some(FinalFill::new(self).run())
                } else {
                    None
                };

                self.stage = Stage::Complete;
                info!(
                    "[Count({})][Quota({})] count complete, {} of {} seats filled",
                    self.current_count,
                    self.quota,
                    self.elected.len(),
                    self.seats
                );
                self.emit(Event::Completed {
                    counts: self.current_count,
                });
                result
            }
            Stage::Complete => None,
        }
    }

    /// Runs the full count from the first count to completion.
    pub fn run(&mut self) -> CountOutcome {
        self.stage = Stage::Pending;
        while self.step().is_some() {}

        let final_results = self.current_results();
        let summary = Summary::from(&final_results);
        CountOutcome {
            final_results,
            all_counts: self.counts.clone(),
            summary,
        }
    }

    /// The results as they stand after the latest count.
    pub fn current_results(&self) -> ElectionResult {
        ElectionResult {
            current_count: self.current_count,
            quota: self.quota,
            total_seats: self.seats,
            seats_remaining: self.seats_remaining(),
            candidates: self
                .candidates
                .iter()
                .map(|c| CandidateStanding {
                    id: c.info.id.clone(),
                    name: c.info.name.clone(),
                    party: c.info.party.clone(),
                    votes: c.votes,
                    status: c.status,
                })
                .collect(),
            elected: self
                .elected
                .iter()
                .map(|r| {
                    let c = &self.candidates[r.candidate];
                    ElectedCandidate {
                        id: c.info.id.clone(),
                        name: c.info.name.clone(),
                        party: c.info.party.clone(),
                        votes: c.votes,
                        elected_on_count: r.count,
                        elected_without_quota: r.without_quota,
                    }
                })
                .collect(),
            eliminated: self
                .eliminated
                .iter()
                .map(|r| {
                    let c = &self.candidates[r.candidate];
                    EliminatedCandidate {
                        id: c.info.id.clone(),
                        name: c.info.name.clone(),
                        party: c.info.party.clone(),
                        eliminated_on_count: r.count,
                    }
                })
                .collect(),
            non_transferable: self.non_transferable,
            is_complete: self.is_complete(),
        }
    }

    /// Summary of the count as it stands.
    #[inline]
    pub fn summary(&self) -> Summary {
        Summary::from(&self.current_results())
    }

    #[inline]
    fn check_counting(&self, action: &str) -> Result<()> {
        if self.stage == Stage::Pending {
            return Err(Error::NotAllowed(format!(
                "can't {} before the first count",
                action
            )));
        }
        Ok(())
    }

    #[inline]
    fn lookup(&self, candidate_id: &str) -> Result<usize> {
        self.candidate_index
            .get(candidate_id)
            .copied()
            .ok_or_else(|| Error::InvalidCandidates(format!("unknown candidate({})", candidate_id)))
    }

    #[inline]
    fn active_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_active()).count()
    }

    /// The first elected candidate, in list order, holding more than the quota.
    #[inline]
    fn surplus_holder(&self) -> Option<usize> {
        let quota = self.quota as f64;
        self.candidates
            .iter()
            .position(|c| c.status == Status::Elected && c.votes > quota)
    }

    fn next_preference(&self, ballot: usize, exclude_elected: bool) -> Option<usize> {
        self.ballots[ballot]
            .ranked
            .iter()
            .copied()
            .find(|&c| match self.candidates[c].status {
                Status::Active => true,
                Status::Elected => !exclude_elected,
                Status::Eliminated => false,
            })
    }

    /// Credits `paper` to `candidate`.
    #[inline]
    fn credit(&mut self, candidate: usize, paper: usize) {
        let value = self.papers[paper].value;
        let c = &mut self.candidates[candidate];
        c.votes += value;
        c.papers.push(paper);
    }

    /// Elects active candidates at or above the quota, in list order, until every seat is filled.
    fn check_elections(&mut self) -> Vec<Event> {
        let quota = self.quota as f64;
        let count = self.current_count;
        let mut events = Vec::new();

        for (i, c) in self.candidates.iter_mut().enumerate() {
            if self.elected.len() >= self.seats {
                break;
            }
            if c.is_active() && c.votes >= quota {
                c.status = Status::Elected;
                info!(
                    "[Count({})][Quota({})] candidate({}) elected with {:.2} votes",
                    count, self.quota, c.info.id, c.votes
                );
                self.elected.push(ElectedRecord {
                    candidate: i,
                    count,
                    without_quota: false,
                });
                events.push(Event::Elected {
                    candidate: c.info.id.clone(),
                    count,
                    met_quota: true,
                });
            }
        }

        events
    }

    /// Appends a snapshot of the current state to the count log.
    fn record_count(&mut self, description: String) {
        let snapshot = CountSnapshot {
            count: self.current_count,
            description,
            quota: self.quota,
            candidates: self
                .candidates
                .iter()
                .map(|c| CandidateSnapshot {
                    id: c.info.id.clone(),
                    name: c.info.name.clone(),
                    party: c.info.party.clone(),
                    votes: round_votes(c.votes),
                    status: c.status,
                })
                .collect(),
            elected: self.elected.len(),
            seats_remaining: self.seats_remaining(),
            non_transferable: round_votes(self.non_transferable),
        };
        debug!("[Count({})][Quota({})] recorded: {}", self.current_count, self.quota, snapshot.description);
        self.counts.push(snapshot);
    }

    #[inline]
    fn emit(&self, event: Event) {
        if let Some(handler) = &self.event_handler {
            if let Err(e) = handler.handle_event(event.clone()) {
                error!(
                    "[Count({})][Quota({})] failed to handle event ({:?}): {}",
                    self.current_count, self.quota, event, e
                );
            }
        }
    }

    #[inline]
    fn emit_all(&self, events: Vec<Event>) {
        for event in events {
            self.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<CandidateInfo> {
        (0..n)
            .map(|i| CandidateInfo::new(format!("c{}", i), format!("Candidate {}", i), ""))
            .collect()
    }

    #[test]
    fn test_droop_quota() {
        assert_eq!(droop_quota(10, 1), 6);
        assert_eq!(droop_quota(10, 2), 4);
        assert_eq!(droop_quota(100, 3), 26);
        assert_eq!(droop_quota(0, 3), 1);
        assert_eq!(droop_quota(1, 1), 1);
    }

    #[test]
    fn test_reject_zero_seats() {
        let result = Counter::new(candidates(3), 0);
        assert!(matches!(result, Err(Error::InvalidSeats(_))));
    }

    #[test]
    fn test_reject_empty_candidates() {
        let result = Counter::new(Vec::new(), 1);
        assert!(matches!(result, Err(Error::InvalidCandidates(_))));
    }

    #[test]
    fn test_reject_duplicate_candidate_ids() {
        let mut list = candidates(2);
        list.push(CandidateInfo::new("c0", "Again", ""));
        let result = Counter::new(list, 1);
        assert!(matches!(result, Err(Error::InvalidCandidates(_))));
    }

    #[test]
    fn test_more_seats_than_candidates_allowed() {
        let counter = Counter::new(candidates(2), 5).unwrap();
        assert_eq!(counter.seats(), 5);
        assert_eq!(counter.stage(), Stage::Pending);
    }

    #[test]
    fn test_reject_duplicate_ballot_ids() {
        let mut counter = Counter::new(candidates(2), 1).unwrap();
        let result = counter.set_ballots(vec![Ballot::ranked(1, ["c0"]), Ballot::ranked(1, ["c1"])]);
        assert!(matches!(result, Err(Error::InvalidBallot(_))));
        assert_eq!(counter.ballot_count(), 0);
    }

    #[test]
    fn test_reject_ballots_after_first_count() {
        let mut counter = Counter::new(candidates(2), 1).unwrap();
        counter.first_count();
        let result = counter.set_ballots(vec![Ballot::ranked(1, ["c0"])]);
        assert!(matches!(result, Err(Error::NotAllowed(_))));
    }

    #[test]
    fn test_transfer_before_first_count_rejected() {
        let mut counter = Counter::new(candidates(2), 1).unwrap();
        assert!(matches!(counter.eliminate_lowest(), Err(Error::NotAllowed(_))));
        assert!(matches!(counter.distribute_surplus("c0"), Err(Error::NotAllowed(_))));
    }

    #[test]
    fn test_current_preference() {
        let mut counter = Counter::new(candidates(3), 1).unwrap();
        counter
            .set_ballots(vec![Ballot::ranked(10, ["c1", "c2"]), Ballot::ranked(11, Vec::<String>::new())])
            .unwrap();
        assert_eq!(counter.current_preference(10, true).unwrap().id, "c1");
        assert!(counter.current_preference(11, false).is_none());
        assert!(counter.current_preference(99, false).is_none());

        counter.candidates[1].status = Status::Elected;
        assert_eq!(counter.current_preference(10, false).unwrap().id, "c1");
        assert_eq!(counter.current_preference(10, true).unwrap().id, "c2");

        counter.candidates[2].status = Status::Eliminated;
        assert!(counter.current_preference(10, true).is_none());
    }

    #[test]
    fn test_surplus_holder_picks_first_in_list_order() {
        let mut counter = Counter::new(candidates(3), 2).unwrap();
        counter.quota = 4;
        counter.candidates[1].status = Status::Elected;
        counter.candidates[1].votes = 5.0;
        counter.candidates[2].status = Status::Elected;
        counter.candidates[2].votes = 6.0;
        assert_eq!(counter.surplus_holder(), Some(1));

        counter.candidates[1].votes = 4.0;
        assert_eq!(counter.surplus_holder(), Some(2));
    }

    #[test]
    fn test_election_check_stops_at_seat_limit() {
        let mut counter = Counter::new(candidates(3), 2).unwrap();
        counter.quota = 4;
        for c in counter.candidates.iter_mut() {
            c.votes = 5.0;
        }

        let events = counter.check_elections();
        assert_eq!(events.len(), 2);
        assert_eq!(counter.elected.len(), 2);
        assert_eq!(counter.candidates[0].status, Status::Elected);
        assert_eq!(counter.candidates[1].status, Status::Elected);
        assert_eq!(counter.candidates[2].status, Status::Active);
        assert!(counter.check_elections().is_empty());
    }

    #[test]
    fn test_transfer_values_stay_within_one() {
        let mut ballots = Vec::new();
        let mut add = |copies: usize, ranking: &[&str]| {
            for _ in 0..copies {
                let id = ballots.len() as u64 + 1;
                ballots.push(Ballot::ranked(id, ranking.iter().copied()));
            }
        };
        add(30, &["c0"]);
        add(2, &["c0", "c1", "c2"]);
        add(1, &["c0", "c1", "c3"]);
        add(9, &["c1"]);

        let mut counter = Counter::new(candidates(5), 3).unwrap();
        counter.set_ballots(ballots).unwrap();
        counter.run();

        assert!(counter.papers.len() > counter.ballots.len());
        for paper in &counter.papers {
            assert!(paper.value > 0.0 && paper.value <= 1.0, "paper value {}", paper.value);
        }
        assert!(counter.non_transferable >= 0.0);
        assert_eq!(counter.elected.len(), 3);
    }
}
