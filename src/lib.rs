//! PR-STV (proportional representation by single transferable vote) counting engine.
//!
//! A [`Counter`] takes the candidates, the number of seats and a set of ranked ballots, then
//! counts in rounds: first preferences, distribution of surpluses above the Droop quota, and
//! elimination of the lowest candidate, until every seat is filled.
//!
//! ```
//! use prstv::{Ballot, CandidateInfo, Counter};
//!
//! let candidates = vec![
//!     CandidateInfo::new("a", "Alice", "Red"),
//!     CandidateInfo::new("b", "Bob", "Blue"),
//! ];
//! let mut counter = Counter::new(candidates, 1).unwrap();
//! counter
//!     .set_ballots(vec![
//!         Ballot::ranked(1, ["a", "b"]),
//!         Ballot::ranked(2, ["a"]),
//!         Ballot::ranked(3, ["b"]),
//!     ])
//!     .unwrap();
//!
//! let outcome = counter.run();
//! assert_eq!(outcome.summary.elected[0].name, "Alice");
//! ```

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

mod ballot;
mod candidate;
mod core;
mod error;
mod event;
mod options;
mod report;
mod snapshot;

pub use crate::ballot::{Ballot, BallotGenerator, BallotId};
pub use crate::candidate::{CandidateId, CandidateInfo, Status};
pub use crate::core::{droop_quota, Counter, Stage};
pub use crate::error::{Error, Result};
pub use crate::event::{Event, EventHandler};
pub use crate::options::{Options, OptionsBuilder, TieBreak, DEFAULT_MAX_ROUNDS};
pub use crate::report::{
    CandidateStanding, CountOutcome, ElectedCandidate, ElectedSummary, ElectionResult, EliminatedCandidate,
    EliminatedSummary, Summary,
};
pub use crate::snapshot::{CandidateSnapshot, CountSnapshot};
