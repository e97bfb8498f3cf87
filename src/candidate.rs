use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique id used to identify a candidate.
pub type CandidateId = String;

/// A candidate standing in the election, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub id: CandidateId,
    pub name: String,
    /// Free-text party label, empty for independents.
    #[serde(default)]
    pub party: String,
}

impl CandidateInfo {
    #[inline]
    pub fn new(id: impl Into<CandidateId>, name: impl Into<String>, party: impl Into<String>) -> Self {
        CandidateInfo {
            id: id.into(),
            name: name.into(),
            party: party.into(),
        }
    }
}

/// The status of a candidate during the count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    Elected,
    Eliminated,
}

impl Status {
    #[inline]
    pub fn is_active(self) -> bool {
        self == Status::Active
    }
}

impl fmt::Display for Status {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => f.write_str("active"),
            Status::Elected => f.write_str("elected"),
            Status::Eliminated => f.write_str("eliminated"),
        }
    }
}

/// Per-count state of a candidate, held in the counter's arena.
#[derive(Debug, Clone)]
pub(crate) struct CandidateState {
    pub(crate) info: CandidateInfo,
    pub(crate) votes: f64,
    pub(crate) status: Status,
    /// Indices into the counter's paper arena, in the order they were credited.
    pub(crate) papers: Vec<usize>,
}

impl CandidateState {
    #[inline]
    pub(crate) fn new(info: CandidateInfo) -> Self {
        CandidateState {
            info,
            votes: 0.0,
            status: Status::Active,
            papers: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn reset(&mut self) {
        self.votes = 0.0;
        self.status = Status::Active;
        self.papers.clear();
    }

    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
