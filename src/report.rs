use crate::candidate::{CandidateId, Status};
use crate::snapshot::CountSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A candidate's standing in the current results view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateStanding {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    pub votes: f64,
    pub status: Status,
}

/// A candidate who has been elected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectedCandidate {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    pub votes: f64,
    /// The count on which the candidate was elected.
    pub elected_on_count: u32,
    /// Set when the seat was filled by highest tally rather than by reaching the quota.
    pub elected_without_quota: bool,
}

impl ElectedCandidate {
    #[inline]
    pub fn met_quota(&self) -> bool {
        !self.elected_without_quota
    }
}

/// A candidate who has been eliminated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminatedCandidate {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    /// The count on which the candidate was eliminated.
    pub eliminated_on_count: u32,
}

/// The results of the count as they stand after the latest count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionResult {
    pub current_count: u32,
    pub quota: u64,
    pub total_seats: usize,
    pub seats_remaining: usize,
    pub candidates: Vec<CandidateStanding>,
    /// Elected candidates in the order they were elected.
    pub elected: Vec<ElectedCandidate>,
    /// Eliminated candidates in the order they were eliminated.
    pub eliminated: Vec<EliminatedCandidate>,
    /// Weight of ballots and surplus that found no continuing candidate.
    pub non_transferable: f64,
    pub is_complete: bool,
}

/// An elected candidate as reported in the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectedSummary {
    pub name: String,
    pub party: String,
    pub votes: f64,
    pub elected_on_count: u32,
    pub met_quota: bool,
}

/// An eliminated candidate as reported in the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminatedSummary {
    pub name: String,
    pub party: String,
    pub eliminated_on_count: u32,
}

/// Summary of a completed count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_counts: u32,
    pub quota: u64,
    pub elected: Vec<ElectedSummary>,
    pub eliminated: Vec<EliminatedSummary>,
}

impl From<&ElectionResult> for Summary {
    fn from(result: &ElectionResult) -> Self {
        Summary {
            total_counts: result.current_count,
            quota: result.quota,
            elected: result
                .elected
                .iter()
                .map(|c| ElectedSummary {
                    name: c.name.clone(),
                    party: c.party.clone(),
                    votes: c.votes,
                    elected_on_count: c.elected_on_count,
                    met_quota: c.met_quota(),
                })
                .collect(),
            eliminated: result
                .eliminated
                .iter()
                .map(|c| EliminatedSummary {
                    name: c.name.clone(),
                    party: c.party.clone(),
                    eliminated_on_count: c.eliminated_on_count,
                })
                .collect(),
        }
    }
}

#[inline]
fn party_label(party: &str) -> &str {
    if party.is_empty() {
        "Independent"
    } else {
        party
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quota: {}", self.quota)?;
        writeln!(f, "Counts: {}", self.total_counts)?;
        writeln!(f, "Elected:")?;
        for (i, c) in self.elected.iter().enumerate() {
            write!(
                f,
                "  {}. {} ({}) {:.2} votes, count {}",
                i + 1,
                c.name,
                party_label(&c.party),
                c.votes,
                c.elected_on_count
            )?;
            if !c.met_quota {
                f.write_str(", without reaching quota")?;
            }
            writeln!(f)?;
        }
        write!(f, "Eliminated:")?;
        if self.eliminated.is_empty() {
            f.write_str(" none")?;
        }
        for c in &self.eliminated {
            write!(
                f,
                "\n  {} ({}) on count {}",
                c.name,
                party_label(&c.party),
                c.eliminated_on_count
            )?;
        }
        Ok(())
    }
}

/// Everything produced by a full count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountOutcome {
    pub final_results: ElectionResult,
    /// Every count snapshot, in order.
    pub all_counts: Vec<CountSnapshot>,
    pub summary: Summary,
}
