use crate::candidate::{CandidateId, Status};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rounds a tally to two decimal places for reporting.
#[inline]
pub(crate) fn round_votes(votes: f64) -> f64 {
    (votes * 100.0).round() / 100.0
}

/// A candidate's standing as recorded at the end of a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    /// Tally rounded to two decimal places.
    pub votes: f64,
    pub status: Status,
}

/// An immutable record of the state of the count after one count was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountSnapshot {
    /// Sequential count number, starting from 1.
    pub count: u32,
    pub description: String,
    pub quota: u64,
    pub candidates: Vec<CandidateSnapshot>,
    /// Number of candidates elected so far.
    pub elected: usize,
    pub seats_remaining: usize,
    /// Weight that found no continuing candidate so far, rounded to two decimal places.
    pub non_transferable: f64,
}

impl fmt::Display for CountSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.description)?;
        writeln!(
            f,
            "  quota {}, {} elected, {} seat(s) remaining",
            self.quota, self.elected, self.seats_remaining
        )?;
        for candidate in &self.candidates {
            writeln!(
                f,
                "  {:<24} {:<16} {:>10.2}  {}",
                candidate.name, candidate.party, candidate.votes, candidate.status
            )?;
        }
        write!(f, "  {:<24} {:<16} {:>10.2}", "non-transferable", "", self.non_transferable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_votes() {
        assert_eq!(round_votes(3.0), 3.0);
        assert_eq!(round_votes(2.999_999_999), 3.0);
        assert_eq!(round_votes(1.0 / 3.0), 0.33);
        assert_eq!(round_votes(2.0 / 3.0), 0.67);
    }

    #[test]
    fn test_display() {
        let snapshot = CountSnapshot {
            count: 1,
            description: "Count 1: First Preferences".to_string(),
            quota: 4,
            candidates: vec![CandidateSnapshot {
                id: "a".to_string(),
                name: "Alice".to_string(),
                party: "Red".to_string(),
                votes: 6.0,
                status: Status::Elected,
            }],
            elected: 1,
            seats_remaining: 1,
            non_transferable: 0.0,
        };
        let text = snapshot.to_string();
        assert!(text.starts_with("Count 1: First Preferences\n"));
        assert!(text.contains("quota 4, 1 elected, 1 seat(s) remaining"));
        assert!(text.contains("6.00  elected"));
    }
}
