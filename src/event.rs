use crate::candidate::CandidateId;
use crate::error::Result;

/// The event of the count.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    FirstCount { quota: u64 },
    Elected { candidate: CandidateId, count: u32, met_quota: bool },
    SurplusDistributed { candidate: CandidateId, count: u32, surplus: f64 },
    Eliminated { candidate: CandidateId, count: u32, votes: f64 },
    Completed { counts: u32 },
}

/// The event handler of the count, e.g. an audit log.
pub trait EventHandler: Send + Sync {
    /// Handle the given count event.
    fn handle_event(&self, event: Event) -> Result<()>;
}
