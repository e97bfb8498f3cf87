use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Error related to counting.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidOptions(String),
    InvalidCandidates(String),
    InvalidSeats(String),
    InvalidBallot(String),
    NotAllowed(String),
    EventError(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidOptions(s) => f.write_str(s),
            Error::InvalidCandidates(s) => f.write_str(s),
            Error::InvalidSeats(s) => f.write_str(s),
            Error::InvalidBallot(s) => f.write_str(s),
            Error::NotAllowed(s) => f.write_str(s),
            Error::EventError(s) => f.write_str(s),
        }
    }
}
