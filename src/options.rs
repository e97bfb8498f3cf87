use crate::error::{Error, Result};

/// Default ceiling on the number of counts the full-count driver performs
/// before falling back to filling the remaining seats by highest tally.
pub const DEFAULT_MAX_ROUNDS: u32 = 20;

/// The counting configurations.
#[derive(Debug, Clone)]
pub struct Options {
    /// The number of counts after which the driver stops transferring and fills any
    /// remaining seats from the highest tallies.
    ///
    /// Defaults to 20.
    ///
    /// **NOTE WELL:** this is a guard against pathological cycling, not a bound derived
    /// from the election. Lowering it changes the outcome of long counts.
    max_rounds: u32,

    /// How a tie for the lowest tally is resolved at elimination.
    tie_break: TieBreak,
}

/// How a tie between candidates sharing the lowest tally is resolved.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TieBreak {
    /// The candidate listed first among those tied is eliminated.
    ListOrder,
    /// One of the tied candidates is drawn by lot from a random source seeded with `seed`.
    Lot { seed: u64 },
}

impl Default for TieBreak {
    #[inline]
    fn default() -> Self {
        TieBreak::ListOrder
    }
}

impl Options {
    /// Creates a new `Options` with default values.
    #[inline]
    pub const fn new() -> Self {
        Options {
            max_rounds: DEFAULT_MAX_ROUNDS,
            tie_break: TieBreak::ListOrder,
        }
    }

    /// The number of counts after which the driver stops transferring.
    #[inline]
    pub const fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// How a tie for the lowest tally is resolved at elimination.
    #[inline]
    pub const fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Creates a new `Options` builder.
    #[inline]
    pub const fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        Options::new()
    }
}

/// The builder of counting configurations.
#[derive(Debug, Default)]
pub struct OptionsBuilder {
    max_rounds: Option<u32>,
    tie_break: Option<TieBreak>,
}

impl OptionsBuilder {
    /// Creates a new `Options` builder.
    #[inline]
    pub const fn new() -> Self {
        OptionsBuilder {
            max_rounds: None,
            tie_break: None,
        }
    }

    /// The number of counts after which the driver stops transferring.
    #[inline]
    pub const fn max_rounds(mut self, val: u32) -> Self {
        self.max_rounds = Some(val);
        self
    }

    /// How a tie for the lowest tally is resolved at elimination.
    #[inline]
    pub const fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = Some(tie_break);
        self
    }

    /// Builds a new `Options`.
    #[inline]
    pub fn build(self) -> Result<Options> {
        let max_rounds = self.max_rounds.unwrap_or(DEFAULT_MAX_ROUNDS);
        if max_rounds == 0 {
            return Err(Error::InvalidOptions(format!(
                "max rounds({}) is invalid: at least the first count must be allowed",
                max_rounds
            )));
        }

        let tie_break = self.tie_break.unwrap_or_default();

        Ok(Options { max_rounds, tie_break })
    }
}
