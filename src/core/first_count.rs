use crate::core::{Counter, Paper, Stage};
use crate::report::ElectionResult;
use crate::{Event, TieBreak};

pub struct FirstCount<'a> {
    core: &'a mut Counter,
}

impl<'a> FirstCount<'a> {
    #[inline]
    pub fn new(core: &'a mut Counter) -> Self {
        Self { core }
    }

    pub fn run(mut self) -> ElectionResult {
        self.reset();

        let core = self.core;
        core.current_count = 1;
        core.quota = core.compute_quota(core.ballots.len() as u64);
        info!(
            "[Count({})][Quota({})] start the first count of {} ballots for {} seats",
            core.current_count,
            core.quota,
            core.ballots.len(),
            core.seats
        );

        for paper in 0..core.papers.len() {
            match core.next_preference(core.papers[paper].ballot, false) {
                Some(candidate) => core.credit(candidate, paper),
                None => {
                    debug!(
                        "[Count({})][Quota({})] ballot({}) expresses no preference",
                        core.current_count, core.quota, core.ballots[core.papers[paper].ballot].id
                    );
                    core.non_transferable += core.papers[paper].value;
                }
            }
        }

        let mut events = vec![Event::FirstCount { quota: core.quota }];
        events.extend(core.check_elections());
        core.stage = Stage::Counting;
        core.record_count(String::from("Count 1: First Preferences"));
        core.emit_all(events);
        core.current_results()
    }

    /// Discards everything a previous count left behind.
    fn reset(&mut self) {
        let core = &mut *self.core;
        core.quota = 0;
        core.current_count = 0;
        core.elected.clear();
        core.eliminated.clear();
        core.counts.clear();
        core.non_transferable = 0.0;
        for candidate in core.candidates.iter_mut() {
            candidate.reset();
        }
        core.papers = (0..core.ballots.len())
            .map(|ballot| Paper { ballot, value: 1.0 })
            .collect();
        if let TieBreak::Lot { seed } = core.options.tie_break() {
            core.tie_rng = Some(fastrand::Rng::with_seed(seed));
        }
    }
}
