use crate::candidate::Status;
use crate::core::{Counter, EliminatedRecord};
use crate::report::ElectionResult;
use crate::Event;

pub struct Elimination<'a> {
    core: &'a mut Counter,
}

impl<'a> Elimination<'a> {
    #[inline]
    pub fn new(core: &'a mut Counter) -> Self {
        Self { core }
    }

    pub fn run(mut self) -> ElectionResult {
        self.core.current_count += 1;

        let candidate = match self.select_lowest() {
            Some(candidate) => candidate,
            None => {
                debug!(
                    "[Count({})][Quota({})] no active candidate left to eliminate",
                    self.core.current_count, self.core.quota
                );
                return self.core.current_results();
            }
        };

        let core = self.core;
        let count = core.current_count;
        let (votes, papers) = {
            let c = &mut core.candidates[candidate];
            c.status = Status::Eliminated;
            let votes = c.votes;
            c.votes = 0.0;
            (votes, std::mem::take(&mut c.papers))
        };
        core.eliminated.push(EliminatedRecord { candidate, count });
        info!(
            "[Count({})][Quota({})] eliminate candidate({}) with {:.2} votes, transferring {} papers",
            count,
            core.quota,
            core.candidates[candidate].info.id,
            votes,
            papers.len()
        );

        for paper in papers {
            match core.next_preference(core.papers[paper].ballot, true) {
                Some(target) => core.credit(target, paper),
                None => {
                    debug!(
                        "[Count({})][Quota({})] ballot({}) is exhausted",
                        count, core.quota, core.ballots[core.papers[paper].ballot].id
                    );
                    core.non_transferable += core.papers[paper].value;
                }
            }
        }

        let mut events = vec![Event::Eliminated {
            candidate: core.candidates[candidate].info.id.clone(),
            count,
            votes,
        }];
        events.extend(core.check_elections());
        let description = format!(
            "Count {}: Elimination of {} ({:.2} votes)",
            count, core.candidates[candidate].info.name, votes
        );
        core.record_count(description);
        core.emit_all(events);
        core.current_results()
    }

    /// Picks the active candidate with the lowest tally, breaking ties per the configured policy.
    fn select_lowest(&mut self) -> Option<usize> {
        let core = &mut *self.core;
        let lowest = core
            .candidates
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.votes)
            .fold(None, |min: Option<f64>, votes| match min {
                Some(min) if min <= votes => Some(min),
                _ => Some(votes),
            })?;

        let tied: Vec<usize> = core
            .candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_active() && c.votes == lowest)
            .map(|(i, _)| i)
            .collect();

        let chosen = match core.tie_rng.as_mut() {
            Some(rng) if tied.len() > 1 => {
                let chosen = tied[rng.usize(..tied.len())];
                debug!(
                    "[Count({})][Quota({})] {} candidates tied at {:.2}, candidate({}) drawn by lot",
                    core.current_count,
                    core.quota,
                    tied.len(),
                    lowest,
                    core.candidates[chosen].info.id
                );
                chosen
            }
            _ => tied[0],
        };
        Some(chosen)
    }
}
