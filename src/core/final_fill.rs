use crate::candidate::Status;
use crate::core::{Counter, ElectedRecord};
use crate::report::ElectionResult;
use crate::Event;
use std::cmp::Ordering;

/// Fills the seats still open once transfers stop, from the highest continuing tallies.
///
/// No new count number is opened: the candidates are elected on the count that was current
/// and the closing snapshot carries that number.
pub struct FinalFill<'a> {
    core: &'a mut Counter,
}

impl<'a> FinalFill<'a> {
    #[inline]
    pub fn new(core: &'a mut Counter) -> Self {
        Self { core }
    }

    pub fn run(self) -> ElectionResult {
        let core = self.core;
        let count = core.current_count;
        let seats_remaining = core.seats_remaining();

        let mut active: Vec<usize> = (0..core.candidates.len())
            .filter(|&i| core.candidates[i].is_active())
            .collect();
        // Stable, so equal tallies keep list order.
        active.sort_by(|&a, &b| {
            core.candidates[b]
                .votes
                .partial_cmp(&core.candidates[a].votes)
                .unwrap_or(Ordering::Equal)
        });

        let mut events = Vec::new();
        for &candidate in active.iter().take(seats_remaining) {
            let c = &mut core.candidates[candidate];
            c.status = Status::Elected;
            info!(
                "[Count({})][Quota({})] candidate({}) fills a remaining seat with {:.2} votes",
                count, core.quota, c.info.id, c.votes
            );
            events.push(Event::Elected {
                candidate: c.info.id.clone(),
                count,
                met_quota: false,
            });
            core.elected.push(ElectedRecord {
                candidate,
                count,
                without_quota: true,
            });
        }

        core.record_count(String::from(
            "Final Count: Remaining seats filled by highest vote totals.",
        ));
        core.emit_all(events);
        core.current_results()
    }
}
