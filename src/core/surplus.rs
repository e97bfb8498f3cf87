use crate::core::{Counter, Paper};
use crate::report::ElectionResult;
use crate::Event;

/// Transfers the votes an elected candidate holds above the quota.
///
/// Every transferable paper moves on as a copy carrying `surplus / transferable papers` of its
/// value, at most all of it. The elected candidate is reset to exactly the quota and keeps the
/// first `quota` papers it was credited with; which papers stay is decided by position only, not
/// by their next preferences.
pub struct SurplusDistribution<'a> {
    core: &'a mut Counter,
    candidate: usize,
}

impl<'a> SurplusDistribution<'a> {
    #[inline]
    pub fn new(core: &'a mut Counter, candidate: usize) -> Self {
        Self { core, candidate }
    }

    pub fn run(self) -> ElectionResult {
        let core = self.core;
        let candidate = self.candidate;
        core.current_count += 1;

        let quota = core.quota as f64;
        let surplus = core.candidates[candidate].votes - quota;
        if surplus <= 0.0 {
            debug!(
                "[Count({})][Quota({})] candidate({}) has no surplus to distribute",
                core.current_count, core.quota, core.candidates[candidate].info.id
            );
            return core.current_results();
        }

        let held = std::mem::take(&mut core.candidates[candidate].papers);
        let transferable = held
            .iter()
            .filter(|&&paper| core.next_preference(core.papers[paper].ballot, true).is_some())
            .count();
        // With nothing transferable the whole surplus is non-transferable. A paper never passes
        // on more than its own value; whatever the capped factor leaves is non-transferable too.
        let factor = if transferable == 0 {
            0.0
        } else {
            (surplus / transferable as f64).min(1.0)
        };
        info!(
            "[Count({})][Quota({})] distribute surplus {:.2} of candidate({}): {} of {} papers transferable at {:.4}",
            core.current_count,
            core.quota,
            surplus,
            core.candidates[candidate].info.id,
            transferable,
            held.len(),
            factor
        );

        {
            let c = &mut core.candidates[candidate];
            c.votes = quota;
            c.papers = held.iter().copied().take(core.quota as usize).collect();
        }

        let mut credited = 0.0;
        for &paper in &held {
            let original = core.papers[paper];
            let target = match core.next_preference(original.ballot, true) {
                Some(target) if core.candidates[target].is_active() => target,
                _ => continue,
            };
            let copy = Paper {
                ballot: original.ballot,
                value: original.value * factor,
            };
            core.papers.push(copy);
            core.credit(target, core.papers.len() - 1);
            credited += copy.value;
            debug!(
                "[Count({})][Quota({})] ballot({}) transfers {:.4} to candidate({})",
                core.current_count,
                core.quota,
                core.ballots[original.ballot].id,
                copy.value,
                core.candidates[target].info.id
            );
        }
        core.non_transferable += surplus - credited;

        let mut events = vec![Event::SurplusDistributed {
            candidate: core.candidates[candidate].info.id.clone(),
            count: core.current_count,
            surplus,
        }];
        events.extend(core.check_elections());
        let description = format!(
            "Count {}: Distribution of {}'s surplus ({:.2} votes)",
            core.current_count, core.candidates[candidate].info.name, surplus
        );
        core.record_count(description);
        core.emit_all(events);
        core.current_results()
    }
}
