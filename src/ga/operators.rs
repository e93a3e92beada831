//! Genetic operators on whole timetables.
//!
//! Schedules are evolved directly rather than through an encoding:
//!
//! - [`tournament_select`]: best of `k` individuals drawn without replacement
//! - [`crossover`]: slot-level uniform recombination
//! - [`mutate`]: move one entry to a random free slot, dropping it if none
//!   is found within [`MUTATION_ATTEMPTS`] tries
//!
//! Operators never consult the hard-constraint validator; the runner gates
//! their output.
//!
//! # Reference
//! - Burke, Elliman & Weare (1995), "Specialised recombinative operators
//!   for timetabling problems"

use std::collections::BTreeSet;

use log::trace;
use rand::prelude::IndexedRandom;
use rand::seq::index;
use rand::Rng;

use crate::models::{Schedule, TimeSlot, DAYS_PER_WEEK, PERIODS_PER_DAY};

/// Random reinsertion tries per mutation.
pub const MUTATION_ATTEMPTS: usize = 10;

/// Tournament selection over a score vector.
///
/// Samples `min(tournament_size, scores.len())` distinct indices and
/// returns the one with the highest score. Returns `None` for an empty
/// population.
pub fn tournament_select<R: Rng>(scores: &[f64], tournament_size: usize, rng: &mut R) -> Option<usize> {
    let amount = tournament_size.min(scores.len());
    index::sample(rng, scores.len(), amount)
        .into_iter()
        .max_by(|&a, &b| scores[a].total_cmp(&scores[b]))
}

/// Slot-level crossover.
///
/// Every slot occupied in either parent is copied into the child. When
/// both parents use a slot, its whole entry list comes from one parent
/// picked uniformly. Entries are cloned; the child shares nothing with
/// its parents.
pub fn crossover<R: Rng>(parent1: &Schedule, parent2: &Schedule, rng: &mut R) -> Schedule {
    let slots: BTreeSet<TimeSlot> = parent1
        .occupied_slots()
        .union(&parent2.occupied_slots())
        .copied()
        .collect();

    let mut child = Schedule::new();
    for slot in slots {
        let (a, b) = (parent1.entries_at(slot), parent2.entries_at(slot));
        let source = if a.is_empty() {
            b
        } else if b.is_empty() || rng.random_bool(0.5) {
            a
        } else {
            b
        };
        child.set_slot(slot, source.to_vec());
    }
    child
}

/// What a mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The schedule had no entries.
    Unchanged,
    /// An entry moved (possibly back to its own slot).
    Moved {
        /// Original slot.
        from: TimeSlot,
        /// New slot.
        to: TimeSlot,
    },
    /// No free slot was found and the entry was removed.
    Dropped {
        /// Original slot.
        from: TimeSlot,
    },
}

/// Moves one uniformly chosen entry to a random slot free for its
/// lecturer and all of its groups.
///
/// Room availability is not checked. After [`MUTATION_ATTEMPTS`] failed
/// draws the entry is dropped, so the entry count never grows.
pub fn mutate<R: Rng>(schedule: &mut Schedule, rng: &mut R) -> MutationOutcome {
    let positions: Vec<(TimeSlot, usize)> = schedule
        .slots()
        .flat_map(|(slot, entries)| (0..entries.len()).map(move |i| (slot, i)))
        .collect();
    let Some(&(from, index)) = positions.choose(rng) else {
        return MutationOutcome::Unchanged;
    };
    let Some(entry) = schedule.remove_entry(from, index) else {
        return MutationOutcome::Unchanged;
    };

    for _ in 0..MUTATION_ATTEMPTS {
        let to = TimeSlot::at(
            rng.random_range(0..DAYS_PER_WEEK),
            rng.random_range(0..PERIODS_PER_DAY),
        );
        let free = schedule.is_lecturer_free(to, &entry.lecturer.id)
            && entry.groups.iter().all(|g| schedule.is_group_free(to, &g.id));
        if free {
            schedule.add_entry(to, entry);
            return MutationOutcome::Moved { from, to };
        }
    }

    trace!(
        "mutation dropped {} of '{}' from {from}",
        entry.mode(),
        entry.subject.id
    );
    MutationOutcome::Dropped { from }
}
