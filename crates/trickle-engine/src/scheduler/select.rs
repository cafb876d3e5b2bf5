//! Unit selection policy

use rand::seq::SliceRandom;
use rand::Rng;
use trickle_core::{ProgressState, Unit};
use trickle_state::StateStore;

use super::{Scheduler, Selection};
use crate::publish::Publisher;
use crate::timer::Timer;

impl<S, P, T, R> Scheduler<S, P, T, R>
where
    S: StateStore,
    P: Publisher,
    T: Timer,
    R: Rng,
{
    /// Picks the next unit to publish, `None` once nothing remains
    ///
    /// When both kinds remain a divisible file is chosen with the configured
    /// probability; the file itself and the sub-unit index are uniform picks.
    /// A divisible file whose sub-units are all recorded already is marked
    /// completed and selection starts over.
    pub fn select(&mut self, state: &mut ProgressState) -> Option<Selection> {
        loop {
            let remaining = self.catalog.remaining(state);
            if remaining.is_empty() {
                return None;
            }

            let pick_divisible = match (
                remaining.divisible.is_empty(),
                remaining.atomic.is_empty(),
            ) {
                (false, false) => self.rng.gen_bool(self.config.divisible_probability),
                (false, true) => true,
                _ => false,
            };

            if !pick_divisible {
                let path = remaining.atomic.choose(&mut self.rng)?.clone();
                return Some(Selection::Atomic { path });
            }

            let path = remaining.divisible.choose(&mut self.rng)?.clone();
            let (path, sub_units) = match self.catalog.load_unit(&path) {
                Unit::Atomic { path } => return Some(Selection::Atomic { path }),
                Unit::Divisible { path, sub_units } => (path, sub_units),
            };

            let published = state.published_indices(&path);
            let uncommitted: Vec<usize> = sub_units
                .iter()
                .map(|unit| unit.index)
                .filter(|index| !published.contains(index))
                .collect();

            let Some(&index) = uncommitted.choose(&mut self.rng) else {
                log::info!(
                    "{} has {} sub-unit(s), all already published; marking it completed",
                    path,
                    sub_units.len()
                );
                state.mark_completed(&path);
                self.persist(state);
                continue;
            };

            return Some(Selection::SubUnit { path, sub_units, index });
        }
    }
}
