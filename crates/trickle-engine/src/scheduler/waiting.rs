//! Resumed and regular waits between commits

use rand::Rng;
use trickle_core::ProgressState;
use trickle_state::StateStore;

use super::{Phase, Scheduler};
use crate::formatting::{format_timestamp, format_wait};
use crate::publish::Publisher;
use crate::timer::{Timer, WaitOutcome};

impl<S, P, T, R> Scheduler<S, P, T, R>
where
    S: StateStore,
    P: Publisher,
    T: Timer,
    R: Rng,
{
    /// Finishes a wait interrupted by a previous run
    ///
    /// Only honoured for a resumed session; a fresh session drops any pending
    /// deadline. On cancellation the deadline stays persisted.
    pub fn resume_wait(&mut self, state: &mut ProgressState) -> WaitOutcome {
        let Some(deadline) = state.pending_wait_until() else {
            return WaitOutcome::Elapsed;
        };

        if !state.is_fresh_session {
            let now = self.timer.now();
            if deadline > now {
                self.phase = Phase::ResumingWait;
                log::info!(
                    "Resuming interrupted wait: {} left (until {})",
                    format_wait(deadline - now),
                    format_timestamp(deadline)
                );
                if self.timer.wait_until(deadline, &self.cancel) == WaitOutcome::Cancelled {
                    return WaitOutcome::Cancelled;
                }
            }
        }

        state.clear_pending_wait();
        self.persist(state);
        WaitOutcome::Elapsed
    }

    /// Waits a random delay before the next commit
    ///
    /// The deadline is persisted before blocking so an interrupted wait can
    /// be resumed instead of restarted.
    pub fn delay(&mut self, state: &mut ProgressState) -> WaitOutcome {
        self.phase = Phase::Delaying;

        let secs = self.rng.gen_range(self.config.min_delay..=self.config.max_delay);
        let deadline = self.timer.now().saturating_add(secs);
        state.set_pending_wait(deadline);
        self.persist(state);

        log::info!("Next commit in {}", format_wait(secs));
        let outcome = self.timer.wait_until(deadline, &self.cancel);

        if outcome == WaitOutcome::Elapsed {
            state.clear_pending_wait();
            self.persist(state);
        }
        outcome
    }
}
