//! Scheduler: the select → publish → delay loop
//!
//! This module drives one run over the catalog:
//! - Waiting logic, both the resumed and the regular delay (waiting.rs)
//! - Unit selection policy (select.rs)
//! - Publishing a selected unit and recording it (publishing.rs)
//!
//! All bookkeeping lives in a [`ProgressState`] passed in by the caller and
//! persisted through the injected [`StateStore`] after every change.

mod publishing;
mod select;
mod waiting;

use anyhow::{bail, Result};
use rand::Rng;
use trickle_core::{ProgressState, SubUnit};
use trickle_state::StateStore;

use crate::catalog::WorkCatalog;
use crate::publish::Publisher;
use crate::timer::{CancelToken, Timer, WaitOutcome};

/// Default probability of picking a divisible unit when both kinds remain
pub const DEFAULT_DIVISIBLE_PROBABILITY: f64 = 0.7;

/// Default bounds of the random delay between commits, in seconds
pub const DEFAULT_MIN_DELAY: u64 = 10;
pub const DEFAULT_MAX_DELAY: u64 = 50;

/// What a divisible file is rewritten to once its sub-unit was published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestorePolicy {
    /// All known sub-units, trimmed and separated by a blank line
    #[default]
    Concatenated,
    /// The exact content the file had before the rewrite
    Original,
}

/// Scheduler tuning
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub divisible_probability: f64,
    pub min_delay: u64,
    pub max_delay: u64,
    pub restore: RestorePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            divisible_probability: DEFAULT_DIVISIBLE_PROBABILITY,
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            restore: RestorePolicy::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.divisible_probability) {
            bail!(
                "Divisible probability must be within 0..=1, got {}",
                self.divisible_probability
            );
        }
        if self.min_delay > self.max_delay {
            bail!(
                "Minimum delay ({}s) is larger than maximum delay ({}s)",
                self.min_delay,
                self.max_delay
            );
        }
        Ok(())
    }
}

/// Where the state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ResumingWait,
    SelectingUnit,
    Publishing,
    Delaying,
    AllComplete,
    Paused,
}

/// The unit chosen for the next publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A whole file
    Atomic { path: String },
    /// One sub-unit of a divisible file, with all sub-units known right now
    SubUnit {
        path: String,
        sub_units: Vec<SubUnit>,
        index: usize,
    },
}

impl Selection {
    pub fn path(&self) -> &str {
        match self {
            Selection::Atomic { path } | Selection::SubUnit { path, .. } => path,
        }
    }

    /// Commit message identifying the unit
    pub fn commit_message(&self) -> String {
        match self {
            Selection::Atomic { path } => format!("Add {}", path),
            Selection::SubUnit { path, sub_units, index } => {
                let name = sub_units.get(*index).map(|u| u.name.as_str()).unwrap_or("?");
                format!(
                    "Add {} to {} (part {} of {})",
                    name,
                    path,
                    index + 1,
                    sub_units.len()
                )
            }
        }
    }
}

/// Result of one select + publish pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing left to publish
    AllComplete,
    /// The selection was published and recorded
    Published(Selection),
    /// Publishing failed; progress is unchanged
    Failed(Selection),
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Everything published, progress record deleted
    AllComplete,
    /// Cancelled; progress saved for the next run
    Paused,
}

/// Resumable incremental-commit scheduler
pub struct Scheduler<S, P, T, R> {
    config: SchedulerConfig,
    catalog: WorkCatalog,
    store: S,
    publisher: P,
    timer: T,
    rng: R,
    cancel: CancelToken,
    phase: Phase,
}

impl<S, P, T, R> Scheduler<S, P, T, R>
where
    S: StateStore,
    P: Publisher,
    T: Timer,
    R: Rng,
{
    pub fn new(
        config: SchedulerConfig,
        catalog: WorkCatalog,
        store: S,
        publisher: P,
        timer: T,
        rng: R,
        cancel: CancelToken,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            catalog,
            store,
            publisher,
            timer,
            rng,
            cancel,
            phase: Phase::Idle,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn catalog(&self) -> &WorkCatalog {
        &self.catalog
    }

    /// Runs until everything is published or the cancel token is set
    pub fn run(&mut self, state: &mut ProgressState) -> RunOutcome {
        if self.resume_wait(state) == WaitOutcome::Cancelled {
            return self.pause(state);
        }

        loop {
            if self.cancel.is_cancelled() {
                return self.pause(state);
            }

            match self.step(state) {
                StepOutcome::AllComplete => return self.finish(),
                StepOutcome::Published(selection) => {
                    log::info!("Published {}", selection.commit_message());
                }
                StepOutcome::Failed(selection) => {
                    log::info!("Will retry {} in a later cycle", selection.path());
                }
            }

            if self.catalog.remaining(state).is_empty() {
                return self.finish();
            }

            if self.delay(state) == WaitOutcome::Cancelled {
                return self.pause(state);
            }
            self.phase = Phase::Idle;
        }
    }

    /// One SelectingUnit + Publishing pass, without any delay
    pub fn step(&mut self, state: &mut ProgressState) -> StepOutcome {
        if state.pending_wait_until().is_some() {
            state.clear_pending_wait();
            self.persist(state);
        }

        self.phase = Phase::SelectingUnit;
        let Some(selection) = self.select(state) else {
            self.phase = Phase::AllComplete;
            return StepOutcome::AllComplete;
        };

        self.phase = Phase::Publishing;
        self.publish(state, selection)
    }

    /// Saves the state; failures are logged and the run continues in memory
    fn persist(&self, state: &ProgressState) {
        if let Err(e) = self.store.save(state) {
            log::warn!("Failed to save progress (continuing in memory): {:#}", e);
        }
    }

    fn pause(&mut self, state: &ProgressState) -> RunOutcome {
        self.phase = Phase::Paused;
        self.persist(state);
        log::info!("Paused, progress saved. Run again to continue.");
        RunOutcome::Paused
    }

    fn finish(&mut self) -> RunOutcome {
        self.phase = Phase::AllComplete;
        if let Err(e) = self.store.clear() {
            log::warn!("Failed to delete progress record: {:#}", e);
        }
        log::info!("All files published");
        RunOutcome::AllComplete
    }
}
