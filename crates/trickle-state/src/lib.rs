//! Trickle State - Durable progress record
//!
//! The scheduler never touches the filesystem for its own bookkeeping: it
//! talks to a [`StateStore`]. [`JsonStateFile`] is the production store,
//! [`MemoryStore`] keeps everything in memory for tests and dry runs.

mod json_file;
mod memory;
mod stored;

use anyhow::Result;
use trickle_core::ProgressState;

pub use json_file::JsonStateFile;
pub use memory::MemoryStore;

/// Storage port for the progress record
pub trait StateStore {
    /// Loads the persisted state, `None` when nothing has been saved yet
    fn load(&self) -> Result<Option<ProgressState>>;

    /// Persists the whole state; either the full record is written or nothing
    fn save(&self, state: &ProgressState) -> Result<()>;

    /// Deletes the persisted state (no-op when absent)
    fn clear(&self) -> Result<()>;
}

/// Loads the persisted state or starts a fresh one
///
/// A missing record yields a fresh state silently; an unreadable or malformed
/// record is logged and also replaced by a fresh state, never aborting the run.
pub fn load_or_fresh<S: StateStore + ?Sized>(store: &S, now: u64) -> ProgressState {
    match store.load() {
        Ok(Some(state)) => {
            log::info!(
                "Resuming: {} file(s) completed, {} in progress",
                state.completed().len(),
                state.partial().len()
            );
            state
        }
        Ok(None) => {
            log::info!("No saved progress found, starting fresh");
            ProgressState::new(now)
        }
        Err(e) => {
            log::warn!("Failed to load saved progress, starting fresh: {:#}", e);
            ProgressState::new(now)
        }
    }
}
