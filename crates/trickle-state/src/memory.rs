//! In-memory store

use anyhow::{bail, Context, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use trickle_core::ProgressState;

use crate::stored::{pack, unpack, StoredState};
use crate::StateStore;

/// Keeps the serialized record in memory
///
/// Clones share the same record, so a test can hand one clone to the
/// scheduler and inspect what it persisted through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Rc<RefCell<Option<String>>>,
    saves: Rc<Cell<usize>>,
    fail_saves: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `state`
    pub fn with_state(state: &ProgressState) -> Result<Self> {
        let store = Self::new();
        store.save(state)?;
        Ok(store)
    }

    /// Raw JSON of the last saved record
    pub fn raw(&self) -> Option<String> {
        self.record.borrow().clone()
    }

    /// Replaces the raw record (used to simulate corrupted files)
    pub fn set_raw(&self, raw: impl Into<String>) {
        *self.record.borrow_mut() = Some(raw.into());
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Makes every subsequent save fail
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<ProgressState>> {
        let record = self.record.borrow();
        let Some(raw) = record.as_deref() else {
            return Ok(None);
        };
        let stored: StoredState =
            serde_json::from_str(raw).context("Failed to parse in-memory progress record")?;
        Ok(Some(unpack(stored)))
    }

    fn save(&self, state: &ProgressState) -> Result<()> {
        if self.fail_saves.get() {
            bail!("in-memory store is configured to fail saves");
        }
        let raw = serde_json::to_string(&pack(state)).context("Failed to serialize progress")?;
        *self.record.borrow_mut() = Some(raw);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.record.borrow_mut() = None;
        Ok(())
    }
}
