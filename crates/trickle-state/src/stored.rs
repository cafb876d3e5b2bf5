//! On-disk representation of the progress record

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use trickle_core::ProgressState;

/// Wire format with stable field names
///
/// Timestamps are epoch seconds; floats are accepted on read so records
/// written by other tools with sub-second precision still load.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredState {
    #[serde(default)]
    completed_files: Vec<String>,

    #[serde(default)]
    partial_methods: BTreeMap<String, Vec<usize>>,

    start_time: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_wait_until: Option<f64>,
}

/// Converts a `ProgressState` into its wire form
pub(crate) fn pack(state: &ProgressState) -> StoredState {
    StoredState {
        completed_files: state.completed().iter().cloned().collect(),
        partial_methods: state
            .partial()
            .iter()
            .map(|(path, indices)| (path.clone(), indices.iter().copied().collect()))
            .collect(),
        start_time: state.start_time as f64,
        current_wait_until: state.pending_wait_until().map(|t| t as f64),
    }
}

/// Converts the wire form back into a (non-fresh) `ProgressState`
pub(crate) fn unpack(stored: StoredState) -> ProgressState {
    let partial = stored
        .partial_methods
        .into_iter()
        .map(|(path, indices)| (path, indices.into_iter().collect::<BTreeSet<usize>>()));

    ProgressState::restore(
        stored.completed_files,
        partial,
        epoch_secs(stored.start_time),
        stored.current_wait_until.map(epoch_secs),
    )
}

/// Rounds a wire timestamp up so a pending deadline is never shortened
fn epoch_secs(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.ceil() as u64
    } else {
        0
    }
}
