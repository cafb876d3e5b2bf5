//! Publishing a selected unit and recording it

use rand::Rng;
use std::fs;
use std::io;
use std::path::Path;
use trickle_core::{ProgressState, SubUnit};
use trickle_state::StateStore;

use super::{RestorePolicy, Scheduler, Selection, StepOutcome};
use crate::catalog::REWRITE_TMP_SUFFIX;
use crate::publish::{is_published, Publisher};
use crate::timer::Timer;

impl<S, P, T, R> Scheduler<S, P, T, R>
where
    S: StateStore,
    P: Publisher,
    T: Timer,
    R: Rng,
{
    /// Publishes `selection` and records it on success
    ///
    /// Failures leave `state` untouched; the unit stays eligible for a later
    /// cycle.
    pub fn publish(&mut self, state: &mut ProgressState, selection: Selection) -> StepOutcome {
        let message = selection.commit_message();

        let published = match &selection {
            Selection::Atomic { path } => self.publish_atomic(state, path, &message),
            Selection::SubUnit { path, sub_units, index } => {
                self.publish_sub_unit(state, path, sub_units, *index, &message)
            }
        };

        if published {
            StepOutcome::Published(selection)
        } else {
            StepOutcome::Failed(selection)
        }
    }

    fn publish_atomic(&mut self, state: &mut ProgressState, path: &str, message: &str) -> bool {
        let result = self.publisher.publish(Path::new(path), message);
        if !is_published(&result) {
            if let Err(e) = result {
                log::warn!("Failed to publish {}: {}", path, e);
            }
            return false;
        }

        state.mark_completed(path);
        self.persist(state);
        true
    }

    fn publish_sub_unit(
        &mut self,
        state: &mut ProgressState,
        path: &str,
        sub_units: &[SubUnit],
        index: usize,
        message: &str,
    ) -> bool {
        let Some(unit) = sub_units.get(index) else {
            log::warn!("Sub-unit {} of {} disappeared before publishing", index, path);
            return false;
        };

        let file = self.catalog.absolute(path);
        let original = match fs::read(&file) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to publish {}: file vanished ({})", path, e);
                return false;
            }
        };

        if let Err(e) = replace_contents(&file, unit.publishable_content().as_bytes()) {
            log::warn!("Failed to rewrite {} for publishing, left untouched: {}", path, e);
            return false;
        }

        let result = self.publisher.publish(Path::new(path), message);
        let published = if is_published(&result) {
            match state.record_sub_unit(path, index, sub_units.len()) {
                Ok(completed) => {
                    self.persist(state);
                    if completed {
                        log::info!("{} fully published", path);
                    }
                    true
                }
                Err(e) => {
                    log::warn!("Could not record {}: {}", path, e);
                    false
                }
            }
        } else {
            if let Err(e) = result {
                log::warn!("Failed to publish {} of {}: {}", unit.name, path, e);
            }
            false
        };

        self.restore_file(&file, sub_units, &original);
        published
    }

    /// Rewrites a divisible file after publishing, whatever the outcome
    fn restore_file(&self, file: &Path, sub_units: &[SubUnit], original: &[u8]) {
        let restored = match self.config.restore {
            RestorePolicy::Concatenated => concatenate(sub_units).into_bytes(),
            RestorePolicy::Original => original.to_vec(),
        };

        if let Err(e) = replace_contents(file, &restored) {
            log::warn!("Failed to restore {:?}: {}", file, e);
        }
    }
}

/// All sub-units, dedented, separated by a blank line, newline terminated
pub(crate) fn concatenate(sub_units: &[SubUnit]) -> String {
    let body = sub_units
        .iter()
        .map(SubUnit::dedented_content)
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{}\n", body)
}

/// Replaces the content of `file` through a sibling temp file and a rename
///
/// On failure `file` keeps its previous content.
fn replace_contents(file: &Path, content: &[u8]) -> io::Result<()> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = file.with_file_name(format!(".{}{}", name, REWRITE_TMP_SUFFIX));

    let result = fs::write(&tmp, content).and_then(|()| fs::rename(&tmp, file));
    if result.is_err() && tmp.is_file() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
