//! JSON progress file

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use trickle_core::ProgressState;

use crate::stored::{pack, unpack, StoredState};
use crate::StateStore;

/// Progress record stored as a single JSON document
pub struct JsonStateFile {
    path: PathBuf,
}

impl JsonStateFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temp file used for all-or-nothing writes
    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "progress".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

impl StateStore for JsonStateFile {
    fn load(&self) -> Result<Option<ProgressState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read progress file {:?}", self.path))?;
        let stored: StoredState = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed progress file {:?}", self.path))?;

        log::debug!("Loaded progress from {:?}", self.path);
        Ok(Some(unpack(stored)))
    }

    fn save(&self, state: &ProgressState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(&pack(state))
            .context("Failed to serialize progress")?;

        // Rename is atomic on the same filesystem
        let tmp = self.tmp_path();
        fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace progress file {:?}", self.path))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to delete progress file {:?}", self.path))?;
            log::debug!("Deleted progress file {:?}", self.path);
        }
        Ok(())
    }
}
