//! Command implementations

mod run;
mod status;

pub use run::cmd_run;
pub use status::cmd_status;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::DEFAULT_PROGRESS_FILE;

/// Canonical project directory; fails when it does not exist
fn resolve_project_dir(project_dir: &Path) -> Result<PathBuf> {
    let dir = project_dir
        .canonicalize()
        .with_context(|| format!("Project directory {:?} not found", project_dir))?;
    if !dir.is_dir() {
        anyhow::bail!("{:?} is not a directory", dir);
    }
    Ok(dir)
}

/// Absolute progress file path, relative ones taken from the current directory
fn resolve_progress_file(project_dir: &Path, progress_file: Option<PathBuf>) -> Result<PathBuf> {
    match progress_file {
        None => Ok(project_dir.join(DEFAULT_PROGRESS_FILE)),
        Some(path) if path.is_absolute() => Ok(path),
        Some(path) => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Ok(cwd.join(path))
        }
    }
}
