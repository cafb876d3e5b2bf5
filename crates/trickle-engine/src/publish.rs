//! Publish collaborator seam

use std::path::{Path, PathBuf};

/// Outcome of a publish call; `Ok` carries the new commit id
pub type PublishResult = Result<String, PublishError>;

/// Why a unit could not be published
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("File not found: {0:?}")]
    FileMissing(PathBuf),

    #[error("No changes to publish")]
    NoChanges,

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}

impl PublishError {
    /// "Nothing to commit" is an idempotent no-op, not a failure
    pub fn counts_as_published(&self) -> bool {
        matches!(self, PublishError::NoChanges)
    }
}

/// Commits and pushes the current content of one file
pub trait Publisher {
    /// Publishes `file` (relative to the project root) with `message`
    fn publish(&mut self, file: &Path, message: &str) -> PublishResult;
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn publish(&mut self, file: &Path, message: &str) -> PublishResult {
        (**self).publish(file, message)
    }
}

/// True when the result should advance progress
pub fn is_published(result: &PublishResult) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => e.counts_as_published(),
    }
}
