//! Error types for trickle-core

/// Errors raised when a progress mutation would break the state invariants
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Sub-unit index {index} out of range for {path} ({total} sub-units)")]
    IndexOutOfRange {
        path: String,
        index: usize,
        total: usize,
    },
}
