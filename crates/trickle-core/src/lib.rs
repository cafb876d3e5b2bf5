//! Trickle Core - Shared data models for the incremental-commit scheduler
//!
//! This crate defines the work-unit model (`Unit`, `SubUnit`) and the
//! `ProgressState` record that tracks which units have been published.

mod error;
mod models;

pub use error::CoreError;
pub use models::{ProgressState, SubUnit, Unit, UnitKind};
