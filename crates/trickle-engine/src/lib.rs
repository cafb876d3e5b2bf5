//! Trickle Engine - Resumable incremental-commit scheduler
//!
//! This crate is responsible for:
//! - Enumerating the project tree and classifying files ([`WorkCatalog`])
//! - Splitting source files into function-level sub-units ([`parsers`])
//! - Committing and pushing one unit at a time ([`Publisher`], [`GitPublisher`])
//! - Driving the select → publish → delay loop with durable progress ([`Scheduler`])

pub mod catalog;
pub mod formatting;
pub mod git;
pub mod parsers;
pub mod publish;
pub mod scheduler;
pub mod timer;

pub use catalog::{Remaining, WorkCatalog};
pub use git::{GitPublisher, PublishOptions};
pub use publish::{PublishError, PublishResult, Publisher};
pub use scheduler::{
    Phase, RestorePolicy, RunOutcome, Scheduler, SchedulerConfig, Selection, StepOutcome,
};
pub use timer::{CancelToken, NoopObserver, SystemTimer, Timer, WaitObserver, WaitOutcome};
