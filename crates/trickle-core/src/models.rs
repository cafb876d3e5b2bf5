//! Core data models for the scheduler

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::CoreError;

/// How the catalog treats a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Committed whole in a single cycle
    Atomic,
    /// Split into ordered sub-units, one per cycle
    Divisible,
}

/// One extracted fragment of a divisible file
///
/// `index` is the durable key stored in the progress record, so it must
/// always equal the fragment's position in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubUnit {
    pub index: usize,

    /// Function or method name (e.g. "parse_header")
    pub name: String,

    /// Exact source text, decorators and attached comments included
    pub content: String,
}

impl SubUnit {
    pub fn new(index: usize, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            content: content.into(),
        }
    }

    /// Content with the shared indentation removed and outer blank lines
    /// dropped, so a method reads as a top-level function
    pub fn dedented_content(&self) -> String {
        let dedented = dedent(&self.content);
        dedented.trim_start_matches('\n').trim_end().to_string()
    }

    /// Content as written to disk while this sub-unit is being published
    pub fn publishable_content(&self) -> String {
        format!("{}\n", self.dedented_content())
    }
}

/// Removes the leading whitespace shared by every non-blank line
///
/// Blank lines become empty. Tabs and spaces are not interchangeable.
fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .reduce(common_prefix)
        .unwrap_or("");

    text.lines()
        .map(|line| if line.trim().is_empty() { "" } else { &line[margin.len()..] })
        .collect::<Vec<_>>()
        .join("\n")
}

fn common_prefix<'a>(a: &'a str, b: &'a str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()));
    &a[..end]
}

/// Something the scheduler can commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Atomic { path: String },
    Divisible { path: String, sub_units: Vec<SubUnit> },
}

impl Unit {
    pub fn path(&self) -> &str {
        match self {
            Unit::Atomic { path } | Unit::Divisible { path, .. } => path,
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Atomic { .. } => UnitKind::Atomic,
            Unit::Divisible { .. } => UnitKind::Divisible,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Atomic { path } => write!(f, "{} (atomic)", path),
            Unit::Divisible { path, sub_units } => {
                write!(f, "{} ({} sub-units)", path, sub_units.len())
            }
        }
    }
}

/// Progress of a scheduling run
///
/// Paths are relative to the project root and always use `/` separators.
/// A path is either in `completed` or has an entry in `partial`, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    completed: BTreeSet<String>,
    partial: BTreeMap<String, BTreeSet<usize>>,

    /// Unix epoch seconds at which the first run started
    pub start_time: u64,

    pending_wait_until: Option<u64>,

    /// True until the state has been loaded back from durable storage
    pub is_fresh_session: bool,
}

impl ProgressState {
    /// Creates an empty state for a brand new run
    pub fn new(start_time: u64) -> Self {
        Self {
            completed: BTreeSet::new(),
            partial: BTreeMap::new(),
            start_time,
            pending_wait_until: None,
            is_fresh_session: true,
        }
    }

    /// Rebuilds a state from its persisted parts
    ///
    /// Entries that would break the partition invariant are repaired: a path
    /// present in both collections stays completed, and empty index sets are
    /// dropped.
    pub fn restore(
        completed: impl IntoIterator<Item = String>,
        partial: impl IntoIterator<Item = (String, BTreeSet<usize>)>,
        start_time: u64,
        pending_wait_until: Option<u64>,
    ) -> Self {
        let completed: BTreeSet<String> = completed.into_iter().collect();
        let partial = partial
            .into_iter()
            .filter(|(path, indices)| !indices.is_empty() && !completed.contains(path))
            .collect();

        Self {
            completed,
            partial,
            start_time,
            pending_wait_until,
            is_fresh_session: false,
        }
    }

    pub fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    pub fn partial(&self) -> &BTreeMap<String, BTreeSet<usize>> {
        &self.partial
    }

    pub fn is_completed(&self, path: &str) -> bool {
        self.completed.contains(path)
    }

    /// Indices already published for `path` (empty when none)
    pub fn published_indices(&self, path: &str) -> BTreeSet<usize> {
        self.partial.get(path).cloned().unwrap_or_default()
    }

    /// Marks a path fully published, dropping any partial entry with it
    pub fn mark_completed(&mut self, path: &str) {
        self.partial.remove(path);
        self.completed.insert(path.to_string());
    }

    /// Records a published sub-unit index
    ///
    /// Returns `Ok(true)` when the path is (now) completed. Promotion to
    /// `completed` and removal of the partial entry happen in this single
    /// mutation so one save captures both.
    pub fn record_sub_unit(
        &mut self,
        path: &str,
        index: usize,
        total: usize,
    ) -> Result<bool, CoreError> {
        if self.completed.contains(path) {
            return Ok(true);
        }
        if index >= total {
            return Err(CoreError::IndexOutOfRange {
                path: path.to_string(),
                index,
                total,
            });
        }

        let indices = self.partial.entry(path.to_string()).or_default();
        indices.insert(index);

        if (0..total).all(|i| indices.contains(&i)) {
            self.mark_completed(path);
            return Ok(true);
        }
        Ok(false)
    }

    pub fn pending_wait_until(&self) -> Option<u64> {
        self.pending_wait_until
    }

    pub fn set_pending_wait(&mut self, deadline: u64) {
        self.pending_wait_until = Some(deadline);
    }

    pub fn clear_pending_wait(&mut self) {
        self.pending_wait_until = None;
    }

    /// Checks the partition invariant and that no partial entry is empty
    pub fn is_consistent(&self) -> bool {
        self.partial
            .iter()
            .all(|(path, indices)| !indices.is_empty() && !self.completed.contains(path))
    }
}
