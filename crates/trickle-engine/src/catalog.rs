//! Work catalog: what there is to publish under the project root

use std::path::{Component, Path, PathBuf};
use trickle_core::{ProgressState, Unit, UnitKind};
use walkdir::{DirEntry, WalkDir};

use crate::parsers::extract_file;

/// Version-control metadata directories never published
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Suffix of the temp files used while a source file is rewritten
pub(crate) const REWRITE_TMP_SUFFIX: &str = ".trickle-tmp";

/// Default extension of files split into sub-units
pub const DEFAULT_DIVISIBLE_EXTENSION: &str = "py";

/// Enumerates and classifies the files of a project
#[derive(Debug, Clone)]
pub struct WorkCatalog {
    root: PathBuf,
    extension: String,
    excluded: Vec<PathBuf>,
}

/// Not-yet-completed paths, split by kind
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Remaining {
    pub divisible: Vec<String>,
    pub atomic: Vec<String>,
}

impl Remaining {
    pub fn is_empty(&self) -> bool {
        self.divisible.is_empty() && self.atomic.is_empty()
    }

    pub fn len(&self) -> usize {
        self.divisible.len() + self.atomic.len()
    }
}

impl WorkCatalog {
    /// Creates a catalog rooted at `root`
    ///
    /// `state_file` (and its temp sibling) are excluded from enumeration when
    /// they live inside the project.
    pub fn new<P: AsRef<Path>>(root: P, extension: &str, state_file: Option<&Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let excluded = state_file
            .map(|file| {
                let file = absolutize(&root, file);
                let mut paths = vec![file.clone()];
                if let Some(name) = file.file_name() {
                    paths.push(file.with_file_name(format!(".{}.tmp", name.to_string_lossy())));
                }
                paths
            })
            .unwrap_or_default();

        Self {
            root,
            extension: extension.trim_start_matches('.').to_string(),
            excluded,
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// All publishable files as sorted, `/`-separated relative paths
    pub fn enumerate(&self) -> Vec<String> {
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_vcs_dir(entry));

        let mut paths = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if self.excluded.iter().any(|p| p == entry.path())
                || entry.file_name().to_string_lossy().ends_with(REWRITE_TMP_SUFFIX)
            {
                continue;
            }
            if let Some(relative) = self.relative(entry.path()) {
                paths.push(relative);
            }
        }
        paths
    }

    pub fn classify(&self, path: &str) -> UnitKind {
        let matches = Path::new(path)
            .extension()
            .map(|ext| ext.to_string_lossy() == self.extension.as_str())
            .unwrap_or(false);

        if matches {
            UnitKind::Divisible
        } else {
            UnitKind::Atomic
        }
    }

    /// Paths not yet in `completed`, partitioned by kind in enumeration order
    pub fn remaining(&self, progress: &ProgressState) -> Remaining {
        let mut remaining = Remaining::default();
        for path in self.enumerate() {
            if progress.is_completed(&path) {
                continue;
            }
            match self.classify(&path) {
                UnitKind::Divisible => remaining.divisible.push(path),
                UnitKind::Atomic => remaining.atomic.push(path),
            }
        }
        remaining
    }

    /// Builds the unit for `path`, extracting sub-units for divisible files
    ///
    /// A divisible file that yields no sub-units (unparseable, undecodable or
    /// without any function) comes back as an atomic unit.
    pub fn load_unit(&self, path: &str) -> Unit {
        if self.classify(path) == UnitKind::Atomic {
            return Unit::Atomic { path: path.to_string() };
        }

        let sub_units = extract_file(&self.absolute(path));
        if sub_units.is_empty() {
            log::info!("No sub-units in {}, handling it as a whole file", path);
            return Unit::Atomic { path: path.to_string() };
        }

        Unit::Divisible {
            path: path.to_string(),
            sub_units,
        }
    }

    pub fn absolute(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }
}

fn is_vcs_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| VCS_DIRS.contains(&name))
            .unwrap_or(false)
}

fn absolutize(root: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    }
}
