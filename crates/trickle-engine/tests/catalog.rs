//! Tests for project enumeration and classification

mod common;

use anyhow::Result;
use tempfile::TempDir;
use trickle_core::{ProgressState, Unit, UnitKind};
use trickle_engine::WorkCatalog;

use common::{write, THREE_FUNCTIONS};

// ── fixtures ─────────────────────────────────────────────────────────────────

fn project() -> Result<TempDir> {
    let tmp = TempDir::new()?;
    write(tmp.path(), "README.md", "# demo\n");
    write(tmp.path(), "src/app.py", THREE_FUNCTIONS);
    write(tmp.path(), "src/util/strings.py", "def upper(s):\n    return s.upper()\n");
    write(tmp.path(), "assets/logo.svg", "<svg/>");
    write(tmp.path(), ".git/HEAD", "ref: refs/heads/main\n");
    write(tmp.path(), ".git/objects/ab/cdef", "blob");
    write(tmp.path(), ".progress.json", "{}");
    Ok(tmp)
}

// ── enumerate ────────────────────────────────────────────────────────────────

#[test]
fn test_enumerate_is_sorted_and_skips_vcs_and_state_file() -> Result<()> {
    let tmp = project()?;
    let state_file = tmp.path().join(".progress.json");
    let catalog = WorkCatalog::new(tmp.path(), "py", Some(state_file.as_path()));

    assert_eq!(
        catalog.enumerate(),
        vec![
            "README.md".to_string(),
            "assets/logo.svg".to_string(),
            "src/app.py".to_string(),
            "src/util/strings.py".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn test_state_temp_file_is_skipped() -> Result<()> {
    let tmp = project()?;
    write(tmp.path(), "..progress.json.tmp", "{}");
    write(tmp.path(), ".progress.json.tmp", "{}");
    let state_file = tmp.path().join(".progress.json");
    let catalog = WorkCatalog::new(tmp.path(), "py", Some(state_file.as_path()));

    let paths = catalog.enumerate();
    assert!(!paths.contains(&"..progress.json.tmp".to_string()));
    assert!(paths.contains(&".progress.json.tmp".to_string()));
    Ok(())
}

#[test]
fn test_rewrite_temp_files_are_skipped() -> Result<()> {
    let tmp = project()?;
    write(tmp.path(), "src/.app.py.trickle-tmp", "def partial():\n    pass\n");
    let catalog = WorkCatalog::new(tmp.path(), "py", None);

    let paths = catalog.enumerate();
    assert!(!paths.contains(&"src/.app.py.trickle-tmp".to_string()));
    assert!(paths.contains(&"src/app.py".to_string()));
    Ok(())
}

#[test]
fn test_state_file_outside_project_excludes_nothing() -> Result<()> {
    let tmp = project()?;
    let elsewhere = TempDir::new()?;
    let state_file = elsewhere.path().join("p.json");
    let catalog = WorkCatalog::new(tmp.path(), "py", Some(state_file.as_path()));
    assert!(catalog.enumerate().contains(&".progress.json".to_string()));
    Ok(())
}

// ── classify ─────────────────────────────────────────────────────────────────

#[test]
fn test_classify_by_extension() {
    let catalog = WorkCatalog::new("/tmp/unused", ".py", None);
    assert_eq!(catalog.extension(), "py");
    assert_eq!(catalog.classify("src/app.py"), UnitKind::Divisible);
    assert_eq!(catalog.classify("src/app.pyc"), UnitKind::Atomic);
    assert_eq!(catalog.classify("Makefile"), UnitKind::Atomic);
}

// ── remaining ────────────────────────────────────────────────────────────────

#[test]
fn test_remaining_partitions_and_skips_completed() -> Result<()> {
    let tmp = project()?;
    let state_file = tmp.path().join(".progress.json");
    let catalog = WorkCatalog::new(tmp.path(), "py", Some(state_file.as_path()));

    let mut state = ProgressState::new(0);
    state.mark_completed("README.md");
    state.record_sub_unit("src/app.py", 0, 3)?;

    let remaining = catalog.remaining(&state);
    assert_eq!(remaining.divisible, vec!["src/app.py", "src/util/strings.py"]);
    assert_eq!(remaining.atomic, vec!["assets/logo.svg"]);
    assert_eq!(remaining.len(), 3);
    assert_eq!(catalog.remaining(&state), remaining, "deterministic per invocation");
    Ok(())
}

// ── load_unit ────────────────────────────────────────────────────────────────

#[test]
fn test_load_unit_extracts_divisible_files() -> Result<()> {
    let tmp = project()?;
    let catalog = WorkCatalog::new(tmp.path(), "py", None);

    match catalog.load_unit("src/app.py") {
        Unit::Divisible { path, sub_units } => {
            assert_eq!(path, "src/app.py");
            assert_eq!(sub_units.len(), 3);
        }
        other => panic!("expected divisible unit, got {:?}", other),
    }
    assert_eq!(
        catalog.load_unit("README.md"),
        Unit::Atomic { path: "README.md".to_string() }
    );
    Ok(())
}

#[test]
fn test_load_unit_degrades_unparseable_file() -> Result<()> {
    let tmp = project()?;
    write(tmp.path(), "broken.py", "def oops(:\n");
    let catalog = WorkCatalog::new(tmp.path(), "py", None);

    assert_eq!(
        catalog.load_unit("broken.py"),
        Unit::Atomic { path: "broken.py".to_string() }
    );
    Ok(())
}
