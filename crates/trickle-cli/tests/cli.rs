//! CLI integration tests
//!
//! These tests run the compiled `trickle` binary directly. None of them
//! reach the network: every `run` invocation here fails during setup.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_trickle"));
    cmd.env_remove("GITHUB_TOKEN");
    cmd
}

// ── help / version ────────────────────────────────────────────────────────────

#[test]
fn test_help_exits_zero() {
    let status = bin().arg("--help").status().expect("failed to run binary");
    assert!(status.success(), "--help should exit 0");
}

#[test]
fn test_version_flag() {
    let output = bin().arg("--version").output().expect("failed to run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("trickle"),
        "version output should contain binary name, got: {}",
        stdout
    );
}

// ── status ────────────────────────────────────────────────────────────────────

#[test]
fn test_status_without_saved_progress() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("main.py"), "def main():\n    pass\n").unwrap();
    fs::write(tmp.path().join("README.md"), "# hi\n").unwrap();

    let output = bin()
        .arg("status")
        .arg("--project-dir").arg(tmp.path())
        .output()
        .expect("failed to run binary");

    assert!(output.status.success(), "status should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("none saved"), "got: {}", stdout);
}

#[test]
fn test_status_with_saved_progress_lists_partial_files() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("lib.py"),
        "def a():\n    pass\n\n\ndef b():\n    pass\n",
    )
    .unwrap();
    fs::write(tmp.path().join("README.md"), "# hi\n").unwrap();
    fs::write(
        tmp.path().join(".trickle-progress.json"),
        concat!(
            r#"{"completed_files": ["README.md"], "partial_methods": {"lib.py": [1]}, "#,
            r#""start_time": 1700000000.0}"#,
        ),
    )
    .unwrap();

    let output = bin()
        .arg("status")
        .arg("--project-dir").arg(tmp.path())
        .output()
        .expect("failed to run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lib.py"), "got: {}", stdout);
    assert!(stdout.contains("2023-11-14"), "start time should be shown, got: {}", stdout);
}

#[test]
fn test_status_on_missing_directory_fails() {
    let tmp = TempDir::new().unwrap();
    let status = bin()
        .arg("status")
        .arg("--project-dir").arg(tmp.path().join("missing"))
        .status()
        .expect("failed to run binary");
    assert!(!status.success());
}

// ── run setup failures ────────────────────────────────────────────────────────

#[test]
fn test_run_without_token_fails() {
    let tmp = TempDir::new().unwrap();
    let status = bin()
        .arg("run")
        .arg("--project-dir").arg(tmp.path())
        .arg("--repo").arg("octo/site")
        .status()
        .expect("failed to run binary");
    assert!(!status.success(), "missing token must be rejected");
}

#[test]
fn test_run_with_invalid_repo_id_fails() {
    let tmp = TempDir::new().unwrap();
    let output = bin()
        .arg("run")
        .arg("--project-dir").arg(tmp.path())
        .arg("--repo").arg("not-a-repo-id")
        .arg("--token").arg("t0ken")
        .output()
        .expect("failed to run binary");
    assert!(!output.status.success());
    assert!(
        !tmp.path().join(".trickle-progress.json").exists(),
        "nothing is persisted when setup fails"
    );
}

#[test]
fn test_run_with_inverted_delays_fails() {
    let tmp = TempDir::new().unwrap();
    let status = bin()
        .arg("run")
        .arg("--project-dir").arg(tmp.path())
        .arg("--repo").arg("octo/site")
        .arg("--token").arg("t0ken")
        .arg("--min-delay").arg("60")
        .arg("--max-delay").arg("5")
        .status()
        .expect("failed to run binary");
    assert!(!status.success());
}
