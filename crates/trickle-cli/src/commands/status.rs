//! Status command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tabled::{Table, settings::{Style, Color, Modify, object::Rows}};
use trickle_core::{ProgressState, Unit, UnitKind};
use trickle_engine::formatting::format_timestamp;
use trickle_engine::WorkCatalog;
use trickle_state::{JsonStateFile, StateStore};

use super::{resolve_progress_file, resolve_project_dir};
use crate::output::PartialRow;

/// Displays how far publishing of a project has come
pub fn cmd_status(
    project_dir: PathBuf,
    progress_file: Option<PathBuf>,
    extension: String,
) -> Result<()> {
    let project_dir = resolve_project_dir(&project_dir)?;
    let progress_file = resolve_progress_file(&project_dir, progress_file)?;
    let catalog = WorkCatalog::new(&project_dir, &extension, Some(progress_file.as_path()));

    let paths = catalog.enumerate();
    let divisible = paths
        .iter()
        .filter(|p| catalog.classify(p) == UnitKind::Divisible)
        .count();

    println!("{}", "Project Status:".bright_cyan().bold());
    println!("  {}: {}", "Directory".bright_yellow(), project_dir.display());
    println!(
        "  {}: {} ({} splittable, {} whole)",
        "Files".bright_yellow(),
        paths.len().to_string().bold(),
        divisible,
        paths.len() - divisible
    );

    let store = JsonStateFile::new(&progress_file);
    let state = store
        .load()
        .with_context(|| format!("Failed to read progress file {:?}", progress_file))?;

    let Some(state) = state else {
        println!("  {}: {}", "Progress".bright_yellow(), "none saved".dimmed());
        return Ok(());
    };

    print_progress(&catalog, &state);
    Ok(())
}

fn print_progress(catalog: &WorkCatalog, state: &ProgressState) {
    let remaining = catalog.remaining(state);

    println!("  {}: {}", "Completed".bright_yellow(), state.completed().len().to_string().bold());
    println!("  {}: {}", "In progress".bright_yellow(), state.partial().len().to_string().bold());
    println!("  {}: {}", "Remaining".bright_yellow(), remaining.len().to_string().bold());
    println!("  {}: {}", "Started".bright_yellow(), format_timestamp(state.start_time));
    if let Some(deadline) = state.pending_wait_until() {
        println!("  {}: {}", "Next commit after".bright_yellow(), format_timestamp(deadline));
    }

    if state.partial().is_empty() {
        return;
    }

    let rows: Vec<PartialRow> = state
        .partial()
        .iter()
        .map(|(path, indices)| PartialRow {
            path: path.clone(),
            published: indices.len(),
            total: match catalog.load_unit(path) {
                Unit::Divisible { sub_units, .. } => sub_units.len().to_string(),
                Unit::Atomic { .. } => "-".to_string(),
            },
            indices: indices
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    println!();
    let mut table = Table::new(rows);
    table.with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_BRIGHT_CYAN));
    println!("{}", table);
}
