//! Trickle CLI - Publishes a project to GitHub one small commit at a time
//!
//! Provides:
//! - `run`: the resumable publishing loop (Ctrl-C pauses, rerun resumes)
//! - `status`: what has been published so far

mod commands;
mod output;
mod progress;
mod signal;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use trickle_engine::catalog::DEFAULT_DIVISIBLE_EXTENSION;
use trickle_engine::scheduler::{
    DEFAULT_DIVISIBLE_PROBABILITY, DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY,
};

use commands::{cmd_run, cmd_status};

/// Progress file name used when `--progress-file` is not given
pub const DEFAULT_PROGRESS_FILE: &str = ".trickle-progress.json";

#[derive(Parser)]
#[command(name = "trickle")]
#[command(
    about = "Publish a project to GitHub as a slow trickle of small commits",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publishes the project, resuming from saved progress if any
    Run(RunArgs),

    /// Shows publishing progress for a project
    Status {
        /// Project directory
        #[arg(short, long)]
        project_dir: PathBuf,

        /// Progress file (default: <project-dir>/.trickle-progress.json)
        #[arg(long)]
        progress_file: Option<PathBuf>,

        /// Extension of files split into functions
        #[arg(short, long, default_value = DEFAULT_DIVISIBLE_EXTENSION)]
        extension: String,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Project directory to publish
    #[arg(short, long)]
    pub project_dir: PathBuf,

    /// GitHub token used for pushing
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Target repository as owner/name
    #[arg(short, long)]
    pub repo: String,

    /// Progress file (default: <project-dir>/.trickle-progress.json)
    #[arg(long)]
    pub progress_file: Option<PathBuf>,

    /// Branch to push (default: current branch, or "main")
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Remote name to create or update
    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Extension of files split into functions
    #[arg(short, long, default_value = DEFAULT_DIVISIBLE_EXTENSION)]
    pub extension: String,

    /// Shortest delay between commits, in seconds
    #[arg(long, default_value_t = DEFAULT_MIN_DELAY)]
    pub min_delay: u64,

    /// Longest delay between commits, in seconds
    #[arg(long, default_value_t = DEFAULT_MAX_DELAY)]
    pub max_delay: u64,

    /// Chance of picking a splittable file when both kinds remain
    #[arg(long, default_value_t = DEFAULT_DIVISIBLE_PROBABILITY)]
    pub divisible_probability: f64,

    /// Seed for the random choices (default: from entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Put split files back as they were instead of as the joined functions
    #[arg(long)]
    pub keep_original: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logger
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level)
    ).init();

    match cli.command {
        Commands::Run(args) => {
            cmd_run(args)?;
        }
        Commands::Status { project_dir, progress_file, extension } => {
            cmd_status(project_dir, progress_file, extension)?;
        }
    }

    Ok(())
}
