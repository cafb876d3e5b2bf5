//! Run command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use trickle_engine::{
    CancelToken, GitPublisher, PublishOptions, RestorePolicy, RunOutcome, Scheduler,
    SchedulerConfig, SystemTimer, Timer, WorkCatalog,
};
use trickle_state::{load_or_fresh, JsonStateFile};

use super::{resolve_progress_file, resolve_project_dir};
use crate::progress::WaitBar;
use crate::signal::install_ctrl_c_handler;
use crate::RunArgs;

/// Publishes the project until everything is pushed or the user interrupts
pub fn cmd_run(args: RunArgs) -> Result<()> {
    let project_dir = resolve_project_dir(&args.project_dir)?;
    let progress_file = resolve_progress_file(&project_dir, args.progress_file)?;

    let config = SchedulerConfig {
        divisible_probability: args.divisible_probability,
        min_delay: args.min_delay,
        max_delay: args.max_delay,
        restore: if args.keep_original {
            RestorePolicy::Original
        } else {
            RestorePolicy::Concatenated
        },
    };
    config.validate().context("Invalid scheduling options")?;

    log::info!("Publishing {:?} to {}", project_dir, args.repo);
    log::info!("Progress file: {:?}", progress_file);

    let options = PublishOptions {
        remote: args.remote,
        branch: args.branch,
    };
    let publisher = GitPublisher::connect(&project_dir, &args.repo, &args.token, options)
        .context("Failed to set up publishing")?;
    log::info!("Pushing to branch {}", publisher.branch());

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let cancel = CancelToken::new();
    install_ctrl_c_handler(cancel.clone())?;

    let timer = SystemTimer::new().with_observer(Box::new(WaitBar::default()));
    let store = JsonStateFile::new(&progress_file);
    let mut state = load_or_fresh(&store, timer.now());

    let catalog = WorkCatalog::new(&project_dir, &args.extension, Some(progress_file.as_path()));
    let mut scheduler = Scheduler::new(config, catalog, store, publisher, timer, rng, cancel)?;

    match scheduler.run(&mut state) {
        RunOutcome::AllComplete => {
            println!(
                "{} All {} file(s) published",
                "✔".green(),
                state.completed().len().to_string().bold()
            );
        }
        RunOutcome::Paused => {
            println!(
                "{} Paused with {} file(s) published; run the same command to continue",
                "⏸".yellow(),
                state.completed().len().to_string().bold()
            );
        }
    }

    Ok(())
}
