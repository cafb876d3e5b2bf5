//! Ctrl-C handling
//!
//! The first interrupt sets the cancel token so the scheduler pauses at its
//! next check; a second one exits immediately.

use anyhow::{Context, Result};
use std::thread;
use trickle_engine::CancelToken;

/// Exit status for a forced stop (128 + SIGINT)
const FORCED_EXIT_CODE: i32 = 130;

/// Listens for Ctrl-C on a background thread with its own tokio runtime
pub fn install_ctrl_c_handler(cancel: CancelToken) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::warn!("Cannot listen for Ctrl-C: {}", e);
                    return;
                }
                log::info!("Interrupt received, pausing (press Ctrl-C again to force quit)");
                cancel.cancel();

                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Forced quit; progress up to the last save is kept");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            });
        })
        .context("Failed to spawn signal thread")?;

    Ok(())
}
