//! Progress bar shown while waiting for the next commit

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::OnceLock;
use trickle_engine::WaitObserver;

fn wait_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}s")
                .expect("hardcoded progress template is valid")
                .progress_chars("=> ")
        })
        .clone()
}

/// Draws one bar per wait on stderr; hidden when stderr is not a terminal
#[derive(Default)]
pub struct WaitBar {
    bar: Option<ProgressBar>,
}

impl WaitObserver for WaitBar {
    fn started(&mut self, total_secs: u64) {
        let bar = ProgressBar::new(total_secs);
        bar.set_style(wait_style());
        bar.set_message("Next commit");
        self.bar = Some(bar);
    }

    fn tick(&mut self, elapsed_secs: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(elapsed_secs);
        }
    }

    fn finished(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
