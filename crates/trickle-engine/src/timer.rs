//! Clock, interruptible waits and cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How often a wait re-checks cancellation and refreshes its observer
const DEFAULT_TICK: Duration = Duration::from_millis(250);

/// Shared cancellation flag, set from a signal handler
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// Time source and blocking wait used by the scheduler
pub trait Timer {
    /// Current time as Unix epoch seconds
    fn now(&self) -> u64;

    /// Blocks until `deadline` (epoch seconds) or until `cancel` is set
    fn wait_until(&mut self, deadline: u64, cancel: &CancelToken) -> WaitOutcome;
}

/// Receives progress updates while a wait is in progress
pub trait WaitObserver {
    /// A wait of `total_secs` started
    fn started(&mut self, total_secs: u64);

    fn tick(&mut self, elapsed_secs: u64);

    fn finished(&mut self);
}

/// Observer that displays nothing
#[derive(Debug, Default)]
pub struct NoopObserver;

impl WaitObserver for NoopObserver {
    fn started(&mut self, _total_secs: u64) {}
    fn tick(&mut self, _elapsed_secs: u64) {}
    fn finished(&mut self) {}
}

/// Wall-clock timer sleeping in short ticks
pub struct SystemTimer {
    tick: Duration,
    observer: Box<dyn WaitObserver>,
}

impl SystemTimer {
    pub fn new() -> Self {
        Self {
            tick: DEFAULT_TICK,
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn WaitObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for SystemTimer {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn wait_until(&mut self, deadline: u64, cancel: &CancelToken) -> WaitOutcome {
        let start = self.now();
        self.observer.started(deadline.saturating_sub(start));

        let outcome = loop {
            if cancel.is_cancelled() {
                break WaitOutcome::Cancelled;
            }
            let now = self.now();
            if now >= deadline {
                break WaitOutcome::Elapsed;
            }
            self.observer.tick(now - start);
            thread::sleep(self.tick);
        };

        self.observer.finished();
        outcome
    }
}
