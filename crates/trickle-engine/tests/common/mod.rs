//! Shared fixtures for engine tests: a scripted publisher and a manual clock

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use trickle_engine::{CancelToken, PublishError, PublishResult, Publisher, Timer, WaitOutcome};

// ── publisher ────────────────────────────────────────────────────────────────

/// One recorded publish call
#[derive(Debug, Clone)]
pub struct PublishCall {
    pub path: String,
    pub message: String,
    /// File content at the moment of the call
    pub content: String,
}

type FailRule = Box<dyn Fn(&str, &str) -> Option<PublishError>>;

/// Publisher that records calls and fails according to a rule
#[derive(Clone)]
pub struct ScriptedPublisher {
    root: PathBuf,
    pub calls: Rc<RefCell<Vec<PublishCall>>>,
    fail_rule: Rc<RefCell<Option<FailRule>>>,
}

impl ScriptedPublisher {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            calls: Rc::new(RefCell::new(Vec::new())),
            fail_rule: Rc::new(RefCell::new(None)),
        }
    }

    /// Fails every call for which `rule(path, message)` returns an error
    pub fn fail_when(&self, rule: impl Fn(&str, &str) -> Option<PublishError> + 'static) {
        *self.fail_rule.borrow_mut() = Some(Box::new(rule));
    }

    pub fn succeed_always(&self) {
        *self.fail_rule.borrow_mut() = None;
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls(&self) -> Vec<PublishCall> {
        self.calls.borrow().clone()
    }
}

impl Publisher for ScriptedPublisher {
    fn publish(&mut self, file: &Path, message: &str) -> PublishResult {
        let full = self.root.join(file);
        let path = file.to_string_lossy().into_owned();
        let Ok(content) = fs::read_to_string(&full) else {
            return Err(PublishError::FileMissing(file.to_path_buf()));
        };

        self.calls.borrow_mut().push(PublishCall {
            path: path.clone(),
            message: message.to_string(),
            content,
        });

        if let Some(rule) = self.fail_rule.borrow().as_ref() {
            if let Some(err) = rule(&path, message) {
                return Err(err);
            }
        }
        Ok(format!("commit-{}", self.calls.borrow().len()))
    }
}

// ── timer ────────────────────────────────────────────────────────────────────

/// Clock that jumps straight to each deadline
///
/// With `cancel_on_wait(n)` the n-th wait (1-based) sets the cancel token and
/// returns `Cancelled` without advancing time.
#[derive(Clone)]
pub struct ManualTimer {
    now: Rc<Cell<u64>>,
    cancel_on: Rc<Cell<Option<usize>>>,
    pub waits: Rc<RefCell<Vec<(u64, u64)>>>,
}

impl ManualTimer {
    pub fn starting_at(now: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
            cancel_on: Rc::new(Cell::new(None)),
            waits: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn cancel_on_wait(&self, n: usize) {
        self.cancel_on.set(Some(n));
    }

    pub fn advance(&self, secs: u64) {
        self.now.set(self.now.get() + secs);
    }

    pub fn wait_count(&self) -> usize {
        self.waits.borrow().len()
    }

    /// (start, deadline) of every wait so far
    pub fn waits(&self) -> Vec<(u64, u64)> {
        self.waits.borrow().clone()
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> u64 {
        self.now.get()
    }

    fn wait_until(&mut self, deadline: u64, cancel: &CancelToken) -> WaitOutcome {
        self.waits.borrow_mut().push((self.now.get(), deadline));
        if self.cancel_on.get() == Some(self.waits.borrow().len()) {
            cancel.cancel();
            return WaitOutcome::Cancelled;
        }
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
        WaitOutcome::Elapsed
    }
}

// ── project fixtures ─────────────────────────────────────────────────────────

pub const THREE_FUNCTIONS: &str = "\
import os


def first():
    return 1


# Second one
def second():
    return 2


@cached
def third():
    return os.getcwd()
";

pub const TWO_FUNCTIONS: &str = "\
def alpha():
    return 'a'


def beta():
    return 'b'
";

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
