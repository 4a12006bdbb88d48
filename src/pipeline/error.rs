//! Error types and reporting for pipeline stages.
//!
//! Faults inside spawned stage tasks cannot propagate as `Result`s to the
//! caller, so they go through an [`ErrorReporter`]. All faults are local to
//! one session; nothing here escalates to the host process.

use std::fmt;
use std::sync::Mutex;

/// Errors that can occur inside a running pipeline stage.
#[derive(Debug, Clone)]
pub enum StageError {
    /// Recoverable error; the stage keeps processing.
    Recoverable(String),
    /// Fatal error; the stage shuts down and the session winds down with it.
    Fatal(String),
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::Recoverable(msg) => write!(f, "Recoverable error: {}", msg),
            StageError::Fatal(msg) => write!(f, "Fatal error: {}", msg),
        }
    }
}

impl std::error::Error for StageError {}

/// Trait for reporting stage errors.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from the named stage.
    fn report(&self, stage: &str, error: &StageError);
}

/// Default reporter that logs to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report(&self, stage: &str, error: &StageError) {
        eprintln!("voxbridge [{}]: {}", stage, error);
    }
}

/// Reporter that collects reports in memory, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all (stage, message) pairs reported so far.
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.reports().is_empty()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, stage: &str, error: &StageError) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push((stage.to_string(), error.to_string()));
        }
    }
}
