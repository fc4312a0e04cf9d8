//! Run Outcome
//!
//! Produced once per (algorithm, size, iteration).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of executing one work unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Completed within the deadline with a verified result
    Success(Duration),
    /// Exceeded the per-run deadline and was terminated
    TimedOut,
    /// Panicked, crashed the worker, or returned an incorrect result
    Errored(String),
}

impl RunOutcome {
    /// Measured duration, only for `Success`
    pub fn duration(&self) -> Option<Duration> {
        match self {
            RunOutcome::Success(d) => Some(*d),
            _ => None,
        }
    }

    /// Whether this outcome contributes a sample
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }

    /// Short label used in logs and the journal
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Success(_) => "ok",
            RunOutcome::TimedOut => "timed out",
            RunOutcome::Errored(_) => "errored",
        }
    }
}
