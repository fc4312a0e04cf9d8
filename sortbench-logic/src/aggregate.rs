//! Statistics Aggregator
//!
//! Reduces the outcomes of one (algorithm, size) cell into `SizeStats`.
//! Only `Success` durations enter the numbers; failures are counted.

use serde::{Deserialize, Serialize};
use sortbench_core::RunOutcome;
use sortbench_stats::compute_summary;

/// Outcome counts for one (algorithm, size) cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    /// Verified successful runs
    pub succeeded: usize,
    /// Runs killed at the deadline
    pub timed_out: usize,
    /// Panics, crashes and incorrect outputs
    pub errored: usize,
}

impl OutcomeTally {
    /// All recorded outcomes
    pub fn total(&self) -> usize {
        self.succeeded + self.timed_out + self.errored
    }

    /// Runs that did not produce a sample ("DNF" in the log line)
    pub fn failed(&self) -> usize {
        self.timed_out + self.errored
    }
}

/// Count outcomes by kind
pub fn tally<'a>(outcomes: impl IntoIterator<Item = &'a RunOutcome>) -> OutcomeTally {
    let mut t = OutcomeTally::default();
    for outcome in outcomes {
        match outcome {
            RunOutcome::Success(_) => t.succeeded += 1,
            RunOutcome::TimedOut => t.timed_out += 1,
            RunOutcome::Errored(_) => t.errored += 1,
        }
    }
    t
}

/// Statistics for one algorithm at one array size (durations in nanoseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeStats {
    /// Candidate display name
    pub algorithm: String,
    /// Array size
    pub size: usize,
    /// Number of successful samples
    pub sample_count: usize,
    /// Iterations that timed out
    pub timed_out: usize,
    /// Iterations that errored
    pub errored: usize,
    /// Arithmetic mean
    pub mean_ns: f64,
    /// Median
    pub median_ns: f64,
    /// Sample standard deviation
    pub std_dev_ns: f64,
    /// Fastest sample
    pub min_ns: f64,
    /// Slowest sample
    pub max_ns: f64,
    /// Standard deviation as a percentage of the mean; `None` below two samples
    pub variance_percent: Option<f64>,
}

/// Aggregate one cell. Returns `None` when no iteration succeeded.
pub fn aggregate(algorithm: &str, size: usize, outcomes: &[RunOutcome]) -> Option<SizeStats> {
    let counts = tally(outcomes);
    let samples: Vec<f64> = outcomes
        .iter()
        .filter_map(RunOutcome::duration)
        .map(|d| d.as_nanos() as f64)
        .collect();

    let summary = compute_summary(&samples)?;

    Some(SizeStats {
        algorithm: algorithm.to_string(),
        size,
        sample_count: summary.sample_count,
        timed_out: counts.timed_out,
        errored: counts.errored,
        mean_ns: summary.mean,
        median_ns: summary.median,
        std_dev_ns: summary.std_dev,
        min_ns: summary.min,
        max_ns: summary.max,
        variance_percent: summary.variance_percent(),
    })
}
