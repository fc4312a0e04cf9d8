//! Skip Policy
//!
//! Per-algorithm state machine `Active -> Skipped(at_size)`. The first
//! disqualifying observation wins and is never revised; workers read and write
//! it concurrently without a lock (one `OnceLock` per algorithm).

use crate::aggregate::OutcomeTally;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use sortbench_core::RunOutcome;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

/// Why an algorithm stopped being scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// An iteration exceeded the hard per-run deadline
    TimedOut,
    /// Iterations errored (with `skip_on_error`), or too many iterations at a size failed
    Errored,
    /// The mean at a completed size exceeded the soft threshold
    AggregateTooSlow,
}

impl SkipReason {
    /// Hard skips abandon the size they fire at; soft skips keep it
    pub fn is_hard(self) -> bool {
        !matches!(self, SkipReason::AggregateTooSlow)
    }

    /// Label used in reports
    pub fn label(self) -> &'static str {
        match self {
            SkipReason::TimedOut => "timed out",
            SkipReason::Errored => "errored",
            SkipReason::AggregateTooSlow => "too slow",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Permanent skip decision for one algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    /// Candidate display name
    pub algorithm: String,
    /// Size at which the algorithm was disqualified
    pub skipped_at_size: usize,
    /// Category of the disqualification
    pub reason: SkipReason,
}

/// Current state of one algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmStatus {
    /// Still scheduled
    Active,
    /// Excluded from every size after `at_size`
    Skipped {
        /// Size of the disqualifying observation
        at_size: usize,
        /// Category
        reason: SkipReason,
    },
}

#[derive(Debug, Clone, Copy)]
struct Decision {
    at_size: usize,
    reason: SkipReason,
}

/// Shared skip state for one run
#[derive(Debug)]
pub struct SkipPolicy {
    names: Vec<String>,
    index: FxHashMap<String, usize>,
    slots: Vec<OnceLock<Decision>>,
    skip_on_error: bool,
}

impl SkipPolicy {
    /// Track the given algorithms, all starting `Active`
    pub fn new<I, S>(algorithms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = algorithms.into_iter().map(Into::into).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let slots = names.iter().map(|_| OnceLock::new()).collect();
        Self {
            names,
            index,
            slots,
            skip_on_error: false,
        }
    }

    /// Treat any errored iteration as disqualifying
    pub fn with_skip_on_error(mut self, skip_on_error: bool) -> Self {
        self.skip_on_error = skip_on_error;
        self
    }

    fn decision(&self, algorithm: &str) -> Option<Decision> {
        let &i = self.index.get(algorithm)?;
        self.slots[i].get().copied()
    }

    /// Current status; untracked algorithms are reported `Active`
    pub fn status(&self, algorithm: &str) -> AlgorithmStatus {
        match self.decision(algorithm) {
            Some(d) => AlgorithmStatus::Skipped {
                at_size: d.at_size,
                reason: d.reason,
            },
            None => AlgorithmStatus::Active,
        }
    }

    /// Whether work for `algorithm` at `size` may still be dispatched.
    ///
    /// Also vetoes the remaining iterations at the skip size itself.
    pub fn permits(&self, algorithm: &str, size: usize) -> bool {
        match self.decision(algorithm) {
            Some(d) => size < d.at_size,
            None => true,
        }
    }

    /// Record a skip. Returns `true` only for the call that created the record.
    pub fn record(&self, algorithm: &str, size: usize, reason: SkipReason) -> bool {
        let Some(&i) = self.index.get(algorithm) else {
            return false;
        };

        let mut created = false;
        self.slots[i].get_or_init(|| {
            created = true;
            Decision {
                at_size: size,
                reason,
            }
        });

        if created {
            warn!(
                algorithm,
                size,
                reason = reason.label(),
                "Skipping {} for sizes above {}",
                algorithm,
                size
            );
        }
        created
    }

    /// Feed one work-unit outcome. Returns `true` if it triggered the skip.
    pub fn observe_outcome(&self, algorithm: &str, size: usize, outcome: &RunOutcome) -> bool {
        match outcome {
            RunOutcome::TimedOut => self.record(algorithm, size, SkipReason::TimedOut),
            RunOutcome::Errored(_) if self.skip_on_error => {
                self.record(algorithm, size, SkipReason::Errored)
            }
            _ => false,
        }
    }

    /// Feed the outcome counts of a completed size. Returns `true` if a failed
    /// share of at least `max_ratio` triggered the skip.
    pub fn observe_failures(
        &self,
        algorithm: &str,
        size: usize,
        tally: &OutcomeTally,
        max_ratio: f64,
    ) -> bool {
        let total = tally.total();
        total > 0
            && tally.failed() as f64 / total as f64 >= max_ratio
            && self.record(algorithm, size, SkipReason::Errored)
    }

    /// Feed the mean of a completed size. Returns `true` if it triggered the skip.
    pub fn observe_mean(
        &self,
        algorithm: &str,
        size: usize,
        mean: Duration,
        threshold: Duration,
    ) -> bool {
        mean > threshold && self.record(algorithm, size, SkipReason::AggregateTooSlow)
    }

    /// All skip records, ordered by size then name
    pub fn records(&self) -> Vec<SkipRecord> {
        let mut records: Vec<SkipRecord> = self
            .names
            .iter()
            .zip(&self.slots)
            .filter_map(|(name, slot)| {
                slot.get().map(|d| SkipRecord {
                    algorithm: name.clone(),
                    skipped_at_size: d.at_size,
                    reason: d.reason,
                })
            })
            .collect();
        records.sort_by(|a, b| {
            a.skipped_at_size
                .cmp(&b.skipped_at_size)
                .then_with(|| a.algorithm.cmp(&b.algorithm))
        });
        records
    }

    /// Algorithms still active
    pub fn active(&self) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| slot.get().is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
