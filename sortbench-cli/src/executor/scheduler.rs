//! Concurrency Scheduler
//!
//! Runs the (algorithm × size × iteration) matrix one size at a time.
//!
//! ```text
//!  units ──▶ crossbeam queue ──▶ pool slot 0..P (one UnitRunner each)
//!                                     │  permits()? run : abandon
//!                                     │  observe_outcome()
//!                                     ▼
//!                               event channel ──▶ collector (this thread)
//!                                                  ResultStore, journal, progress
//! ```
//!
//! Sizes are processed as waves. The skip policy is consulted by the slot
//! right before a unit runs, so a skip recorded by one slot stops its
//! siblings from starting further iterations of that algorithm. After a
//! wave drains, the size is aggregated and the soft (mean), failure-ratio
//! and zero-success skips are applied before the next size is planned.

use super::execution::{BenchmarkConfig, UnitRunner, make_runner};
use super::statistics::summarize_size;
use crate::journal::{Journal, JournalRow};
use crossbeam::channel::{self, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::{ThreadPool, ThreadPoolBuilder};
use sortbench_core::{CandidateDef, CoreError, RunOutcome, shutdown_requested, validate_unique_names};
use sortbench_logic::{
    AlgorithmStatus, OutcomeTally, ResultStore, SizeStats, SkipPolicy, SkipReason, SkipRecord,
};
use sortbench_report::{format_nanos, format_size};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Stack size of pool threads (in-process mode runs candidates on them)
const POOL_STACK: usize = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid benchmark configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Candidates(#[from] CoreError),

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy)]
struct WorkUnit {
    candidate: &'static CandidateDef,
    size: usize,
    iteration: u32,
}

/// A finished or abandoned unit; `None` means it never ran
struct UnitEvent {
    unit: WorkUnit,
    outcome: Option<RunOutcome>,
}

/// Results of one size
#[derive(Debug, Clone)]
pub struct SizeRun {
    pub size: usize,
    /// Stats that survive the skip rules, by candidate order
    pub stats: Vec<SizeStats>,
    /// Outcome counts over every algorithm at this size
    pub tally: OutcomeTally,
    /// Skips that fired at this size
    pub skipped_here: Vec<SkipRecord>,
    /// False when a shutdown interrupted the wave
    pub completed: bool,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunResults {
    pub sizes: Vec<SizeRun>,
    /// Every skip, ordered by size then name
    pub skipped: Vec<SkipRecord>,
    pub interrupted: bool,
    pub elapsed: Duration,
    /// Units executed in this process
    pub units_executed: usize,
    /// Units restored from the journal
    pub units_restored: usize,
}

impl RunResults {
    /// Stats of every size, in size order
    pub fn all_stats(&self) -> Vec<SizeStats> {
        self.sizes.iter().flat_map(|s| s.stats.iter().cloned()).collect()
    }

    /// Stats of the sizes whose wave ran to the end
    pub fn completed_stats(&self) -> Vec<SizeStats> {
        self.sizes
            .iter()
            .filter(|s| s.completed)
            .flat_map(|s| s.stats.iter().cloned())
            .collect()
    }
}

/// Drives one benchmark run
pub struct Scheduler {
    config: BenchmarkConfig,
    candidates: Vec<&'static CandidateDef>,
    policy: SkipPolicy,
    pool: ThreadPool,
    runners: Vec<Mutex<Box<dyn UnitRunner>>>,
    journal: Option<Journal>,
    show_progress: bool,
}

impl Scheduler {
    /// Validate the configuration and prepare one runner per worker slot
    pub fn new(
        config: BenchmarkConfig,
        candidates: Vec<&'static CandidateDef>,
    ) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        validate_unique_names(candidates.iter().copied())?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.parallelism)
            .stack_size(POOL_STACK)
            .thread_name(|i| format!("sortbench-slot-{}", i))
            .build()?;

        let policy = SkipPolicy::new(candidates.iter().map(|c| c.name))
            .with_skip_on_error(config.skip_on_error);
        let runners = (0..config.parallelism)
            .map(|slot| Mutex::new(make_runner(&config, slot)))
            .collect();

        Ok(Self {
            config,
            candidates,
            policy,
            pool,
            runners,
            journal: None,
            show_progress: false,
        })
    }

    /// Record every unit in `journal` and resume from rows it already holds
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Show a progress bar per size
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Replace the per-slot runners (the closure receives the slot index)
    pub fn with_runner_factory(mut self, factory: impl Fn(usize) -> Box<dyn UnitRunner>) -> Self {
        self.runners = (0..self.config.parallelism)
            .map(|slot| Mutex::new(factory(slot)))
            .collect();
        self
    }

    /// The skip state of this run
    pub fn policy(&self) -> &SkipPolicy {
        &self.policy
    }

    /// Run every size in ascending order
    pub fn run(mut self) -> RunResults {
        let start = Instant::now();
        let mut store = ResultStore::new();
        let mut sizes = Vec::new();
        let mut interrupted = false;
        let mut units_executed = 0;
        let mut units_restored = 0;

        let planned = self.config.sizes.clone();
        for size in planned {
            if shutdown_requested() {
                interrupted = true;
                break;
            }
            if !self.candidates.is_empty()
                && self
                    .candidates
                    .iter()
                    .all(|c| !self.policy.permits(c.name, size))
            {
                info!("All algorithms skipped; stopping before size {}", format_size(size));
                break;
            }

            info!(
                workers = self.config.parallelism,
                "Testing array size: {}",
                format_size(size)
            );

            units_restored += self.restore(size, &mut store);
            let units = self.plan_units(size, &store);
            units_executed += self.dispatch(size, units, &mut store);

            let completed = !shutdown_requested();
            sizes.push(self.finish_size(size, &store, completed));

            if let Some(journal) = self.journal.as_mut() {
                if let Err(e) = journal.finish_size(size) {
                    warn!("Failed to sort journal for size {}: {}", size, e);
                }
            }

            if !completed {
                interrupted = true;
                break;
            }
        }

        if interrupted {
            warn!("Run interrupted; reporting completed sizes only");
        }

        RunResults {
            sizes,
            skipped: self.policy.records(),
            interrupted,
            elapsed: start.elapsed(),
            units_executed,
            units_restored,
        }
    }

    /// Feed journal rows for `size` into the store and the skip policy
    fn restore(&self, size: usize, store: &mut ResultStore) -> usize {
        let Some(journal) = self.journal.as_ref() else {
            return 0;
        };
        let rows = match journal.load(size) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Failed to read journal for size {}: {}", size, e);
                return 0;
            }
        };

        let mut restored = 0;
        for row in rows {
            let Some(candidate) = self.candidates.iter().find(|c| c.name == row.algorithm) else {
                continue;
            };
            if row.iteration == 0
                || row.iteration > self.config.iterations
                || !self.policy.permits(candidate.name, size)
            {
                continue;
            }
            self.policy.observe_outcome(candidate.name, size, &row.outcome);
            store.insert(candidate.name, size, row.iteration, row.outcome);
            restored += 1;
        }

        if restored > 0 {
            info!(
                "Restored {} results for size {} from {}",
                restored,
                format_size(size),
                journal.path_for(size).display()
            );
        }
        restored
    }

    fn plan_units(&self, size: usize, store: &ResultStore) -> Vec<WorkUnit> {
        let mut units = Vec::new();
        for &candidate in &self.candidates {
            if !self.policy.permits(candidate.name, size) {
                continue;
            }
            for iteration in 1..=self.config.iterations {
                if !store.contains(candidate.name, size, iteration) {
                    units.push(WorkUnit {
                        candidate,
                        size,
                        iteration,
                    });
                }
            }
        }
        units
    }

    /// Run one wave and collect its events. Returns the number of units executed.
    fn dispatch(&mut self, size: usize, units: Vec<WorkUnit>, store: &mut ResultStore) -> usize {
        if units.is_empty() {
            return 0;
        }

        let pb = self.progress_bar(size, units.len() as u64);
        let (unit_tx, unit_rx) = channel::unbounded();
        for unit in units {
            let _ = unit_tx.send(unit);
        }
        drop(unit_tx);

        let (event_tx, event_rx) = channel::unbounded::<UnitEvent>();
        let pool = &self.pool;
        let runners = &self.runners;
        let policy = &self.policy;
        let journal = &mut self.journal;
        let mut executed = 0;

        std::thread::scope(|s| {
            let workers = s.spawn(move || {
                pool.broadcast(|ctx| work_loop(ctx.index(), runners, policy, &unit_rx, &event_tx));
            });

            for event in event_rx.iter() {
                pb.inc(1);
                let Some(outcome) = event.outcome else {
                    continue;
                };
                let WorkUnit {
                    candidate,
                    size,
                    iteration,
                } = event.unit;
                executed += 1;

                match &outcome {
                    RunOutcome::Success(d) => {
                        debug!(candidate = candidate.name, size, iteration, "{:?}", d)
                    }
                    RunOutcome::TimedOut => warn!(
                        "{} timed out at size {} (iteration {})",
                        candidate.name,
                        format_size(size),
                        iteration
                    ),
                    RunOutcome::Errored(reason) => warn!(
                        "{} errored at size {} (iteration {}): {}",
                        candidate.name,
                        format_size(size),
                        iteration,
                        reason
                    ),
                }

                if let Some(journal) = journal.as_mut() {
                    let row = JournalRow {
                        algorithm: candidate.name.to_string(),
                        size,
                        iteration,
                        outcome: outcome.clone(),
                    };
                    if let Err(e) = journal.append(&row) {
                        warn!("Failed to write journal: {}", e);
                    }
                }
                store.insert(candidate.name, size, iteration, outcome);
            }

            if workers.join().is_err() {
                warn!("Worker pool panicked during size {}", size);
            }
        });

        pb.finish_and_clear();
        executed
    }

    /// Aggregate a drained size and apply the post-size skip rules
    fn finish_size(&self, size: usize, store: &ResultStore, completed: bool) -> SizeRun {
        let cells = self
            .pool
            .install(|| summarize_size(store, &self.candidates, size));

        let mut stats = Vec::new();
        let mut size_tally = OutcomeTally::default();

        for cell in cells {
            size_tally.succeeded += cell.tally.succeeded;
            size_tally.timed_out += cell.tally.timed_out;
            size_tally.errored += cell.tally.errored;

            if completed {
                match &cell.stats {
                    None => {
                        self.policy.record(cell.algorithm, size, SkipReason::Errored);
                    }
                    Some(s) => {
                        if let Some(ratio) = self.config.max_failure_ratio {
                            self.policy
                                .observe_failures(cell.algorithm, size, &cell.tally, ratio);
                        }
                        if let Some(threshold) = self.config.threshold {
                            let mean = Duration::from_nanos(s.mean_ns.round() as u64);
                            self.policy.observe_mean(cell.algorithm, size, mean, threshold);
                        }
                    }
                }
            }

            let hard_skipped_here = matches!(
                self.policy.status(cell.algorithm),
                AlgorithmStatus::Skipped { at_size, reason } if at_size == size && reason.is_hard()
            );

            match cell.stats {
                Some(s) if !hard_skipped_here => {
                    info!(
                        "{} on size {}: {} (DNF: {})",
                        cell.algorithm,
                        format_size(size),
                        format_nanos(s.mean_ns, true),
                        cell.tally.failed()
                    );
                    stats.push(s);
                }
                _ => info!(
                    "{} on size {}: no result (DNF: {})",
                    cell.algorithm,
                    format_size(size),
                    cell.tally.failed()
                ),
            }
        }

        let skipped_here = self
            .policy
            .records()
            .into_iter()
            .filter(|r| r.skipped_at_size == size)
            .collect();

        SizeRun {
            size,
            stats,
            tally: size_tally,
            skipped_here,
            completed,
        }
    }

    fn progress_bar(&self, size: usize, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(format!("size {}", format_size(size)));
        pb
    }
}

/// Body of one pool slot: pull units until the queue is drained
fn work_loop(
    slot: usize,
    runners: &[Mutex<Box<dyn UnitRunner>>],
    policy: &SkipPolicy,
    units: &Receiver<WorkUnit>,
    events: &Sender<UnitEvent>,
) {
    let Some(runner) = runners.get(slot) else {
        return;
    };
    let mut runner = runner.lock().unwrap_or_else(PoisonError::into_inner);

    while let Ok(unit) = units.recv() {
        let outcome = if shutdown_requested() || !policy.permits(unit.candidate.name, unit.size) {
            None
        } else {
            let outcome = runner.run(unit.candidate, unit.size, unit.iteration);
            policy.observe_outcome(unit.candidate.name, unit.size, &outcome);
            Some(outcome)
        };
        if events.send(UnitEvent { unit, outcome }).is_err() {
            break;
        }
    }
}
