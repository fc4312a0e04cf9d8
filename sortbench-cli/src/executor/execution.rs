//! Unit Execution
//!
//! One `UnitRunner` per scheduler slot turns a work unit into a `RunOutcome`.
//! Which runner is used depends on the isolation mode.
//!
//! ## Execution Modes
//!
//! - **Process (`ProcessRunner`)**: a persistent worker process per slot. A
//!   timeout kills the worker and the next unit spawns a fresh one. Crashes
//!   (segfault, stack overflow, abort) only cost the unit that caused them.
//!
//! - **Thread (`ThreadRunner`)**: the candidate runs on a dedicated thread. On
//!   timeout the thread is abandoned, since threads cannot be killed.
//!
//! - **In-process (`InProcessRunner`)**: direct call on the slot thread. The
//!   timeout is applied after the fact. Debugging only.

use crate::config::IsolationMode;
use crate::supervisor::{SupervisorError, UnitReply, WorkerHandle};
use crossbeam::channel;
use sortbench_core::{CandidateDef, INCORRECT_OUTPUT, RunOutcome, WorkloadGenerator, execute_unit};
use sortbench_ipc::{FailureKind, RunRequest};
use std::time::Duration;
use tracing::{debug, warn};

/// Stack size of a thread-mode unit; deep recursion in naive quicksorts needs room
const UNIT_THREAD_STACK: usize = 256 * 1024 * 1024;

/// Default share of failed iterations that disqualifies an algorithm
pub const DEFAULT_MAX_FAILURE_RATIO: f64 = 0.5;

/// Wall-clock allowance past the timeout for workload generation, verification and IPC
const DEADLINE_GRACE: Duration = Duration::from_millis(50);
const DEADLINE_GRACE_PER_ELEMENT: Duration = Duration::from_nanos(200);

/// How long a runner waits before abandoning a unit of `size` elements.
///
/// The timeout itself is compared against the measured sort time by
/// [`apply_timeout`]; this only bounds the whole unit.
pub fn wall_deadline(timeout: Duration, size: usize) -> Duration {
    let elements = u32::try_from(size).unwrap_or(u32::MAX);
    timeout
        .saturating_add(DEADLINE_GRACE)
        .saturating_add(DEADLINE_GRACE_PER_ELEMENT.saturating_mul(elements))
}

/// A successful run whose sort took longer than `timeout` counts as timed out
pub fn apply_timeout(outcome: RunOutcome, timeout: Option<Duration>) -> RunOutcome {
    match outcome {
        RunOutcome::Success(d) if timeout.is_some_and(|t| d > t) => RunOutcome::TimedOut,
        outcome => outcome,
    }
}

/// Configuration for one benchmark run
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Iterations per (algorithm, size)
    pub iterations: u32,
    /// Array sizes, ascending and unique
    pub sizes: Vec<usize>,
    /// Hard deadline on the measured sort of one run; `None` disables it
    pub timeout: Option<Duration>,
    /// Soft ceiling on a size's mean; `None` disables the AggregateTooSlow skip
    pub threshold: Option<Duration>,
    /// Concurrent workers
    pub parallelism: usize,
    /// How units are isolated from the scheduler
    pub isolation: IsolationMode,
    /// Disqualify an algorithm on its first errored iteration
    pub skip_on_error: bool,
    /// Share of failed iterations at a completed size that disqualifies an
    /// algorithm; `None` disables the rule
    pub max_failure_ratio: Option<f64>,
    /// Workload seed
    pub seed: u64,
    /// Smallest generated value
    pub min_value: i64,
    /// Largest generated value
    pub max_value: i64,
}

impl BenchmarkConfig {
    /// Check the invariants the scheduler relies on
    pub fn validate(&self) -> Result<(), String> {
        if self.iterations == 0 {
            return Err("iterations must be at least 1".to_string());
        }
        if self.parallelism == 0 {
            return Err("parallelism must be at least 1".to_string());
        }
        if let Some(w) = self.sizes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(format!(
                "sizes must be strictly ascending ({} is followed by {})",
                w[0], w[1]
            ));
        }
        if self.min_value > self.max_value {
            return Err(format!(
                "min_value {} exceeds max_value {}",
                self.min_value, self.max_value
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err("timeout must be positive".to_string());
        }
        if let Some(ratio) = self.max_failure_ratio {
            if ratio.is_nan() || ratio <= 0.0 || ratio > 1.0 {
                return Err(format!("max_failure_ratio must be in (0, 1], got {}", ratio));
            }
        }
        Ok(())
    }

    /// Generator every runner of this run draws from
    pub fn generator(&self) -> WorkloadGenerator {
        WorkloadGenerator::new(self.seed).with_range(self.min_value, self.max_value)
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iterations: 500,
            sizes: vec![5, 7, 9],
            timeout: None,
            threshold: Some(Duration::from_secs(300)),
            parallelism: 1,
            isolation: IsolationMode::default(),
            skip_on_error: false,
            max_failure_ratio: Some(DEFAULT_MAX_FAILURE_RATIO),
            seed: 0,
            min_value: sortbench_core::DEFAULT_MIN_VALUE,
            max_value: sortbench_core::DEFAULT_MAX_VALUE,
        }
    }
}

/// Executes work units for one scheduler slot
pub trait UnitRunner: Send {
    /// Run `candidate` once on the workload of (`size`, `iteration`)
    fn run(&mut self, candidate: &'static CandidateDef, size: usize, iteration: u32) -> RunOutcome;
}

/// Build the runner for scheduler slot `slot` matching the configured isolation mode.
///
/// Worker processes are pinned one per CPU when more than one slot runs.
pub fn make_runner(config: &BenchmarkConfig, slot: usize) -> Box<dyn UnitRunner> {
    let generator = config.generator();
    match config.isolation {
        IsolationMode::Process => {
            let runner = ProcessRunner::new(generator, config.timeout);
            if config.parallelism > 1 {
                let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
                Box::new(runner.with_cpu(slot % cpus))
            } else {
                Box::new(runner)
            }
        }
        IsolationMode::Thread => Box::new(ThreadRunner::new(generator, config.timeout)),
        IsolationMode::InProcess => Box::new(InProcessRunner::new(generator, config.timeout)),
    }
}

/// Runs units in a persistent worker process
pub struct ProcessRunner {
    generator: WorkloadGenerator,
    timeout: Option<Duration>,
    cpu: Option<usize>,
    worker: Option<WorkerHandle>,
}

impl ProcessRunner {
    pub fn new(generator: WorkloadGenerator, timeout: Option<Duration>) -> Self {
        Self {
            generator,
            timeout,
            cpu: None,
            worker: None,
        }
    }

    /// Pin every worker this runner spawns to `cpu`
    pub fn with_cpu(mut self, cpu: usize) -> Self {
        self.cpu = Some(cpu);
        self
    }

    fn worker(&mut self) -> Result<&mut WorkerHandle, SupervisorError> {
        let alive = match self.worker.as_mut() {
            Some(w) => w.is_alive(),
            None => false,
        };
        if !alive {
            let handle = WorkerHandle::spawn(self.cpu)?;
            debug!(pid = handle.pid(), cpu = ?self.cpu, "Spawned worker");
            self.worker = Some(handle);
        }
        self.worker
            .as_mut()
            .ok_or_else(|| SupervisorError::IpcError("worker unavailable".to_string()))
    }
}

impl UnitRunner for ProcessRunner {
    fn run(&mut self, candidate: &'static CandidateDef, size: usize, iteration: u32) -> RunOutcome {
        let (min_value, max_value) = self.generator.range();
        let request = RunRequest {
            candidate: candidate.name.to_string(),
            size: size as u64,
            iteration,
            seed: self.generator.seed(),
            min_value,
            max_value,
        };
        let timeout = self.timeout;
        let deadline = timeout.map(|t| wall_deadline(t, size));

        let result = self.worker().and_then(|w| w.run_unit(&request, deadline));
        match result {
            Ok(UnitReply::Completed(d)) => apply_timeout(RunOutcome::Success(d), timeout),
            Ok(UnitReply::Failed { kind, message }) => match kind {
                FailureKind::IncorrectOutput => RunOutcome::Errored(INCORRECT_OUTPUT.to_string()),
                FailureKind::Panic | FailureKind::UnknownCandidate => RunOutcome::Errored(message),
            },
            Err(SupervisorError::Timeout) => {
                self.worker = None;
                RunOutcome::TimedOut
            }
            Err(e) => {
                warn!(candidate = candidate.name, size, iteration, "{}", e);
                self.worker = None;
                RunOutcome::Errored(e.to_string())
            }
        }
    }
}

impl Drop for ProcessRunner {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown();
        }
    }
}

/// Runs each unit on its own thread and abandons it on timeout
pub struct ThreadRunner {
    generator: WorkloadGenerator,
    timeout: Option<Duration>,
}

impl ThreadRunner {
    pub fn new(generator: WorkloadGenerator, timeout: Option<Duration>) -> Self {
        Self { generator, timeout }
    }
}

impl UnitRunner for ThreadRunner {
    fn run(&mut self, candidate: &'static CandidateDef, size: usize, iteration: u32) -> RunOutcome {
        let (tx, rx) = channel::bounded(1);
        let generator = self.generator;

        let spawned = std::thread::Builder::new()
            .name(format!("sortbench-unit-{}", candidate.id))
            .stack_size(UNIT_THREAD_STACK)
            .spawn(move || {
                let _ = tx.send(execute_unit(candidate, &generator, size, iteration));
            });
        if let Err(e) = spawned {
            return RunOutcome::Errored(format!("failed to spawn unit thread: {}", e));
        }

        let received = match self.timeout {
            Some(timeout) => rx
                .recv_timeout(wall_deadline(timeout, size))
                .map_err(|e| e.is_timeout()),
            None => rx.recv().map_err(|_| false),
        };
        match received {
            Ok(outcome) => apply_timeout(outcome, self.timeout),
            Err(true) => {
                debug!(candidate = candidate.name, size, iteration, "Abandoning unit thread");
                RunOutcome::TimedOut
            }
            Err(false) => RunOutcome::Errored("unit thread exited without a result".to_string()),
        }
    }
}

/// Runs units directly on the calling thread
pub struct InProcessRunner {
    generator: WorkloadGenerator,
    timeout: Option<Duration>,
}

impl InProcessRunner {
    pub fn new(generator: WorkloadGenerator, timeout: Option<Duration>) -> Self {
        Self { generator, timeout }
    }
}

impl UnitRunner for InProcessRunner {
    fn run(&mut self, candidate: &'static CandidateDef, size: usize, iteration: u32) -> RunOutcome {
        apply_timeout(
            execute_unit(candidate, &self.generator, size, iteration),
            self.timeout,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn std_sort(mut v: Vec<i64>) -> Vec<i64> {
        v.sort();
        v
    }

    fn sleepy(v: Vec<i64>) -> Vec<i64> {
        std::thread::sleep(Duration::from_millis(500));
        std_sort(v)
    }

    fn napping(mut v: Vec<i64>) -> Vec<i64> {
        std::thread::sleep(Duration::from_millis(30));
        v.sort();
        v
    }

    fn truncating(mut v: Vec<i64>) -> Vec<i64> {
        v.pop();
        v
    }

    fn panicking(_: Vec<i64>) -> Vec<i64> {
        panic!("no thanks")
    }

    static STD: CandidateDef = CandidateDef::new("Std Sort", std_sort);
    static SLEEPY: CandidateDef = CandidateDef::new("Sleepy Sort", sleepy);
    static NAPPING: CandidateDef = CandidateDef::new("Napping Sort", napping);
    static TRUNCATING: CandidateDef = CandidateDef::new("Truncating Sort", truncating);
    static PANICKING: CandidateDef = CandidateDef::new("Panicking Sort", panicking);

    #[test]
    fn test_validate_rejects_bad_configs() {
        let ok = BenchmarkConfig::default();
        assert!(ok.validate().is_ok());

        let zero_iter = BenchmarkConfig {
            iterations: 0,
            ..ok.clone()
        };
        assert!(zero_iter.validate().is_err());

        let unsorted = BenchmarkConfig {
            sizes: vec![7, 5],
            ..ok.clone()
        };
        assert!(unsorted.validate().unwrap_err().contains("ascending"));

        let zero_workers = BenchmarkConfig {
            parallelism: 0,
            ..ok.clone()
        };
        assert!(zero_workers.validate().is_err());

        let bad_range = BenchmarkConfig {
            min_value: 10,
            max_value: -10,
            ..ok.clone()
        };
        assert!(bad_range.validate().is_err());

        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let bad_ratio = BenchmarkConfig {
                max_failure_ratio: Some(ratio),
                ..ok.clone()
            };
            assert!(bad_ratio.validate().unwrap_err().contains("max_failure_ratio"));
        }
        let whole = BenchmarkConfig {
            max_failure_ratio: Some(1.0),
            ..ok.clone()
        };
        assert!(whole.validate().is_ok());
        let disabled = BenchmarkConfig {
            max_failure_ratio: None,
            ..ok
        };
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn test_wall_deadline_leaves_room_for_workload() {
        let timeout = Duration::from_millis(10);
        assert_eq!(wall_deadline(timeout, 0), Duration::from_millis(60));
        assert_eq!(wall_deadline(timeout, 1_000_000), Duration::from_millis(260));
        assert_eq!(wall_deadline(Duration::MAX, 5), Duration::MAX);
    }

    #[test]
    fn test_timeout_applies_to_measured_sort() {
        let limit = Some(Duration::from_millis(10));
        let over = RunOutcome::Success(Duration::from_millis(11));
        let at = RunOutcome::Success(Duration::from_millis(10));
        let failed = RunOutcome::Errored(INCORRECT_OUTPUT.to_string());

        assert_eq!(apply_timeout(over.clone(), limit), RunOutcome::TimedOut);
        assert_eq!(apply_timeout(at.clone(), limit), at);
        assert_eq!(apply_timeout(failed.clone(), limit), failed);
        assert_eq!(apply_timeout(over.clone(), None), over);
    }

    #[test]
    fn test_thread_runner_success() {
        let mut runner = ThreadRunner::new(WorkloadGenerator::new(1), Some(Duration::from_secs(5)));
        assert!(runner.run(&STD, 100, 1).is_success());
    }

    #[test]
    fn test_thread_runner_times_out() {
        let mut runner =
            ThreadRunner::new(WorkloadGenerator::new(1), Some(Duration::from_millis(50)));
        assert_eq!(runner.run(&SLEEPY, 5, 1), RunOutcome::TimedOut);
    }

    #[test]
    fn test_thread_runner_times_out_a_sort_finishing_within_grace() {
        let mut runner =
            ThreadRunner::new(WorkloadGenerator::new(1), Some(Duration::from_millis(20)));
        assert_eq!(runner.run(&NAPPING, 5, 1), RunOutcome::TimedOut);

        let mut runner =
            ThreadRunner::new(WorkloadGenerator::new(1), Some(Duration::from_secs(5)));
        assert!(runner.run(&NAPPING, 5, 1).is_success());
    }

    #[test]
    fn test_thread_runner_reports_incorrect_output() {
        let mut runner = ThreadRunner::new(WorkloadGenerator::new(1), None);
        assert_eq!(
            runner.run(&TRUNCATING, 10, 1),
            RunOutcome::Errored(INCORRECT_OUTPUT.to_string())
        );
    }

    #[test]
    fn test_thread_runner_captures_panic() {
        let mut runner = ThreadRunner::new(WorkloadGenerator::new(1), None);
        match runner.run(&PANICKING, 10, 1) {
            RunOutcome::Errored(msg) => assert!(msg.contains("no thanks")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_in_process_applies_timeout_after_the_fact() {
        let mut runner =
            InProcessRunner::new(WorkloadGenerator::new(1), Some(Duration::from_millis(10)));
        assert_eq!(runner.run(&SLEEPY, 5, 1), RunOutcome::TimedOut);

        let mut runner = InProcessRunner::new(WorkloadGenerator::new(1), None);
        assert!(runner.run(&SLEEPY, 5, 1).is_success());
    }
}
