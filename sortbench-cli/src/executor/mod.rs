//! Benchmark Executor
//!
//! Runs the candidate matrix and turns the samples into a report. Units run
//! in worker processes by default (see `supervisor`), or on threads or
//! in-process for tests and debugging.
//!
//! ## Pipeline Overview
//!
//! ```text
//! CandidateDef (registered via #[candidate])
//!       │
//!       ▼
//! ┌─────────────┐
//! │  scheduler  │  Size waves, worker slots, skip policy, journal
//! └──────┬──────┘
//!        │  (execution: one UnitRunner per slot)
//!        ▼
//! ┌─────────────┐
//! │ statistics  │  SizeStats per (algorithm, size) (parallel)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Per-size and overall rankings
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Run configuration and the per-mode unit runners
//! - [`scheduler`] - Work distribution and result collection
//! - [`statistics`] - Parallel aggregation of one size
//! - [`report`] - Report building
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - System metadata collection

mod execution;
mod formatting;
mod metadata;
mod report;
mod scheduler;
mod statistics;

// Re-export public API
pub use execution::{
    BenchmarkConfig, DEFAULT_MAX_FAILURE_RATIO, InProcessRunner, ProcessRunner, ThreadRunner,
    UnitRunner, apply_timeout, make_runner, wall_deadline,
};
pub use formatting::format_human_output;
pub use metadata::system_info;
pub use report::{RankingSettings, build_report};
pub use scheduler::{RunResults, Scheduler, SchedulerError, SizeRun};
pub use statistics::{CellSummary, summarize_size};
