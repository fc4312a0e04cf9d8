#![warn(missing_docs)]
//! # Sortbench
//!
//! Benchmark harness for interchangeable sorting routines.
//!
//! Sortbench runs every registered candidate over a ladder of array sizes:
//! - **Process Isolation**: each unit runs in a worker process that is killed at the deadline
//! - **Skip Policy**: an algorithm that times out, keeps failing, or gets too slow stops at that size
//! - **Verified Samples**: outputs are checked to be sorted permutations before they count
//! - **Tie-Aware Rankings**: per-size and overall competition ranks with resolution bands
//! - **Resumable Runs**: per-size CSV journals let an interrupted run pick up where it stopped
//!
//! ## Quick Start
//!
//! ```ignore
//! use sortbench::prelude::*;
//!
//! #[candidate(name = "Insertion Sort")]
//! fn insertion_sort(mut v: Vec<i64>) -> Vec<i64> {
//!     for i in 1..v.len() {
//!         let mut j = i;
//!         while j > 0 && v[j - 1] > v[j] {
//!             v.swap(j - 1, j);
//!             j -= 1;
//!         }
//!     }
//!     v
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     sortbench::run()
//! }
//! ```
//!
//! ## Embedding
//!
//! ```ignore
//! use sortbench::{BenchmarkConfig, IsolationMode, RankingSettings, Scheduler, build_report};
//!
//! let config = BenchmarkConfig {
//!     iterations: 20,
//!     sizes: vec![5, 7, 9],
//!     isolation: IsolationMode::Thread,
//!     ..BenchmarkConfig::default()
//! };
//! let results = Scheduler::new(config.clone(), sortbench::registered_candidates())?.run();
//! let report = build_report(&config, &RankingSettings::default(), 3, &results);
//! ```

// Re-export core types
pub use sortbench_core::{
    CandidateDef, CoreError, RunOutcome, SortFn, VerifyError, WorkloadGenerator, execute_unit,
    find_candidate, registered_candidates, request_shutdown, shutdown_requested,
    verify_sorted_permutation,
};

// Re-export macros
pub use sortbench_macros::candidate;

// Re-export logic types
pub use sortbench_logic::{
    AlgorithmStatus, OutcomeTally, OverallRankEntry, RankEntry, ResultStore, SizeStats,
    SkipPolicy, SkipReason, SkipRecord, TieResolution, aggregate, rank_overall, rank_size, top_n,
};

// Re-export stats
pub use sortbench_stats::{SummaryStatistics, compute_summary};

// Re-export orchestration
pub use sortbench_cli::{
    BenchmarkConfig, IsolationMode, RankingSettings, RunResults, Scheduler, SchedulerError,
    SizeRun, UnitRunner, build_report,
};

// Re-export reporting
pub use sortbench_report::{
    OutputFormat, Report, generate_json_report, generate_markdown_report,
};

/// Internal re-exports for macro use
#[doc(hidden)]
pub mod internal {
    pub use inventory;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{CandidateDef, RunOutcome, candidate};
}

/// Run the Sortbench CLI harness.
///
/// Call this from your benchmark binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     sortbench::run()
/// }
/// ```
pub use sortbench_cli::run;
