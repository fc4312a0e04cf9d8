#![warn(missing_docs)]
//! Sortbench Logic - Aggregation, Skip Policy and Ranking
//!
//! Everything between raw `RunOutcome`s and the tables a report renders:
//! - `ResultStore`: outcomes per (algorithm, size), written by one collector
//! - `aggregate`: `SizeStats` from the successful samples of one cell
//! - `SkipPolicy`: per-algorithm `Active -> Skipped(size)` state, shared by workers
//! - `rank_size` / `rank_overall`: competition ranking with resolution-floor tie bands

mod aggregate;
mod ranking;
mod skip;
mod store;

pub use aggregate::{OutcomeTally, SizeStats, aggregate, tally};
pub use ranking::{
    OverallRankEntry, RankEntry, TieResolution, overall_averages, rank_overall, rank_size, top_n,
};
pub use skip::{AlgorithmStatus, SkipPolicy, SkipReason, SkipRecord};
pub use store::ResultStore;

/// Default per-size tie resolution (1 ms)
pub const DEFAULT_TIE_RESOLUTION_NS: u64 = 1_000_000;

/// Default overall-ranking tie resolution (1 µs)
pub const DEFAULT_OVERALL_RESOLUTION_NS: u64 = 1_000;

/// Default length of the overall ranking
pub const DEFAULT_TOP_N: usize = 20;
