//! Report Building
//!
//! Turns scheduler results into the serializable `Report`.
//!
//! ```text
//!   RunResults (SizeStats per size, SkipRecords)
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │   rank_size (each)  │  per-size competition ranks, 1 ms bands
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │    rank_overall     │  cross-size averages, 1 µs bands
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │       Report        │  Ready for JSON/Markdown/human output
//!   └─────────────────────┘
//! ```

use super::execution::BenchmarkConfig;
use super::metadata::build_report_meta;
use super::scheduler::RunResults;
use sortbench_logic::{
    DEFAULT_OVERALL_RESOLUTION_NS, DEFAULT_TOP_N, TieResolution, rank_overall, rank_size,
};
use sortbench_report::{Report, ReportConfig, ReportSummary, SizeSection};
use std::time::Duration;

/// How results are grouped into ranks
#[derive(Debug, Clone, Copy)]
pub struct RankingSettings {
    /// Band width of the per-size tables
    pub tie_resolution: TieResolution,
    /// Band width of the overall table
    pub overall_resolution: TieResolution,
    /// Length of the overall table
    pub top: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            tie_resolution: TieResolution::default(),
            overall_resolution: TieResolution::from_duration(Duration::from_nanos(
                DEFAULT_OVERALL_RESOLUTION_NS,
            )),
            top: DEFAULT_TOP_N,
        }
    }
}

/// Build a complete Report from a finished run
pub fn build_report(
    config: &BenchmarkConfig,
    ranking: &RankingSettings,
    algorithms: usize,
    results: &RunResults,
) -> Report {
    let sizes: Vec<SizeSection> = results
        .sizes
        .iter()
        .map(|run| SizeSection {
            size: run.size,
            ranking: rank_size(&run.stats, ranking.tie_resolution),
            stats: run.stats.clone(),
            tally: run.tally,
            skipped_here: run.skipped_here.clone(),
            completed: run.completed,
        })
        .collect();

    let overall = rank_overall(&results.completed_stats(), ranking.overall_resolution);

    let mut summary = ReportSummary {
        algorithms,
        sizes_planned: config.sizes.len(),
        sizes_completed: sizes.iter().filter(|s| s.completed).count(),
        skipped_algorithms: results.skipped.len(),
        interrupted: results.interrupted,
        total_duration_ms: results.elapsed.as_secs_f64() * 1000.0,
        ..Default::default()
    };
    for section in &sizes {
        summary.total_units += section.tally.total();
        summary.succeeded += section.tally.succeeded;
        summary.timed_out += section.tally.timed_out;
        summary.errored += section.tally.errored;
    }

    let report_config = ReportConfig {
        iterations: config.iterations,
        sizes: config.sizes.clone(),
        threshold_ns: config.threshold.map(|t| t.as_nanos() as u64),
        timeout_ns: config.timeout.map(|t| t.as_nanos() as u64),
        parallelism: config.parallelism,
        isolation: config.isolation.as_str().to_string(),
        skip_on_error: config.skip_on_error,
        max_failure_ratio: config.max_failure_ratio,
        seed: config.seed,
        tie_resolution_ns: ranking.tie_resolution.as_nanos(),
        overall_resolution_ns: ranking.overall_resolution.as_nanos(),
        top: ranking.top,
    };

    Report {
        meta: build_report_meta(report_config),
        sizes,
        skipped: results.skipped.clone(),
        overall,
        summary,
    }
}
