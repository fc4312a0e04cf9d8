//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sortbench_logic::{OutcomeTally, OverallRankEntry, RankEntry, SizeStats, SkipRecord};

/// Complete benchmark report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub sizes: Vec<SizeSection>,
    pub skipped: Vec<SkipRecord>,
    pub overall: Vec<OverallRankEntry>,
    pub summary: ReportSummary,
}

impl Report {
    /// Overall ranks shown in the top-N table, and whether a tie band pushed it past N
    pub fn top_overall(&self) -> (&[OverallRankEntry], bool) {
        sortbench_logic::top_n(&self.overall, self.meta.config.top)
    }

    /// All stats across sizes, in size order
    pub fn all_stats(&self) -> impl Iterator<Item = &SizeStats> {
        self.sizes.iter().flat_map(|s| s.stats.iter())
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub schema_version: u32,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,
    pub system: SystemInfo,
    pub config: ReportConfig,
}

/// Run configuration echoed into the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Iterations per (algorithm, size)
    pub iterations: u32,
    /// Planned array sizes, ascending
    pub sizes: Vec<usize>,
    /// Soft ceiling on a size's mean
    pub threshold_ns: Option<u64>,
    /// Hard per-run deadline, if enabled
    pub timeout_ns: Option<u64>,
    /// Concurrent workers
    pub parallelism: usize,
    /// `process`, `thread` or `in-process`
    pub isolation: String,
    /// Whether an errored iteration disqualifies
    pub skip_on_error: bool,
    /// Failed share of a size that disqualifies, if enabled
    #[serde(default)]
    pub max_failure_ratio: Option<f64>,
    /// Workload seed
    pub seed: u64,
    /// Per-size tie band width
    pub tie_resolution_ns: u64,
    /// Overall tie band width
    pub overall_resolution_ns: u64,
    /// Length of the overall table
    pub top: usize,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu: String,
    pub cpu_cores: u32,
    pub memory_gb: f64,
}

/// Results for one array size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeSection {
    pub size: usize,
    /// Stats of every algorithm that produced samples here, by name
    pub stats: Vec<SizeStats>,
    /// Competition ranking of `stats`
    pub ranking: Vec<RankEntry>,
    /// Outcome counts over all algorithms at this size
    pub tally: OutcomeTally,
    /// Skips that fired at this size
    pub skipped_here: Vec<SkipRecord>,
    /// Whether every scheduled unit ran (false after an interrupt)
    pub completed: bool,
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub algorithms: usize,
    pub sizes_planned: usize,
    pub sizes_completed: usize,
    pub total_units: usize,
    pub succeeded: usize,
    pub timed_out: usize,
    pub errored: usize,
    pub skipped_algorithms: usize,
    pub interrupted: bool,
    pub total_duration_ms: f64,
}
