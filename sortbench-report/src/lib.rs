#![warn(missing_docs)]
//! Sortbench Report - Report Model and Rendering
//!
//! Generates the output formats of a run:
//! - JSON (machine-readable, full report)
//! - Markdown (results document with ranked tables per array size)
//!
//! Human terminal output lives in the CLI.

mod format;
mod json;
mod markdown;
mod report;

pub use format::{anchor, format_nanos, format_size, format_time, ordinal};
pub use json::{ReportSchema, generate_json_report, parse_json_report};
pub use markdown::generate_markdown_report;
pub use report::{Report, ReportConfig, ReportMeta, ReportSummary, SizeSection, SystemInfo};

/// Version of the JSON report layout
pub const SCHEMA_VERSION: u32 = 1;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Markdown results document
    Markdown,
    /// Human-readable terminal output
    Human,
}

impl OutputFormat {
    /// File extension used when writing the report to disk
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
            OutputFormat::Human => "txt",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sortbench_logic::{
        OutcomeTally, OverallRankEntry, RankEntry, SizeStats, SkipReason, SkipRecord,
    };

    fn stats(algorithm: &str, size: usize, mean_ns: f64) -> SizeStats {
        SizeStats {
            algorithm: algorithm.to_string(),
            size,
            sample_count: 10,
            timed_out: 0,
            errored: 0,
            mean_ns,
            median_ns: mean_ns,
            std_dev_ns: mean_ns / 10.0,
            min_ns: mean_ns,
            max_ns: mean_ns,
            variance_percent: Some(10.0),
        }
    }

    fn overall(rank: usize, algorithms: &[&str], avg: f64) -> OverallRankEntry {
        OverallRankEntry {
            rank,
            algorithms: algorithms.iter().map(|s| s.to_string()).collect(),
            overall_average_ns: avg,
            band: avg as u64 / 1000,
        }
    }

    fn sample_report(top: usize) -> Report {
        let small = SizeSection {
            size: 5,
            stats: vec![stats("Quick Sort", 5, 900.0), stats("Merge Sort", 5, 1_000.0)],
            ranking: vec![RankEntry {
                rank: 1,
                algorithms: vec!["Quick Sort".into(), "Merge Sort".into()],
                mean_ns: 900.0,
                median_ns: 900.0,
                variance_percent: None,
                band: 0,
            }],
            tally: OutcomeTally {
                succeeded: 20,
                timed_out: 0,
                errored: 0,
            },
            skipped_here: vec![],
            completed: true,
        };
        let large = SizeSection {
            size: 12_800,
            stats: vec![
                stats("Quick Sort", 12_800, 2_000_000.0),
                stats("Merge Sort", 12_800, 5_000_000.0),
            ],
            ranking: vec![
                RankEntry {
                    rank: 1,
                    algorithms: vec!["Quick Sort".into()],
                    mean_ns: 2_000_000.0,
                    median_ns: 2_000_000.0,
                    variance_percent: Some(3.25),
                    band: 2,
                },
                RankEntry {
                    rank: 2,
                    algorithms: vec!["Merge Sort".into()],
                    mean_ns: 5_000_000.0,
                    median_ns: 5_000_000.0,
                    variance_percent: None,
                    band: 5,
                },
            ],
            tally: OutcomeTally {
                succeeded: 20,
                timed_out: 1,
                errored: 0,
            },
            skipped_here: vec![SkipRecord {
                algorithm: "Bogo Sort".into(),
                skipped_at_size: 12_800,
                reason: SkipReason::TimedOut,
            }],
            completed: true,
        };

        Report {
            meta: ReportMeta {
                schema_version: SCHEMA_VERSION,
                version: "0.1.0".into(),
                timestamp: Utc::now(),
                git_commit: None,
                git_branch: None,
                system: SystemInfo {
                    os: "linux".into(),
                    arch: "x86_64".into(),
                    cpu: "Test CPU".into(),
                    cpu_cores: 4,
                    memory_gb: 8.0,
                },
                config: ReportConfig {
                    iterations: 10,
                    sizes: vec![5, 12_800],
                    threshold_ns: Some(300_000_000_000),
                    timeout_ns: Some(1_000_000_000),
                    parallelism: 4,
                    isolation: "process".into(),
                    skip_on_error: false,
                    max_failure_ratio: Some(0.5),
                    seed: 7,
                    tie_resolution_ns: 1_000_000,
                    overall_resolution_ns: 1_000,
                    top,
                },
            },
            sizes: vec![small, large],
            skipped: vec![SkipRecord {
                algorithm: "Bogo Sort".into(),
                skipped_at_size: 12_800,
                reason: SkipReason::TimedOut,
            }],
            overall: vec![
                overall(1, &["Quick Sort"], 1_000_450.0),
                overall(2, &["Merge Sort", "Tim Sort"], 2_500_500.0),
                overall(4, &["Bubble Sort"], 9_000_000.0),
            ],
            summary: ReportSummary::default(),
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_markdown_sections() {
        let md = generate_markdown_report(&sample_report(20));
        assert!(md.starts_with("# Sorting Algorithms Benchmark Results"));
        assert!(md.contains("## Overall Top 20 Algorithms"));
        assert!(md.contains("| 1st | Quick Sort | 1ms |"));
        assert!(md.contains("| 2nd | Merge Sort, Tim Sort |"));
        assert!(md.contains("| 4th | Bubble Sort |"));
        assert!(md.contains("| Bogo Sort | 12,800 | timed out |"));
        assert!(md.contains("- [Array Size: 12,800](#array-size-12800)"));
        assert!(md.contains(
            "All algorithms ran in less than 1ms on this array size; differences are negligible."
        ));
        assert!(md.contains("| 1st | Quick Sort | 2ms | 2ms | 3.25 |"));
        assert!(md.contains("| 2nd | Merge Sort | 5ms | 5ms |  |"));
        assert!(md.contains("Runs: 20 succeeded, 1 timed out, 0 errored."));
        assert!(!md.contains("falls within a tie group"));
    }

    #[test]
    fn test_markdown_tie_note_when_band_crosses_top() {
        let md = generate_markdown_report(&sample_report(2));
        assert!(md.contains("| 2nd | Merge Sort, Tim Sort |"));
        assert!(!md.contains("Bubble Sort"));
        assert!(md.contains(
            "*Note: The 2nd rank falls within a tie group, so all tied algorithms are shown.*"
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let report = sample_report(20);
        let json = generate_json_report(&report).unwrap();
        let back = parse_json_report(&json).unwrap();
        assert_eq!(back.sizes.len(), 2);
        assert_eq!(back.skipped, report.skipped);
        assert_eq!(back.overall, report.overall);
        assert_eq!(ReportSchema::current().version, "1");
    }
}
