//! Output Formatting
//!
//! Human-readable terminal summary of a report: the overall top-N table,
//! skipped algorithms, the leaders of each array size and run totals.
//! The full per-size tables are left to the Markdown output.

use sortbench_report::{Report, format_nanos, format_size, ordinal};

/// How many ranks of each size are listed
const LEADERS_PER_SIZE: usize = 3;

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Sortbench Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    if report.summary.interrupted {
        output.push_str("  (interrupted: only completed sizes are included)\n\n");
    }

    let (top, overflow) = report.top_overall();
    output.push_str(&format!("Overall Top {}\n", report.meta.config.top));
    output.push_str(&"-".repeat(60));
    output.push('\n');
    if top.is_empty() {
        output.push_str("  no algorithm produced results\n");
    }
    let name_width = top
        .iter()
        .map(|e| e.algorithms.join(", ").len())
        .max()
        .unwrap_or(10)
        .min(48);
    for entry in top {
        output.push_str(&format!(
            "  {:>5}  {:<width$}  {}\n",
            ordinal(entry.rank),
            entry.algorithms.join(", "),
            format_nanos(entry.overall_average_ns, true),
            width = name_width
        ));
    }
    if overflow {
        output.push_str("  (a tie at the last rank lists more than the requested count)\n");
    }

    if !report.skipped.is_empty() {
        output.push_str("\nSkipped Algorithms\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for record in &report.skipped {
            output.push_str(&format!(
                "  ⊘ {} at size {} ({})\n",
                record.algorithm,
                format_size(record.skipped_at_size),
                record.reason
            ));
        }
    }

    output.push_str("\nBy Array Size\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    for section in &report.sizes {
        let marker = if section.completed { "" } else { " (partial)" };
        output.push_str(&format!("  size {}{}\n", format_size(section.size), marker));
        for entry in section.ranking.iter().take(LEADERS_PER_SIZE) {
            output.push_str(&format!(
                "    {:>5}  {}  {}\n",
                ordinal(entry.rank),
                entry.algorithms.join(", "),
                format_nanos(entry.mean_ns, true)
            ));
        }
        let hidden: usize = section
            .ranking
            .iter()
            .skip(LEADERS_PER_SIZE)
            .map(|e| e.algorithms.len())
            .sum();
        if hidden > 0 {
            output.push_str(&format!("           ... {} more\n", hidden));
        }
    }

    let summary = &report.summary;
    output.push_str("\nSummary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Algorithms: {}  Sizes: {}/{}  Skipped: {}\n",
        summary.algorithms, summary.sizes_completed, summary.sizes_planned, summary.skipped_algorithms
    ));
    output.push_str(&format!(
        "  Runs: {}  Succeeded: {}  Timed out: {}  Errored: {}\n",
        summary.total_units, summary.succeeded, summary.timed_out, summary.errored
    ));
    output.push_str(&format!(
        "  Seed: {}  Duration: {}\n",
        report.meta.config.seed,
        format_nanos(summary.total_duration_ms * 1e6, false)
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{BenchmarkConfig, RankingSettings, RunResults, SizeRun, build_report};
    use sortbench_logic::{OutcomeTally, SizeStats, SkipReason, SkipRecord};
    use std::time::Duration;

    fn stats(algorithm: &str, mean_ns: f64) -> SizeStats {
        SizeStats {
            algorithm: algorithm.to_string(),
            size: 12_800,
            sample_count: 2,
            timed_out: 0,
            errored: 0,
            mean_ns,
            median_ns: mean_ns,
            std_dev_ns: 0.0,
            min_ns: mean_ns,
            max_ns: mean_ns,
            variance_percent: Some(0.0),
        }
    }

    #[test]
    fn test_human_output_sections() {
        let results = RunResults {
            sizes: vec![SizeRun {
                size: 12_800,
                stats: vec![stats("Quick Sort", 2_000_000.0), stats("Merge Sort", 5_000_000.0)],
                tally: OutcomeTally {
                    succeeded: 4,
                    timed_out: 1,
                    errored: 0,
                },
                skipped_here: Vec::new(),
                completed: false,
            }],
            skipped: vec![SkipRecord {
                algorithm: "Bogo Sort".into(),
                skipped_at_size: 12_800,
                reason: SkipReason::TimedOut,
            }],
            interrupted: true,
            elapsed: Duration::from_secs(2),
            units_executed: 5,
            units_restored: 0,
        };
        let report = build_report(
            &BenchmarkConfig::default(),
            &RankingSettings::default(),
            3,
            &results,
        );

        let out = format_human_output(&report);
        assert!(out.contains("Sortbench Results"));
        assert!(out.contains("interrupted"));
        assert!(out.contains("Overall Top 20"));
        assert!(out.contains("1st"));
        assert!(out.contains("Quick Sort"));
        assert!(out.contains("⊘ Bogo Sort at size 12,800 (timed out)"));
        assert!(out.contains("size 12,800 (partial)"));
        assert!(out.contains("Runs: 5  Succeeded: 4  Timed out: 1  Errored: 0"));
    }
}
