//! Markdown Output
//!
//! README-style document: overall top-N table, skipped algorithms, then one
//! ranked table per array size.

use crate::format::{anchor, format_nanos, format_size, ordinal};
use crate::report::{Report, SizeSection};
use std::fmt::Write;

/// Generate the Markdown results document
pub fn generate_markdown_report(report: &Report) -> String {
    let mut md = String::new();
    let config = &report.meta.config;

    md.push_str("# Sorting Algorithms Benchmark Results\n\n");
    let _ = writeln!(
        md,
        "Generated {} with {} iterations per array size (seed {}).\n",
        report.meta.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        config.iterations,
        config.seed
    );
    if report.summary.interrupted {
        md.push_str("**This run was interrupted; later array sizes are missing.**\n\n");
    }

    write_overall(&mut md, report);
    write_skipped(&mut md, report);

    md.push_str("## Detailed Benchmark Results\n\n");
    for section in &report.sizes {
        let title = size_title(section.size);
        let _ = writeln!(md, "- [{}](#{})", title, anchor(&title));
    }
    md.push('\n');

    for section in &report.sizes {
        write_size_section(&mut md, section, config.tie_resolution_ns);
    }

    md
}

fn size_title(size: usize) -> String {
    format!("Array Size: {}", format_size(size))
}

fn write_overall(md: &mut String, report: &Report) {
    let top = report.meta.config.top;
    let (entries, overflow) = report.top_overall();

    let _ = writeln!(
        md,
        "## Overall Top {} Algorithms (by average time across sizes)\n",
        top
    );

    if entries.is_empty() {
        md.push_str("No algorithm produced a result.\n\n");
        return;
    }

    md.push_str("| Rank | Algorithms | Overall Average Time |\n");
    md.push_str("| ---- | ---------- | -------------------- |\n");
    for entry in entries {
        let _ = writeln!(
            md,
            "| {} | {} | {} |",
            ordinal(entry.rank),
            entry.algorithms.join(", "),
            format_nanos(entry.overall_average_ns, true)
        );
    }
    md.push('\n');

    if overflow {
        let _ = writeln!(
            md,
            "*Note: The {} rank falls within a tie group, so all tied algorithms are shown.*\n",
            ordinal(top)
        );
    }
}

fn write_skipped(md: &mut String, report: &Report) {
    md.push_str("## Skipped Algorithms\n\n");
    if report.skipped.is_empty() {
        md.push_str("No algorithms were skipped.\n\n");
        return;
    }

    let mut records = report.skipped.clone();
    records.sort_by(|a, b| a.algorithm.cmp(&b.algorithm));

    md.push_str("| Algorithm | Skipped At Size | Reason |\n");
    md.push_str("| --------- | --------------- | ------ |\n");
    for record in &records {
        let _ = writeln!(
            md,
            "| {} | {} | {} |",
            record.algorithm,
            format_size(record.skipped_at_size),
            record.reason
        );
    }
    md.push('\n');
}

fn write_size_section(md: &mut String, section: &SizeSection, tie_resolution_ns: u64) {
    let _ = writeln!(md, "### {}\n", size_title(section.size));

    if section.ranking.is_empty() {
        md.push_str("No algorithms produced a result for this array size.\n\n");
    } else if section.ranking.len() == 1 && section.ranking[0].band == 0 {
        let _ = writeln!(
            md,
            "All algorithms ran in less than {} on this array size; differences are negligible.\n",
            format_nanos(tie_resolution_ns as f64, true)
        );
    } else {
        md.push_str("| Rank | Algorithm(s) | Average Time | Median Time | Variance (%) |\n");
        md.push_str("| ---- | ------------ | ------------ | ----------- | ------------ |\n");
        for entry in &section.ranking {
            let variance = entry
                .variance_percent
                .map(|v| format!("{v:.2}"))
                .unwrap_or_default();
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} | {} |",
                ordinal(entry.rank),
                entry.algorithms.join(", "),
                format_nanos(entry.mean_ns, false),
                format_nanos(entry.median_ns, false),
                variance
            );
        }
        md.push('\n');
    }

    if section.tally.failed() > 0 {
        let _ = writeln!(
            md,
            "Runs: {} succeeded, {} timed out, {} errored.\n",
            section.tally.succeeded, section.tally.timed_out, section.tally.errored
        );
    }

    if !section.skipped_here.is_empty() {
        let names: Vec<String> = section
            .skipped_here
            .iter()
            .map(|r| format!("{} ({})", r.algorithm, r.reason))
            .collect();
        let _ = writeln!(
            md,
            "**Note:** The following algorithm{} will not run on larger arrays: {}.\n",
            if names.len() == 1 { "" } else { "s" },
            names.join(", ")
        );
    }

    if !section.completed {
        md.push_str("*This array size did not finish; results are partial.*\n\n");
    }
}
