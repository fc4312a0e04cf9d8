#![warn(missing_docs)]
//! Sortbench CLI Library
//!
//! This module provides the CLI infrastructure for benchmark binaries.
//! Use `sortbench::run()` (or `sortbench_cli::run()`) in your main function to
//! benchmark every candidate registered in the binary.
//!
//! # Example
//!
//! ```ignore
//! use sortbench::prelude::*;
//!
//! #[candidate(name = "Std Sort")]
//! fn std_sort(mut v: Vec<i64>) -> Vec<i64> {
//!     v.sort();
//!     v
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     sortbench_cli::run()
//! }
//! ```

mod config;
mod executor;
mod journal;
mod planner;
mod supervisor;

pub use config::*;
pub use executor::{
    BenchmarkConfig, CellSummary, DEFAULT_MAX_FAILURE_RATIO, InProcessRunner, ProcessRunner,
    RankingSettings, RunResults, Scheduler, SchedulerError, SizeRun, ThreadRunner, UnitRunner,
    apply_timeout, build_report, format_human_output, make_runner, summarize_size, system_info,
    wall_deadline,
};
pub use journal::{JOURNAL_HEADER, Journal, JournalRow, RESTORED_ERROR};
pub use planner::{ExecutionPlan, build_plan, generate_sizes, normalize_sizes, resolve_workers};
pub use supervisor::*;

use anyhow::Context;
use clap::{Parser, Subcommand};
use regex::Regex;
use sortbench_core::{WorkerMain, install_shutdown_handler, registered_candidates, validate_unique_names};
use sortbench_logic::TieResolution;
use sortbench_report::{
    OutputFormat, format_size, generate_json_report, generate_markdown_report,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status of a run stopped by SIGINT/SIGTERM
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Sortbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "sortbench")]
#[command(author, version, about = "Sortbench - benchmark harness for sorting algorithms")]
pub struct Cli {
    /// Optional subcommand (List, Run, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter candidates by regex pattern on their name
    #[arg(default_value = ".*")]
    pub filter: String,

    /// Iterations per (algorithm, size)
    #[arg(long, short = 'n')]
    pub iterations: Option<u32>,

    /// Soft ceiling on a size's mean (e.g., "300s"); "off" disables it
    #[arg(long)]
    pub threshold: Option<String>,

    /// Hard per-run timeout (e.g., "5s"); setting it enables the timeout
    #[arg(long)]
    pub timeout: Option<String>,

    /// Disable the per-run timeout even if sortbench.toml enables it
    #[arg(long, conflicts_with = "timeout")]
    pub no_timeout: bool,

    /// Use every available CPU
    #[arg(long)]
    pub all_cpus: bool,

    /// Run on a single worker in deterministic order
    #[arg(long, conflicts_with = "all_cpus")]
    pub sequential: bool,

    /// Number of parallel workers (overrides --all-cpus)
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Isolation mode: process, thread, in-process
    #[arg(long)]
    pub isolation: Option<String>,

    /// Explicit comma-separated array sizes
    #[arg(long, value_delimiter = ',')]
    pub sizes: Option<Vec<usize>>,

    /// Largest size of the default size ladder
    #[arg(long)]
    pub max_size: Option<usize>,

    /// Workload seed (random when not set)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disqualify an algorithm on its first errored iteration
    #[arg(long)]
    pub skip_on_error: bool,

    /// Skip an algorithm once this share of a size's runs fail (0 disables)
    #[arg(long, value_name = "RATIO")]
    pub max_failure_ratio: Option<f64>,

    /// Output format: human, json, markdown
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Length of the overall ranking table
    #[arg(long)]
    pub top: Option<usize>,

    /// Record results in per-size CSV journals and resume from them
    #[arg(long)]
    pub journal: bool,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Internal: Run as worker process (used by supervisor)
    #[arg(long, hide = true)]
    pub sortbench_worker: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true)]
    pub bench: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all discovered candidates and the planned sizes
    List,
    /// Run benchmarks (default)
    Run,
    /// Print a default sortbench.toml
    Init,
}

/// Run the Sortbench CLI with the given arguments.
/// This is the main entry point for benchmark binaries.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Sortbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Handle worker mode first (before any other initialization)
    if cli.sortbench_worker {
        return run_worker_mode();
    }

    init_tracing(cli.verbose);

    let config = SortbenchConfig::discover().unwrap_or_default();

    match cli.command {
        Some(Commands::List) => list_candidates(&cli, &config),
        Some(Commands::Init) => {
            print!("{}", SortbenchConfig::default_toml());
            Ok(())
        }
        Some(Commands::Run) | None => run_benchmarks(&cli, &config),
    }
}

/// Run as a worker process (IPC mode)
fn run_worker_mode() -> anyhow::Result<()> {
    let mut worker = WorkerMain::new();
    worker
        .run()
        .map_err(|e| anyhow::anyhow!("Worker error: {}", e))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sortbench=debug" } else { "sortbench=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Layer sortbench.toml and CLI flags into the run and ranking configuration.
pub fn build_benchmark_config(
    cli: &Cli,
    config: &SortbenchConfig,
) -> anyhow::Result<(BenchmarkConfig, RankingSettings)> {
    let runner = &config.runner;

    let threshold_str = cli.threshold.as_deref().unwrap_or(&runner.threshold);
    let threshold = parse_optional_duration(threshold_str).context("invalid threshold")?;

    let timeout = if cli.no_timeout {
        None
    } else if let Some(t) = cli.timeout.as_deref() {
        Some(parse_duration(t).context("invalid timeout")?)
    } else if runner.timeout_enabled {
        let source = runner.timeout.as_deref().map(str::to_string).or_else(|| {
            threshold.map(|t| format!("{}ns", t.as_nanos()))
        });
        let source = source
            .ok_or_else(|| anyhow::anyhow!("timeout_enabled needs a timeout or a threshold"))?;
        Some(parse_duration(&source).context("invalid timeout")?)
    } else {
        None
    };

    let isolation = match cli.isolation.as_deref() {
        Some(s) => s.parse().map_err(anyhow::Error::msg)?,
        None => runner.isolation,
    };

    let parallelism = if cli.sequential {
        1
    } else {
        resolve_workers(cli.all_cpus || runner.use_all_cpus, cli.jobs.or(runner.jobs))
    };

    let sizes = match cli.sizes.clone().or_else(|| config.sizes.list.clone()) {
        Some(list) => normalize_sizes(list),
        None => generate_sizes(cli.max_size.unwrap_or(config.sizes.max_size)),
    };

    let bench = BenchmarkConfig {
        iterations: cli.iterations.unwrap_or(runner.iterations),
        sizes,
        timeout,
        threshold,
        parallelism,
        isolation,
        skip_on_error: cli.skip_on_error || runner.skip_on_error,
        max_failure_ratio: Some(cli.max_failure_ratio.unwrap_or(runner.max_failure_ratio))
            .filter(|ratio| *ratio != 0.0),
        seed: cli.seed.or(runner.seed).unwrap_or_else(rand::random),
        min_value: runner.min_value,
        max_value: runner.max_value,
    };
    bench.validate().map_err(anyhow::Error::msg)?;

    let ranking = RankingSettings {
        tie_resolution: TieResolution::from_duration(
            parse_duration(&config.ranking.tie_resolution).context("invalid tie_resolution")?,
        ),
        overall_resolution: TieResolution::from_duration(
            parse_duration(&config.ranking.overall_resolution)
                .context("invalid overall_resolution")?,
        ),
        top: cli.top.unwrap_or(config.ranking.top),
    };

    Ok((bench, ranking))
}

fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    SortbenchConfig::parse_duration(s).map(Duration::from_nanos)
}

/// `None` for "off"/"none", otherwise a duration
fn parse_optional_duration(s: &str) -> anyhow::Result<Option<Duration>> {
    match s.trim().to_lowercase().as_str() {
        "off" | "none" | "" => Ok(None),
        _ => parse_duration(s).map(Some),
    }
}

fn list_candidates(cli: &Cli, config: &SortbenchConfig) -> anyhow::Result<()> {
    let filter = Regex::new(&cli.filter).context("invalid filter pattern")?;
    let (bench, _) = build_benchmark_config(cli, config)?;
    let plan = build_plan(registered_candidates(), Some(&filter), bench.sizes);

    println!("Sortbench Plan:");
    for candidate in &plan.candidates {
        println!(
            "├── {} ({}:{})",
            candidate.name, candidate.file, candidate.line
        );
    }
    println!("{} candidates found.", plan.candidates.len());

    let sizes: Vec<String> = plan.sizes.iter().map(|&s| format_size(s)).collect();
    println!("Sizes ({}): {}", sizes.len(), sizes.join(", "));

    if let Err(e) = validate_unique_names(plan.candidates.iter().copied()) {
        eprintln!("Warning: {}", e);
    }
    Ok(())
}

fn run_benchmarks(cli: &Cli, config: &SortbenchConfig) -> anyhow::Result<()> {
    let (mut bench, ranking) = build_benchmark_config(cli, config)?;

    let format: OutputFormat = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse()
        .map_err(anyhow::Error::msg)?;

    let filter = Regex::new(&cli.filter).context("invalid filter pattern")?;
    let plan = build_plan(registered_candidates(), Some(&filter), bench.sizes.clone());
    bench.sizes = plan.sizes.clone();

    if plan.candidates.is_empty() {
        println!("No candidates found.");
        return Ok(());
    }

    if bench.timeout.is_some() && !bench.isolation.is_isolated() {
        warn!(
            "{} isolation cannot stop a running candidate; timeouts only mark the run",
            bench.isolation.as_str()
        );
    }

    println!(
        "Running {} candidates over {} sizes ({}, {} worker(s), {} iterations, seed {})...\n",
        plan.candidates.len(),
        bench.sizes.len(),
        bench.isolation.as_str(),
        bench.parallelism,
        bench.iterations,
        bench.seed
    );

    install_shutdown_handler();

    let candidate_count = plan.candidates.len();
    let mut scheduler =
        Scheduler::new(bench.clone(), plan.candidates)?.with_progress(!cli.no_progress);
    if cli.journal || config.output.journal {
        let journal = Journal::open(&config.output.directory).with_context(|| {
            format!("failed to open journal directory {}", config.output.directory)
        })?;
        info!("Journaling results to {}", journal.dir().display());
        scheduler = scheduler.with_journal(journal);
    }

    let results = scheduler.run();
    info!(
        executed = results.units_executed,
        restored = results.units_restored,
        "Finished in {:.2}s",
        results.elapsed.as_secs_f64()
    );

    let report = build_report(&bench, &ranking, candidate_count, &results);

    let output = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Markdown => generate_markdown_report(&report),
        OutputFormat::Human => format_human_output(&report),
    };

    if let Some(ref path) = cli.output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    if results.interrupted {
        eprintln!("\nRun interrupted; report covers completed sizes only");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["sortbench"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_follow_config_file() {
        let cli = parse(&["--seed", "7"]);
        let (bench, ranking) = build_benchmark_config(&cli, &SortbenchConfig::default()).unwrap();

        assert_eq!(bench.iterations, 500);
        assert_eq!(bench.threshold, Some(Duration::from_secs(300)));
        assert_eq!(bench.timeout, None);
        assert_eq!(bench.isolation, IsolationMode::Process);
        assert_eq!(bench.seed, 7);
        assert_eq!(bench.max_failure_ratio, Some(0.5));
        assert_eq!(&bench.sizes[..3], &[5, 7, 9]);
        assert_eq!(ranking.tie_resolution.as_nanos(), 1_000_000);
        assert_eq!(ranking.overall_resolution.as_nanos(), 1_000);
        assert_eq!(ranking.top, 20);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = parse(&[
            "Merge|Quick",
            "-n",
            "10",
            "--timeout",
            "1s",
            "--threshold",
            "off",
            "--sizes",
            "9,5,7",
            "--isolation",
            "thread",
            "--sequential",
            "--top",
            "5",
        ]);
        let (bench, ranking) = build_benchmark_config(&cli, &SortbenchConfig::default()).unwrap();

        assert_eq!(cli.filter, "Merge|Quick");
        assert_eq!(bench.iterations, 10);
        assert_eq!(bench.timeout, Some(Duration::from_secs(1)));
        assert_eq!(bench.threshold, None);
        assert_eq!(bench.sizes, vec![5, 7, 9]);
        assert_eq!(bench.isolation, IsolationMode::Thread);
        assert_eq!(bench.parallelism, 1);
        assert_eq!(ranking.top, 5);
    }

    #[test]
    fn test_timeout_enabled_falls_back_to_threshold() {
        let mut config = SortbenchConfig::default();
        config.runner.timeout_enabled = true;
        config.runner.threshold = "2s".to_string();

        let (bench, _) = build_benchmark_config(&parse(&[]), &config).unwrap();
        assert_eq!(bench.timeout, Some(Duration::from_secs(2)));

        let (bench, _) = build_benchmark_config(&parse(&["--no-timeout"]), &config).unwrap();
        assert_eq!(bench.timeout, None);
    }

    #[test]
    fn test_failure_ratio_flag() {
        let config = SortbenchConfig::default();
        let (bench, _) =
            build_benchmark_config(&parse(&["--max-failure-ratio", "0.25"]), &config).unwrap();
        assert_eq!(bench.max_failure_ratio, Some(0.25));

        let (bench, _) =
            build_benchmark_config(&parse(&["--max-failure-ratio", "0"]), &config).unwrap();
        assert_eq!(bench.max_failure_ratio, None);

        assert!(build_benchmark_config(&parse(&["--max-failure-ratio", "2"]), &config).is_err());
    }

    #[test]
    fn test_jobs_override_cpu_count() {
        let (bench, _) =
            build_benchmark_config(&parse(&["-j", "3"]), &SortbenchConfig::default()).unwrap();
        assert_eq!(bench.parallelism, 3);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let config = SortbenchConfig::default();
        assert!(build_benchmark_config(&parse(&["--timeout", "soon"]), &config).is_err());
        assert!(build_benchmark_config(&parse(&["--isolation", "vm"]), &config).is_err());
        assert!(build_benchmark_config(&parse(&["-n", "0"]), &config).is_err());
    }

    #[test]
    fn test_worker_flag_is_hidden_but_accepted() {
        let cli = parse(&[sortbench_ipc::WORKER_FLAG]);
        assert!(cli.sortbench_worker);
    }

    #[test]
    fn test_subcommands() {
        assert!(matches!(parse(&["list"]).command, Some(Commands::List)));
        assert!(matches!(parse(&["init"]).command, Some(Commands::Init)));
        assert!(parse(&[]).command.is_none());
    }
}
