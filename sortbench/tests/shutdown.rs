//! Graceful shutdown
//!
//! Kept in its own test binary: the shutdown flag is process-wide and would
//! stop any scheduler running alongside it.

use sortbench::{
    BenchmarkConfig, CandidateDef, IsolationMode, RankingSettings, RunOutcome, Scheduler,
    UnitRunner, build_report, request_shutdown,
};
use std::time::Duration;

fn unsorted(v: Vec<i64>) -> Vec<i64> {
    v
}

static ALPHA: CandidateDef = CandidateDef::new("Alpha", unsorted);
static BETA: CandidateDef = CandidateDef::new("Beta", unsorted);

/// Requests a shutdown while running Alpha's second iteration at size 7
struct InterruptingRunner;

impl UnitRunner for InterruptingRunner {
    fn run(&mut self, candidate: &'static CandidateDef, size: usize, iteration: u32) -> RunOutcome {
        if size == 7 && candidate.name == ALPHA.name && iteration == 2 {
            request_shutdown();
        }
        // Slower at the interrupted size so a leak into the overall is visible
        let micros = if size == 7 { 500 } else { 1 };
        RunOutcome::Success(Duration::from_micros(micros))
    }
}

#[test]
fn test_shutdown_reports_partial_size_and_stops() {
    let config = BenchmarkConfig {
        iterations: 4,
        sizes: vec![5, 7, 9],
        timeout: None,
        threshold: None,
        parallelism: 1,
        isolation: IsolationMode::InProcess,
        ..BenchmarkConfig::default()
    };
    let results = Scheduler::new(config.clone(), vec![&ALPHA, &BETA])
        .unwrap()
        .with_runner_factory(|_| Box::new(InterruptingRunner))
        .run();

    assert!(results.interrupted);
    assert_eq!(results.sizes.len(), 2);
    assert!(results.sizes[0].completed);
    assert!(!results.sizes[1].completed);
    assert_eq!(results.units_executed, 8 + 2);
    // An interrupted size never triggers a skip
    assert!(results.skipped.is_empty());

    let partial = &results.sizes[1];
    assert_eq!(partial.tally.succeeded, 2);
    assert_eq!(partial.stats.len(), 1);
    assert_eq!(partial.stats[0].algorithm, "Alpha");
    assert_eq!(partial.stats[0].sample_count, 2);

    let report = build_report(&config, &RankingSettings::default(), 2, &results);
    assert_eq!(report.summary.sizes_completed, 1);
    assert!(report.summary.interrupted);
    for entry in &report.overall {
        assert!((entry.overall_average_ns - 1_000.0).abs() < 1e-6);
    }
    assert_eq!(report.overall.len(), 1);
    assert_eq!(report.overall[0].algorithms, vec!["Alpha", "Beta"]);
}
