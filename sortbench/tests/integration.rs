//! Integration tests for Sortbench
//!
//! These tests drive the scheduler end to end on threads and check the
//! skip rules, rankings and journal resume against registered candidates.

use proptest::prelude::*;
use proptest::sample::Index;
use sortbench::{
    BenchmarkConfig, CandidateDef, IsolationMode, RankingSettings, RunOutcome, Scheduler,
    SizeStats, SkipReason, SkipRecord, TieResolution, UnitRunner, WorkloadGenerator,
    build_report, execute_unit, find_candidate, rank_overall, rank_size, registered_candidates,
    top_n, verify_sorted_permutation,
};
use std::collections::BTreeSet;
use std::time::Duration;

#[sortbench::candidate(name = "It Std Sort")]
fn it_std_sort(mut v: Vec<i64>) -> Vec<i64> {
    v.sort();
    v
}

#[sortbench::candidate(name = "It Insertion Sort")]
fn it_insertion_sort(mut v: Vec<i64>) -> Vec<i64> {
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && v[j - 1] > v[j] {
            v.swap(j - 1, j);
            j -= 1;
        }
    }
    v
}

#[sortbench::candidate(name = "It Sleeper")]
fn it_sleeper(mut v: Vec<i64>) -> Vec<i64> {
    std::thread::sleep(Duration::from_millis(400));
    v.sort();
    v
}

#[sortbench::candidate(name = "It Dawdler")]
fn it_dawdler(mut v: Vec<i64>) -> Vec<i64> {
    std::thread::sleep(Duration::from_millis(20));
    v.sort();
    v
}

#[sortbench::candidate(name = "It Reverser")]
fn it_reverser(mut v: Vec<i64>) -> Vec<i64> {
    v.sort();
    v.reverse();
    v
}

fn unsorted(v: Vec<i64>) -> Vec<i64> {
    v
}

static FRAGILE: CandidateDef = CandidateDef::new("Ladder Fragile", unsorted);
static STEADY: CandidateDef = CandidateDef::new("Ladder Steady", unsorted);

/// Times out the fragile candidate from `fails_from` upward
struct LadderRunner {
    fails_from: usize,
}

impl UnitRunner for LadderRunner {
    fn run(&mut self, candidate: &'static CandidateDef, size: usize, _: u32) -> RunOutcome {
        if candidate.name == FRAGILE.name && size >= self.fails_from {
            RunOutcome::TimedOut
        } else {
            RunOutcome::Success(Duration::from_micros(1))
        }
    }
}

fn candidates(names: &[&str]) -> Vec<&'static CandidateDef> {
    names
        .iter()
        .map(|name| find_candidate(name).expect("candidate registered"))
        .collect()
}

fn thread_config(iterations: u32, sizes: Vec<usize>) -> BenchmarkConfig {
    BenchmarkConfig {
        iterations,
        sizes,
        timeout: None,
        threshold: None,
        parallelism: 2,
        isolation: IsolationMode::Thread,
        seed: 7,
        ..BenchmarkConfig::default()
    }
}

fn stats(algorithm: &str, size: usize, mean_ns: f64) -> SizeStats {
    SizeStats {
        algorithm: algorithm.to_string(),
        size,
        sample_count: 3,
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
fn test_attribute_registers_candidates() {
    let names: Vec<&str> = registered_candidates().iter().map(|c| c.name).collect();
    for expected in ["It Std Sort", "It Insertion Sort", "It Sleeper", "It Reverser"] {
        assert!(names.contains(&expected), "missing {}", expected);
    }

    let def = find_candidate("It Std Sort").unwrap();
    assert_eq!(def.id, "it_std_sort");
    assert!(def.file.ends_with("integration.rs"));
    assert!(find_candidate("Nope Sort").is_err());
}

#[test]
fn test_timeout_skips_larger_sizes() {
    let config = BenchmarkConfig {
        timeout: Some(Duration::from_millis(50)),
        ..thread_config(2, vec![5, 7, 9])
    };
    let results = Scheduler::new(config, candidates(&["It Std Sort", "It Sleeper"]))
        .unwrap()
        .run();

    assert!(!results.interrupted);
    assert_eq!(results.skipped.len(), 1);
    assert_eq!(results.skipped[0].algorithm, "It Sleeper");
    assert_eq!(results.skipped[0].skipped_at_size, 5);
    assert_eq!(results.skipped[0].reason, SkipReason::TimedOut);

    assert_eq!(results.sizes.len(), 3);
    for size_run in &results.sizes {
        assert!(size_run.stats.iter().all(|s| s.algorithm != "It Sleeper"));
        assert!(size_run.stats.iter().any(|s| s.algorithm == "It Std Sort"));
    }
    assert_eq!(results.sizes[0].skipped_here.len(), 1);
    assert!(results.sizes[0].tally.timed_out >= 1);
    assert_eq!(results.sizes[1].tally.timed_out, 0);
}

#[test]
fn test_soft_threshold_keeps_completed_size() {
    let config = BenchmarkConfig {
        threshold: Some(Duration::from_millis(5)),
        isolation: IsolationMode::InProcess,
        ..thread_config(2, vec![5, 7, 9])
    };
    let results = Scheduler::new(config.clone(), candidates(&["It Std Sort", "It Dawdler"]))
        .unwrap()
        .run();

    assert_eq!(results.skipped.len(), 1);
    assert_eq!(results.skipped[0].reason, SkipReason::AggregateTooSlow);
    assert_eq!(results.skipped[0].skipped_at_size, 5);

    let dawdler: Vec<SizeStats> = results
        .all_stats()
        .into_iter()
        .filter(|s| s.algorithm == "It Dawdler")
        .collect();
    assert_eq!(dawdler.len(), 1);
    assert_eq!(dawdler[0].size, 5);

    // The overall average only sees the size the dawdler completed
    let report = build_report(&config, &RankingSettings::default(), 2, &results);
    let entry = report
        .overall
        .iter()
        .find(|e| e.algorithms.iter().any(|a| a == "It Dawdler"))
        .unwrap();
    assert_eq!(entry.overall_average_ns, dawdler[0].mean_ns);
    assert_eq!(report.overall[0].algorithms, vec!["It Std Sort".to_string()]);
}

#[test]
fn test_incorrect_output_is_errored() {
    let config = thread_config(3, vec![5, 7]);
    let results = Scheduler::new(config, candidates(&["It Reverser", "It Insertion Sort"]))
        .unwrap()
        .run();

    let record = results
        .skipped
        .iter()
        .find(|r| r.algorithm == "It Reverser")
        .unwrap();
    assert_eq!(record.reason, SkipReason::Errored);
    assert_eq!(record.skipped_at_size, 5);

    assert_eq!(results.sizes[0].tally.errored, 3);
    assert_eq!(results.sizes[1].tally.errored, 0);
    assert_eq!(results.sizes[1].tally.succeeded, 3);
}

#[test]
fn test_all_skipped_stops_early() {
    let config = BenchmarkConfig {
        timeout: Some(Duration::from_millis(50)),
        ..thread_config(1, vec![5, 7, 9])
    };
    let results = Scheduler::new(config, candidates(&["It Sleeper"]))
        .unwrap()
        .run();

    assert_eq!(results.sizes.len(), 1);
    assert_eq!(results.units_executed, 1);
    assert!(!results.interrupted);
}

#[test]
fn test_journal_resume_skips_finished_units() {
    let dir = tempfile::tempdir().unwrap();
    let config = thread_config(3, vec![5, 7]);

    let first = Scheduler::new(config.clone(), candidates(&["It Std Sort"]))
        .unwrap()
        .with_journal(sortbench_cli::Journal::open(dir.path()).unwrap())
        .run();
    assert_eq!(first.units_executed, 6);
    assert_eq!(first.units_restored, 0);

    let second = Scheduler::new(config, candidates(&["It Std Sort"]))
        .unwrap()
        .with_journal(sortbench_cli::Journal::open(dir.path()).unwrap())
        .run();
    assert_eq!(second.units_executed, 0);
    assert_eq!(second.units_restored, 6);
    assert_eq!(second.sizes.len(), 2);
    assert_eq!(second.sizes[1].stats[0].sample_count, 3);

    let journal = std::fs::read_to_string(dir.path().join("results_7.csv")).unwrap();
    assert_eq!(journal.lines().count(), 4);
}

#[test]
fn test_tie_bands_share_rank() {
    let cell = vec![
        stats("Quick Sort", 1000, 1_600_000.0),
        stats("Merge Sort", 1000, 2_400_000.0),
        stats("Heap Sort", 1000, 5_000_000.0),
    ];
    let ranking = rank_size(&cell, TieResolution::from_duration(Duration::from_millis(1)));

    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].rank, 1);
    assert_eq!(ranking[0].algorithms, vec!["Quick Sort", "Merge Sort"]);
    assert!(ranking[0].is_tie());
    assert_eq!(ranking[1].rank, 3);
    assert_eq!(ranking[1].algorithms, vec!["Heap Sort"]);
}

#[test]
fn test_top_n_keeps_whole_band() {
    let all = vec![
        stats("A", 5, 1_000.0),
        stats("B", 5, 3_000.0),
        stats("C", 5, 3_400.0),
        stats("D", 5, 9_000.0),
    ];
    let overall = rank_overall(&all, TieResolution::from_duration(Duration::from_micros(1)));
    let (kept, overflow) = top_n(&overall, 2);

    let names: Vec<&String> = kept.iter().flat_map(|e| e.algorithms.iter()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert!(overflow);
}

#[test]
fn test_ranks_partition_algorithms() {
    let cell: Vec<SizeStats> = (0..12)
        .map(|i| stats(&format!("Sort {:02}", i), 100, 1_000_000.0 * (i / 3) as f64 + 1.0))
        .collect();
    let ranking = rank_size(&cell, TieResolution::default());

    let mut listed: Vec<&String> = ranking.iter().flat_map(|e| e.algorithms.iter()).collect();
    listed.sort();
    listed.dedup();
    assert_eq!(listed.len(), 12);

    let mut ahead = 0;
    for entry in &ranking {
        assert_eq!(entry.rank, ahead + 1);
        ahead += entry.algorithms.len();
    }
}

#[test]
fn test_workload_is_reproducible() {
    let a = WorkloadGenerator::new(42);
    let b = WorkloadGenerator::new(42);
    assert_eq!(a.generate(100, 3), b.generate(100, 3));
    assert_ne!(a.generate(100, 3), a.generate(100, 4));
    assert!(a.generate(100, 3).iter().all(|v| (-1_000_000..=1_000_000).contains(v)));
}

#[test]
fn test_execute_unit_verifies_output() {
    let generator = WorkloadGenerator::new(1);
    let good = find_candidate("It Insertion Sort").unwrap();
    let bad = find_candidate("It Reverser").unwrap();

    assert!(execute_unit(good, &generator, 50, 1).is_success());
    assert_eq!(
        execute_unit(bad, &generator, 50, 1),
        RunOutcome::Errored("incorrect output".to_string())
    );
}

proptest! {
    #[test]
    fn prop_correct_candidates_sort(input in proptest::collection::vec(any::<i64>(), 0..200)) {
        for name in ["It Std Sort", "It Insertion Sort"] {
            let def = find_candidate(name).unwrap();
            let output = (def.sort_fn)(input.clone());
            prop_assert!(verify_sorted_permutation(&input, &output).is_ok());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_scheduler_never_runs_past_skip(
        ladder in proptest::collection::btree_set(2usize..10_000, 2..7),
        pick in any::<Index>(),
        iterations in 1u32..4,
        parallelism in 1usize..4,
    ) {
        let ladder: Vec<usize> = ladder.into_iter().collect();
        let skip_size = ladder[pick.index(ladder.len())];
        let config = BenchmarkConfig {
            iterations,
            sizes: ladder.clone(),
            timeout: None,
            threshold: None,
            parallelism,
            isolation: IsolationMode::InProcess,
            ..BenchmarkConfig::default()
        };
        let results = Scheduler::new(config, vec![&FRAGILE, &STEADY])
            .unwrap()
            .with_runner_factory(move |_| {
                Box::new(LadderRunner { fails_from: skip_size }) as Box<dyn UnitRunner>
            })
            .run();

        let expected_skip = vec![SkipRecord {
            algorithm: FRAGILE.name.to_string(),
            skipped_at_size: skip_size,
            reason: SkipReason::TimedOut,
        }];
        prop_assert_eq!(&results.skipped, &expected_skip);

        let fragile_sizes: BTreeSet<usize> = results
            .all_stats()
            .iter()
            .filter(|s| s.algorithm == FRAGILE.name)
            .map(|s| s.size)
            .collect();
        let expected: BTreeSet<usize> = ladder.iter().copied().filter(|&n| n < skip_size).collect();
        prop_assert_eq!(fragile_sizes, expected);

        prop_assert_eq!(results.sizes.len(), ladder.len());
        for size_run in &results.sizes {
            prop_assert!(size_run.stats.iter().any(|s| s.algorithm == STEADY.name));
            let expected_timeouts = usize::from(size_run.size == skip_size);
            prop_assert!(size_run.tally.timed_out >= expected_timeouts);
            if size_run.size != skip_size {
                prop_assert_eq!(size_run.tally.timed_out, 0);
            }
        }
    }
}
