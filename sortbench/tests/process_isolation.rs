//! Process isolation tests
//!
//! Runs without the libtest harness: the supervisor re-executes the current
//! binary as its worker, so `main` has to hand worker invocations to
//! `sortbench::run()` instead of running the tests again.

use sortbench::{BenchmarkConfig, IsolationMode, Scheduler, SkipReason, find_candidate};
use sortbench_cli::{UnitReply, WorkerHandle};
use sortbench_ipc::{FailureKind, RunRequest, WORKER_FLAG};
use std::time::Duration;

#[sortbench::candidate(name = "Px Std Sort")]
fn px_std_sort(mut v: Vec<i64>) -> Vec<i64> {
    v.sort();
    v
}

#[sortbench::candidate(name = "Px Spinner")]
fn px_spinner(v: Vec<i64>) -> Vec<i64> {
    loop {
        std::hint::black_box(&v);
    }
}

#[sortbench::candidate(name = "Px Aborter")]
fn px_aborter(v: Vec<i64>) -> Vec<i64> {
    drop(v);
    std::process::abort()
}

fn request(candidate: &str, size: u64) -> RunRequest {
    RunRequest {
        candidate: candidate.to_string(),
        size,
        iteration: 1,
        seed: 7,
        min_value: -1_000,
        max_value: 1_000,
    }
}

fn test_worker_handshake_and_units() {
    for cpu in [None, Some(0)] {
        let mut worker = WorkerHandle::spawn(cpu).expect("worker spawns");
        let caps = worker.capabilities().expect("handshake completed");
        assert!(caps.candidate_count >= 3);
        assert_eq!(caps.pid, worker.pid());

        let reply = worker
            .run_unit(&request("Px Std Sort", 100), Some(Duration::from_secs(5)))
            .expect("unit completes");
        assert!(matches!(reply, UnitReply::Completed(_)));

        // The same worker keeps serving units
        match worker.run_unit(&request("Px Missing Sort", 5), Some(Duration::from_secs(5))) {
            Ok(UnitReply::Failed { kind, .. }) => assert_eq!(kind, FailureKind::UnknownCandidate),
            other => panic!("unexpected reply {:?}", other),
        }
        assert!(worker.is_alive());
        worker.shutdown().expect("worker stops");
    }
}

fn test_scheduler_isolates_hangs_and_crashes() {
    let config = BenchmarkConfig {
        iterations: 3,
        sizes: vec![5, 7, 9],
        timeout: Some(Duration::from_millis(300)),
        threshold: None,
        parallelism: 2,
        isolation: IsolationMode::Process,
        seed: 7,
        ..BenchmarkConfig::default()
    };
    let candidates = ["Px Std Sort", "Px Spinner", "Px Aborter"]
        .iter()
        .map(|name| find_candidate(name).expect("candidate registered"))
        .collect();
    let results = Scheduler::new(config, candidates).expect("valid config").run();

    assert!(!results.interrupted);
    assert_eq!(results.sizes.len(), 3);
    for size_run in &results.sizes {
        let std_sort = size_run
            .stats
            .iter()
            .find(|s| s.algorithm == "Px Std Sort")
            .expect("std sort measured at every size");
        assert_eq!(std_sort.sample_count, 3);
        assert_eq!(size_run.stats.len(), 1);
    }

    let reason = |name: &str| {
        results
            .skipped
            .iter()
            .find(|r| r.algorithm == name)
            .map(|r| (r.skipped_at_size, r.reason))
    };
    assert_eq!(reason("Px Spinner"), Some((5, SkipReason::TimedOut)));
    assert_eq!(reason("Px Aborter"), Some((5, SkipReason::Errored)));
    assert_eq!(reason("Px Std Sort"), None);

    let first = &results.sizes[0].tally;
    assert!(first.timed_out >= 1);
    assert_eq!(first.errored, 3);
    assert_eq!(first.succeeded, 3);
}

fn main() {
    if std::env::args().any(|arg| arg == WORKER_FLAG) {
        if let Err(e) = sortbench::run() {
            eprintln!("worker failed: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    let tests: &[(&str, fn())] = &[
        ("test_worker_handshake_and_units", test_worker_handshake_and_units),
        (
            "test_scheduler_isolates_hangs_and_crashes",
            test_scheduler_isolates_hangs_and_crashes,
        ),
    ];
    for (name, test) in tests {
        print!("test {} ... ", name);
        test();
        println!("ok");
    }
    println!("\ntest result: ok. {} passed", tests.len());
}
