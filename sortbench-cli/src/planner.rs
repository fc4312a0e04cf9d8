//! Benchmark Planner
//!
//! Decides what a run covers: which candidates, which array sizes, how many
//! workers.
//!
//! Filtering options:
//! - Regex pattern matching on the candidate display name
//!
//! Ordering: candidates are sorted alphabetically by name for deterministic execution.

use sortbench_core::CandidateDef;

/// Execution plan for a run
pub struct ExecutionPlan {
    /// Ordered list of candidates to run
    pub candidates: Vec<&'static CandidateDef>,
    /// Ascending, unique array sizes
    pub sizes: Vec<usize>,
}

/// Build execution plan from discovered candidates
pub fn build_plan(
    candidates: impl IntoIterator<Item = &'static CandidateDef>,
    filter: Option<&regex::Regex>,
    sizes: Vec<usize>,
) -> ExecutionPlan {
    let mut selected: Vec<_> = candidates
        .into_iter()
        .filter(|c| filter.is_none_or(|re| re.is_match(c.name)))
        .collect();

    selected.sort_by_key(|c| c.name);

    ExecutionPlan {
        candidates: selected,
        sizes: normalize_sizes(sizes),
    }
}

/// Default size ladder: 15 geometrically spaced sizes from 5 to ~333, plus
/// doubling sizes from 100, capped at `max_size`.
pub fn generate_sizes(max_size: usize) -> Vec<usize> {
    const SMALL_COUNT: i32 = 15;

    let small = (0..SMALL_COUNT).map(|i| {
        let exponent = f64::from(i) / f64::from(SMALL_COUNT - 1);
        (5.0 * (200.0f64 / 3.0).powf(exponent)).round() as usize
    });

    let large = std::iter::successors(Some(100usize), |s| s.checked_mul(2))
        .take_while(|&s| s <= max_size);

    let sizes: Vec<usize> = small.chain(large).filter(|&s| s <= max_size).collect();
    normalize_sizes(sizes)
}

/// Sort ascending and drop duplicates
pub fn normalize_sizes(mut sizes: Vec<usize>) -> Vec<usize> {
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

/// Number of concurrent workers: explicit `jobs` wins, then all CPUs, then 1.
pub fn resolve_workers(use_all_cpus: bool, jobs: Option<usize>) -> usize {
    match jobs {
        Some(n) => n.max(1),
        None if use_all_cpus => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
        None => 1,
    }
}
