//! Statistics Computation
//!
//! Parallel reduction of one size's result table into per-algorithm
//! summaries. Each (algorithm, size) cell is independent, so cells are
//! aggregated with Rayon.

use sortbench_core::CandidateDef;
use sortbench_logic::{OutcomeTally, ResultStore, SizeStats, aggregate, tally};
use rayon::prelude::*;

/// Aggregated view of one (algorithm, size) cell
#[derive(Debug, Clone)]
pub struct CellSummary {
    /// Candidate display name
    pub algorithm: &'static str,
    /// Outcome counts, including failures
    pub tally: OutcomeTally,
    /// `None` when no iteration succeeded
    pub stats: Option<SizeStats>,
}

/// Summarize every candidate's cell at `size`, in candidate order.
///
/// Candidates with no recorded outcome at this size are left out.
pub fn summarize_size(
    store: &ResultStore,
    candidates: &[&'static CandidateDef],
    size: usize,
) -> Vec<CellSummary> {
    candidates
        .par_iter()
        .filter_map(|c| {
            let outcomes = store.outcomes(c.name, size);
            if outcomes.is_empty() {
                return None;
            }
            Some(CellSummary {
                algorithm: c.name,
                tally: tally(&outcomes),
                stats: aggregate(c.name, size, &outcomes),
            })
        })
        .collect()
}
