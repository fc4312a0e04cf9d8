//! Result Store
//!
//! Outcomes keyed by (algorithm, size). Owned by the single collector that
//! drains the workers' result channel, so it needs no locking.

use fxhash::FxHashMap;
use sortbench_core::RunOutcome;

/// Every recorded outcome of a run
#[derive(Debug, Default)]
pub struct ResultStore {
    cells: FxHashMap<(String, usize), Vec<(u32, RunOutcome)>>,
}

impl ResultStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one work unit. A repeated iteration replaces the earlier one.
    pub fn insert(&mut self, algorithm: &str, size: usize, iteration: u32, outcome: RunOutcome) {
        let cell = self
            .cells
            .entry((algorithm.to_string(), size))
            .or_default();
        match cell.iter_mut().find(|(i, _)| *i == iteration) {
            Some(slot) => slot.1 = outcome,
            None => cell.push((iteration, outcome)),
        }
    }

    /// Whether an iteration already has an outcome
    pub fn contains(&self, algorithm: &str, size: usize, iteration: u32) -> bool {
        self.cells
            .get(&(algorithm.to_string(), size))
            .is_some_and(|cell| cell.iter().any(|(i, _)| *i == iteration))
    }

    /// Outcomes of one cell in iteration order
    pub fn outcomes(&self, algorithm: &str, size: usize) -> Vec<RunOutcome> {
        let Some(cell) = self.cells.get(&(algorithm.to_string(), size)) else {
            return Vec::new();
        };
        let mut sorted: Vec<&(u32, RunOutcome)> = cell.iter().collect();
        sorted.sort_by_key(|(i, _)| *i);
        sorted.into_iter().map(|(_, o)| o.clone()).collect()
    }

    /// Number of recorded outcomes across all cells
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_outcomes_in_iteration_order() {
        let mut store = ResultStore::new();
        store.insert("A", 5, 3, RunOutcome::TimedOut);
        store.insert("A", 5, 1, RunOutcome::Success(Duration::from_nanos(10)));
        store.insert("A", 7, 1, RunOutcome::Errored("x".into()));

        assert_eq!(
            store.outcomes("A", 5),
            vec![RunOutcome::Success(Duration::from_nanos(10)), RunOutcome::TimedOut]
        );
        assert!(store.contains("A", 7, 1));
        assert!(!store.contains("A", 7, 2));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_reinsert_replaces() {
        let mut store = ResultStore::new();
        store.insert("A", 5, 1, RunOutcome::TimedOut);
        store.insert("A", 5, 1, RunOutcome::Success(Duration::from_nanos(1)));
        assert_eq!(store.len(), 1);
        assert!(store.outcomes("A", 5)[0].is_success());
        assert!(store.outcomes("B", 5).is_empty());
    }
}
