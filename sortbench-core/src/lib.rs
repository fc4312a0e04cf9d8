#![warn(missing_docs)]
//! Sortbench Core - Candidate Registry and Worker Runtime
//!
//! This crate owns everything that touches a candidate sort directly:
//! - `CandidateDef` registration via `inventory`
//! - Reproducible workload generation
//! - Timing one sort call and verifying its output
//! - The worker-process main loop used for process isolation

mod measure;
mod outcome;
mod run;
mod signal;
mod verify;
mod worker;
mod workload;

pub use measure::Timer;
pub use outcome::RunOutcome;
pub use run::{INCORRECT_OUTPUT, execute_unit, panic_message};
pub use signal::{install_shutdown_handler, request_shutdown, shutdown_requested};
pub use verify::{VerifyError, verify_sorted_permutation};
pub use worker::WorkerMain;
pub use workload::{DEFAULT_MAX_VALUE, DEFAULT_MIN_VALUE, WorkloadGenerator};

use std::collections::HashMap;
use thiserror::Error;

/// Signature every candidate exposes: take ownership of the input, return it sorted.
pub type SortFn = fn(Vec<i64>) -> Vec<i64>;

/// A sorting routine under test, registered via `#[sortbench::candidate]`
#[derive(Debug, Clone, Copy)]
pub struct CandidateDef {
    /// Unique display name ("Merge Sort")
    pub name: &'static str,
    /// Rust identifier of the registered function
    pub id: &'static str,
    /// The sort capability
    pub sort_fn: SortFn,
    /// Source file path
    pub file: &'static str,
    /// Source line number
    pub line: u32,
    /// Module path
    pub module_path: &'static str,
}

impl CandidateDef {
    /// Build a candidate outside the inventory (tests, embedding)
    pub const fn new(name: &'static str, sort_fn: SortFn) -> Self {
        Self {
            name,
            id: name,
            sort_fn,
            file: "",
            line: 0,
            module_path: "",
        }
    }
}

inventory::collect!(CandidateDef);

/// Anchor to prevent LTO from stripping inventory entries
#[used]
#[doc(hidden)]
pub static REGISTRY_ANCHOR: fn() = || {
    for _ in inventory::iter::<CandidateDef> {}
};

/// Registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Two candidates share a display name
    #[error("Duplicate candidate name: {name} ({first} and {second})")]
    DuplicateCandidate {
        /// The shared name
        name: String,
        /// Location of the first registration
        first: String,
        /// Location of the second registration
        second: String,
    },

    /// A name did not resolve to a registered candidate
    #[error("Candidate not found: {0}")]
    UnknownCandidate(String),
}

/// All candidates compiled into this binary, sorted by name.
pub fn registered_candidates() -> Vec<&'static CandidateDef> {
    let mut all: Vec<_> = inventory::iter::<CandidateDef>.into_iter().collect();
    all.sort_by_key(|c| c.name);
    all
}

/// Look up a registered candidate by display name.
pub fn find_candidate(name: &str) -> Result<&'static CandidateDef, CoreError> {
    inventory::iter::<CandidateDef>
        .into_iter()
        .find(|c| c.name == name)
        .ok_or_else(|| CoreError::UnknownCandidate(name.to_string()))
}

/// Reject candidate lists in which a display name appears twice.
pub fn validate_unique_names<'a>(
    candidates: impl IntoIterator<Item = &'a CandidateDef>,
) -> Result<(), CoreError> {
    let mut seen: HashMap<&str, &CandidateDef> = HashMap::new();
    for candidate in candidates {
        if let Some(first) = seen.insert(candidate.name, candidate) {
            return Err(CoreError::DuplicateCandidate {
                name: candidate.name.to_string(),
                first: format!("{}:{}", first.file, first.line),
                second: format!("{}:{}", candidate.file, candidate.line),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(v: Vec<i64>) -> Vec<i64> {
        v
    }

    #[test]
    fn test_unique_names_accepts_distinct() {
        let a = CandidateDef::new("A", identity);
        let b = CandidateDef::new("B", identity);
        assert!(validate_unique_names([&a, &b]).is_ok());
    }

    #[test]
    fn test_unique_names_rejects_duplicates() {
        let a = CandidateDef::new("Same", identity);
        let b = CandidateDef::new("Same", identity);
        let err = validate_unique_names([&a, &b]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateCandidate { ref name, .. } if name == "Same"));
    }

    #[test]
    fn test_unknown_candidate() {
        let err = find_candidate("definitely not registered").unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownCandidate("definitely not registered".to_string())
        );
    }
}
