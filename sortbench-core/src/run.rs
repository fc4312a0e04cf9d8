//! Unit Execution
//!
//! One unit = generate the input, time a single call to the candidate,
//! verify the result. Shared by every isolation mode; the process-isolated
//! worker runs exactly this code on its side of the pipe.

use crate::measure::Timer;
use crate::verify::{VerifyError, verify_sorted_permutation};
use crate::{CandidateDef, RunOutcome, WorkloadGenerator};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

/// Error text recorded when a candidate returns a wrong result
pub const INCORRECT_OUTPUT: &str = "incorrect output";

/// Why a unit failed before producing a sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UnitFailure {
    Panic(String),
    IncorrectOutput(VerifyError),
}

/// Run the candidate once and return the measured sort duration.
pub(crate) fn measure_unit(
    candidate: &CandidateDef,
    generator: &WorkloadGenerator,
    size: usize,
    iteration: u32,
) -> Result<Duration, UnitFailure> {
    let input = generator.generate(size, iteration);
    let data = input.clone();
    let sort_fn = candidate.sort_fn;

    let result = catch_unwind(AssertUnwindSafe(move || {
        let timer = Timer::start();
        let sorted = sort_fn(data);
        (timer.stop(), sorted)
    }));

    match result {
        Ok((elapsed, sorted)) => {
            verify_sorted_permutation(&input, &sorted).map_err(UnitFailure::IncorrectOutput)?;
            Ok(elapsed)
        }
        Err(payload) => Err(UnitFailure::Panic(panic_message(payload.as_ref()))),
    }
}

/// Execute one (candidate, size, iteration) unit in the current thread.
///
/// The timeout is not enforced here; callers that need a hard deadline run
/// this on a thread or in a worker process they are able to abandon.
pub fn execute_unit(
    candidate: &CandidateDef,
    generator: &WorkloadGenerator,
    size: usize,
    iteration: u32,
) -> RunOutcome {
    match measure_unit(candidate, generator, size, iteration) {
        Ok(elapsed) => RunOutcome::Success(elapsed),
        Err(UnitFailure::Panic(message)) => RunOutcome::Errored(message),
        Err(UnitFailure::IncorrectOutput(_)) => RunOutcome::Errored(INCORRECT_OUTPUT.to_string()),
    }
}

/// Extract a readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
