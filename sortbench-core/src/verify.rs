//! Output Verification
//!
//! A fast but wrong result must never be counted as a sample.

use thiserror::Error;

/// Why a candidate's output was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("output has {got} elements, input had {expected}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("output decreases at index {index}")]
    NotSorted { index: usize },

    #[error("output is not a permutation of the input")]
    NotPermutation,
}

/// Check that `output` is non-decreasing and holds the same multiset as `input`.
pub fn verify_sorted_permutation(input: &[i64], output: &[i64]) -> Result<(), VerifyError> {
    if input.len() != output.len() {
        return Err(VerifyError::LengthMismatch {
            expected: input.len(),
            got: output.len(),
        });
    }

    if let Some(index) = output.windows(2).position(|w| w[0] > w[1]) {
        return Err(VerifyError::NotSorted { index: index + 1 });
    }

    // A sorted output is a permutation of the input iff it equals the sorted input.
    let mut expected = input.to_vec();
    expected.sort_unstable();
    if expected != output {
        return Err(VerifyError::NotPermutation);
    }

    Ok(())
}
