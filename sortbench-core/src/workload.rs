//! Workload Generation
//!
//! Every (size, iteration) pair maps to its own RNG stream, so a unit's input
//! does not depend on which worker runs it, in which order, or whether the
//! unit is re-run after a resume.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default smallest generated value
pub const DEFAULT_MIN_VALUE: i64 = -1_000_000;
/// Default largest generated value
pub const DEFAULT_MAX_VALUE: i64 = 1_000_000;

/// Reproducible random integer arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadGenerator {
    seed: u64,
    min_value: i64,
    max_value: i64,
}

impl WorkloadGenerator {
    /// Generator over the default value range
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
        }
    }

    /// Restrict generated values to `[min_value, max_value]` (bounds are swapped if reversed)
    pub fn with_range(mut self, min_value: i64, max_value: i64) -> Self {
        self.min_value = min_value.min(max_value);
        self.max_value = min_value.max(max_value);
        self
    }

    /// Run-wide seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Inclusive value range
    pub fn range(&self) -> (i64, i64) {
        (self.min_value, self.max_value)
    }

    /// Fresh array for one work unit
    pub fn generate(&self, size: usize, iteration: u32) -> Vec<i64> {
        let mut rng = StdRng::seed_from_u64(self.stream_seed(size, iteration));
        (0..size)
            .map(|_| rng.gen_range(self.min_value..=self.max_value))
            .collect()
    }

    fn stream_seed(&self, size: usize, iteration: u32) -> u64 {
        let mixed = self
            .seed
            .wrapping_add(splitmix64(size as u64))
            .rotate_left(17)
            ^ splitmix64(u64::from(iteration).wrapping_add(0xA5A5_A5A5));
        splitmix64(mixed)
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
