#![warn(missing_docs)]
//! Sortbench Statistical Engine
//!
//! Reduces raw duration samples (in nanoseconds) to the numbers a ranking
//! needs:
//! - Mean and median (linear-interpolated 50th percentile)
//! - Sample standard deviation and coefficient of variation
//! - Min/max and percentile helpers for reporting

mod percentiles;
mod summary;

pub use percentiles::{Percentiles, compute_percentile, compute_percentiles};
pub use summary::{SummaryStatistics, compute_summary};

/// Fewest samples for which a variance is reported
pub const MIN_VARIANCE_SAMPLES: usize = 2;
