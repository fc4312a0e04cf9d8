//! Summary Statistics
//!
//! All statistics are computed over every successful sample; there is no
//! outlier rejection, a slow iteration is a real observation.

use crate::MIN_VARIANCE_SAMPLES;
use crate::percentiles::compute_percentile;
use serde::{Deserialize, Serialize};

/// Summary of one (algorithm, size) sample set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// Middle value (mean of the two middle values for even counts)
    pub median: f64,
    /// Sample standard deviation (n - 1); zero for a single sample
    pub std_dev: f64,
    /// Fastest sample
    pub min: f64,
    /// Slowest sample
    pub max: f64,
    /// Number of samples summarized
    pub sample_count: usize,
}

impl SummaryStatistics {
    /// Coefficient of variation in percent, `None` with fewer than two samples
    /// or a zero mean.
    pub fn variance_percent(&self) -> Option<f64> {
        if self.sample_count < MIN_VARIANCE_SAMPLES || self.mean == 0.0 {
            return None;
        }
        Some(self.std_dev / self.mean * 100.0)
    }
}

/// Summarize samples; `None` when there is nothing to summarize.
pub fn compute_summary(samples: &[f64]) -> Option<SummaryStatistics> {
    if samples.is_empty() {
        return None;
    }

    let n = samples.len();
    let mean = samples.iter().sum::<f64>() / n as f64;

    let std_dev = if n >= MIN_VARIANCE_SAMPLES {
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(SummaryStatistics {
        mean,
        median: compute_percentile(samples, 50.0),
        std_dev,
        min,
        max,
        sample_count: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_none() {
        assert!(compute_summary(&[]).is_none());
    }

    #[test]
    fn test_basic_summary() {
        let stats = compute_summary(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.sample_count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.median - 4.5).abs() < 1e-12);
        assert!((stats.min - 2.0).abs() < f64::EPSILON);
        assert!((stats.max - 9.0).abs() < f64::EPSILON);
        // population sd is 2.0; sample sd is sqrt(32/7)
        assert!((stats.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_variance_percent() {
        let stats = compute_summary(&[90.0, 110.0]).unwrap();
        // mean 100, sample sd sqrt(200) ~ 14.142
        let cv = stats.variance_percent().unwrap();
        assert!((cv - 200f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample() {
        let stats = compute_summary(&[3.5]).unwrap();
        assert_eq!(stats.mean, 3.5);
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.std_dev, 0.0);
        assert!(stats.variance_percent().is_none());
    }

    #[test]
    fn test_zero_mean_has_no_variance_percent() {
        let stats = compute_summary(&[0.0, 0.0, 0.0]).unwrap();
        assert!(stats.variance_percent().is_none());
    }
}
