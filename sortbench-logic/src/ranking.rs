//! Ranking Engine
//!
//! Competition ranking ("1224") over tie bands. Two means share a band when
//! they round to the same multiple of the resolution, which is also how the
//! reports print them, so two algorithms shown with the same time share a rank
//! and a tie never depends on nanosecond noise.

use crate::aggregate::SizeStats;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;

/// Width of one tie band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieResolution {
    nanos: u64,
}

impl TieResolution {
    /// Band width from a duration (at least 1 ns)
    pub fn from_duration(resolution: Duration) -> Self {
        Self {
            nanos: (resolution.as_nanos() as u64).max(1),
        }
    }

    /// Band width in nanoseconds
    pub fn as_nanos(&self) -> u64 {
        self.nanos
    }

    /// Band index of a mean in nanoseconds: the nearest multiple of the width
    pub fn band(&self, value_ns: f64) -> u64 {
        // NaN and negatives land in band 0; `as` saturates at the top.
        (value_ns / self.nanos as f64).round().max(0.0) as u64
    }
}

impl Default for TieResolution {
    fn default() -> Self {
        Self {
            nanos: crate::DEFAULT_TIE_RESOLUTION_NS,
        }
    }
}

/// One rank of a per-size table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    /// 1-based competition rank
    pub rank: usize,
    /// Algorithms sharing this rank, fastest first
    pub algorithms: Vec<String>,
    /// Mean of the fastest member
    pub mean_ns: f64,
    /// Median of the fastest member
    pub median_ns: f64,
    /// Variance percent, only for a single-member rank with two or more samples
    pub variance_percent: Option<f64>,
    /// Tie band index
    pub band: u64,
}

impl RankEntry {
    /// Whether more than one algorithm shares this rank
    pub fn is_tie(&self) -> bool {
        self.algorithms.len() > 1
    }
}

/// One rank of the cross-size table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallRankEntry {
    /// 1-based competition rank
    pub rank: usize,
    /// Algorithms sharing this rank, fastest first
    pub algorithms: Vec<String>,
    /// Average of per-size means of the fastest member
    pub overall_average_ns: f64,
    /// Tie band index
    pub band: u64,
}

fn by_mean_then_median_then_name(a: &SizeStats, b: &SizeStats) -> Ordering {
    a.mean_ns
        .total_cmp(&b.mean_ns)
        .then_with(|| a.median_ns.total_cmp(&b.median_ns))
        .then_with(|| a.algorithm.cmp(&b.algorithm))
}

/// Split an ordered sequence into runs of equal band, assigning competition ranks
fn competition_groups<T>(ordered: &[T], band_of: impl Fn(&T) -> u64) -> Vec<(usize, &[T])> {
    let mut groups = Vec::new();
    let mut start = 0;
    while start < ordered.len() {
        let band = band_of(&ordered[start]);
        let len = ordered[start..]
            .iter()
            .take_while(|item| band_of(*item) == band)
            .count();
        // rank = 1 + number of algorithms strictly ahead
        groups.push((start + 1, &ordered[start..start + len]));
        start += len;
    }
    groups
}

/// Rank every algorithm that produced stats at one size.
///
/// `stats` may contain entries for several sizes; callers pass one size.
pub fn rank_size(stats: &[SizeStats], resolution: TieResolution) -> Vec<RankEntry> {
    let mut ordered: Vec<&SizeStats> = stats.iter().collect();
    ordered.sort_by(|a, b| by_mean_then_median_then_name(a, b));

    competition_groups(&ordered, |s| resolution.band(s.mean_ns))
        .into_iter()
        .map(|(rank, group)| {
            let lead = group[0];
            RankEntry {
                rank,
                algorithms: group.iter().map(|s| s.algorithm.clone()).collect(),
                mean_ns: lead.mean_ns,
                median_ns: lead.median_ns,
                variance_percent: if group.len() == 1 {
                    lead.variance_percent
                } else {
                    None
                },
                band: resolution.band(lead.mean_ns),
            }
        })
        .collect()
}

/// Average of each algorithm's per-size means over the sizes it has stats for,
/// ordered by name.
pub fn overall_averages(stats: &[SizeStats]) -> Vec<(String, f64)> {
    let mut totals: FxHashMap<&str, (f64, usize)> = FxHashMap::default();
    for s in stats {
        let entry = totals.entry(s.algorithm.as_str()).or_insert((0.0, 0));
        entry.0 += s.mean_ns;
        entry.1 += 1;
    }

    let mut averages: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(name, (sum, count))| (name.to_string(), sum / count as f64))
        .collect();
    averages.sort_by(|a, b| a.0.cmp(&b.0));
    averages
}

/// Rank algorithms by their cross-size average
pub fn rank_overall(stats: &[SizeStats], resolution: TieResolution) -> Vec<OverallRankEntry> {
    let mut ordered = overall_averages(stats);
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    competition_groups(&ordered, |(_, avg)| resolution.band(*avg))
        .into_iter()
        .map(|(rank, group)| OverallRankEntry {
            rank,
            algorithms: group.iter().map(|(name, _)| name.clone()).collect(),
            overall_average_ns: group[0].1,
            band: resolution.band(group[0].1),
        })
        .collect()
}

/// Ranks up to `n`, including every member of a band that starts at or before rank `n`.
///
/// Returns the kept prefix and whether it lists more than `n` algorithms.
pub fn top_n(entries: &[OverallRankEntry], n: usize) -> (&[OverallRankEntry], bool) {
    let keep = entries.iter().take_while(|e| e.rank <= n).count();
    let shown: usize = entries[..keep].iter().map(|e| e.algorithms.len()).sum();
    (&entries[..keep], shown > n)
}
