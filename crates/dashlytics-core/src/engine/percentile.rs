//! Nearest-rank percentiles.
//!
//! The estimator always returns an observed value: the element at
//! `ceil(p / 100 * n) - 1` of the ascending sort. There is no interpolation
//! between ranks.

use serde::{Deserialize, Serialize};

use super::stats::sorted;

/// Nearest-rank index into a sorted slice of length `len` (> 0).
fn rank_index(len: usize, p: f64) -> usize {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
    let rank = (p / 100.0 * len as f64).ceil() as usize;
    rank.saturating_sub(1).min(len - 1)
}

/// Value at percentile `p` (0..=100) of `values`; 0 for empty input.
///
/// `p` outside 0..=100 is clamped.
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted(values);
    sorted[rank_index(sorted.len(), p)]
}

/// Several percentiles over a single sort, in the order of `ranks`.
#[must_use]
pub fn percentiles(values: &[f64], ranks: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return vec![0.0; ranks.len()];
    }
    let sorted = sorted(values);
    ranks
        .iter()
        .map(|&p| sorted[rank_index(sorted.len(), p)])
        .collect()
}

/// Common dashboard percentiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentileSummary {
    /// Median (nearest rank).
    pub p50: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
}

impl PercentileSummary {
    /// Computes the summary over one sort.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        match percentiles(values, &[50.0, 90.0, 95.0, 99.0])[..] {
            [p50, p90, p95, p99] => Self { p50, p90, p95, p99 },
            _ => Self::default(),
        }
    }
}
