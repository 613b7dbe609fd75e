//! Period-over-period growth and trailing moving averages.

use serde::{Deserialize, Serialize};

use super::time_bucket::TimeBucket;

/// A dated value in an ordered series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Period label.
    pub date: String,
    /// Observed value.
    pub value: f64,
}

impl SeriesPoint {
    /// Creates a point.
    #[must_use]
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

impl From<&TimeBucket> for SeriesPoint {
    fn from(bucket: &TimeBucket) -> Self {
        Self::new(bucket.date.clone(), bucket.value)
    }
}

impl From<&GrowthPoint> for SeriesPoint {
    fn from(point: &GrowthPoint) -> Self {
        Self::new(point.date.clone(), point.value)
    }
}

/// A series point enriched with its change versus the previous point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    /// Period label.
    pub date: String,
    /// Observed value.
    pub value: f64,
    /// `value - previous.value`; 0 for the first point.
    pub growth: f64,
    /// Percent change versus the previous value; 0 for the first point or
    /// when the previous value is 0.
    pub growth_rate: f64,
}

/// Derives absolute and percentage growth for an ordered series.
#[must_use]
pub fn growth_rates(series: &[SeriesPoint]) -> Vec<GrowthPoint> {
    let mut previous: Option<f64> = None;
    series
        .iter()
        .map(|point| {
            let (growth, growth_rate) = match previous {
                None => (0.0, 0.0),
                Some(prev) => {
                    let growth = point.value - prev;
                    let rate = if prev == 0.0 { 0.0 } else { growth / prev * 100.0 };
                    (growth, rate)
                }
            };
            previous = Some(point.value);
            GrowthPoint {
                date: point.date.clone(),
                value: point.value,
                growth,
                growth_rate,
            }
        })
        .collect()
}

/// Trailing moving average with the same length as `values`.
///
/// `output[i]` is the mean of `values[max(0, i + 1 - window) ..= i]`, so the
/// first `window - 1` outputs average over a shorter prefix. A window of 0 is
/// treated as 1.
#[must_use]
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let slice = &values[(i + 1).saturating_sub(window)..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
