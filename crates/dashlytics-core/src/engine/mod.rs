//! Analytical computation engine.
//!
//! - [`aggregator`]: group-by reduction (sum, avg, min, max, count, median, stddev)
//! - [`time_bucket`]: calendar-interval bucketing with ISO-8601 weeks
//! - [`trend`]: growth rates and trailing moving averages
//! - [`percentile`]: nearest-rank percentiles
//! - [`streaming`]: single-pass variant of the aggregator
//!
//! None of these functions fail on dirty input. Unparseable fields are skipped,
//! empty inputs produce empty or zero results, and divisions by zero yield 0.

pub mod aggregator;
pub mod percentile;
pub mod stats;
#[cfg(test)]
mod stats_tests;
pub mod streaming;
pub mod time_bucket;
pub mod trend;

pub use aggregator::{aggregate, group_key, AggregateOp, AggregationSpec};
pub use percentile::{percentile, percentiles, PercentileSummary};
pub use streaming::{stream_aggregate, StreamAggregate, StreamingAggregator};
pub use time_bucket::{
    bucket, bucket_start, interval_key, iso_week, Interval, TimeBucket, TimeBucketer,
    TimeSeriesSpec,
};
pub use trend::{growth_rates, moving_average, GrowthPoint, SeriesPoint};

use crate::error::{Error, Result};

/// Rejects inputs larger than `limit` records.
///
/// The engine itself has no limit; callers exposed to untrusted payloads use
/// this before handing records over.
pub fn check_record_limit(len: usize, limit: usize) -> Result<()> {
    if len > limit {
        return Err(Error::TooManyRecords { limit, actual: len });
    }
    Ok(())
}
