//! # `Dashlytics` Core
//!
//! In-process analytical engine behind the Dashlytics business-intelligence
//! dashboards.
//!
//! ## Features
//!
//! - **Group-by aggregation**: sum, avg, min, max, count, median, stddev over
//!   open-shaped records
//! - **Time bucketing**: hour/day/week/month/quarter/year series with ISO-8601
//!   week numbering
//! - **Trends**: period-over-period growth and trailing moving averages
//! - **Percentiles**: nearest-rank estimator
//! - **Streaming aggregation**: single-pass, memory-bounded grouping
//! - **Result cache**: TTL memoization with lazy eviction and a background sweep
//!
//! ## Quick Start
//!
//! ```rust
//! use dashlytics_core::{aggregate, AggregateOp, AggregationSpec, Record};
//! use serde_json::json;
//!
//! let records: Vec<Record> = vec![
//!     Record::from_json(&json!({"region": "A", "revenue": 10})).unwrap(),
//!     Record::from_json(&json!({"region": "A", "revenue": 20})).unwrap(),
//!     Record::from_json(&json!({"region": "B", "revenue": 5})).unwrap(),
//! ];
//!
//! let spec = AggregationSpec::new(["region"]).with("revenue", AggregateOp::Sum);
//! let rows = aggregate(&records, &spec);
//! assert_eq!(rows.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // Acceptable for count -> f64 conversions
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod record;

pub use cache::{
    request_key, CacheEntry, CacheStats, CacheSweeper, Clock, ManualClock, ResultCache,
    SystemClock,
};
pub use config::{
    CacheConfig, ConfigError, DashConfig, EngineConfig, LoggingConfig, ServerConfig,
};
pub use engine::{
    aggregate, bucket, growth_rates, interval_key, iso_week, moving_average, percentile,
    percentiles, stream_aggregate, AggregateOp, AggregationSpec, GrowthPoint, Interval,
    PercentileSummary, SeriesPoint, StreamAggregate, StreamingAggregator, TimeBucket,
    TimeBucketer, TimeSeriesSpec,
};
pub use error::{Error, Result};
pub use record::{Record, Value};
