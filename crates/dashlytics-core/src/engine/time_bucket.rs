//! Calendar-interval bucketing of time-stamped records.
//!
//! Each record's date field is mapped to an interval key (hour, day, ISO week,
//! month, quarter, year) and its value field is folded into that bucket's
//! running count/sum/min/max. Records with an unparseable date or a
//! non-numeric value are dropped. Periods without records produce no bucket.
//!
//! All keys and bucket starts are computed in UTC.

use chrono::{DateTime, Datelike, Days, NaiveDate, Timelike, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::record::Record;

/// Calendar interval used to bucket records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// `YYYY-MM-DDTHH:00:00`
    Hour,
    /// `YYYY-MM-DD`
    #[default]
    Day,
    /// `YYYY-W<n>` with the ISO-8601 week-numbering year and week.
    Week,
    /// `YYYY-MM`
    Month,
    /// `YYYY-Q<n>`
    Quarter,
    /// `YYYY`
    Year,
}

impl Interval {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(Error::InvalidArgument {
                name: "interval".to_string(),
                message: format!("unknown interval '{other}'"),
            }),
        }
    }
}

/// Which fields to bucket and at what granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesSpec {
    /// Field holding the record's date.
    pub date_field: String,
    /// Field holding the numeric value to reduce.
    pub value_field: String,
    /// Bucket granularity.
    #[serde(default)]
    pub interval: Interval,
    /// Accepted for compatibility. Gap filling is not performed.
    #[serde(default)]
    pub fill_missing: bool,
}

impl TimeSeriesSpec {
    /// Creates a spec without gap filling.
    #[must_use]
    pub fn new(
        date_field: impl Into<String>,
        value_field: impl Into<String>,
        interval: Interval,
    ) -> Self {
        Self {
            date_field: date_field.into(),
            value_field: value_field.into(),
            interval,
            fill_missing: false,
        }
    }

    /// Strict validation: both field names must be non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.date_field.trim().is_empty() {
            return Err(Error::InvalidSpec("dateField is empty".into()));
        }
        if self.value_field.trim().is_empty() {
            return Err(Error::InvalidSpec("valueField is empty".into()));
        }
        Ok(())
    }
}

/// One interval's reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucket {
    /// Interval key, e.g. `2024-W3`.
    pub date: String,
    /// Bucket start, epoch milliseconds.
    pub timestamp: i64,
    /// Mean of the bucket's values.
    pub value: f64,
    /// Number of values folded in.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Total of values.
    pub sum: f64,
}

/// ISO-8601 week-numbering year and week of `date`.
///
/// Shifts the date to the Thursday of its Monday-based week; that Thursday's
/// calendar year is the week-numbering year, and since week 1 holds the
/// year's first Thursday, the Thursday's day-of-year fixes the week number.
#[must_use]
pub fn iso_week(date: NaiveDate) -> (i32, u32) {
    let weekday = date.weekday().number_from_monday();
    let thursday = if weekday <= 4 {
        date.checked_add_days(Days::new(u64::from(4 - weekday)))
    } else {
        date.checked_sub_days(Days::new(u64::from(weekday - 4)))
    }
    .unwrap_or(date);

    (thursday.year(), thursday.ordinal0() / 7 + 1)
}

/// Interval key for an instant.
#[must_use]
pub fn interval_key(at: DateTime<Utc>, interval: Interval) -> String {
    match interval {
        Interval::Hour => at.format("%Y-%m-%dT%H:00:00").to_string(),
        Interval::Day => at.format("%Y-%m-%d").to_string(),
        Interval::Week => {
            let (year, week) = iso_week(at.date_naive());
            format!("{year:04}-W{week}")
        }
        Interval::Month => at.format("%Y-%m").to_string(),
        Interval::Quarter => format!("{:04}-Q{}", at.year(), at.month0() / 3 + 1),
        Interval::Year => format!("{:04}", at.year()),
    }
}

/// Start of the interval containing `at`. Weeks start on Monday.
#[must_use]
pub fn bucket_start(at: DateTime<Utc>, interval: Interval) -> Option<DateTime<Utc>> {
    let date = at.date_naive();
    let start = match interval {
        Interval::Hour => return date.and_hms_opt(at.hour(), 0, 0).map(|n| n.and_utc()),
        Interval::Day => date,
        Interval::Week => {
            date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))?
        }
        Interval::Month => date.with_day(1)?,
        Interval::Quarter => NaiveDate::from_ymd_opt(date.year(), date.month0() / 3 * 3 + 1, 1)?,
        Interval::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?,
    };
    start.and_hms_opt(0, 0, 0).map(|n| n.and_utc())
}

#[derive(Debug, Clone, Copy)]
struct BucketState {
    timestamp: i64,
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl BucketState {
    fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn fold(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// Incremental bucketer: push records one at a time, then [`finish`](Self::finish).
#[derive(Debug)]
pub struct TimeBucketer {
    spec: TimeSeriesSpec,
    buckets: FxHashMap<String, BucketState>,
    accepted: usize,
    dropped: usize,
}

impl TimeBucketer {
    /// Creates an empty bucketer.
    #[must_use]
    pub fn new(spec: TimeSeriesSpec) -> Self {
        if spec.fill_missing {
            tracing::debug!(
                interval = %spec.interval,
                "fillMissing requested; empty periods are not synthesized"
            );
        }
        Self {
            spec,
            buckets: FxHashMap::default(),
            accepted: 0,
            dropped: 0,
        }
    }

    /// Folds one record in. Returns false if the record was dropped.
    pub fn push(&mut self, record: &Record) -> bool {
        let parsed = record
            .datetime(&self.spec.date_field)
            .zip(record.number(&self.spec.value_field));
        let Some((at, value)) = parsed else {
            self.dropped += 1;
            return false;
        };
        let key = interval_key(at, self.spec.interval);
        if let Some(state) = self.buckets.get_mut(&key) {
            state.fold(value);
        } else {
            let Some(start) = bucket_start(at, self.spec.interval) else {
                self.dropped += 1;
                return false;
            };
            let mut state = BucketState::new(start.timestamp_millis());
            state.fold(value);
            self.buckets.insert(key, state);
        }
        self.accepted += 1;
        true
    }

    /// Records folded in so far.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Records dropped so far.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Emits buckets sorted ascending by start timestamp.
    #[must_use]
    pub fn finish(self) -> Vec<TimeBucket> {
        if self.dropped > 0 {
            tracing::debug!(
                dropped = self.dropped,
                accepted = self.accepted,
                "dropped records with unparseable date or non-numeric value"
            );
        }
        let mut buckets: Vec<TimeBucket> = self
            .buckets
            .into_iter()
            .map(|(date, state)| TimeBucket {
                date,
                timestamp: state.timestamp,
                value: state.sum / state.count as f64,
                count: state.count,
                min: state.min,
                max: state.max,
                sum: state.sum,
            })
            .collect();
        buckets.sort_by_key(|b| b.timestamp);
        buckets
    }
}

/// Buckets `records` per `spec`; see [`TimeBucketer`].
#[must_use]
pub fn bucket(records: &[Record], spec: &TimeSeriesSpec) -> Vec<TimeBucket> {
    let mut bucketer = TimeBucketer::new(spec.clone());
    for record in records {
        bucketer.push(record);
    }
    bucketer.finish()
}
