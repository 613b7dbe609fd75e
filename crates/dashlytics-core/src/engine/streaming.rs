//! Single-pass, memory-bounded group-by aggregation.
//!
//! Unlike [`aggregate`](super::aggregate), which keeps every record of every
//! group, the streaming aggregator keeps running count/sum/min/max per group
//! and field. That is O(groups) memory for `sum`, `avg`, `min`, `max` and
//! `count`. `median` and `stddev` cannot be computed from running totals, so
//! fields using them buffer that field's numeric values per group: memory for
//! those fields grows with the input.
//!
//! Output is not incremental. No group is final until the source is exhausted,
//! so rows only become available after the last record has been pushed.
//! Results are identical to the batch aggregator for the same input order.

use indexmap::IndexMap;
use std::borrow::Borrow;

use super::aggregator::{group_key, AggregateOp, AggregationSpec};
use super::stats;
use crate::record::{Record, Value};

#[derive(Debug, Clone)]
struct FieldState {
    op: AggregateOp,
    numeric: u64,
    sum: f64,
    min: f64,
    max: f64,
    /// Every numeric value, kept only for median/stddev.
    buffer: Option<Vec<f64>>,
}

impl FieldState {
    fn new(op: AggregateOp) -> Self {
        Self {
            op,
            numeric: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            buffer: op.needs_all_values().then(Vec::new),
        }
    }

    fn fold(&mut self, value: f64) {
        self.numeric += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.push(value);
        }
    }

    fn merge(&mut self, other: Self) {
        self.numeric += other.numeric;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        if let (Some(buffer), Some(more)) = (self.buffer.as_mut(), other.buffer) {
            buffer.extend(more);
        }
    }

    fn finalize(&self, group_size: usize) -> f64 {
        let buffered = || self.buffer.as_deref().unwrap_or_default();
        match self.op {
            AggregateOp::Count => group_size as f64,
            _ if self.numeric == 0 => 0.0,
            AggregateOp::Sum => self.sum,
            AggregateOp::Avg => self.sum / self.numeric as f64,
            AggregateOp::Min => self.min,
            AggregateOp::Max => self.max,
            AggregateOp::Median => stats::median(buffered()),
            AggregateOp::StdDev => stats::population_std_dev(buffered()),
        }
    }
}

#[derive(Debug, Clone)]
struct GroupState {
    key_values: Vec<String>,
    count: usize,
    /// Aligned with the spec's aggregation order.
    fields: Vec<FieldState>,
}

/// Running per-group state fed one record at a time.
#[derive(Debug, Clone)]
pub struct StreamingAggregator {
    spec: AggregationSpec,
    groups: IndexMap<String, GroupState>,
    processed: u64,
}

impl StreamingAggregator {
    /// Creates an aggregator for `spec`.
    #[must_use]
    pub fn new(spec: AggregationSpec) -> Self {
        Self {
            spec,
            groups: IndexMap::new(),
            processed: 0,
        }
    }

    /// Folds one record into its group.
    pub fn push(&mut self, record: &Record) {
        self.processed += 1;
        let key_values = self.spec.key_values(record);
        let key = group_key(&key_values);
        let spec = &self.spec;
        let group = self.groups.entry(key).or_insert_with(|| GroupState {
            key_values,
            count: 0,
            fields: spec.aggregations.values().map(|&op| FieldState::new(op)).collect(),
        });
        group.count += 1;
        for ((field, _), state) in spec.aggregations.iter().zip(group.fields.iter_mut()) {
            if let Some(value) = record.number(field) {
                state.fold(value);
            }
        }
    }

    /// Records pushed so far.
    #[must_use]
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Distinct groups seen so far.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Combines a partial aggregator built from the same spec, e.g. one per
    /// input chunk. Groups keep `self`'s first-seen order, then `other`'s.
    pub fn merge(&mut self, other: Self) {
        debug_assert_eq!(self.spec, other.spec, "merging aggregators with different specs");
        self.processed += other.processed;
        for (key, theirs) in other.groups {
            match self.groups.get_mut(&key) {
                Some(ours) => {
                    ours.count += theirs.count;
                    for (mine, other_field) in ours.fields.iter_mut().zip(theirs.fields) {
                        mine.merge(other_field);
                    }
                }
                None => {
                    self.groups.insert(key, theirs);
                }
            }
        }
    }

    /// Emits one row per group, in first-seen order.
    #[must_use]
    pub fn finish(self) -> Vec<Record> {
        tracing::debug!(
            records = self.processed,
            groups = self.groups.len(),
            "finished streaming aggregation"
        );
        let spec = self.spec;
        self.groups
            .into_values()
            .map(|group| {
                let mut row = spec.row_prefix(&group.key_values);
                for (field, state) in spec.aggregations.keys().zip(&group.fields) {
                    row.insert(field.clone(), Value::Number(state.finalize(group.count)));
                }
                row
            })
            .collect()
    }
}

impl<R: Borrow<Record>> Extend<R> for StreamingAggregator {
    fn extend<T: IntoIterator<Item = R>>(&mut self, iter: T) {
        for record in iter {
            self.push(record.borrow());
        }
    }
}

enum StreamState<I> {
    Pending(I, StreamingAggregator),
    Draining(std::vec::IntoIter<Record>),
    Done,
}

/// Lazy aggregated rows over a single-use record source.
///
/// The source is drained on the first call to `next`; rows are then yielded
/// one by one. The adapter cannot be restarted.
pub struct StreamAggregate<I> {
    state: StreamState<I>,
}

impl<I, R> Iterator for StreamAggregate<I>
where
    I: Iterator<Item = R>,
    R: Borrow<Record>,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            match std::mem::replace(&mut self.state, StreamState::Done) {
                StreamState::Pending(source, mut aggregator) => {
                    aggregator.extend(source);
                    self.state = StreamState::Draining(aggregator.finish().into_iter());
                }
                StreamState::Draining(mut rows) => {
                    let row = rows.next();
                    if row.is_some() {
                        self.state = StreamState::Draining(rows);
                    }
                    return row;
                }
                StreamState::Done => return None,
            }
        }
    }
}

/// Aggregates `records` in one pass; see [`StreamingAggregator`].
pub fn stream_aggregate<I, R>(records: I, spec: AggregationSpec) -> StreamAggregate<I::IntoIter>
where
    I: IntoIterator<Item = R>,
    R: Borrow<Record>,
{
    StreamAggregate {
        state: StreamState::Pending(records.into_iter(), StreamingAggregator::new(spec)),
    }
}
