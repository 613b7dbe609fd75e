//! Group-by aggregation over open-shaped records.
//!
//! Records are grouped by the `|`-joined text of their group-by fields (missing
//! fields read as ""), then every configured field is reduced per group. One
//! pass builds the groups; output rows follow first-seen key order.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::stats;
use crate::error::{Error, Result};
use crate::record::{Record, Value};

/// Separator between group-by values in a composite key.
pub const GROUP_KEY_SEPARATOR: &str = "|";

/// Reduction applied to one field of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    /// Arithmetic total.
    Sum,
    /// Mean of the numeric values.
    #[serde(alias = "average", alias = "mean")]
    Avg,
    /// Smallest numeric value.
    Min,
    /// Largest numeric value.
    Max,
    /// Size of the group, regardless of the field's values.
    Count,
    /// Median of the numeric values.
    Median,
    /// Population standard deviation of the numeric values.
    #[serde(alias = "std_dev", alias = "stdev")]
    StdDev,
}

impl AggregateOp {
    /// All operators, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Sum,
        Self::Avg,
        Self::Min,
        Self::Max,
        Self::Count,
        Self::Median,
        Self::StdDev,
    ];

    /// Applies the operator.
    ///
    /// `values` holds the group's numeric-coercible values for the field;
    /// `group_size` is the raw number of records in the group. `Count` reports
    /// `group_size`, not `values.len()`.
    #[must_use]
    pub fn apply(self, values: &[f64], group_size: usize) -> f64 {
        match self {
            Self::Sum => stats::sum(values),
            Self::Avg => stats::mean(values),
            Self::Min => stats::min(values),
            Self::Max => stats::max(values),
            Self::Count => group_size as f64,
            Self::Median => stats::median(values),
            Self::StdDev => stats::population_std_dev(values),
        }
    }

    /// Returns true if the operator needs every value, not just running totals.
    #[must_use]
    pub const fn needs_all_values(self) -> bool {
        matches!(self, Self::Median | Self::StdDev)
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
            Self::Median => "median",
            Self::StdDev => "stddev",
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "avg" | "average" | "mean" => Ok(Self::Avg),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "count" => Ok(Self::Count),
            "median" => Ok(Self::Median),
            "stddev" | "std_dev" | "stdev" => Ok(Self::StdDev),
            other => Err(Error::InvalidArgument {
                name: "operator".to_string(),
                message: format!("unknown aggregate operator '{other}'"),
            }),
        }
    }
}

/// Declarative grouping: which fields form the key and how to reduce the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    /// Group-by fields, in key order. Accepts a single string on the wire.
    #[serde(
        rename = "groupByFields",
        alias = "groupBy",
        default,
        deserialize_with = "one_or_many"
    )]
    pub group_by: Vec<String>,
    /// Output field -> operator. The output overwrites the field's raw value.
    #[serde(default)]
    pub aggregations: IndexMap<String, AggregateOp>,
}

impl AggregationSpec {
    /// Creates a spec grouping by `fields` with no aggregations yet.
    #[must_use]
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_by: fields.into_iter().map(Into::into).collect(),
            aggregations: IndexMap::new(),
        }
    }

    /// Adds (or replaces) the operator for a field.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, op: AggregateOp) -> Self {
        self.aggregations.insert(field.into(), op);
        self
    }

    /// Strict validation for callers that want to reject malformed specs
    /// up front. [`aggregate`] itself accepts any spec.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.group_by.len());
        for field in &self.group_by {
            if field.trim().is_empty() {
                return Err(Error::InvalidSpec("group-by field name is empty".into()));
            }
            if !seen.insert(field.as_str()) {
                return Err(Error::InvalidSpec(format!(
                    "duplicate group-by field '{field}'"
                )));
            }
        }
        if self.aggregations.keys().any(|f| f.trim().is_empty()) {
            return Err(Error::InvalidSpec("aggregation field name is empty".into()));
        }
        Ok(())
    }

    /// Group-by values of `record`, in declared order.
    pub(crate) fn key_values(&self, record: &Record) -> Vec<String> {
        self.group_by.iter().map(|f| record.key_string(f)).collect()
    }

    /// Starts an output row holding the group-by values as text.
    pub(crate) fn row_prefix(&self, key_values: &[String]) -> Record {
        let mut row = Record::with_capacity(self.group_by.len() + self.aggregations.len());
        for (field, value) in self.group_by.iter().zip(key_values) {
            row.insert(field.clone(), Value::Text(value.clone()));
        }
        row
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(field) => vec![field],
        OneOrMany::Many(fields) => fields,
    })
}

/// Builds the composite group key.
#[must_use]
pub fn group_key(values: &[String]) -> String {
    values.join(GROUP_KEY_SEPARATOR)
}

struct Group<'a> {
    key_values: Vec<String>,
    members: Vec<&'a Record>,
}

/// Groups `records` and reduces each configured field per group.
///
/// Values that do not coerce to a finite number are left out of a field's
/// reduction; empty reductions yield 0. Row order is first-seen key order,
/// which is deterministic but carries no other meaning.
#[must_use]
pub fn aggregate(records: &[Record], spec: &AggregationSpec) -> Vec<Record> {
    let mut groups: IndexMap<String, Group<'_>> = IndexMap::new();

    for record in records {
        let key_values = spec.key_values(record);
        groups
            .entry(group_key(&key_values))
            .or_insert_with(|| Group {
                key_values,
                members: Vec::new(),
            })
            .members
            .push(record);
    }

    tracing::debug!(
        records = records.len(),
        groups = groups.len(),
        "grouped records for aggregation"
    );

    groups
        .into_values()
        .map(|group| {
            let mut row = spec.row_prefix(&group.key_values);
            for (field, op) in &spec.aggregations {
                let values: Vec<f64> = group
                    .members
                    .iter()
                    .filter_map(|r| r.number(field))
                    .collect();
                row.insert(field.clone(), Value::Number(op.apply(&values, group.members.len())));
            }
            row
        })
        .collect()
}
