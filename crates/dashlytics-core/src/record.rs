//! Open-shaped records fed to the analytical engine.
//!
//! A [`Record`] is a flat, insertion-ordered map from field name to scalar
//! [`Value`]. Fields are looked up by name at call time; nested paths are not
//! supported. Coercion helpers are lenient: anything that cannot be read as a
//! number or a date yields `None` and the caller skips it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest integer magnitude an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Naive datetime layouts accepted in addition to RFC 3339. Interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Scalar field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent or explicit null.
    #[default]
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Numeric value. May be non-finite when built programmatically.
    Number(f64),
    /// Free text, including date-like strings.
    Text(String),
    /// Parsed instant.
    DateTime(DateTime<Utc>),
}

impl Value {
    /// Returns true for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Lenient numeric coercion.
    ///
    /// Booleans become 1/0, numeric text is parsed after trimming and
    /// instants become epoch milliseconds. Null, empty text, non-numeric text
    /// and non-finite numbers yield `None`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Self::Null => return None,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
            Self::DateTime(dt) => dt.timestamp_millis() as f64,
        };
        n.is_finite().then_some(n)
    }

    /// Lenient date coercion.
    ///
    /// Numbers are read as epoch milliseconds; text goes through [`parse_date`].
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            Self::Text(s) => parse_date(s),
            Self::Number(n) if n.is_finite() => DateTime::from_timestamp_millis(*n as i64),
            Self::Null | Self::Bool(_) | Self::Number(_) => None,
        }
    }

    /// Text form used when building group keys. Null renders as the empty string.
    #[must_use]
    pub fn to_key_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Formats a number the way a dashboard expects to read it back: integral
/// values without a fractional part.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        // f64 Display never uses exponent notation and drops a zero fraction.
        format!("{n}")
    }
}

/// Parses a date-like string into a UTC instant.
///
/// Accepts RFC 3339 (any offset), naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` (with
/// `T` or a space) and plain `YYYY-MM-DD`. Naive values are taken as UTC.
#[must_use]
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            // Records are flat; nested structures are kept as opaque text.
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Self::Text(other.to_string())
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            // Non-finite numbers have no JSON form; emit null like JSON.stringify.
            Self::Number(n) if !n.is_finite() => serializer.serialize_unit(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::DateTime(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

/// A flat record: field name to scalar value, in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record with room for `capacity` fields.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    /// Builds a record from a JSON object. Returns `None` for non-objects.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        json.as_object().map(|obj| {
            obj.iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect()
        })
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Inserts or overwrites a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field coerced to a number, if possible.
    #[must_use]
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_number)
    }

    /// Returns the field coerced to an instant, if possible.
    #[must_use]
    pub fn datetime(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(Value::as_datetime)
    }

    /// Returns the field's group-key text; missing fields render as "".
    #[must_use]
    pub fn key_string(&self, field: &str) -> String {
        self.get(field).map(Value::to_key_string).unwrap_or_default()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Converts the record into a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
