//! Typed cell values

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number};

use crate::inference::{ScalarKind, parse_boolean, parse_date, parse_time, parse_timestamp};

/// A single extracted cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    String(String),
    List(Vec<Value>),
    /// Named fields in schema order
    Struct(Vec<(String, Value)>),
    /// Attribute name to value, in declaration order
    Map(Vec<(String, String)>),
    /// Serialized XML
    Document(String),
}

/// One output row, as long as the schema it was extracted with
pub type Row = Vec<Value>;

impl Value {
    /// Convert cleaned text to `kind`
    ///
    /// Empty text is null. Text that does not parse as `kind` is kept as a
    /// string rather than dropped.
    pub fn from_text(text: &str, kind: ScalarKind) -> Value {
        if text.is_empty() {
            return Value::Null;
        }

        let converted = match kind {
            ScalarKind::Boolean => parse_boolean(text).map(Value::Boolean),
            ScalarKind::Integer => text.parse::<i64>().ok().map(Value::Integer),
            ScalarKind::Double => text.parse::<f64>().ok().map(Value::Double),
            ScalarKind::Date => parse_date(text).map(Value::Date),
            ScalarKind::Time => parse_time(text).map(Value::Time),
            ScalarKind::Timestamp => parse_timestamp(text).map(Value::Timestamp),
            ScalarKind::String => None,
        };

        converted.unwrap_or_else(|| Value::String(text.to_string()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Document(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a JSON value; temporal values become ISO 8601 strings
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Double(d) => Number::from_f64(*d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Value::Time(t) => serde_json::Value::String(t.format("%H:%M:%S%.f").to_string()),
            Value::Timestamp(ts) => {
                serde_json::Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            Value::String(s) | Value::Document(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Struct(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::String(s) | Value::Document(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Rows as a JSON array of objects keyed by column name
pub fn rows_to_json(names: &[String], rows: &[Row]) -> serde_json::Value {
    serde_json::Value::Array(
        rows.iter()
            .map(|row| {
                serde_json::Value::Object(
                    names
                        .iter()
                        .zip(row)
                        .map(|(name, value)| (name.clone(), value.to_json()))
                        .collect::<Map<_, _>>(),
                )
            })
            .collect(),
    )
}
