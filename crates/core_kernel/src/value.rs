//! Dynamically-typed column values
//!
//! `Value` is the tagged union every column travels as between an entity codec
//! and the backing store. Codecs pattern-match on the discriminant instead of
//! casting; the accessors below encode the few lossless widenings the store
//! needs (integer columns read back as floats, booleans stored as 0/1,
//! timestamps stored as formatted text).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// The single datetime format used for every persisted timestamp (UTC, millisecond precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Parse format accepting any fractional precision
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL as read back from storage. Codecs never write it.
    Null,
    /// UTF-8 text
    Text(String),
    /// 64-bit signed integer (also used for enumeration ordinals)
    Integer(i64),
    /// 64-bit float
    Float(f64),
    /// Boolean, persisted as 0/1
    Boolean(bool),
    /// UTC timestamp, persisted as text in [`TIMESTAMP_FORMAT`]
    Timestamp(DateTime<Utc>),
    /// Opaque serialized blob, e.g. a nested map encoded as JSON text
    Blob(String),
}

impl Value {
    /// Name of the discriminant, used in decode diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Timestamp(_) => "timestamp",
            Value::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text of a `Text` or `Blob` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Blob(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns a float; integers widen since the store may hand back `100` for `100.0`
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns a boolean; the store hands booleans back as 0/1 integers
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(0) => Some(false),
            Value::Integer(1) => Some(true),
            _ => None,
        }
    }

    /// Returns a timestamp, parsing text written in the persisted format
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            Value::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }

    /// Returns a decimal parsed from its exact text form
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Text(s) => s.parse().ok(),
            Value::Integer(n) => Some(Decimal::from(*n)),
            _ => None,
        }
    }

    /// Encodes a string map for a `<field>_json` column
    ///
    /// An empty map encodes as an empty string rather than a null marker.
    pub fn json_map(map: &BTreeMap<String, String>) -> Self {
        if map.is_empty() {
            return Value::Blob(String::new());
        }
        let object: serde_json::Map<String, serde_json::Value> = map
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        Value::Blob(serde_json::Value::Object(object).to_string())
    }
}

/// Formats a timestamp in the persisted format
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a timestamp written in the persisted format
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_PARSE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Text(s) | Value::Blob(s) => write!(f, "{}", s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(ts) => write!(f, "{}", format_timestamp(ts)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(s) | Value::Blob(s) => serializer.serialize_str(s),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Timestamp(ts) => serializer.serialize_str(&format_timestamp(ts)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

/// Decimals persist as their exact text form
impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Text(d.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_text_round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(250);
        let text = format_timestamp(&ts);
        assert_eq!(text, "2024-03-01 12:30:45.250");
        assert_eq!(Value::Text(text).as_timestamp(), Some(ts));
    }

    #[test]
    fn test_bool_from_stored_integer() {
        assert_eq!(Value::Integer(1).as_bool(), Some(true));
        assert_eq!(Value::Integer(0).as_bool(), Some(false));
        assert_eq!(Value::Integer(2).as_bool(), None);
    }

    #[test]
    fn test_empty_map_encodes_as_empty_string() {
        assert_eq!(Value::json_map(&BTreeMap::new()), Value::Blob(String::new()));
    }

    #[test]
    fn test_decimal_is_exact_text() {
        let d: Decimal = "150.10".parse().unwrap();
        assert_eq!(Value::from(d), Value::Text("150.10".to_string()));
        assert_eq!(Value::from(d).as_decimal(), Some(d));
    }
}
