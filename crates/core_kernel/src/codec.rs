//! Record codec contract
//!
//! Each entity module supplies a [`RecordCodec`] that turns its entity into a
//! [`Record`] and back. Decoding goes through a [`RowReader`], which applies
//! the store's [`DecodePolicy`]: under `BestEffort` a value of the wrong type
//! leaves that attribute at its default and is remembered as an issue, while
//! a missing required column still fails the row.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::entity::Ordinal;
use crate::record::Record;
use crate::value::Value;

/// Errors raised while decoding a row into an entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A required column is absent from the row or holds NULL
    #[error("Missing column '{column}'")]
    MissingColumn { column: String },

    /// The stored value has a different type than the attribute expects
    #[error("Type mismatch in column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The stored value has the right type but cannot be interpreted
    #[error("Malformed value in column '{column}': {message}")]
    Malformed { column: String, message: String },
}

impl DecodeError {
    pub fn missing(column: impl Into<String>) -> Self {
        DecodeError::MissingColumn {
            column: column.into(),
        }
    }

    pub fn malformed(column: impl Into<String>, message: impl Into<String>) -> Self {
        DecodeError::Malformed {
            column: column.into(),
            message: message.into(),
        }
    }

    /// The column the error refers to
    pub fn column(&self) -> &str {
        match self {
            DecodeError::MissingColumn { column }
            | DecodeError::TypeMismatch { column, .. }
            | DecodeError::Malformed { column, .. } => column,
        }
    }

    /// True for errors about a present value of the wrong shape, as opposed to a missing one
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            DecodeError::TypeMismatch { .. } | DecodeError::Malformed { .. }
        )
    }
}

/// How a store reacts to values that do not match the attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Leave mismatched attributes at their default, report, and keep going
    #[default]
    BestEffort,
    /// Abort the operation on the first decode error
    FailFast,
}

/// Conversion from a stored value into an attribute type
pub trait FromValue: Sized {
    /// Human-readable type name used in mismatch reports
    const EXPECTED: &'static str;

    /// Returns `None` when the value's discriminant does not fit this type
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const EXPECTED: &'static str = "text";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_text().map(str::to_string)
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer()
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer().and_then(|n| i32::try_from(n).ok())
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for DateTime<Utc> {
    const EXPECTED: &'static str = "timestamp";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_timestamp()
    }
}

impl FromValue for Decimal {
    const EXPECTED: &'static str = "decimal";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_decimal()
    }
}

/// Typed, policy-aware view over one result row
///
/// # Example
///
/// ```rust
/// use core_kernel::{DecodePolicy, Record, RowReader};
///
/// let row = Record::new().with("amount", "oops").with("currency", "USD");
/// let mut reader = RowReader::new(&row, DecodePolicy::BestEffort);
///
/// let amount: f64 = reader.required("amount").unwrap();
/// let currency: String = reader.required("currency").unwrap();
///
/// assert_eq!(amount, 0.0);
/// assert_eq!(currency, "USD");
/// assert_eq!(reader.issues().len(), 1);
/// ```
#[derive(Debug)]
pub struct RowReader<'a> {
    record: &'a Record,
    policy: DecodePolicy,
    issues: Vec<DecodeError>,
}

impl<'a> RowReader<'a> {
    pub fn new(record: &'a Record, policy: DecodePolicy) -> Self {
        Self {
            record,
            policy,
            issues: Vec::new(),
        }
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    pub fn record(&self) -> &'a Record {
        self.record
    }

    /// Tolerated type problems seen so far (always empty under `FailFast`)
    pub fn issues(&self) -> &[DecodeError] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<DecodeError> {
        self.issues
    }

    /// Reads a column that must be present
    pub fn required<T: FromValue + Default>(&mut self, column: &str) -> Result<T, DecodeError> {
        let value = self.present(column).ok_or_else(|| DecodeError::missing(column))?;
        match T::from_value(value) {
            Some(v) => Ok(v),
            None => {
                let err = mismatch::<T>(column, value);
                self.tolerate(err)
            }
        }
    }

    /// Reads a column that may be absent; absent and NULL both yield `None`
    pub fn optional<T: FromValue>(&mut self, column: &str) -> Result<Option<T>, DecodeError> {
        let Some(value) = self.present(column) else {
            return Ok(None);
        };
        match T::from_value(value) {
            Some(v) => Ok(Some(v)),
            None => {
                let err = mismatch::<T>(column, value);
                self.tolerate(err)
            }
        }
    }

    /// Reads an enumeration persisted as its integer ordinal
    pub fn ordinal<T: Ordinal + Default>(&mut self, column: &str) -> Result<T, DecodeError> {
        let value = self.present(column).ok_or_else(|| DecodeError::missing(column))?;
        let Some(n) = value.as_integer() else {
            let err = DecodeError::TypeMismatch {
                column: column.to_string(),
                expected: "integer",
                found: value.kind(),
            };
            return self.tolerate(err);
        };
        match T::from_ordinal(n) {
            Some(v) => Ok(v),
            None => self.tolerate(DecodeError::malformed(column, format!("unknown ordinal {}", n))),
        }
    }

    /// Reads a `<field>_json` string map; absent, NULL and empty text all mean an empty map
    pub fn json_map(&mut self, column: &str) -> Result<BTreeMap<String, String>, DecodeError> {
        let Some(value) = self.present(column) else {
            return Ok(BTreeMap::new());
        };
        let Some(text) = value.as_text() else {
            let err = DecodeError::TypeMismatch {
                column: column.to_string(),
                expected: "blob",
                found: value.kind(),
            };
            return self.tolerate(err);
        };
        if text.is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(text) {
            Ok(map) => Ok(map),
            Err(e) => self.tolerate(DecodeError::malformed(column, e.to_string())),
        }
    }

    fn present(&self, column: &str) -> Option<&'a Value> {
        self.record.get(column).filter(|v| !v.is_null())
    }

    fn tolerate<T: Default>(&mut self, err: DecodeError) -> Result<T, DecodeError> {
        match self.policy {
            DecodePolicy::FailFast => Err(err),
            DecodePolicy::BestEffort => {
                self.issues.push(err);
                Ok(T::default())
            }
        }
    }
}

fn mismatch<T: FromValue>(column: &str, found: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        column: column.to_string(),
        expected: T::EXPECTED,
        found: found.kind(),
    }
}

/// Per-entity conversion between a typed entity and a [`Record`]
///
/// `encode` must write every column the table expects, including the
/// inherited base attributes, and omit absent optional attributes rather
/// than writing NULL. `decode` must tolerate missing optional columns.
pub trait RecordCodec: Send + Sync {
    /// The entity type; `Default` is what a row that cannot be decoded turns into
    type Entity: Default + Send;

    /// Column holding the identifier
    fn id_column(&self) -> &str {
        "id"
    }

    fn encode(&self, entity: &Self::Entity) -> Record;

    fn decode(&self, row: &mut RowReader<'_>) -> Result<Self::Entity, DecodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_fails_under_both_policies() {
        let row = Record::new();
        for policy in [DecodePolicy::BestEffort, DecodePolicy::FailFast] {
            let mut reader = RowReader::new(&row, policy);
            let result: Result<String, _> = reader.required("name");
            assert_eq!(result, Err(DecodeError::missing("name")));
        }
    }

    #[test]
    fn test_fail_fast_surfaces_mismatch() {
        let row = Record::new().with("amount", true);
        let mut reader = RowReader::new(&row, DecodePolicy::FailFast);
        let result: Result<f64, _> = reader.required("amount");
        assert!(result.unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_null_optional_is_none() {
        let row = Record::new().with("email", Value::Null);
        let mut reader = RowReader::new(&row, DecodePolicy::FailFast);
        let email: Option<String> = reader.optional("email").unwrap();
        assert_eq!(email, None);
    }

    #[test]
    fn test_malformed_json_map_is_tolerated() {
        let row = Record::new().with("tags_json", Value::Blob("{not json".into()));
        let mut reader = RowReader::new(&row, DecodePolicy::BestEffort);
        assert!(reader.json_map("tags_json").unwrap().is_empty());
        assert_eq!(reader.issues()[0].column(), "tags_json");
    }
}
