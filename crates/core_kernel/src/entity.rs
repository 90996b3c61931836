//! Base attributes shared by every persisted entity
//!
//! Every entity carries an identifier, creation and update timestamps, and a
//! lifecycle status. The identifier is assigned before the first write and
//! never changes afterwards.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::{DecodeError, RowReader};
use crate::record::Record;
use crate::value::Value;

/// Column names of the base attributes
pub mod columns {
    pub const ID: &str = "id";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const STATUS: &str = "status";
}

/// Enumerations persisted as their integer ordinal
pub trait Ordinal: Sized + Copy {
    fn ordinal(self) -> i64;
    fn from_ordinal(ordinal: i64) -> Option<Self>;

    /// The value written to storage
    fn to_value(self) -> Value {
        Value::Integer(self.ordinal())
    }
}

/// Lifecycle status of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Draft,
    Active,
    Suspended,
    Archived,
}

impl Ordinal for RecordStatus {
    fn ordinal(self) -> i64 {
        match self {
            RecordStatus::Draft => 0,
            RecordStatus::Active => 1,
            RecordStatus::Suspended => 2,
            RecordStatus::Archived => 3,
        }
    }

    fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(RecordStatus::Draft),
            1 => Some(RecordStatus::Active),
            2 => Some(RecordStatus::Suspended),
            3 => Some(RecordStatus::Archived),
            _ => None,
        }
    }
}

/// Truncates a timestamp to the millisecond precision the store keeps
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(ts)
}

/// Current time at stored precision
pub fn now_millis() -> DateTime<Utc> {
    truncate_to_millis(Utc::now())
}

/// Creates a new time-ordered record identifier
pub fn new_record_id() -> String {
    Uuid::now_v7().to_string()
}

/// Identifier, timestamps and status carried by every entity
///
/// Timestamps are kept at millisecond precision; values with finer precision
/// are truncated by the store on write.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityBase {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: RecordStatus,
}

impl EntityBase {
    /// Creates base attributes with a fresh identifier
    pub fn new() -> Self {
        Self::with_id(new_record_id())
    }

    /// Creates base attributes for a caller-assigned identifier
    pub fn with_id(id: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
            status: RecordStatus::Active,
        }
    }

    /// Marks the entity as modified now
    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }

    /// Writes the base columns into `record`
    pub fn encode_into(&self, record: &mut Record) {
        record.insert(columns::ID, self.id.as_str());
        record.insert(columns::CREATED_AT, self.created_at);
        record.insert(columns::UPDATED_AT, self.updated_at);
        record.insert(columns::STATUS, self.status.to_value());
    }

    /// Reads the base columns from a row
    pub fn decode(row: &mut RowReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: row.required(columns::ID)?,
            created_at: row.required(columns::CREATED_AT)?,
            updated_at: row.required(columns::UPDATED_AT)?,
            status: row.ordinal(columns::STATUS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DecodePolicy;
    use chrono::TimeZone;

    #[test]
    fn test_status_ordinals_round_trip() {
        for status in [
            RecordStatus::Draft,
            RecordStatus::Active,
            RecordStatus::Suspended,
            RecordStatus::Archived,
        ] {
            assert_eq!(RecordStatus::from_ordinal(status.ordinal()), Some(status));
        }
        assert_eq!(RecordStatus::from_ordinal(9), None);
    }

    #[test]
    fn test_truncate_to_millis() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + TimeDelta::nanoseconds(1_234_567);
        let truncated = truncate_to_millis(ts);
        assert_eq!(truncated.timestamp_subsec_nanos(), 1_000_000);
    }

    #[test]
    fn test_base_round_trip() {
        let base = EntityBase::with_id("A1");
        let mut record = Record::new();
        base.encode_into(&mut record);
        assert_eq!(record.get(columns::STATUS), Some(&Value::Integer(1)));

        let mut reader = RowReader::new(&record, DecodePolicy::FailFast);
        assert_eq!(EntityBase::decode(&mut reader).unwrap(), base);
    }
}
