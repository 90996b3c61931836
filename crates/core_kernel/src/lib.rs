//! Core Kernel - Foundational types for the persistence layer
//!
//! This crate provides the building blocks shared by the record store and
//! every entity module:
//! - `Value` and `Record`, the dynamically-typed row interchange format
//! - The `RecordCodec` contract and the policy-aware `RowReader`
//! - Base entity attributes and ordinal-encoded enumerations
//! - The injectable diagnostics sink

pub mod value;
pub mod record;
pub mod codec;
pub mod entity;
pub mod diagnostics;

pub use value::{Value, TIMESTAMP_FORMAT, format_timestamp, parse_timestamp};
pub use record::{Record, Filter};
pub use codec::{RecordCodec, RowReader, DecodeError, DecodePolicy, FromValue};
pub use entity::{EntityBase, RecordStatus, Ordinal, new_record_id, now_millis, truncate_to_millis};
pub use diagnostics::{Diagnostic, DiagnosticsSink, ErrorCategory, MemorySink, TracingSink};
