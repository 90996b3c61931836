//! Billing Domain - Payment records
//!
//! This crate defines the payment entity and the codec that maps it onto the
//! `payments` table.
//!
//! # Stored representation
//!
//! - `amount` is stored as exact decimal text
//! - `method` and `status` are stored as integer ordinals
//! - `metadata` is stored as JSON text in `metadata_json` (empty map → `""`)
//! - timestamps are stored at millisecond precision
//!
//! # Example
//!
//! ```rust
//! use core_kernel::{DecodePolicy, RecordCodec, RowReader};
//! use domain_billing::{Payment, PaymentCodec};
//! use rust_decimal::Decimal;
//!
//! let payment = Payment::new("A1", Decimal::new(10000, 2), "USD");
//! let record = PaymentCodec.encode(&payment);
//!
//! let mut reader = RowReader::new(&record, DecodePolicy::FailFast);
//! assert_eq!(PaymentCodec.decode(&mut reader).unwrap(), payment);
//! ```

pub mod payment;
pub mod codec;

pub use payment::{Payment, PaymentMethod};
pub use codec::{PaymentCodec, PAYMENTS_SCHEMA, PAYMENTS_TABLE};
