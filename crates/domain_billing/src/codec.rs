//! Persistence codec for payments

use core_kernel::{DecodeError, EntityBase, Ordinal, Record, RecordCodec, RowReader, Value};

use crate::payment::Payment;

/// Table holding payments
pub const PAYMENTS_TABLE: &str = "payments";

/// Schema bootstrap for the payments table
pub const PAYMENTS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS payments (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    status INTEGER NOT NULL,
    amount TEXT NOT NULL,
    currency TEXT NOT NULL,
    method INTEGER NOT NULL,
    reference TEXT,
    exchange_rate REAL,
    settled_at TEXT,
    metadata_json TEXT NOT NULL DEFAULT ''
)";

/// Column names of the payments table beyond the base attributes
pub mod columns {
    pub const AMOUNT: &str = "amount";
    pub const CURRENCY: &str = "currency";
    pub const METHOD: &str = "method";
    pub const REFERENCE: &str = "reference";
    pub const EXCHANGE_RATE: &str = "exchange_rate";
    pub const SETTLED_AT: &str = "settled_at";
    pub const METADATA_JSON: &str = "metadata_json";
}

/// Converts [`Payment`]s to and from records
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentCodec;

impl RecordCodec for PaymentCodec {
    type Entity = Payment;

    fn encode(&self, payment: &Payment) -> Record {
        let mut record = Record::new();
        payment.base.encode_into(&mut record);
        record.insert(columns::AMOUNT, payment.amount);
        record.insert(columns::CURRENCY, payment.currency.as_str());
        record.insert(columns::METHOD, payment.method.to_value());
        record.insert_opt(columns::REFERENCE, payment.reference.as_deref());
        record.insert_opt(columns::EXCHANGE_RATE, payment.exchange_rate);
        record.insert_opt(columns::SETTLED_AT, payment.settled_at);
        record.insert(columns::METADATA_JSON, Value::json_map(&payment.metadata));
        record
    }

    fn decode(&self, row: &mut RowReader<'_>) -> Result<Payment, DecodeError> {
        Ok(Payment {
            base: EntityBase::decode(row)?,
            amount: row.required(columns::AMOUNT)?,
            currency: row.required(columns::CURRENCY)?,
            method: row.ordinal(columns::METHOD)?,
            reference: row.optional(columns::REFERENCE)?,
            exchange_rate: row.optional(columns::EXCHANGE_RATE)?,
            settled_at: row.optional(columns::SETTLED_AT)?,
            metadata: row.json_map(columns::METADATA_JSON)?,
        })
    }
}
