//! Persistence codec for parties

use core_kernel::{DecodeError, EntityBase, Ordinal, Record, RecordCodec, RowReader, Value};

use crate::party::Party;

/// Table holding parties
pub const PARTIES_TABLE: &str = "parties";

/// Schema bootstrap for the parties table
pub const PARTIES_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS parties (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    status INTEGER NOT NULL,
    display_name TEXT NOT NULL,
    kind INTEGER NOT NULL,
    email TEXT,
    verified INTEGER NOT NULL,
    risk_score REAL NOT NULL,
    attributes_json TEXT NOT NULL DEFAULT ''
)";

pub mod columns {
    pub const DISPLAY_NAME: &str = "display_name";
    pub const KIND: &str = "kind";
    pub const EMAIL: &str = "email";
    pub const VERIFIED: &str = "verified";
    pub const RISK_SCORE: &str = "risk_score";
    pub const ATTRIBUTES_JSON: &str = "attributes_json";
}

/// Converts [`Party`] values to and from records
#[derive(Debug, Clone, Copy, Default)]
pub struct PartyCodec;

impl RecordCodec for PartyCodec {
    type Entity = Party;

    fn encode(&self, party: &Party) -> Record {
        let mut record = Record::new();
        party.base.encode_into(&mut record);
        record.insert(columns::DISPLAY_NAME, party.display_name.as_str());
        record.insert(columns::KIND, party.kind.to_value());
        record.insert_opt(columns::EMAIL, party.email.as_deref());
        record.insert(columns::VERIFIED, party.verified);
        record.insert(columns::RISK_SCORE, party.risk_score);
        record.insert(columns::ATTRIBUTES_JSON, Value::json_map(&party.attributes));
        record
    }

    fn decode(&self, row: &mut RowReader<'_>) -> Result<Party, DecodeError> {
        Ok(Party {
            base: EntityBase::decode(row)?,
            display_name: row.required(columns::DISPLAY_NAME)?,
            kind: row.ordinal(columns::KIND)?,
            email: row.optional(columns::EMAIL)?,
            verified: row.required(columns::VERIFIED)?,
            risk_score: row.required(columns::RISK_SCORE)?,
            attributes: row.json_map(columns::ATTRIBUTES_JSON)?,
        })
    }
}
