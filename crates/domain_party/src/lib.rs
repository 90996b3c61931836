//! Party Domain - Customers and organizations
//!
//! This crate defines the party entity and the codec that maps it onto the
//! `parties` table. `kind` and `status` are stored as ordinals, `verified` as
//! 0/1, and `attributes` as JSON text in `attributes_json`.

pub mod party;
pub mod codec;

pub use party::{Party, PartyKind};
pub use codec::{PartyCodec, PARTIES_SCHEMA, PARTIES_TABLE};
