//! Party store

use std::sync::Arc;

use core_kernel::DiagnosticsSink;
use domain_party::{PartyCodec, PARTIES_TABLE};

use crate::pool::ConnectionPool;
use crate::store::GenericRecordStore;

/// Record store for the `parties` table
pub type PartyStore = GenericRecordStore<PartyCodec>;

/// Creates the party store
pub fn party_store(pool: Arc<ConnectionPool>, sink: Arc<dyn DiagnosticsSink>) -> PartyStore {
    GenericRecordStore::new(PARTIES_TABLE, pool, PartyCodec, sink)
}
