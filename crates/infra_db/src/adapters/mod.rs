//! Entity store adapters
//!
//! This module binds each domain's codec to its table, giving the
//! application one ready-made store type per entity.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::payment_store;
//!
//! let payments = payment_store(pool.clone(), sink.clone());
//! let payment = payments.get_by_id("A1")?;
//! ```

pub mod billing;
pub mod party;

pub use billing::{payment_store, PaymentStore};
pub use party::{party_store, PartyStore};

use core_kernel::{Diagnostic, Record};
use tracing::info;

use crate::error::DatabaseError;
use crate::pool::ConnectionPool;

/// `CREATE TABLE IF NOT EXISTS` statements for every entity table
pub const SCHEMAS: &[(&str, &str)] = &[
    (domain_billing::PAYMENTS_TABLE, domain_billing::PAYMENTS_SCHEMA),
    (domain_party::PARTIES_TABLE, domain_party::PARTIES_SCHEMA),
];

/// Creates any missing entity tables
///
/// Idempotent; existing tables are left untouched. Statement failures are
/// reported to the pool's sink as well as returned; acquire failures are
/// reported by the pool itself.
pub fn bootstrap_schema(pool: &ConnectionPool) -> Result<(), DatabaseError> {
    let mut conn = pool.acquire()?;
    for (table, schema) in SCHEMAS {
        if let Err(e) = conn.execute(schema, &Record::new()) {
            pool.sink()
                .report(Diagnostic::new(e.category(), format!("{}: {}", table, e)));
            return Err(e);
        }
        info!(table, "Ensured table exists");
    }
    Ok(())
}
