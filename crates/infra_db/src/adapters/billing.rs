//! Payment store

use std::sync::Arc;

use core_kernel::DiagnosticsSink;
use domain_billing::{PaymentCodec, PAYMENTS_TABLE};

use crate::pool::ConnectionPool;
use crate::store::GenericRecordStore;

/// Record store for the `payments` table
pub type PaymentStore = GenericRecordStore<PaymentCodec>;

/// Creates the payment store
pub fn payment_store(pool: Arc<ConnectionPool>, sink: Arc<dyn DiagnosticsSink>) -> PaymentStore {
    GenericRecordStore::new(PAYMENTS_TABLE, pool, PaymentCodec, sink)
}
