//! Generic record store
//!
//! `GenericRecordStore` turns a table name and a [`RecordCodec`] into
//! create/read/update/delete/query/count operations. Each operation checks a
//! connection out of the pool, runs a single parameterized statement and
//! returns the connection on every path.
//!
//! Every error an operation returns is also reported to the diagnostics
//! sink, so failures reach the operational logs even when a caller ignores
//! the result. Pool failures are reported by the pool itself.
//!
//! # Limitations
//!
//! - `update` does not distinguish zero affected rows from one.
//! - `update` only sets the columns the codec writes, so an optional
//!   attribute cleared on the entity keeps its stored value.
//! - No operation spans more than one statement or connection.

use std::sync::Arc;

use core_kernel::{
    DecodePolicy, Diagnostic, DiagnosticsSink, ErrorCategory, Filter, Record, RecordCodec,
    RowReader, Value,
};
use tracing::{debug, instrument};

use crate::connection::Connection;
use crate::error::DatabaseError;
use crate::pool::ConnectionPool;
use crate::statement::{self, COUNT_COLUMN};

/// Record store for one table, parameterized over the entity's codec
///
/// # Example
///
/// ```rust,ignore
/// use infra_db::GenericRecordStore;
/// use domain_billing::{PaymentCodec, PAYMENTS_TABLE};
///
/// let store = GenericRecordStore::new(PAYMENTS_TABLE, pool.clone(), PaymentCodec, sink);
/// store.create(&payment)?;
/// let usd = store.filtered_find(&Filter::new().with("currency", "USD"))?;
/// ```
pub struct GenericRecordStore<C: RecordCodec> {
    table: String,
    pool: Arc<ConnectionPool>,
    codec: C,
    sink: Arc<dyn DiagnosticsSink>,
    policy: DecodePolicy,
}

impl<C: RecordCodec> std::fmt::Debug for GenericRecordStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericRecordStore")
            .field("table", &self.table)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<C: RecordCodec> GenericRecordStore<C> {
    /// Creates a store for `table` using the best-effort decode policy
    ///
    /// # Arguments
    ///
    /// * `table` - Table name, fixed for the lifetime of the store
    /// * `pool` - Pool the store checks connections out of
    /// * `codec` - Entity codec
    /// * `sink` - Where failures are reported
    pub fn new(
        table: impl Into<String>,
        pool: Arc<ConnectionPool>,
        codec: C,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            table: table.into(),
            pool,
            codec,
            sink,
            policy: DecodePolicy::default(),
        }
    }

    /// Sets how rows that do not match the entity's types are handled
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Inserts every encoded column of `entity`
    ///
    /// The identifier is neither assigned nor validated here.
    #[instrument(skip(self, entity), fields(table = %self.table))]
    pub fn create(&self, entity: &C::Entity) -> Result<(), DatabaseError> {
        let record = self.codec.encode(entity);
        let sql = self.reported(statement::insert(&self.table, &record))?;
        let affected = self.with_connection(|conn| conn.execute(&sql, &record))?;
        debug!(affected, "Created record");
        Ok(())
    }

    /// Fetches the entity whose identifier equals `id`
    ///
    /// Returns `Ok(None)` when no row matches. When several rows match, the
    /// first one is decoded; identifier uniqueness is not enforced here.
    #[instrument(skip(self, id), fields(table = %self.table))]
    pub fn get_by_id(&self, id: impl Into<Value>) -> Result<Option<C::Entity>, DatabaseError> {
        let filter = Filter::new().with(self.codec.id_column(), id);
        let sql = self.reported(statement::select(&self.table, &filter))?;
        let rows = self.with_connection(|conn| conn.query(&sql, &filter))?;

        match rows.first() {
            Some(row) => self.decode_row(row).map(Some),
            None => {
                debug!("Record not found");
                Ok(None)
            }
        }
    }

    /// Rewrites every encoded column except the identifier
    ///
    /// Succeeds whether or not a row matched the identifier.
    #[instrument(skip(self, entity), fields(table = %self.table))]
    pub fn update(&self, entity: &C::Entity) -> Result<(), DatabaseError> {
        let record = self.codec.encode(entity);
        let sql = self.reported(statement::update(&self.table, &record, self.codec.id_column()))?;
        let affected = self.with_connection(|conn| conn.execute(&sql, &record))?;
        debug!(affected, "Updated record");
        Ok(())
    }

    /// Deletes the row whose identifier equals `id`
    #[instrument(skip(self, id), fields(table = %self.table))]
    pub fn remove(&self, id: impl Into<Value>) -> Result<(), DatabaseError> {
        let params = Record::new().with(self.codec.id_column(), id);
        let sql = self.reported(statement::delete(&self.table, self.codec.id_column()))?;
        let affected = self.with_connection(|conn| conn.execute(&sql, &params))?;
        debug!(affected, "Removed record");
        Ok(())
    }

    /// Every row of the table, decoded
    pub fn find_all(&self) -> Result<Vec<C::Entity>, DatabaseError> {
        self.filtered_find(&Filter::new())
    }

    /// Rows matching every `column = value` pair of `filter`, decoded
    ///
    /// Filter columns are passed through as given; the store rejects ones
    /// the table does not have. A filter that matches nothing yields an
    /// empty vector.
    #[instrument(skip(self, filter), fields(table = %self.table, predicates = filter.len()))]
    pub fn filtered_find(&self, filter: &Filter) -> Result<Vec<C::Entity>, DatabaseError> {
        let sql = self.reported(statement::select(&self.table, filter))?;
        let rows = self.with_connection(|conn| conn.query(&sql, filter))?;
        debug!(rows = rows.len(), "Fetched records");

        rows.iter().map(|row| self.decode_row(row)).collect()
    }

    /// Number of rows matching `filter`
    #[instrument(skip(self, filter), fields(table = %self.table, predicates = filter.len()))]
    pub fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        let sql = self.reported(statement::count(&self.table, filter))?;
        let rows = self.with_connection(|conn| conn.query(&sql, filter))?;

        let count = rows
            .first()
            .and_then(|row| row.get(COUNT_COLUMN))
            .and_then(Value::as_integer)
            .and_then(|n| u64::try_from(n).ok());
        match count {
            Some(n) => Ok(n),
            None => self.reported(Err(DatabaseError::statement(
                "count query returned no usable count column",
            ))),
        }
    }

    /// Runs `op` on a pooled connection, reporting statement failures
    ///
    /// The connection goes back to the pool when this returns, on success
    /// and failure alike.
    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut dyn Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let mut conn = self.pool.acquire()?;
        let result = op(&mut *conn);
        drop(conn);
        self.reported(result)
    }

    /// Decodes one row under the store's policy
    ///
    /// Under `BestEffort`, tolerated mismatches are reported and a row that
    /// cannot be decoded at all becomes a default entity.
    fn decode_row(&self, row: &Record) -> Result<C::Entity, DatabaseError> {
        let mut reader = RowReader::new(row, self.policy);
        let result = self.codec.decode(&mut reader);

        for issue in reader.issues() {
            self.report(
                ErrorCategory::DecodeTypeMismatch,
                format!("{}: {}", self.table, issue),
            );
        }

        match result {
            Ok(entity) => Ok(entity),
            Err(e) => {
                let err = DatabaseError::Decode(e);
                self.report(err.category(), format!("{}: {}", self.table, err));
                match self.policy {
                    DecodePolicy::BestEffort => Ok(C::Entity::default()),
                    DecodePolicy::FailFast => Err(err),
                }
            }
        }
    }

    fn reported<T>(&self, result: Result<T, DatabaseError>) -> Result<T, DatabaseError> {
        if let Err(e) = &result {
            self.report(e.category(), format!("{}: {}", self.table, e));
        }
        result
    }

    fn report(&self, category: ErrorCategory, message: String) {
        self.sink.report(Diagnostic::new(category, message));
    }
}
