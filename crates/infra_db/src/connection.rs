//! Connection abstraction
//!
//! A [`Connection`] is one live handle to the backing store. Statements use
//! named `:placeholders` bound from a [`Record`]; every placeholder must have
//! a matching key or the call fails with `MissingParameter`. A failed call
//! leaves the connection usable and its error retrievable via `last_error`.

use core_kernel::Record;

use crate::error::DatabaseError;

/// One live handle to the backing store
///
/// A connection is used by a single caller at a time; the pool guarantees
/// that exclusivity.
pub trait Connection: Send {
    /// Applies a statement and returns the number of affected rows
    fn execute(&mut self, statement: &str, params: &Record) -> Result<u64, DatabaseError>;

    /// Runs a query and returns one record per result row, in storage order
    fn query(&mut self, statement: &str, params: &Record) -> Result<Vec<Record>, DatabaseError>;

    /// The error from the most recent failed call, if any
    fn last_error(&self) -> Option<&DatabaseError>;

    /// Round-trips a trivial query
    fn ping(&mut self) -> Result<(), DatabaseError> {
        self.query("SELECT 1 AS ok", &Record::new()).map(|_| ())
    }
}

/// Creates new connections for a pool
pub trait ConnectionFactory: Send + Sync {
    /// Opens a new connection, failing with `ConnectionUnavailable` if the store is unreachable
    fn connect(&self) -> Result<Box<dyn Connection>, DatabaseError>;

    /// Short description for logs (never includes credentials)
    fn describe(&self) -> String {
        "connection factory".to_string()
    }
}

impl<F> ConnectionFactory for F
where
    F: Fn() -> Result<Box<dyn Connection>, DatabaseError> + Send + Sync,
{
    fn connect(&self) -> Result<Box<dyn Connection>, DatabaseError> {
        self()
    }
}
