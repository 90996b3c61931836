//! Database Test Utilities
//!
//! Provides SQLite test databases that live in a temporary directory and
//! disappear with the [`TestDatabase`] value.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use core_kernel::{DiagnosticsSink, MemorySink, Record};
use infra_db::adapters::{self, PartyStore, PaymentStore};
use infra_db::{ConnectionPool, PoolConfig, SqliteConnectionFactory};
use tempfile::TempDir;

use crate::mock::quick_pool_config;

/// A file-backed SQLite database with the entity schema applied
pub struct TestDatabase {
    _dir: TempDir,
    pub path: PathBuf,
    pub pool: Arc<ConnectionPool>,
    pub sink: Arc<MemorySink>,
}

impl TestDatabase {
    /// Creates a fresh database behind a four-connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory or the schema cannot be
    /// created
    pub fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::with_config(
            quick_pool_config(4)
                .min_connections(1)
                .acquire_timeout(Duration::from_secs(5)),
        )
    }

    pub fn with_config(
        config: PoolConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("records.db");
        let sink = Arc::new(MemorySink::new());

        let pool = ConnectionPool::new(config, SqliteConnectionFactory::file(path.clone()), sink.clone())?;
        adapters::bootstrap_schema(&pool)?;
        // schema bootstrap is not part of what tests observe
        sink.clear();

        Ok(Self {
            _dir: dir,
            path,
            pool: Arc::new(pool),
            sink,
        })
    }

    pub fn sink(&self) -> Arc<dyn DiagnosticsSink> {
        self.sink.clone()
    }

    pub fn payments(&self) -> PaymentStore {
        adapters::payment_store(Arc::clone(&self.pool), self.sink())
    }

    pub fn parties(&self) -> PartyStore {
        adapters::party_store(Arc::clone(&self.pool), self.sink())
    }

    /// Runs a raw statement, for planting rows the codecs would never write
    ///
    /// # Panics
    ///
    /// Panics if the statement fails
    pub fn execute_raw(&self, sql: &str, params: &Record) -> u64 {
        let mut conn = self
            .pool
            .acquire()
            .unwrap_or_else(|e| panic!("acquire failed: {e}"));
        conn.execute(sql, params)
            .unwrap_or_else(|e| panic!("raw statement failed: {e}"))
    }

    /// Deletes every row from every entity table
    pub fn clean(&self) {
        for (table, _) in adapters::SCHEMAS {
            self.execute_raw(&format!("DELETE FROM {table}"), &Record::new());
        }
    }
}
