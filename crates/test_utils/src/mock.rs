//! Scriptable Connection Backend
//!
//! `MockBackend` is a [`ConnectionFactory`] whose connections answer from a
//! shared script instead of a real store. Tests queue result rows, inject
//! failures and inspect every statement that was run. Placeholder binding
//! goes through the same code path the SQLite connection uses, so a missing
//! parameter fails here exactly as it would against a database.

use std::collections::VecDeque;
use std::sync::Arc;

use core_kernel::{DiagnosticsSink, MemorySink, Record};
use infra_db::adapters::{self, PartyStore, PaymentStore};
use infra_db::statement::bind_parameters;
use infra_db::{Connection, ConnectionFactory, ConnectionPool, DatabaseError, PoolConfig};
use parking_lot::Mutex;

/// A statement as seen by a mock connection
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub connection_id: usize,
    pub sql: String,
    pub params: Record,
}

#[derive(Default)]
struct MockState {
    query_results: VecDeque<Vec<Record>>,
    failures: VecDeque<DatabaseError>,
    unreachable: bool,
    statements: Vec<RecordedStatement>,
    connections_opened: usize,
}

/// Shared script for every connection the backend opens
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the rows the next query returns
    ///
    /// Queries with nothing queued return no rows.
    pub fn queue_rows(&self, rows: Vec<Record>) -> &Self {
        self.state.lock().query_results.push_back(rows);
        self
    }

    /// Makes the next execute or query fail with `error`
    pub fn fail_next(&self, error: DatabaseError) -> &Self {
        self.state.lock().failures.push_back(error);
        self
    }

    /// Makes new connection attempts fail with `ConnectionUnavailable`
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    pub fn connections_opened(&self) -> usize {
        self.state.lock().connections_opened
    }

    /// Every statement run so far, in order
    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.state.lock().statements.clone()
    }

    pub fn last_statement(&self) -> Option<RecordedStatement> {
        self.state.lock().statements.last().cloned()
    }
}

impl ConnectionFactory for MockBackend {
    fn connect(&self) -> Result<Box<dyn Connection>, DatabaseError> {
        let mut state = self.state.lock();
        if state.unreachable {
            return Err(DatabaseError::ConnectionUnavailable(
                "mock backend unreachable".to_string(),
            ));
        }
        state.connections_opened += 1;
        Ok(Box::new(MockConnection {
            id: state.connections_opened,
            state: Arc::clone(&self.state),
            last_error: None,
        }))
    }

    fn describe(&self) -> String {
        "mock backend".to_string()
    }
}

/// Connection answering from a [`MockBackend`] script
pub struct MockConnection {
    id: usize,
    state: Arc<Mutex<MockState>>,
    last_error: Option<DatabaseError>,
}

impl MockConnection {
    fn run(&mut self, sql: &str, params: &Record) -> Result<(), DatabaseError> {
        let result = bind_parameters(sql, params).map(|_| ()).and_then(|()| {
            let mut state = self.state.lock();
            state.statements.push(RecordedStatement {
                connection_id: self.id,
                sql: sql.to_string(),
                params: params.clone(),
            });
            match state.failures.pop_front() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        });
        if let Err(e) = &result {
            self.last_error = Some(e.clone());
        }
        result
    }
}

impl Connection for MockConnection {
    fn execute(&mut self, statement: &str, params: &Record) -> Result<u64, DatabaseError> {
        self.run(statement, params)?;
        Ok(1)
    }

    fn query(&mut self, statement: &str, params: &Record) -> Result<Vec<Record>, DatabaseError> {
        self.run(statement, params)?;
        Ok(self.state.lock().query_results.pop_front().unwrap_or_default())
    }

    fn last_error(&self) -> Option<&DatabaseError> {
        self.last_error.as_ref()
    }
}

/// A pool over a [`MockBackend`] with a recording sink
pub struct MockDatabase {
    pub backend: MockBackend,
    pub pool: Arc<ConnectionPool>,
    pub sink: Arc<MemorySink>,
}

impl MockDatabase {
    /// Creates a single-connection pool with a short acquire timeout
    pub fn new() -> Self {
        Self::with_config(quick_pool_config(1))
    }

    pub fn with_config(config: PoolConfig) -> Self {
        let backend = MockBackend::new();
        let sink = Arc::new(MemorySink::new());
        let pool = ConnectionPool::new(config, backend.clone(), sink.clone())
            .unwrap_or_else(|e| panic!("mock pool failed to start: {e}"));
        Self {
            backend,
            pool: Arc::new(pool),
            sink,
        }
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
}

impl Default for MockDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool configuration for tests: no eager connections, 100ms acquire timeout
pub fn quick_pool_config(max_connections: u32) -> PoolConfig {
    PoolConfig::new()
        .max_connections(max_connections)
        .min_connections(0)
        .acquire_timeout(std::time::Duration::from_millis(100))
}
