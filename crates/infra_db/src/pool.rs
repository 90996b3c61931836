//! Database connection pool management
//!
//! This module provides a bounded, thread-safe pool of [`Connection`]s. The
//! pool's available/checked-out partition is guarded by a single mutex; a
//! condition variable wakes waiters when a connection comes back.
//!
//! Waiters are served strictly in arrival order: each `acquire` call takes a
//! ticket and may only claim a connection once its ticket is at the head of
//! the queue. Any waiter is therefore unblocked after a bounded number of
//! releases.

use std::collections::{HashSet, VecDeque};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use core_kernel::{Diagnostic, DiagnosticsSink};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::connection::{Connection, ConnectionFactory};
use crate::error::DatabaseError;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Configuration options for the connection pool
///
/// # Example
///
/// ```rust
/// use infra_db::PoolConfig;
/// use std::time::Duration;
///
/// let config = PoolConfig::new()
///     .max_connections(20)
///     .min_connections(5)
///     .acquire_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool (its capacity)
    pub max_connections: u32,
    /// Number of connections opened eagerly at construction
    pub min_connections: u32,
    /// How long `acquire` waits for a connection before failing, in milliseconds
    pub acquire_timeout_ms: u64,
}

impl PoolConfig {
    /// Creates a pool configuration with sensible defaults
    pub fn new() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout_ms: 30_000,
        }
    }

    /// Sets the maximum number of connections in the pool
    ///
    /// # Arguments
    ///
    /// * `max` - Maximum connection count (default: 10)
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the number of connections opened at construction
    ///
    /// # Arguments
    ///
    /// * `min` - Eager connection count (default: 2)
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets how long `acquire` waits before failing with `PoolExhausted`
    ///
    /// # Arguments
    ///
    /// * `timeout` - Duration to wait for a connection (default: 30s)
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn acquire_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    fn validate(&self) -> Result<(), DatabaseError> {
        if self.max_connections == 0 {
            return Err(DatabaseError::ConnectionUnavailable(
                "pool capacity must be at least one".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(DatabaseError::ConnectionUnavailable(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the pool's partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub capacity: usize,
    /// Connections in existence, including ones being opened
    pub total: usize,
    pub idle: usize,
    pub checked_out: usize,
    pub waiting: usize,
    pub closed: bool,
}

/// Result of a pool health check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolHealth {
    pub healthy: bool,
    pub latency_ms: u64,
    pub message: Option<String>,
    pub status: PoolStatus,
    pub checked_at: DateTime<Utc>,
}

struct IdleConnection {
    id: u64,
    conn: Box<dyn Connection>,
}

struct PoolState {
    capacity: usize,
    idle: Vec<IdleConnection>,
    checked_out: HashSet<u64>,
    /// idle + checked out + connections currently being opened
    total: usize,
    next_connection_id: u64,
    next_ticket: u64,
    waiters: VecDeque<u64>,
    closed: bool,
}

impl PoolState {
    fn leave_queue(&mut self, ticket: u64) {
        self.waiters.retain(|t| *t != ticket);
    }
}

/// Bounded pool of reusable connections
///
/// # Example
///
/// ```rust,ignore
/// use infra_db::{ConnectionPool, PoolConfig, SqliteConnectionFactory};
/// use core_kernel::TracingSink;
/// use std::sync::Arc;
///
/// let pool = ConnectionPool::new(
///     PoolConfig::new().max_connections(4),
///     SqliteConnectionFactory::file("records.db"),
///     Arc::new(TracingSink),
/// )?;
/// let mut conn = pool.acquire()?;
/// conn.execute("DELETE FROM payments WHERE id = :id", &params)?;
/// // returned to the pool when `conn` is dropped
/// ```
pub struct ConnectionPool {
    pool_id: u64,
    config: PoolConfig,
    factory: Box<dyn ConnectionFactory>,
    state: Mutex<PoolState>,
    available: Condvar,
    sink: Arc<dyn DiagnosticsSink>,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("pool_id", &self.pool_id)
            .field("config", &self.config)
            .field("status", &self.status())
            .finish()
    }
}

impl ConnectionPool {
    /// Creates a pool and opens `min_connections` connections eagerly
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ConnectionUnavailable` if the configuration is
    /// invalid or an eager connection cannot be opened.
    pub fn new(
        config: PoolConfig,
        factory: impl ConnectionFactory + 'static,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Result<Self, DatabaseError> {
        info!(
            "Creating connection pool with max_connections={}, min_connections={}, target={}",
            config.max_connections,
            config.min_connections,
            factory.describe()
        );

        let pool = Self {
            pool_id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            state: Mutex::new(PoolState {
                capacity: config.max_connections as usize,
                idle: Vec::with_capacity(config.max_connections as usize),
                checked_out: HashSet::new(),
                total: 0,
                next_connection_id: 1,
                next_ticket: 0,
                waiters: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
            factory: Box::new(factory),
            config,
            sink,
        };

        if let Err(e) = pool.config.validate() {
            return Err(pool.fail(e));
        }

        for _ in 0..pool.config.min_connections {
            let conn = pool.factory.connect().map_err(|e| pool.fail(e))?;
            let mut state = pool.state.lock();
            let id = state.next_connection_id;
            state.next_connection_id += 1;
            state.total += 1;
            state.idle.push(IdleConnection { id, conn });
        }

        info!("Connection pool created successfully");
        Ok(pool)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The sink this pool reports to
    pub fn sink(&self) -> &Arc<dyn DiagnosticsSink> {
        &self.sink
    }

    /// Checks out a connection, waiting up to the acquire timeout
    ///
    /// The connection is exclusively owned by the returned guard and goes
    /// back to the pool when the guard is dropped or passed to [`release`].
    ///
    /// # Errors
    ///
    /// - `PoolExhausted` if no connection became available in time
    /// - `ConnectionUnavailable` if the pool is closed or a new connection
    ///   could not be opened
    ///
    /// [`release`]: ConnectionPool::release
    pub fn acquire(&self) -> Result<PooledConnection<'_>, DatabaseError> {
        let started = Instant::now();
        let deadline = started + self.config.acquire_timeout_duration();

        let mut state = self.state.lock();
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.waiters.push_back(ticket);

        loop {
            if state.closed {
                state.leave_queue(ticket);
                self.available.notify_all();
                drop(state);
                return Err(self.fail(DatabaseError::ConnectionUnavailable(
                    "pool is closed".to_string(),
                )));
            }

            if state.waiters.front() == Some(&ticket) {
                if let Some(IdleConnection { id, conn }) = state.idle.pop() {
                    state.waiters.pop_front();
                    state.checked_out.insert(id);
                    // the next waiter may be able to proceed as well
                    self.available.notify_all();
                    debug!(connection_id = id, "Checked out idle connection");
                    return Ok(PooledConnection::new(self, id, conn));
                }

                if state.total < state.capacity {
                    state.waiters.pop_front();
                    state.total += 1;
                    let id = state.next_connection_id;
                    state.next_connection_id += 1;
                    self.available.notify_all();
                    drop(state);
                    return self.open_new(id);
                }
            }

            if Instant::now() >= deadline {
                state.leave_queue(ticket);
                self.available.notify_all();
                drop(state);
                let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                warn!(waited_ms, "Connection pool exhausted");
                return Err(self.fail(DatabaseError::PoolExhausted { waited_ms }));
            }

            self.available.wait_until(&mut state, deadline);
        }
    }

    /// Opens a connection for a slot already reserved in `total`
    fn open_new(&self, id: u64) -> Result<PooledConnection<'_>, DatabaseError> {
        match self.factory.connect() {
            Ok(conn) => {
                self.state.lock().checked_out.insert(id);
                info!(connection_id = id, "Opened new pooled connection");
                Ok(PooledConnection::new(self, id, conn))
            }
            Err(e) => {
                let mut state = self.state.lock();
                state.total -= 1;
                self.available.notify_all();
                drop(state);
                Err(self.fail(e))
            }
        }
    }

    /// Returns a connection to the pool
    ///
    /// Dropping the guard does the same; this form surfaces a rejected
    /// return to the caller.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotCheckedOut` if the connection was checked
    /// out from a different pool. That connection still goes back to the
    /// pool it came from.
    pub fn release(&self, mut conn: PooledConnection<'_>) -> Result<(), DatabaseError> {
        if conn.pool_id != self.pool_id {
            return Err(self.fail(DatabaseError::NotCheckedOut(conn.id)));
        }
        match conn.conn.take() {
            Some(inner) => self.check_in(conn.id, inner),
            None => Err(self.fail(DatabaseError::NotCheckedOut(conn.id))),
        }
    }

    fn check_in(&self, id: u64, conn: Box<dyn Connection>) -> Result<(), DatabaseError> {
        let mut state = self.state.lock();
        if !state.checked_out.remove(&id) {
            drop(state);
            return Err(self.fail(DatabaseError::NotCheckedOut(id)));
        }

        if state.closed || state.total > state.capacity {
            // surplus after close or shrink: destroy instead of returning
            state.total -= 1;
            debug!(connection_id = id, "Destroyed returned connection");
        } else {
            state.idle.push(IdleConnection { id, conn });
        }
        self.available.notify_all();
        Ok(())
    }

    /// Changes the pool capacity
    ///
    /// Growing takes effect immediately. Shrinking closes surplus idle
    /// connections now and destroys checked-out ones as they are returned.
    pub fn set_capacity(&self, capacity: usize) -> Result<(), DatabaseError> {
        if capacity == 0 {
            return Err(DatabaseError::ConnectionUnavailable(
                "pool capacity must be at least one".to_string(),
            ));
        }
        let mut state = self.state.lock();
        state.capacity = capacity;
        while state.total > state.capacity && !state.idle.is_empty() {
            state.idle.pop();
            state.total -= 1;
        }
        info!(capacity, total = state.total, "Resized connection pool");
        self.available.notify_all();
        Ok(())
    }

    /// Closes the pool
    ///
    /// Idle connections are destroyed now, checked-out ones when returned;
    /// waiters and later `acquire` calls fail with `ConnectionUnavailable`.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        let destroyed = state.idle.len();
        state.idle.clear();
        state.total -= destroyed;
        self.available.notify_all();
        info!(destroyed, still_checked_out = state.checked_out.len(), "Connection pool closed");
    }

    pub fn status(&self) -> PoolStatus {
        let state = self.state.lock();
        PoolStatus {
            capacity: state.capacity,
            total: state.total,
            idle: state.idle.len(),
            checked_out: state.checked_out.len(),
            waiting: state.waiters.len(),
            closed: state.closed,
        }
    }

    /// Checks out a connection and pings it
    pub fn health_check(&self) -> PoolHealth {
        let start = Instant::now();
        let result = self.acquire().and_then(|mut conn| conn.ping());
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        PoolHealth {
            healthy: result.is_ok(),
            latency_ms,
            message: result.err().map(|e| e.to_string()),
            status: self.status(),
            checked_at: Utc::now(),
        }
    }

    /// Reports an error to the sink and hands it back
    fn fail(&self, error: DatabaseError) -> DatabaseError {
        self.sink
            .report(Diagnostic::new(error.category(), error.to_string()));
        error
    }
}

/// A connection checked out from a [`ConnectionPool`]
///
/// Dereferences to the underlying [`Connection`] and returns it to the pool
/// exactly once, when dropped or released.
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    pool_id: u64,
    id: u64,
    conn: Option<Box<dyn Connection>>,
}

impl<'a> PooledConnection<'a> {
    fn new(pool: &'a ConnectionPool, id: u64, conn: Box<dyn Connection>) -> Self {
        Self {
            pool,
            pool_id: pool.pool_id,
            id,
            conn: Some(conn),
        }
    }

    /// Pool-unique identifier of the underlying connection
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Debug for PooledConnection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("pool_id", &self.pool_id)
            .field("id", &self.id)
            .finish()
    }
}

impl Deref for PooledConnection<'_> {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        // `conn` is only taken by `release`, which consumes the guard
        self.conn.as_deref().expect("pooled connection already returned")
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_deref_mut().expect("pooled connection already returned")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            // a rejected check-in has already been reported to the sink
            let _ = self.pool.check_in(self.id, conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = PoolConfig::new()
            .max_connections(50)
            .min_connections(10)
            .acquire_timeout(Duration::from_secs(60));

        assert_eq!(config.max_connections, 50);
        assert_eq!(config.min_connections, 10);
        assert_eq!(config.acquire_timeout_duration(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_validation() {
        assert!(PoolConfig::new().max_connections(0).validate().is_err());
        assert!(PoolConfig::new().max_connections(2).min_connections(3).validate().is_err());
        assert!(PoolConfig::new().validate().is_ok());
    }
}
