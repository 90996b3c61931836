//! Infrastructure Database Layer
//!
//! This crate provides the shared persistence engine every entity module
//! sits on: a bounded connection pool and a generic record store that turns
//! an entity codec into parameterized create/read/update/delete/query/count
//! operations.
//!
//! # Architecture
//!
//! ```text
//! entity ──encode──▶ Record ──▶ GenericRecordStore builds statement
//!                                      │
//!                         pool.acquire() ──▶ Connection executes
//!                                      │
//! entity ◀──decode── Record rows ◀─────┘
//! ```
//!
//! Statements refer to values through named `:column` placeholders; values
//! are never interpolated into SQL.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{ConnectionPool, PoolConfig, SqliteConnectionFactory, adapters};
//! use core_kernel::TracingSink;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(TracingSink);
//! let pool = Arc::new(ConnectionPool::new(
//!     PoolConfig::default(),
//!     SqliteConnectionFactory::file("records.db"),
//!     sink.clone(),
//! )?);
//! let payments = adapters::payment_store(pool, sink);
//! ```

pub mod pool;
pub mod error;
pub mod connection;
pub mod statement;
pub mod sqlite;
pub mod store;
pub mod adapters;

pub use pool::{ConnectionPool, PoolConfig, PoolHealth, PoolStatus, PooledConnection};
pub use error::DatabaseError;
pub use connection::{Connection, ConnectionFactory};
pub use sqlite::{SqliteConnection, SqliteConnectionFactory};
pub use store::GenericRecordStore;
