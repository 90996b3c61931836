//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! record store test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `database`: SQLite-backed test databases in temporary directories
//! - `mock`: Scriptable in-memory connection backend
//! - `assertions`: Custom assertion helpers for pool and diagnostics state
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod mock;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use mock::*;
pub use assertions::*;
pub use generators::*;
