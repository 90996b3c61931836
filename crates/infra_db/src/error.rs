//! Database error types
//!
//! This module defines the errors the pool, the connections and the record
//! store return, and maps each onto the diagnostics category it is reported
//! under.

use core_kernel::{DecodeError, ErrorCategory};
use thiserror::Error;

/// Errors that can occur during database operations
///
/// Messages are kept as strings so that a connection can retain its last
/// error and hand out copies of it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatabaseError {
    /// No connection became available within the acquire timeout
    #[error("Connection pool exhausted: no connection available after {waited_ms}ms")]
    PoolExhausted { waited_ms: u64 },

    /// The pool could not produce a connection at all
    #[error("Connection unavailable: {0}")]
    ConnectionUnavailable(String),

    /// The backing store rejected or failed the statement
    #[error("Statement failed: {0}")]
    StatementFailed(String),

    /// A placeholder in the statement has no matching key in the bound record
    #[error("Missing parameter ':{0}' in bound record")]
    MissingParameter(String),

    /// A table or column name is not a plain identifier
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// A bound float is NaN or infinite, which the store cannot hold faithfully
    #[error("Non-finite value for ':{0}'")]
    NonFiniteValue(String),

    /// The statement could not be built from the given record
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    /// A connection was released that is not checked out from this pool
    #[error("Connection {0} is not checked out from this pool")]
    NotCheckedOut(u64),

    /// A row could not be decoded and the store is configured to fail fast
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),
}

impl DatabaseError {
    /// Creates a statement failure from any displayable cause
    pub fn statement(cause: impl std::fmt::Display) -> Self {
        DatabaseError::StatementFailed(cause.to_string())
    }

    /// Diagnostics category this error is reported under
    pub fn category(&self) -> ErrorCategory {
        match self {
            DatabaseError::PoolExhausted { .. } => ErrorCategory::PoolExhausted,
            DatabaseError::ConnectionUnavailable(_) => ErrorCategory::ConnectionUnavailable,
            DatabaseError::StatementFailed(_)
            | DatabaseError::InvalidIdentifier(_)
            | DatabaseError::InvalidStatement(_)
            | DatabaseError::NonFiniteValue(_) => ErrorCategory::StatementFailed,
            DatabaseError::MissingParameter(_) => ErrorCategory::MissingParameter,
            DatabaseError::NotCheckedOut(_) => ErrorCategory::InvalidRelease,
            DatabaseError::Decode(e) if e.is_type_mismatch() => ErrorCategory::DecodeTypeMismatch,
            DatabaseError::Decode(_) => ErrorCategory::DecodeFailed,
        }
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionUnavailable(_) | DatabaseError::PoolExhausted { .. }
        )
    }

    /// Checks if this error stems from a programming mistake rather than the store
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::MissingParameter(_)
                | DatabaseError::InvalidIdentifier(_)
                | DatabaseError::InvalidStatement(_)
                | DatabaseError::NonFiniteValue(_)
                | DatabaseError::NotCheckedOut(_)
        )
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(error: rusqlite::Error) -> Self {
        DatabaseError::StatementFailed(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            DatabaseError::PoolExhausted { waited_ms: 5 }.category(),
            ErrorCategory::PoolExhausted
        );
        assert_eq!(
            DatabaseError::MissingParameter("id".into()).category(),
            ErrorCategory::MissingParameter
        );
        assert_eq!(
            DatabaseError::Decode(DecodeError::missing("id")).category(),
            ErrorCategory::DecodeFailed
        );
        assert_eq!(
            DatabaseError::Decode(DecodeError::malformed("status", "unknown ordinal 9")).category(),
            ErrorCategory::DecodeTypeMismatch
        );
        assert_eq!(
            DatabaseError::NonFiniteValue("risk_score".into()).category(),
            ErrorCategory::StatementFailed
        );
    }

    #[test]
    fn test_classification() {
        assert!(DatabaseError::ConnectionUnavailable("down".into()).is_connection_error());
        assert!(DatabaseError::MissingParameter("x".into()).is_programming_error());
        assert!(!DatabaseError::statement("no such table").is_programming_error());
    }
}
