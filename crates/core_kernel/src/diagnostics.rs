//! Diagnostics sink
//!
//! The pool and the record store report every failure they return to a
//! caller through a [`DiagnosticsSink`] injected at construction, so
//! operational logs see failures even when callers drop the result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, warn};

/// Failure category carried by each diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// No connection became available within the acquire timeout
    PoolExhausted,
    /// The pool could not produce a connection at all
    ConnectionUnavailable,
    /// The backing store rejected or failed a statement
    StatementFailed,
    /// A stored value did not match the attribute's expected type
    DecodeTypeMismatch,
    /// A row could not be decoded into an entity
    DecodeFailed,
    /// A statement referenced a placeholder absent from the bound record
    MissingParameter,
    /// A connection was handed back that was not checked out
    InvalidRelease,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::PoolExhausted => "pool_exhausted",
            ErrorCategory::ConnectionUnavailable => "connection_unavailable",
            ErrorCategory::StatementFailed => "statement_failed",
            ErrorCategory::DecodeTypeMismatch => "decode_type_mismatch",
            ErrorCategory::DecodeFailed => "decode_failed",
            ErrorCategory::MissingParameter => "missing_parameter",
            ErrorCategory::InvalidRelease => "invalid_release",
        }
    }
}

/// A single reported failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub category: ErrorCategory,
    pub message: String,
    pub reported_at: DateTime<Utc>,
}

impl Diagnostic {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            reported_at: Utc::now(),
        }
    }
}

/// Destination for failure reports
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for Arc<S> {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic)
    }
}

/// Sink that emits each diagnostic as a `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.category {
            ErrorCategory::DecodeTypeMismatch | ErrorCategory::DecodeFailed => warn!(
                category = diagnostic.category.as_str(),
                "{}", diagnostic.message
            ),
            _ => error!(
                category = diagnostic.category.as_str(),
                "{}", diagnostic.message
            ),
        }
    }
}

/// Sink that keeps diagnostics in memory
///
/// Useful in tests and for callers that want to summarize failures after a
/// batch of operations.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Number of diagnostics in the given category
    pub fn count(&self, category: ErrorCategory) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.category == category)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl DiagnosticsSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_counts_by_category() {
        let sink = MemorySink::new();
        sink.report(Diagnostic::new(ErrorCategory::PoolExhausted, "timed out"));
        sink.report(Diagnostic::new(ErrorCategory::StatementFailed, "no such table"));
        sink.report(Diagnostic::new(ErrorCategory::PoolExhausted, "timed out"));

        assert_eq!(sink.count(ErrorCategory::PoolExhausted), 2);
        assert_eq!(sink.count(ErrorCategory::MissingParameter), 0);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_arc_sink_forwards() {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<dyn DiagnosticsSink> = sink.clone();
        shared.report(Diagnostic::new(ErrorCategory::DecodeFailed, "row 3"));
        assert_eq!(sink.entries().len(), 1);
    }
}
