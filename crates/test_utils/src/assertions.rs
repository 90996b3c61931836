//! Custom Test Assertions
//!
//! Provides assertion helpers for diagnostics and pool state that give more
//! meaningful failure messages than bare `assert!`s.

use core_kernel::{ErrorCategory, MemorySink};
use infra_db::ConnectionPool;

/// Asserts that `category` was reported exactly `times` times
pub fn assert_reported_times(sink: &MemorySink, category: ErrorCategory, times: usize) {
    let actual = sink.count(category);
    assert_eq!(
        actual,
        times,
        "Expected {} report(s) of {}, got {}: {:?}",
        times,
        category.as_str(),
        actual,
        sink.entries()
    );
}

/// Asserts that `category` was reported at least once
pub fn assert_reported(sink: &MemorySink, category: ErrorCategory) {
    assert!(
        sink.count(category) > 0,
        "Expected a report of {}, got {:?}",
        category.as_str(),
        sink.entries()
    );
}

/// Asserts that nothing was reported
pub fn assert_nothing_reported(sink: &MemorySink) {
    assert!(sink.is_empty(), "Expected no reports, got {:?}", sink.entries());
}

/// Asserts that every connection of the pool has been returned
pub fn assert_all_returned(pool: &ConnectionPool) {
    let status = pool.status();
    assert_eq!(
        status.checked_out, 0,
        "Expected no checked-out connections, got {:?}",
        status
    );
    assert_eq!(status.idle, status.total, "Idle and total disagree: {:?}", status);
}
