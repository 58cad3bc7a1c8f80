//! Optimistic concurrency for versioned rows.

use crate::error::{DomainError, DomainResult};

/// Optimistic concurrency expectation for a versioned row.
///
/// Item rows start at version 1 and gain +1 on every mutation. A build commit
/// carries the version it planned against; the store rejects the write if the
/// row has moved on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (manual CRUD edits).
    Any,
    /// Require the row to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
