// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::store::StoreError;
use trip_queue_domain::{DomainError, ErrorKind};

/// Errors that can occur while executing an engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// No unused ticket reference was found within the attempt budget.
    DuplicateReference {
        /// Number of references tried.
        attempts: u32,
    },
    /// Another writer changed the same data first.
    ConcurrencyConflict(String),
    /// The backing store failed.
    Storage(String),
}

impl CoreError {
    /// Classifies this error for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DomainViolation(err) => err.kind(),
            Self::DuplicateReference { .. } => ErrorKind::DuplicateReference,
            Self::ConcurrencyConflict(_) => ErrorKind::ConcurrencyConflict,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if running the whole operation again may succeed.
    ///
    /// Only transient contention qualifies. Business failures never do.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict(_))
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::DuplicateReference { attempts } => {
                write!(
                    f,
                    "Could not allocate a unique ticket reference after {attempts} attempt(s)"
                )
            }
            Self::ConcurrencyConflict(msg) => write!(f, "Concurrency conflict: {msg}"),
            Self::Storage(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } | StoreError::Busy(_) => {
                Self::ConcurrencyConflict(err.to_string())
            }
            StoreError::UniqueViolation(_) | StoreError::Backend(_) | StoreError::Corrupt(_) => {
                Self::Storage(err.to_string())
            }
        }
    }
}
