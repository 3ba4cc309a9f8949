// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use serde::{Deserialize, Serialize};
use trip_queue::CoreError;
use trip_queue_domain::{DomainError, ErrorKind};

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// On the wire every variant is `{ "kind": ..., "message": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiError {
    /// A requested resource was not found.
    NotFound {
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The resource exists but its status forbids the operation.
    InvalidState {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The trip cannot hold the requested seats.
    SeatUnavailable {
        /// A human-readable description of the shortfall.
        message: String,
    },
    /// No trip on the route can take the booking.
    NoAvailableTrip {
        /// A human-readable description of the request.
        message: String,
    },
    /// A unique ticket reference could not be allocated.
    DuplicateReference {
        /// A human-readable description of the failure.
        message: String,
    },
    /// A concurrent writer won; the request may be repeated.
    ConcurrencyConflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// A human-readable description of the error.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Builds an error of the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::NotFound => Self::NotFound { message },
            ErrorKind::InvalidState => Self::InvalidState { message },
            ErrorKind::SeatUnavailable => Self::SeatUnavailable { message },
            ErrorKind::NoAvailableTrip => Self::NoAvailableTrip { message },
            ErrorKind::DuplicateReference => Self::DuplicateReference { message },
            ErrorKind::ConcurrencyConflict => Self::ConcurrencyConflict { message },
            ErrorKind::InvalidInput => Self::InvalidInput { message },
            ErrorKind::Internal => Self::Internal { message },
        }
    }

    /// Reports an unusable request field.
    #[must_use]
    pub fn invalid_input(field: &str, message: &str) -> Self {
        Self::InvalidInput {
            message: format!("Invalid input for field '{field}': {message}"),
        }
    }

    /// The error's classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::SeatUnavailable { .. } => ErrorKind::SeatUnavailable,
            Self::NoAvailableTrip { .. } => ErrorKind::NoAvailableTrip,
            Self::DuplicateReference { .. } => ErrorKind::DuplicateReference,
            Self::ConcurrencyConflict { .. } => ErrorKind::ConcurrencyConflict,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// The human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message }
            | Self::InvalidState { message }
            | Self::SeatUnavailable { message }
            | Self::NoAvailableTrip { message }
            | Self::DuplicateReference { message }
            | Self::ConcurrencyConflict { message }
            | Self::InvalidInput { message }
            | Self::Internal { message } => message,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.kind())
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::TicketReferenceNotFound(reference) => ApiError::NotFound {
            message: format!("No booking found for ticket reference '{reference}'"),
        },
        DomainError::InvalidTicketReference(input) => ApiError::invalid_input(
            "ticket_reference",
            &format!("'{input}' is not of the form TKT-XXXXXXXX"),
        ),
        DomainError::InvalidSeatCount(count) => ApiError::invalid_input(
            "seat_count",
            &format!("{count} is not a valid seat count; at least one seat is required"),
        ),
        DomainError::InvalidPassenger(reason) => ApiError::invalid_input("passenger", &reason),
        DomainError::InvalidPayment(reason) => ApiError::invalid_input("payment", &reason),
        DomainError::InvalidBookingType(value) => ApiError::invalid_input(
            "booking_type",
            &format!("'{value}' is not one of online, walk-in"),
        ),
        DomainError::LedgerInconsistent { .. } | DomainError::QueueInconsistent { .. } => {
            ApiError::Internal {
                message: format!("Integrity check failed: {err}"),
            }
        }
        other => ApiError::new(other.kind(), other.to_string()),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::DuplicateReference { attempts } => ApiError::DuplicateReference {
            message: format!(
                "Could not allocate a unique ticket reference after {attempts} attempt(s); please retry"
            ),
        },
        CoreError::ConcurrencyConflict(msg) => ApiError::ConcurrencyConflict {
            message: format!("Another request changed the same data first: {msg}"),
        },
        CoreError::Storage(msg) => ApiError::Internal {
            message: format!("Internal error: {msg}"),
        },
    }
}
