// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::trip::TripStatus;
use crate::types::{BookingId, DriverId, RouteId, TripId, VehicleId};
use serde::{Deserialize, Serialize};

/// Classification of a failure as seen by callers of the engine.
///
/// Every error raised anywhere in the workspace maps onto exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// The entity exists but its current status forbids the operation.
    InvalidState,
    /// The trip cannot satisfy the requested seat count.
    SeatUnavailable,
    /// No trip on the route can take the booking.
    NoAvailableTrip,
    /// A unique ticket reference could not be produced.
    DuplicateReference,
    /// A concurrent writer won; the operation may be retried.
    ConcurrencyConflict,
    /// The request itself is malformed.
    InvalidInput,
    /// Storage failure or ledger corruption.
    Internal,
}

impl ErrorKind {
    /// Returns the wire form of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidState => "invalid_state",
            Self::SeatUnavailable => "seat_unavailable",
            Self::NoAvailableTrip => "no_available_trip",
            Self::DuplicateReference => "duplicate_reference",
            Self::ConcurrencyConflict => "concurrency_conflict",
            Self::InvalidInput => "invalid_input",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by the domain rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Route does not exist in the registry.
    RouteNotFound(RouteId),
    /// Vehicle does not exist in the registry.
    VehicleNotFound(VehicleId),
    /// Driver does not exist in the registry.
    DriverNotFound(DriverId),
    /// Trip does not exist.
    TripNotFound(TripId),
    /// Booking does not exist.
    BookingNotFound(BookingId),
    /// No booking carries the given ticket reference.
    TicketReferenceNotFound(String),
    /// Route is closed for dispatch.
    RouteInactive(RouteId),
    /// Vehicle is out of service.
    VehicleInactive(VehicleId),
    /// Driver is not available for assignment.
    DriverUnavailable(DriverId),
    /// The trip status machine forbids the requested move.
    InvalidTripTransition {
        /// The trip being moved.
        trip_id: TripId,
        /// Current status.
        from: TripStatus,
        /// Requested status.
        to: TripStatus,
    },
    /// Trip is not boarding or has stopped accepting bookings.
    TripNotAcceptingBookings {
        /// The trip.
        trip_id: TripId,
        /// Its current status.
        status: TripStatus,
    },
    /// Operation requires a trip that is still in the queue.
    TripNotQueued {
        /// The trip.
        trip_id: TripId,
        /// Its current status.
        status: TripStatus,
    },
    /// Trip cannot be cancelled while it has paid bookings.
    TripHasPaidBookings {
        /// The trip.
        trip_id: TripId,
        /// Number of paid bookings still attached.
        paid_bookings: usize,
    },
    /// Booking has already been cancelled.
    BookingAlreadyCancelled(BookingId),
    /// Trip does not have enough free seats.
    SeatUnavailable {
        /// The trip.
        trip_id: TripId,
        /// Seats requested.
        requested: u32,
        /// Seats currently free.
        available: u32,
    },
    /// New capacity would not hold the passengers already booked.
    CapacityBelowBooked {
        /// The trip.
        trip_id: TripId,
        /// Proposed capacity.
        capacity: u32,
        /// Seats already sold.
        seats_booked: u32,
    },
    /// No boarding trip on the route has enough free seats.
    NoAvailableTrip {
        /// The route searched.
        route_id: RouteId,
        /// Seats requested.
        requested: u32,
    },
    /// Seat count must be at least one.
    InvalidSeatCount(u32),
    /// Vehicle capacity must be at least one.
    InvalidCapacity(u32),
    /// Ticket reference is not in the `TKT-XXXXXXXX` format.
    InvalidTicketReference(String),
    /// Unknown trip status string.
    InvalidTripStatus(String),
    /// Unknown booking type string.
    InvalidBookingType(String),
    /// Unknown payment status string.
    InvalidPaymentStatus(String),
    /// Unknown route status string.
    InvalidRouteStatus(String),
    /// Passenger details are missing or malformed.
    InvalidPassenger(String),
    /// Payment details are missing or malformed.
    InvalidPayment(String),
    /// Fare arithmetic overflowed.
    AmountOverflow,
    /// Seat accounting no longer balances.
    LedgerInconsistent {
        /// The trip.
        trip_id: TripId,
        /// What failed to balance.
        reason: String,
    },
    /// Queue positions of a route are no longer contiguous.
    QueueInconsistent {
        /// The route.
        route_id: RouteId,
        /// What failed to line up.
        reason: String,
    },
}

impl DomainError {
    /// Classifies this error for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RouteNotFound(_)
            | Self::VehicleNotFound(_)
            | Self::DriverNotFound(_)
            | Self::TripNotFound(_)
            | Self::BookingNotFound(_)
            | Self::TicketReferenceNotFound(_) => ErrorKind::NotFound,
            Self::RouteInactive(_)
            | Self::VehicleInactive(_)
            | Self::DriverUnavailable(_)
            | Self::InvalidTripTransition { .. }
            | Self::TripNotAcceptingBookings { .. }
            | Self::TripNotQueued { .. }
            | Self::TripHasPaidBookings { .. }
            | Self::BookingAlreadyCancelled(_) => ErrorKind::InvalidState,
            Self::SeatUnavailable { .. } | Self::CapacityBelowBooked { .. } => {
                ErrorKind::SeatUnavailable
            }
            Self::NoAvailableTrip { .. } => ErrorKind::NoAvailableTrip,
            Self::InvalidSeatCount(_)
            | Self::InvalidCapacity(_)
            | Self::InvalidTicketReference(_)
            | Self::InvalidTripStatus(_)
            | Self::InvalidBookingType(_)
            | Self::InvalidPaymentStatus(_)
            | Self::InvalidRouteStatus(_)
            | Self::InvalidPassenger(_)
            | Self::InvalidPayment(_) => ErrorKind::InvalidInput,
            Self::AmountOverflow
            | Self::LedgerInconsistent { .. }
            | Self::QueueInconsistent { .. } => ErrorKind::Internal,
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RouteNotFound(id) => write!(f, "Route {id} not found"),
            Self::VehicleNotFound(id) => write!(f, "Vehicle {id} not found"),
            Self::DriverNotFound(id) => write!(f, "Driver {id} not found"),
            Self::TripNotFound(id) => write!(f, "Trip {id} not found"),
            Self::BookingNotFound(id) => write!(f, "Booking {id} not found"),
            Self::TicketReferenceNotFound(reference) => {
                write!(f, "No booking found for ticket reference '{reference}'")
            }
            Self::RouteInactive(id) => write!(f, "Route {id} is inactive"),
            Self::VehicleInactive(id) => write!(f, "Vehicle {id} is inactive"),
            Self::DriverUnavailable(id) => write!(f, "Driver {id} is not available"),
            Self::InvalidTripTransition { trip_id, from, to } => {
                write!(f, "Trip {trip_id} cannot move from {from} to {to}")
            }
            Self::TripNotAcceptingBookings { trip_id, status } => {
                write!(f, "Trip {trip_id} is not accepting bookings (status {status})")
            }
            Self::TripNotQueued { trip_id, status } => {
                write!(f, "Trip {trip_id} is no longer in the queue (status {status})")
            }
            Self::TripHasPaidBookings {
                trip_id,
                paid_bookings,
            } => {
                write!(
                    f,
                    "Trip {trip_id} has {paid_bookings} paid booking(s); cancel them first or cancel with refunds"
                )
            }
            Self::BookingAlreadyCancelled(id) => {
                write!(f, "Booking {id} is already cancelled")
            }
            Self::SeatUnavailable {
                trip_id,
                requested,
                available,
            } => {
                write!(
                    f,
                    "Trip {trip_id} has {available} seat(s) available, {requested} requested"
                )
            }
            Self::CapacityBelowBooked {
                trip_id,
                capacity,
                seats_booked,
            } => {
                write!(
                    f,
                    "Trip {trip_id} already has {seats_booked} seat(s) booked; capacity {capacity} is too small"
                )
            }
            Self::NoAvailableTrip {
                route_id,
                requested,
            } => {
                write!(
                    f,
                    "No boarding trip on route {route_id} has {requested} seat(s) available"
                )
            }
            Self::InvalidSeatCount(count) => {
                write!(f, "Invalid seat count: {count}. Must be at least 1")
            }
            Self::InvalidCapacity(capacity) => {
                write!(f, "Invalid capacity: {capacity}. Must be at least 1")
            }
            Self::InvalidTicketReference(value) => {
                write!(f, "Invalid ticket reference: '{value}'")
            }
            Self::InvalidTripStatus(value) => write!(f, "Invalid trip status: '{value}'"),
            Self::InvalidBookingType(value) => write!(f, "Invalid booking type: '{value}'"),
            Self::InvalidPaymentStatus(value) => {
                write!(f, "Invalid payment status: '{value}'")
            }
            Self::InvalidRouteStatus(value) => write!(f, "Invalid route status: '{value}'"),
            Self::InvalidPassenger(msg) => write!(f, "Invalid passenger: {msg}"),
            Self::InvalidPayment(msg) => write!(f, "Invalid payment: {msg}"),
            Self::AmountOverflow => write!(f, "Amount arithmetic overflow"),
            Self::LedgerInconsistent { trip_id, reason } => {
                write!(f, "Seat ledger for trip {trip_id} is inconsistent: {reason}")
            }
            Self::QueueInconsistent { route_id, reason } => {
                write!(f, "Queue for route {route_id} is inconsistent: {reason}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
