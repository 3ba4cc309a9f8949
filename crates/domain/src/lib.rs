// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod allocation;
mod booking;
mod error;
mod seat_ledger;
mod ticket_reference;
mod trip;
mod trip_queue;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use allocation::{next_available_trip, select_trip, total_amount};
pub use booking::{
    Booking, BookingType, NewBooking, NewPaymentRecord, PassengerInfo, PaymentInfo, PaymentRecord,
    PaymentStatus, REFUND_REFERENCE_PREFIX,
};
pub use error::{DomainError, ErrorKind};
pub use seat_ledger::{book_seats, release_seats, resize_capacity, verify_ledger, verify_paid_seats};
pub use ticket_reference::TicketReference;
pub use trip::{
    BoardingPolicy, NewTrip, Trip, TripStatus, plan_trip, validate_driver, validate_vehicle,
};
pub use trip_queue::{close_gap, next_queue_position, validate_queue};

// Re-export public types
pub use types::{
    BookingId, Driver, DriverId, Money, PaymentId, Route, RouteId, RouteStatus, TripId, Vehicle,
    VehicleId,
};
pub use validation::{validate_passenger, validate_payment, validate_seat_count};
