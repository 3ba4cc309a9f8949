// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip selection for route-level ("smart") bookings.

use crate::error::DomainError;
use crate::trip::Trip;
use crate::types::{Money, RouteId};
use crate::validation::validate_seat_count;

/// Picks the trip a route-level booking lands on.
///
/// Candidates must be on `route_id`, boarding, accepting bookings and have
/// at least `seat_count` free seats. The front-most trip in the queue wins;
/// the trip identifier breaks ties.
///
/// # Errors
///
/// Returns an error if:
/// - `seat_count` is zero
/// - No trip qualifies (`NoAvailableTrip`)
pub fn select_trip(route_id: RouteId, trips: &[Trip], seat_count: u32) -> Result<&Trip, DomainError> {
    validate_seat_count(seat_count)?;

    trips
        .iter()
        .filter(|trip| {
            trip.route_id == route_id && trip.is_bookable() && trip.seats_available >= seat_count
        })
        .min_by_key(|trip| (trip.queue_position, trip.trip_id))
        .ok_or(DomainError::NoAvailableTrip {
            route_id,
            requested: seat_count,
        })
}

/// Returns the next trip on the route that is taking bookings, regardless
/// of how many seats it has left.
#[must_use]
pub fn next_available_trip(route_id: RouteId, trips: &[Trip]) -> Option<&Trip> {
    trips
        .iter()
        .filter(|trip| trip.route_id == route_id && trip.is_bookable())
        .min_by_key(|trip| (trip.queue_position, trip.trip_id))
}

/// Computes the charge for `seat_count` seats at `fare`.
///
/// # Errors
///
/// Returns `AmountOverflow` if the product does not fit.
pub fn total_amount(fare: Money, seat_count: u32) -> Result<Money, DomainError> {
    fare.checked_mul_seats(seat_count)
        .ok_or(DomainError::AmountOverflow)
}
