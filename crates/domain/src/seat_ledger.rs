// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-trip seat accounting.
//!
//! Every function here keeps `seats_booked + seats_available == capacity`
//! and, for boarding trips, keeps `full` in step with zero availability.
//! Callers hold the route's queue lock while calling them.

use crate::error::DomainError;
use crate::trip::{Trip, TripStatus};
use crate::validation::validate_seat_count;

/// Sells `count` seats on a boarding trip.
///
/// When the last seat is sold the trip becomes `full` and stops accepting
/// bookings.
///
/// # Errors
///
/// Returns an error if:
/// - `count` is zero
/// - The trip is not boarding or is not accepting bookings
/// - Fewer than `count` seats are available
pub fn book_seats(trip: &mut Trip, count: u32) -> Result<(), DomainError> {
    validate_seat_count(count)?;

    if !trip.is_bookable() {
        return Err(DomainError::TripNotAcceptingBookings {
            trip_id: trip.trip_id,
            status: trip.status,
        });
    }

    if trip.seats_available < count {
        return Err(DomainError::SeatUnavailable {
            trip_id: trip.trip_id,
            requested: count,
            available: trip.seats_available,
        });
    }

    trip.seats_available -= count;
    trip.seats_booked += count;

    if trip.seats_available == 0 {
        trip.status = TripStatus::Full;
        trip.is_accepting_bookings = false;
    }

    Ok(())
}

/// Returns `count` seats to the trip's inventory.
///
/// A full trip reopens for boarding. Departed, arrived and cancelled trips
/// only have their numbers adjusted, as do waiting trips.
///
/// # Errors
///
/// Returns `LedgerInconsistent` if more seats would be released than are
/// booked.
pub fn release_seats(trip: &mut Trip, count: u32) -> Result<(), DomainError> {
    if count > trip.seats_booked {
        return Err(DomainError::LedgerInconsistent {
            trip_id: trip.trip_id,
            reason: format!(
                "cannot release {count} seat(s); only {} booked",
                trip.seats_booked
            ),
        });
    }

    trip.seats_booked -= count;
    trip.seats_available += count;

    if trip.status == TripStatus::Full && trip.seats_available > 0 {
        trip.status = TripStatus::Boarding;
        trip.is_accepting_bookings = true;
    }

    Ok(())
}

/// Changes the trip's capacity, typically after a vehicle swap.
///
/// Boarding and full trips flip according to the new availability.
///
/// # Errors
///
/// Returns an error if:
/// - `new_capacity` is zero
/// - `new_capacity` is below the number of seats already booked
pub fn resize_capacity(trip: &mut Trip, new_capacity: u32) -> Result<(), DomainError> {
    if new_capacity == 0 {
        return Err(DomainError::InvalidCapacity(new_capacity));
    }
    if new_capacity < trip.seats_booked {
        return Err(DomainError::CapacityBelowBooked {
            trip_id: trip.trip_id,
            capacity: new_capacity,
            seats_booked: trip.seats_booked,
        });
    }

    trip.capacity = new_capacity;
    trip.seats_available = new_capacity - trip.seats_booked;

    if matches!(trip.status, TripStatus::Boarding | TripStatus::Full) {
        if trip.seats_available == 0 {
            trip.status = TripStatus::Full;
            trip.is_accepting_bookings = false;
        } else {
            trip.status = TripStatus::Boarding;
            trip.is_accepting_bookings = true;
        }
    }

    Ok(())
}

/// Checks the trip's seat counters against its status.
///
/// # Errors
///
/// Returns `LedgerInconsistent` describing the first violated rule.
pub fn verify_ledger(trip: &Trip) -> Result<(), DomainError> {
    let total: Option<u32> = trip.seats_booked.checked_add(trip.seats_available);
    if total != Some(trip.capacity) {
        return Err(DomainError::LedgerInconsistent {
            trip_id: trip.trip_id,
            reason: format!(
                "booked {} + available {} != capacity {}",
                trip.seats_booked, trip.seats_available, trip.capacity
            ),
        });
    }

    if matches!(trip.status, TripStatus::Boarding | TripStatus::Full)
        && (trip.seats_available == 0) != (trip.status == TripStatus::Full)
    {
        return Err(DomainError::LedgerInconsistent {
            trip_id: trip.trip_id,
            reason: format!(
                "status {} with {} seat(s) available",
                trip.status, trip.seats_available
            ),
        });
    }

    Ok(())
}

/// Checks that the paid bookings of a trip account for every booked seat.
///
/// # Errors
///
/// Returns `LedgerInconsistent` if the sums differ.
pub fn verify_paid_seats(trip: &Trip, paid_seats: u32) -> Result<(), DomainError> {
    if paid_seats == trip.seats_booked {
        Ok(())
    } else {
        Err(DomainError::LedgerInconsistent {
            trip_id: trip.trip_id,
            reason: format!(
                "paid bookings hold {paid_seats} seat(s) but {} are booked",
                trip.seats_booked
            ),
        })
    }
}
