// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Queue position arithmetic for a route's trips.
//!
//! Only queued trips (`waiting`, `boarding`, `full`) hold positions. Their
//! positions always form `1..=N`.

use crate::error::DomainError;
use crate::trip::Trip;
use crate::types::{RouteId, TripId};

/// Returns the position a newly enqueued trip takes on `route_id`.
///
/// # Arguments
///
/// * `route_id` - The route being extended
/// * `trips` - Trips of the route; non-queued trips are ignored
#[must_use]
pub fn next_queue_position(route_id: RouteId, trips: &[Trip]) -> u32 {
    trips
        .iter()
        .filter(|trip| trip.route_id == route_id && trip.status.is_queued())
        .map(|trip| trip.queue_position)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Shifts every queued trip behind `vacated_position` forward by one.
///
/// Call this after a trip leaves the queue (departure or cancellation). The
/// trip that left must already be in a non-queued status.
///
/// # Returns
///
/// The identifiers of the trips whose position changed.
pub fn close_gap(route_id: RouteId, vacated_position: u32, trips: &mut [Trip]) -> Vec<TripId> {
    let mut shifted: Vec<TripId> = Vec::new();
    for trip in trips.iter_mut().filter(|trip| {
        trip.route_id == route_id
            && trip.status.is_queued()
            && trip.queue_position > vacated_position
    }) {
        trip.queue_position -= 1;
        shifted.push(trip.trip_id);
    }
    shifted
}

/// Checks that the queued trips of `route_id` occupy exactly `1..=N`.
///
/// # Errors
///
/// Returns `QueueInconsistent` on a gap or duplicate.
pub fn validate_queue(route_id: RouteId, trips: &[Trip]) -> Result<(), DomainError> {
    let mut positions: Vec<u32> = trips
        .iter()
        .filter(|trip| trip.route_id == route_id && trip.status.is_queued())
        .map(|trip| trip.queue_position)
        .collect();
    positions.sort_unstable();

    for (expected, actual) in (1_u32..).zip(positions.iter().copied()) {
        if expected != actual {
            return Err(DomainError::QueueInconsistent {
                route_id,
                reason: format!("expected position {expected}, found {actual}"),
            });
        }
    }
    Ok(())
}
