// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip mutations and the route queue lock.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use trip_queue_domain::{NewTrip, RouteId, Trip, TripId};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{flag, format_optional_timestamp, format_timestamp, to_i32};
use crate::diesel_schema::{route_queues, trips};
use crate::error::PersistenceError;

/// Writes the route's `route_queues` row.
///
/// The write takes the database write lock for the rest of the
/// transaction, so competing queue mutations on any route wait for it.
///
/// # Errors
///
/// Returns `DatabaseBusy` if the lock cannot be taken in time.
pub fn lock_route_queue(
    conn: &mut SqliteConnection,
    route_id: RouteId,
) -> Result<(), PersistenceError> {
    diesel::insert_into(route_queues::table)
        .values((
            route_queues::route_id.eq(route_id.value()),
            route_queues::lock_counter.eq(1_i64),
        ))
        .on_conflict(route_queues::route_id)
        .do_update()
        .set(route_queues::lock_counter.eq(route_queues::lock_counter + 1_i64))
        .execute(conn)?;
    Ok(())
}

/// Inserts a trip and returns it with its assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_trip(
    conn: &mut SqliteConnection,
    new_trip: &NewTrip,
) -> Result<Trip, PersistenceError> {
    let draft: Trip = Trip::from_new(TripId::new(0), new_trip);

    diesel::insert_into(trips::table)
        .values((
            trips::route_id.eq(draft.route_id.value()),
            trips::vehicle_id.eq(draft.vehicle_id.value()),
            trips::driver_id.eq(draft.driver_id.value()),
            trips::queue_position.eq(to_i32("trips.queue_position", draft.queue_position)?),
            trips::estimated_departure_time.eq(format_timestamp(draft.estimated_departure_time)?),
            trips::capacity.eq(to_i32("trips.capacity", draft.capacity)?),
            trips::seats_booked.eq(to_i32("trips.seats_booked", draft.seats_booked)?),
            trips::seats_available.eq(to_i32("trips.seats_available", draft.seats_available)?),
            trips::is_accepting_bookings.eq(flag(draft.is_accepting_bookings)),
            trips::status.eq(draft.status.as_str()),
            trips::fare_price.eq(draft.fare_price.minor_units()),
            trips::version.eq(draft.version),
        ))
        .execute(conn)?;

    let trip_id: i64 = get_last_insert_rowid(conn)?;
    debug!(
        trip_id,
        route_id = draft.route_id.value(),
        queue_position = draft.queue_position,
        "Inserted trip"
    );

    Ok(Trip {
        trip_id: TripId::new(trip_id),
        ..draft
    })
}

/// Writes `trip` if the stored version still equals `trip.version`.
///
/// # Errors
///
/// Returns `VersionConflict` if the row moved on, or another error if the
/// update fails.
pub fn update_trip(conn: &mut SqliteConnection, trip: &Trip) -> Result<Trip, PersistenceError> {
    let next_version: i64 = trip.version + 1;

    let affected: usize = diesel::update(
        trips::table
            .filter(trips::trip_id.eq(trip.trip_id.value()))
            .filter(trips::version.eq(trip.version)),
    )
    .set((
        trips::vehicle_id.eq(trip.vehicle_id.value()),
        trips::driver_id.eq(trip.driver_id.value()),
        trips::queue_position.eq(to_i32("trips.queue_position", trip.queue_position)?),
        trips::actual_departure_datetime.eq(format_optional_timestamp(
            trip.actual_departure_datetime,
        )?),
        trips::actual_arrival_datetime.eq(format_optional_timestamp(trip.actual_arrival_datetime)?),
        trips::capacity.eq(to_i32("trips.capacity", trip.capacity)?),
        trips::seats_booked.eq(to_i32("trips.seats_booked", trip.seats_booked)?),
        trips::seats_available.eq(to_i32("trips.seats_available", trip.seats_available)?),
        trips::is_accepting_bookings.eq(flag(trip.is_accepting_bookings)),
        trips::status.eq(trip.status.as_str()),
        trips::version.eq(next_version),
    ))
    .execute(conn)?;

    if affected == 0 {
        return Err(PersistenceError::VersionConflict {
            entity: "trip",
            id: trip.trip_id.value(),
        });
    }

    Ok(Trip {
        version: next_version,
        ..trip.clone()
    })
}
