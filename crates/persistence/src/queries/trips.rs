// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use trip_queue_domain::{DriverId, RouteId, Trip, TripId, TripStatus};

use crate::data_models::{TripRow, map_rows};
use crate::diesel_schema::trips;
use crate::error::PersistenceError;

const QUEUED_STATUSES: [&str; 3] = [
    TripStatus::Waiting.as_str(),
    TripStatus::Boarding.as_str(),
    TripStatus::Full.as_str(),
];

/// Finds a trip by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_trip(
    conn: &mut SqliteConnection,
    trip_id: TripId,
) -> Result<Option<Trip>, PersistenceError> {
    trips::table
        .filter(trips::trip_id.eq(trip_id.value()))
        .select(TripRow::as_select())
        .first::<TripRow>(conn)
        .optional()?
        .map(Trip::try_from)
        .transpose()
}

/// Lists every trip of a route ordered by queue position then id.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn trips_for_route(
    conn: &mut SqliteConnection,
    route_id: RouteId,
) -> Result<Vec<Trip>, PersistenceError> {
    let rows: Vec<TripRow> = trips::table
        .filter(trips::route_id.eq(route_id.value()))
        .order((trips::queue_position.asc(), trips::trip_id.asc()))
        .select(TripRow::as_select())
        .load(conn)?;
    map_rows(rows)
}

/// Lists queued trips of every route ordered by route, position and id.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn queued_trips(conn: &mut SqliteConnection) -> Result<Vec<Trip>, PersistenceError> {
    let rows: Vec<TripRow> = trips::table
        .filter(trips::status.eq_any(QUEUED_STATUSES))
        .order((
            trips::route_id.asc(),
            trips::queue_position.asc(),
            trips::trip_id.asc(),
        ))
        .select(TripRow::as_select())
        .load(conn)?;
    map_rows(rows)
}

/// Lists every trip ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn all_trips(conn: &mut SqliteConnection) -> Result<Vec<Trip>, PersistenceError> {
    let rows: Vec<TripRow> = trips::table
        .order(trips::trip_id.asc())
        .select(TripRow::as_select())
        .load(conn)?;
    map_rows(rows)
}

/// Lists every trip of a driver ordered by estimated departure then id.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn trips_for_driver(
    conn: &mut SqliteConnection,
    driver_id: DriverId,
) -> Result<Vec<Trip>, PersistenceError> {
    let rows: Vec<TripRow> = trips::table
        .filter(trips::driver_id.eq(driver_id.value()))
        .order((trips::estimated_departure_time.asc(), trips::trip_id.asc()))
        .select(TripRow::as_select())
        .load(conn)?;
    map_rows(rows)
}
