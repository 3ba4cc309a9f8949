// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registry queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use trip_queue_domain::{Driver, DriverId, Route, RouteId, Vehicle, VehicleId};

use crate::data_models::{DriverRow, RouteRow, VehicleRow, map_rows};
use crate::diesel_schema::{drivers, routes, vehicles};
use crate::error::PersistenceError;

/// Finds a route by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_route(
    conn: &mut SqliteConnection,
    route_id: RouteId,
) -> Result<Option<Route>, PersistenceError> {
    routes::table
        .filter(routes::route_id.eq(route_id.value()))
        .select(RouteRow::as_select())
        .first::<RouteRow>(conn)
        .optional()?
        .map(Route::try_from)
        .transpose()
}

/// Lists every route ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_routes(conn: &mut SqliteConnection) -> Result<Vec<Route>, PersistenceError> {
    let rows: Vec<RouteRow> = routes::table
        .order(routes::route_id.asc())
        .select(RouteRow::as_select())
        .load(conn)?;
    map_rows(rows)
}

/// Finds a vehicle by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: VehicleId,
) -> Result<Option<Vehicle>, PersistenceError> {
    vehicles::table
        .filter(vehicles::vehicle_id.eq(vehicle_id.value()))
        .select(VehicleRow::as_select())
        .first::<VehicleRow>(conn)
        .optional()?
        .map(Vehicle::try_from)
        .transpose()
}

/// Finds a driver by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_driver(
    conn: &mut SqliteConnection,
    driver_id: DriverId,
) -> Result<Option<Driver>, PersistenceError> {
    Ok(drivers::table
        .filter(drivers::driver_id.eq(driver_id.value()))
        .select(DriverRow::as_select())
        .first::<DriverRow>(conn)
        .optional()?
        .map(Driver::from))
}
