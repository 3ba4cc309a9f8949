// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registry maintenance.
//!
//! The engine never writes these tables; they are filled by seeding and
//! operator tooling.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use trip_queue_domain::{Driver, DriverId, Route, RouteId, RouteStatus, Vehicle};

use crate::data_models::{flag, to_i32};
use crate::diesel_schema::{drivers, routes, vehicles};
use crate::error::PersistenceError;

/// Inserts or replaces a route.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn upsert_route(conn: &mut SqliteConnection, route: &Route) -> Result<(), PersistenceError> {
    let duration: Option<i32> = route
        .estimated_duration_minutes
        .map(|minutes| to_i32("routes.estimated_duration_minutes", minutes))
        .transpose()?;

    diesel::insert_into(routes::table)
        .values((
            routes::route_id.eq(route.route_id.value()),
            routes::origin.eq(&route.origin),
            routes::destination.eq(&route.destination),
            routes::fare_price.eq(route.fare_price.minor_units()),
            routes::status.eq(route.status.as_str()),
            routes::estimated_duration_minutes.eq(duration),
        ))
        .on_conflict(routes::route_id)
        .do_update()
        .set((
            routes::origin.eq(excluded(routes::origin)),
            routes::destination.eq(excluded(routes::destination)),
            routes::fare_price.eq(excluded(routes::fare_price)),
            routes::status.eq(excluded(routes::status)),
            routes::estimated_duration_minutes.eq(excluded(routes::estimated_duration_minutes)),
        ))
        .execute(conn)?;
    Ok(())
}

/// Inserts or replaces a vehicle.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn upsert_vehicle(
    conn: &mut SqliteConnection,
    vehicle: &Vehicle,
) -> Result<(), PersistenceError> {
    diesel::insert_into(vehicles::table)
        .values((
            vehicles::vehicle_id.eq(vehicle.vehicle_id.value()),
            vehicles::plate_number.eq(&vehicle.plate_number),
            vehicles::vehicle_type.eq(&vehicle.vehicle_type),
            vehicles::capacity.eq(to_i32("vehicles.capacity", vehicle.capacity)?),
            vehicles::is_active.eq(flag(vehicle.is_active)),
        ))
        .on_conflict(vehicles::vehicle_id)
        .do_update()
        .set((
            vehicles::plate_number.eq(excluded(vehicles::plate_number)),
            vehicles::vehicle_type.eq(excluded(vehicles::vehicle_type)),
            vehicles::capacity.eq(excluded(vehicles::capacity)),
            vehicles::is_active.eq(excluded(vehicles::is_active)),
        ))
        .execute(conn)?;
    Ok(())
}

/// Inserts or replaces a driver.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn upsert_driver(conn: &mut SqliteConnection, driver: &Driver) -> Result<(), PersistenceError> {
    diesel::insert_into(drivers::table)
        .values((
            drivers::driver_id.eq(driver.driver_id.value()),
            drivers::first_name.eq(&driver.first_name),
            drivers::last_name.eq(&driver.last_name),
            drivers::phone.eq(driver.phone.as_deref()),
            drivers::is_available.eq(flag(driver.is_available)),
        ))
        .on_conflict(drivers::driver_id)
        .do_update()
        .set((
            drivers::first_name.eq(excluded(drivers::first_name)),
            drivers::last_name.eq(excluded(drivers::last_name)),
            drivers::phone.eq(excluded(drivers::phone)),
            drivers::is_available.eq(excluded(drivers::is_available)),
        ))
        .execute(conn)?;
    Ok(())
}

/// Opens or closes a route.
///
/// # Errors
///
/// Returns `NotFound` if the route does not exist.
pub fn set_route_status(
    conn: &mut SqliteConnection,
    route_id: RouteId,
    status: RouteStatus,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(routes::table.filter(routes::route_id.eq(route_id.value())))
        .set(routes::status.eq(status.as_str()))
        .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::NotFound(format!("route {route_id}")));
    }
    Ok(())
}

/// Marks a driver available or unavailable.
///
/// # Errors
///
/// Returns `NotFound` if the driver does not exist.
pub fn set_driver_available(
    conn: &mut SqliteConnection,
    driver_id: DriverId,
    is_available: bool,
) -> Result<(), PersistenceError> {
    let affected: usize =
        diesel::update(drivers::table.filter(drivers::driver_id.eq(driver_id.value())))
            .set(drivers::is_available.eq(flag(is_available)))
            .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::NotFound(format!("driver {driver_id}")));
    }
    Ok(())
}
