// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Load-or-`NotFound` helpers shared by the operations.

use crate::error::CoreError;
use crate::store::UnitOfWork;
use trip_queue_domain::{
    Booking, BookingId, DomainError, Driver, DriverId, Route, RouteId, Trip, TripId, Vehicle,
    VehicleId,
};

pub fn route(uow: &mut dyn UnitOfWork, route_id: RouteId) -> Result<Route, CoreError> {
    Ok(uow
        .find_route(route_id)?
        .ok_or(DomainError::RouteNotFound(route_id))?)
}

pub fn vehicle(uow: &mut dyn UnitOfWork, vehicle_id: VehicleId) -> Result<Vehicle, CoreError> {
    Ok(uow
        .find_vehicle(vehicle_id)?
        .ok_or(DomainError::VehicleNotFound(vehicle_id))?)
}

pub fn driver(uow: &mut dyn UnitOfWork, driver_id: DriverId) -> Result<Driver, CoreError> {
    Ok(uow
        .find_driver(driver_id)?
        .ok_or(DomainError::DriverNotFound(driver_id))?)
}

pub fn trip(uow: &mut dyn UnitOfWork, trip_id: TripId) -> Result<Trip, CoreError> {
    Ok(uow
        .find_trip(trip_id)?
        .ok_or(DomainError::TripNotFound(trip_id))?)
}

pub fn booking(uow: &mut dyn UnitOfWork, booking_id: BookingId) -> Result<Booking, CoreError> {
    Ok(uow
        .find_booking(booking_id)?
        .ok_or(DomainError::BookingNotFound(booking_id))?)
}

/// Loads a trip, takes its route's queue lock, then reloads it so the
/// returned copy reflects every write committed before the lock.
pub fn locked_trip(uow: &mut dyn UnitOfWork, trip_id: TripId) -> Result<Trip, CoreError> {
    let unlocked: Trip = trip(uow, trip_id)?;
    uow.lock_route_queue(unlocked.route_id)?;
    trip(uow, trip_id)
}
