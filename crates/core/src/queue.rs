// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Queue operations: enqueue, boarding, departure, arrival, cancellation
//! and reassignment.
//!
//! Each function runs inside a caller-provided unit of work and takes the
//! route's queue lock before touching positions or seat counters.

use crate::command::EnqueueTrip;
use crate::error::CoreError;
use crate::lifecycle::cancel_paid_booking;
use crate::lookup;
use crate::outcome::{BookingRefund, TripCancellation};
use crate::store::UnitOfWork;
use time::OffsetDateTime;
use tracing::{debug, info};
use trip_queue_domain::{
    BoardingPolicy, Booking, DomainError, Driver, DriverId, NewTrip, Route, RouteId, Trip, TripId,
    TripStatus, Vehicle, VehicleId, close_gap, next_queue_position, plan_trip, resize_capacity,
    validate_driver, validate_queue, validate_vehicle,
};

/// Appends a new trip to the tail of its route's queue.
///
/// # Errors
///
/// Returns an error if:
/// - The route, vehicle or driver does not exist
/// - The route or vehicle is inactive, or the driver is unavailable
pub fn enqueue_trip(
    uow: &mut dyn UnitOfWork,
    request: &EnqueueTrip,
    policy: BoardingPolicy,
) -> Result<Trip, CoreError> {
    let route: Route = lookup::route(uow, request.route_id)?;
    let vehicle: Vehicle = lookup::vehicle(uow, request.vehicle_id)?;
    let driver: Driver = lookup::driver(uow, request.driver_id)?;

    uow.lock_route_queue(route.route_id)?;
    let route_trips: Vec<Trip> = uow.trips_for_route(route.route_id)?;
    let queue_position: u32 = next_queue_position(route.route_id, &route_trips);

    let new_trip: NewTrip = plan_trip(
        &route,
        &vehicle,
        &driver,
        queue_position,
        request.estimated_departure_time,
        policy,
    )?;
    let trip: Trip = uow.insert_trip(&new_trip)?;

    info!(
        trip_id = trip.trip_id.value(),
        route_id = trip.route_id.value(),
        queue_position = trip.queue_position,
        status = trip.status.as_str(),
        capacity = trip.capacity,
        "Enqueued trip"
    );
    Ok(trip)
}

/// Opens a waiting trip for bookings.
///
/// # Errors
///
/// Returns an error if the trip does not exist or is not `waiting`.
pub fn open_boarding(uow: &mut dyn UnitOfWork, trip_id: TripId) -> Result<Trip, CoreError> {
    let mut trip: Trip = lookup::locked_trip(uow, trip_id)?;
    trip.open_boarding()?;
    let trip: Trip = uow.update_trip(&trip)?;

    info!(trip_id = trip_id.value(), "Opened trip for boarding");
    Ok(trip)
}

/// Departs a boarding or full trip and moves every trip behind it forward.
///
/// # Errors
///
/// Returns an error if the trip does not exist or is not `boarding`/`full`.
pub fn advance_queue(
    uow: &mut dyn UnitOfWork,
    trip_id: TripId,
    now: OffsetDateTime,
) -> Result<Trip, CoreError> {
    let mut trip: Trip = lookup::locked_trip(uow, trip_id)?;
    let vacated_position: u32 = trip.queue_position;

    trip.mark_departed(now)?;
    let trip: Trip = uow.update_trip(&trip)?;
    renumber_route(uow, trip.route_id, vacated_position)?;

    info!(
        trip_id = trip_id.value(),
        route_id = trip.route_id.value(),
        seats_booked = trip.seats_booked,
        "Trip departed; queue advanced"
    );
    Ok(trip)
}

/// Records the arrival of a departed trip.
///
/// # Errors
///
/// Returns an error if the trip does not exist or is not `departed`.
pub fn mark_arrived(
    uow: &mut dyn UnitOfWork,
    trip_id: TripId,
    now: OffsetDateTime,
) -> Result<Trip, CoreError> {
    let mut trip: Trip = lookup::locked_trip(uow, trip_id)?;
    trip.mark_arrived(now)?;
    let trip: Trip = uow.update_trip(&trip)?;

    info!(trip_id = trip_id.value(), "Trip arrived");
    Ok(trip)
}

/// Cancels a queued trip that has no paid bookings.
///
/// # Errors
///
/// Returns an error if:
/// - The trip does not exist
/// - The trip is not queued
/// - The trip still has paid bookings
pub fn cancel_trip(uow: &mut dyn UnitOfWork, trip_id: TripId) -> Result<TripCancellation, CoreError> {
    let mut trip: Trip = lookup::locked_trip(uow, trip_id)?;
    trip.validate_transition(TripStatus::Cancelled)?;

    let paid_bookings: usize = uow
        .bookings_for_trip(trip_id)?
        .iter()
        .filter(|booking| booking.is_paid())
        .count();
    if paid_bookings > 0 {
        return Err(DomainError::TripHasPaidBookings {
            trip_id,
            paid_bookings,
        }
        .into());
    }

    let vacated_position: u32 = trip.queue_position;
    trip.mark_cancelled()?;
    let trip: Trip = uow.update_trip(&trip)?;
    renumber_route(uow, trip.route_id, vacated_position)?;

    info!(trip_id = trip_id.value(), "Cancelled trip");
    Ok(TripCancellation {
        trip,
        refunds: Vec::new(),
    })
}

/// Cancels a queued trip, refunding every paid booking on it.
///
/// # Errors
///
/// Returns an error if the trip does not exist or is not queued.
pub fn cancel_trip_with_refunds(
    uow: &mut dyn UnitOfWork,
    trip_id: TripId,
    now: OffsetDateTime,
) -> Result<TripCancellation, CoreError> {
    let mut trip: Trip = lookup::locked_trip(uow, trip_id)?;
    trip.validate_transition(TripStatus::Cancelled)?;

    let paid: Vec<Booking> = uow
        .bookings_for_trip(trip_id)?
        .into_iter()
        .filter(Booking::is_paid)
        .collect();

    let mut refunds: Vec<BookingRefund> = Vec::with_capacity(paid.len());
    for booking in paid {
        let (booking, refund) = cancel_paid_booking(uow, &mut trip, booking, now)?;
        refunds.push(BookingRefund {
            booking_id: booking.booking_id,
            ticket_reference: booking.ticket_reference,
            refund,
        });
    }

    let vacated_position: u32 = trip.queue_position;
    trip.mark_cancelled()?;
    let trip: Trip = uow.update_trip(&trip)?;
    renumber_route(uow, trip.route_id, vacated_position)?;

    info!(
        trip_id = trip_id.value(),
        refunded_bookings = refunds.len(),
        "Cancelled trip with refunds"
    );
    Ok(TripCancellation { trip, refunds })
}

/// Moves a queued trip onto another vehicle, resizing its seat inventory.
///
/// # Errors
///
/// Returns an error if:
/// - The trip or vehicle does not exist
/// - The trip is not queued or the vehicle is inactive
/// - The new vehicle has fewer seats than are already booked
pub fn reassign_vehicle(
    uow: &mut dyn UnitOfWork,
    trip_id: TripId,
    vehicle_id: VehicleId,
) -> Result<Trip, CoreError> {
    let vehicle: Vehicle = lookup::vehicle(uow, vehicle_id)?;
    validate_vehicle(&vehicle)?;

    let mut trip: Trip = lookup::locked_trip(uow, trip_id)?;
    trip.ensure_queued()?;
    resize_capacity(&mut trip, vehicle.capacity)?;
    trip.vehicle_id = vehicle_id;
    let trip: Trip = uow.update_trip(&trip)?;

    info!(
        trip_id = trip_id.value(),
        vehicle_id = vehicle_id.value(),
        capacity = trip.capacity,
        "Reassigned vehicle"
    );
    Ok(trip)
}

/// Assigns another driver to a queued trip.
///
/// # Errors
///
/// Returns an error if:
/// - The trip or driver does not exist
/// - The trip is not queued or the driver is unavailable
pub fn reassign_driver(
    uow: &mut dyn UnitOfWork,
    trip_id: TripId,
    driver_id: DriverId,
) -> Result<Trip, CoreError> {
    let driver: Driver = lookup::driver(uow, driver_id)?;
    validate_driver(&driver)?;

    let mut trip: Trip = lookup::locked_trip(uow, trip_id)?;
    trip.ensure_queued()?;
    trip.driver_id = driver_id;
    let trip: Trip = uow.update_trip(&trip)?;

    info!(
        trip_id = trip_id.value(),
        driver_id = driver_id.value(),
        "Reassigned driver"
    );
    Ok(trip)
}

/// Closes the gap left at `vacated_position` and re-checks the queue.
fn renumber_route(
    uow: &mut dyn UnitOfWork,
    route_id: RouteId,
    vacated_position: u32,
) -> Result<(), CoreError> {
    let mut route_trips: Vec<Trip> = uow.trips_for_route(route_id)?;
    let shifted: Vec<TripId> = close_gap(route_id, vacated_position, &mut route_trips);

    for trip in route_trips
        .iter()
        .filter(|trip| shifted.contains(&trip.trip_id))
    {
        uow.update_trip(trip)?;
    }
    validate_queue(route_id, &route_trips)?;

    debug!(
        route_id = route_id.value(),
        vacated_position,
        shifted = shifted.len(),
        "Renumbered route queue"
    );
    Ok(())
}
