// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read models computed from the canonical entities.
//!
//! Projections never write; they run inside their own read-only unit of
//! work so a projection always sees one consistent snapshot.

use crate::error::CoreError;
use crate::lookup;
use crate::outcome::InvariantReport;
use crate::store::UnitOfWork;
use serde::Serialize;
use time::OffsetDateTime;
use std::cmp::Reverse;
use trip_queue_domain::{
    Booking, BookingId, BookingType, DomainError, Driver, DriverId, Money, PaymentRecord, Route, RouteId,
    TicketReference, Trip, TripId, TripStatus, Vehicle, next_available_trip, validate_queue,
    verify_ledger, verify_paid_seats,
};

/// The queued trips of one route, front of the queue first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteQueue {
    pub route: Route,
    pub trips: Vec<Trip>,
}

/// Queue status across routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub routes: Vec<RouteQueue>,
}

/// One paid booking as it appears on a passenger manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub booking_id: BookingId,
    pub ticket_reference: TicketReference,
    pub passenger_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub seat_count: u32,
    pub booking_type: BookingType,
    pub total_amount: Money,
    #[serde(with = "time::serde::rfc3339")]
    pub booking_date: OffsetDateTime,
}

impl ManifestEntry {
    fn from_booking(booking: &Booking) -> Self {
        Self {
            booking_id: booking.booking_id,
            ticket_reference: booking.ticket_reference.clone(),
            passenger_name: booking.passenger.full_name(),
            email: booking.passenger.email.clone(),
            phone: booking.passenger.phone.clone(),
            seat_count: booking.seat_count,
            booking_type: booking.booking_type,
            total_amount: booking.total_amount,
            booking_date: booking.booking_date,
        }
    }
}

/// Paid passengers of a trip in booking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripManifest {
    pub trip: Trip,
    pub entries: Vec<ManifestEntry>,
    pub total_passengers: u32,
    pub total_bookings: usize,
}

/// A trip with its registry records and manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripDetails {
    pub trip: Trip,
    pub route: Route,
    pub vehicle: Vehicle,
    pub driver: Driver,
    pub manifest: Vec<ManifestEntry>,
    pub total_passengers: u32,
}

/// A booking with its trip, route and payment ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingDetails {
    pub booking: Booking,
    pub trip: Trip,
    pub route: Route,
    pub payments: Vec<PaymentRecord>,
}

/// A paid booking on a queued trip, joined with its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveBooking {
    pub booking: Booking,
    pub route_id: RouteId,
    pub trip_status: TripStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub estimated_departure_time: OffsetDateTime,
}

/// Queued trips per route, optionally restricted to one route.
///
/// # Errors
///
/// Returns `RouteNotFound` if `route_id` is given and unknown.
pub fn queue_status(
    uow: &mut dyn UnitOfWork,
    route_id: Option<RouteId>,
) -> Result<QueueStatus, CoreError> {
    let routes: Vec<Route> = match route_id {
        Some(id) => vec![lookup::route(uow, id)?],
        None => uow.list_routes()?,
    };

    let mut queues: Vec<RouteQueue> = Vec::with_capacity(routes.len());
    for route in routes {
        let mut trips: Vec<Trip> = uow
            .trips_for_route(route.route_id)?
            .into_iter()
            .filter(|trip| trip.status.is_queued())
            .collect();
        trips.sort_by_key(|trip| (trip.queue_position, trip.trip_id));
        queues.push(RouteQueue { route, trips });
    }

    Ok(QueueStatus { routes: queues })
}

/// Builds the manifest of a trip.
///
/// # Errors
///
/// Returns `TripNotFound` if the trip does not exist.
pub fn trip_manifest(
    uow: &mut dyn UnitOfWork,
    trip_id: TripId,
) -> Result<TripManifest, CoreError> {
    let trip: Trip = lookup::trip(uow, trip_id)?;
    let entries: Vec<ManifestEntry> = manifest_entries(uow, &trip)?;
    let total_passengers: u32 = entries.iter().map(|entry| entry.seat_count).sum();

    Ok(TripManifest {
        trip,
        total_bookings: entries.len(),
        entries,
        total_passengers,
    })
}

/// Loads a trip with its route, vehicle, driver and manifest.
///
/// # Errors
///
/// Returns a `NotFound` error if the trip or one of its registry records is
/// missing.
pub fn trip_details(
    uow: &mut dyn UnitOfWork,
    trip_id: TripId,
) -> Result<TripDetails, CoreError> {
    let trip: Trip = lookup::trip(uow, trip_id)?;
    let route: Route = lookup::route(uow, trip.route_id)?;
    let vehicle: Vehicle = lookup::vehicle(uow, trip.vehicle_id)?;
    let driver: Driver = lookup::driver(uow, trip.driver_id)?;
    let manifest: Vec<ManifestEntry> = manifest_entries(uow, &trip)?;
    let total_passengers: u32 = manifest.iter().map(|entry| entry.seat_count).sum();

    Ok(TripDetails {
        trip,
        route,
        vehicle,
        driver,
        manifest,
        total_passengers,
    })
}

fn manifest_entries(uow: &mut dyn UnitOfWork, trip: &Trip) -> Result<Vec<ManifestEntry>, CoreError> {
    let mut paid: Vec<Booking> = uow
        .bookings_for_trip(trip.trip_id)?
        .into_iter()
        .filter(Booking::is_paid)
        .collect();
    paid.sort_by_key(|booking| (booking.booking_date, booking.booking_id));
    Ok(paid.iter().map(ManifestEntry::from_booking).collect())
}

/// Loads a booking with its trip, route and payments.
///
/// # Errors
///
/// Returns a `NotFound` error if the booking, its trip or its route is
/// missing.
pub fn booking_details(
    uow: &mut dyn UnitOfWork,
    booking_id: BookingId,
) -> Result<BookingDetails, CoreError> {
    let booking: Booking = lookup::booking(uow, booking_id)?;
    details_for(uow, booking)
}

/// Looks a booking up by its ticket reference, in any letter case.
///
/// # Errors
///
/// Returns an error if the reference is malformed or unknown.
pub fn booking_by_reference(
    uow: &mut dyn UnitOfWork,
    reference: &str,
) -> Result<BookingDetails, CoreError> {
    let parsed: TicketReference = TicketReference::parse(reference)?;
    let booking: Booking = uow
        .find_booking_by_reference(&parsed)?
        .ok_or_else(|| DomainError::TicketReferenceNotFound(parsed.to_string()))?;
    details_for(uow, booking)
}

fn details_for(uow: &mut dyn UnitOfWork, booking: Booking) -> Result<BookingDetails, CoreError> {
    let trip: Trip = lookup::trip(uow, booking.trip_id)?;
    let route: Route = lookup::route(uow, trip.route_id)?;
    let payments: Vec<PaymentRecord> = uow.payments_for_booking(booking.booking_id)?;

    Ok(BookingDetails {
        booking,
        trip,
        route,
        payments,
    })
}

/// Bookings of a passenger email, newest first.
///
/// # Errors
///
/// Returns `InvalidPassenger` if the email is blank.
pub fn search_by_email(uow: &mut dyn UnitOfWork, email: &str) -> Result<Vec<Booking>, CoreError> {
    let email: &str = email.trim();
    if email.is_empty() {
        return Err(DomainError::InvalidPassenger(String::from("Email cannot be empty")).into());
    }
    Ok(uow.bookings_by_email(email)?)
}

/// Bookings whose passenger name contains `fragment`, newest first.
///
/// # Errors
///
/// Returns `InvalidPassenger` if the fragment is blank.
pub fn search_by_name(uow: &mut dyn UnitOfWork, fragment: &str) -> Result<Vec<Booking>, CoreError> {
    let fragment: &str = fragment.trim();
    if fragment.is_empty() {
        return Err(
            DomainError::InvalidPassenger(String::from("Name search cannot be empty")).into(),
        );
    }
    Ok(uow.bookings_by_passenger_name(fragment)?)
}

/// The most recent cancellations, newest first.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn cancellation_history(
    uow: &mut dyn UnitOfWork,
    limit: usize,
) -> Result<Vec<Booking>, CoreError> {
    Ok(uow.cancelled_bookings(limit)?)
}

/// The newest ledger entry of a booking, if any.
///
/// # Errors
///
/// Returns `BookingNotFound` if the booking does not exist.
pub fn latest_payment(
    uow: &mut dyn UnitOfWork,
    booking_id: BookingId,
) -> Result<Option<PaymentRecord>, CoreError> {
    lookup::booking(uow, booking_id)?;
    Ok(uow
        .payments_for_booking(booking_id)?
        .into_iter()
        .max_by_key(|record| (record.payment_datetime, record.payment_id)))
}

/// The trip a route-level booking would currently land on, ignoring seat
/// count.
///
/// # Errors
///
/// Returns `RouteNotFound` if the route does not exist.
pub fn next_trip(uow: &mut dyn UnitOfWork, route_id: RouteId) -> Result<Option<Trip>, CoreError> {
    let route: Route = lookup::route(uow, route_id)?;
    if !route.is_active() {
        return Ok(None);
    }
    let trips: Vec<Trip> = uow.trips_for_route(route_id)?;
    Ok(next_available_trip(route_id, &trips).cloned())
}

/// Trips of a route currently taking bookings, earliest departure first.
///
/// # Errors
///
/// Returns `RouteNotFound` if the route does not exist.
pub fn available_trips(uow: &mut dyn UnitOfWork, route_id: RouteId) -> Result<Vec<Trip>, CoreError> {
    let route: Route = lookup::route(uow, route_id)?;
    if !route.is_active() {
        return Ok(Vec::new());
    }
    let mut trips: Vec<Trip> = uow
        .trips_for_route(route_id)?
        .into_iter()
        .filter(|trip| {
            trip.is_accepting_bookings
                && matches!(trip.status, TripStatus::Boarding | TripStatus::Full)
        })
        .collect();
    trips.sort_by_key(|trip| (trip.estimated_departure_time, trip.queue_position));
    Ok(trips)
}

/// The trip a driver is working now: the queued or departed trip with the
/// earliest estimated departure.
///
/// # Errors
///
/// Returns `DriverNotFound` if the driver does not exist.
pub fn current_trip_for_driver(
    uow: &mut dyn UnitOfWork,
    driver_id: DriverId,
) -> Result<Option<Trip>, CoreError> {
    lookup::driver(uow, driver_id)?;
    Ok(uow
        .trips_for_driver(driver_id)?
        .into_iter()
        .find(|trip| trip.status.is_queued() || trip.status == TripStatus::Departed))
}

/// Queued trips of a driver, earliest estimated departure first.
///
/// # Errors
///
/// Returns `DriverNotFound` if the driver does not exist.
pub fn upcoming_trips_for_driver(
    uow: &mut dyn UnitOfWork,
    driver_id: DriverId,
) -> Result<Vec<Trip>, CoreError> {
    lookup::driver(uow, driver_id)?;
    Ok(uow
        .trips_for_driver(driver_id)?
        .into_iter()
        .filter(|trip| trip.status.is_queued())
        .collect())
}

/// Departed and arrived trips of a driver, latest actual departure first,
/// at most `limit` of them.
///
/// # Errors
///
/// Returns `DriverNotFound` if the driver does not exist.
pub fn trip_history_for_driver(
    uow: &mut dyn UnitOfWork,
    driver_id: DriverId,
    limit: usize,
) -> Result<Vec<Trip>, CoreError> {
    lookup::driver(uow, driver_id)?;
    let mut history: Vec<Trip> = uow
        .trips_for_driver(driver_id)?
        .into_iter()
        .filter(|trip| matches!(trip.status, TripStatus::Departed | TripStatus::Arrived))
        .collect();
    history.sort_by_key(|trip| Reverse((trip.actual_departure_datetime, trip.trip_id)));
    history.truncate(limit);
    Ok(history)
}

/// Active routes ordered by destination.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn active_routes(uow: &mut dyn UnitOfWork) -> Result<Vec<Route>, CoreError> {
    let mut routes: Vec<Route> = uow
        .list_routes()?
        .into_iter()
        .filter(Route::is_active)
        .collect();
    routes.sort_by(|a, b| {
        a.destination
            .cmp(&b.destination)
            .then(a.route_id.cmp(&b.route_id))
    });
    Ok(routes)
}

/// Paid bookings on queued trips, by departure then booking date.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn active_bookings(uow: &mut dyn UnitOfWork) -> Result<Vec<ActiveBooking>, CoreError> {
    let mut active: Vec<ActiveBooking> = Vec::new();
    for trip in uow.queued_trips()? {
        for booking in uow.bookings_for_trip(trip.trip_id)? {
            if booking.is_paid() {
                active.push(ActiveBooking {
                    booking,
                    route_id: trip.route_id,
                    trip_status: trip.status,
                    estimated_departure_time: trip.estimated_departure_time,
                });
            }
        }
    }
    active.sort_by_key(|entry| {
        (
            entry.estimated_departure_time,
            entry.booking.booking_date,
            entry.booking.booking_id,
        )
    });
    Ok(active)
}

/// Re-checks every seat ledger, paid-seat sum and route queue.
///
/// # Errors
///
/// Returns an `Internal`-kind error describing the first violation.
pub fn verify_invariants(uow: &mut dyn UnitOfWork) -> Result<InvariantReport, CoreError> {
    let trips: Vec<Trip> = uow.all_trips()?;
    for trip in &trips {
        verify_ledger(trip)?;
        let paid_seats: u32 = uow
            .bookings_for_trip(trip.trip_id)?
            .iter()
            .filter(|booking| booking.is_paid())
            .map(|booking| booking.seat_count)
            .sum();
        verify_paid_seats(trip, paid_seats)?;
    }

    let routes: Vec<Route> = uow.list_routes()?;
    for route in &routes {
        let route_trips: Vec<Trip> = uow.trips_for_route(route.route_id)?;
        validate_queue(route.route_id, &route_trips)?;
    }

    Ok(InvariantReport {
        trips_checked: trips.len(),
        routes_checked: routes.len(),
    })
}
