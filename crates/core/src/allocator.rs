// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking allocation: route-level smart booking and direct trip booking.

use crate::command::BookingRequest;
use crate::error::CoreError;
use crate::lookup;
use crate::outcome::BookingConfirmation;
use crate::reference::ReferenceSource;
use crate::store::{StoreError, UnitOfWork};
use time::OffsetDateTime;
use tracing::{info, warn};
use trip_queue_domain::{
    Booking, DomainError, Money, NewBooking, NewPaymentRecord, Route, RouteId, TicketReference,
    Trip, TripId, book_seats, select_trip, total_amount, validate_passenger, validate_payment,
    validate_seat_count,
};

/// Everything an allocation needs besides the unit of work.
#[derive(Clone, Copy)]
pub struct AllocationContext<'a> {
    /// Booking date stamped on the booking and its charge.
    pub now: OffsetDateTime,
    /// Source of candidate ticket references.
    pub references: &'a dyn ReferenceSource,
    /// Candidates tried before giving up.
    pub reference_attempts: u32,
}

/// Books seats on the front-most boarding trip of a route that can hold
/// them.
///
/// Selection and the seat decrement happen under the route's queue lock.
///
/// # Errors
///
/// Returns an error if:
/// - The request is malformed
/// - The route does not exist or is inactive
/// - No boarding trip has enough free seats
/// - No unique ticket reference could be allocated
pub fn smart_book(
    uow: &mut dyn UnitOfWork,
    route_id: RouteId,
    request: &BookingRequest,
    ctx: AllocationContext<'_>,
) -> Result<BookingConfirmation, CoreError> {
    validate_request(request)?;

    let route: Route = lookup::route(uow, route_id)?;
    if !route.is_active() {
        return Err(DomainError::RouteInactive(route_id).into());
    }

    uow.lock_route_queue(route_id)?;
    let route_trips: Vec<Trip> = uow.trips_for_route(route_id)?;
    let chosen: Trip = select_trip(route_id, &route_trips, request.seat_count)?.clone();

    place_booking(uow, chosen, &route, request, ctx)
}

/// Books seats on a caller-chosen trip.
///
/// # Errors
///
/// Returns an error if:
/// - The request is malformed
/// - The trip or its route does not exist, or the route is inactive
/// - The trip is not boarding or lacks free seats
/// - No unique ticket reference could be allocated
pub fn book_for_trip(
    uow: &mut dyn UnitOfWork,
    trip_id: TripId,
    request: &BookingRequest,
    ctx: AllocationContext<'_>,
) -> Result<BookingConfirmation, CoreError> {
    validate_request(request)?;

    let trip: Trip = lookup::locked_trip(uow, trip_id)?;
    let route: Route = lookup::route(uow, trip.route_id)?;
    if !route.is_active() {
        return Err(DomainError::RouteInactive(route.route_id).into());
    }

    place_booking(uow, trip, &route, request, ctx)
}

fn validate_request(request: &BookingRequest) -> Result<(), DomainError> {
    validate_seat_count(request.seat_count)?;
    validate_passenger(&request.passenger)?;
    validate_payment(&request.payment)
}

fn place_booking(
    uow: &mut dyn UnitOfWork,
    mut trip: Trip,
    route: &Route,
    request: &BookingRequest,
    ctx: AllocationContext<'_>,
) -> Result<BookingConfirmation, CoreError> {
    book_seats(&mut trip, request.seat_count)?;
    let total: Money = total_amount(route.fare_price, request.seat_count)?;
    let trip: Trip = uow.update_trip(&trip)?;

    let booking: Booking =
        insert_with_unique_reference(uow, trip.trip_id, request, total, ctx)?;
    uow.append_payment(NewPaymentRecord::charge(&booking, &request.payment))?;

    info!(
        booking_id = booking.booking_id.value(),
        trip_id = trip.trip_id.value(),
        seats = request.seat_count,
        seats_available = trip.seats_available,
        total = %total,
        booking_type = request.booking_type.as_str(),
        "Booked seats"
    );
    Ok(BookingConfirmation {
        booking_id: booking.booking_id,
        trip_id: trip.trip_id,
        total_amount: total,
        ticket_reference: booking.ticket_reference,
    })
}

/// Inserts the booking under the first candidate reference nobody holds.
///
/// A candidate is rejected if the lookup finds it or if the store's unique
/// index refuses the insert.
fn insert_with_unique_reference(
    uow: &mut dyn UnitOfWork,
    trip_id: TripId,
    request: &BookingRequest,
    total: Money,
    ctx: AllocationContext<'_>,
) -> Result<Booking, CoreError> {
    for attempt in 1..=ctx.reference_attempts {
        let candidate: TicketReference = ctx.references.next_reference();
        if uow.ticket_reference_exists(&candidate)? {
            warn!(attempt, reference = %candidate, "Ticket reference collision");
            continue;
        }

        let new_booking: NewBooking = NewBooking {
            trip_id,
            passenger: request.passenger.clone(),
            seat_count: request.seat_count,
            booking_type: request.booking_type,
            total_amount: total,
            ticket_reference: candidate,
            booking_date: ctx.now,
        };
        match uow.insert_booking(new_booking) {
            Ok(booking) => return Ok(booking),
            Err(StoreError::UniqueViolation(detail)) => {
                warn!(attempt, %detail, "Ticket reference rejected by unique index");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(CoreError::DuplicateReference {
        attempts: ctx.reference_attempts,
    })
}
