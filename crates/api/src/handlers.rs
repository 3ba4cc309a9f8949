// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every handler takes plain identifiers and request DTOs, calls exactly one
//! engine operation and translates the outcome into a response DTO or an
//! [`ApiError`]. State-changing handlers run through a [`RetryPolicy`] so a
//! lost concurrency race is repeated before it reaches the caller.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use trip_queue::{BookingRequest, CoreError, EnqueueTrip, Engine, Store};
use trip_queue_domain::{
    BookingId, BookingType, DriverId, PassengerInfo, PaymentInfo, RouteId, TripId, VehicleId,
};

use crate::csv_export::manifest_to_csv;
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    ActiveBookingInfo, BookingCancellationResponse, BookingConfirmationResponse, BookingInfo,
    BookingDetailsResponse, CancellationHistoryQuery, CreateBookingRequest, DriverTripResponse,
    EmailSearchQuery, EnqueueTripRequest, InvariantReportResponse, LatestPaymentResponse,
    NameSearchQuery, NextTripResponse, PaymentRecordInfo, QueueStatusResponse,
    ReassignDriverRequest, ReassignVehicleRequest, RouteInfo, TripCancellationResponse,
    TripDetailsResponse, TripHistoryQuery, TripInfo, TripManifestResponse,
};
use crate::retry::RetryPolicy;

/// Cancellation history length when the caller does not ask for one.
pub const DEFAULT_HISTORY_LIMIT: usize = trip_queue::DEFAULT_CANCELLATION_HISTORY_LIMIT;

/// Driver trip history length when the caller does not ask for one.
pub const DEFAULT_DRIVER_HISTORY_LIMIT: usize = trip_queue::DEFAULT_TRIP_HISTORY_LIMIT;

fn parse_timestamp(field: &str, value: &str) -> Result<OffsetDateTime, ApiError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| {
        ApiError::invalid_input(field, &format!("'{value}' is not an RFC 3339 timestamp: {e}"))
    })
}

/// Converts a booking DTO into an engine request.
///
/// `default_type` applies when the request does not name a booking type.
fn booking_request(
    request: &CreateBookingRequest,
    default_type: BookingType,
) -> Result<BookingRequest, ApiError> {
    let booking_type: BookingType = match request.booking_type.as_deref() {
        Some(value) => value.parse().map_err(translate_domain_error)?,
        None => default_type,
    };

    Ok(BookingRequest {
        passenger: PassengerInfo {
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
        },
        seat_count: request.seat_count,
        payment: PaymentInfo {
            method: request.payment_method.clone(),
            reference: request.payment_reference.clone(),
        },
        booking_type,
    })
}

fn write<T, F>(retry: &RetryPolicy, operation: F) -> Result<T, ApiError>
where
    F: FnMut() -> Result<T, CoreError>,
{
    retry.run(operation).map_err(translate_core_error)
}

// ============================================================================
// Queue management
// ============================================================================

/// Appends a trip to the tail of a route's queue.
///
/// # Errors
///
/// Returns an error if the departure time is malformed, or the route,
/// vehicle or driver is unknown or unusable.
pub fn enqueue_trip<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    request: &EnqueueTripRequest,
) -> Result<TripInfo, ApiError> {
    let command: EnqueueTrip = EnqueueTrip {
        route_id: RouteId::new(request.route_id),
        vehicle_id: VehicleId::new(request.vehicle_id),
        driver_id: DriverId::new(request.driver_id),
        estimated_departure_time: parse_timestamp(
            "estimated_departure_time",
            &request.estimated_departure_time,
        )?,
    };

    let trip = write(retry, || engine.enqueue_trip(&command))?;
    Ok(TripInfo::from(&trip))
}

/// Opens a waiting trip for bookings.
///
/// # Errors
///
/// Returns an error if the trip is unknown or not waiting.
pub fn open_boarding<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    trip_id: i64,
) -> Result<TripInfo, ApiError> {
    let trip = write(retry, || engine.open_boarding(TripId::new(trip_id)))?;
    Ok(TripInfo::from(&trip))
}

/// Departs a trip and moves the rest of its route's queue up.
///
/// # Errors
///
/// Returns an error if the trip is unknown or not boarding or full.
pub fn depart_trip<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    trip_id: i64,
) -> Result<TripInfo, ApiError> {
    let trip = write(retry, || engine.advance_queue(TripId::new(trip_id)))?;
    Ok(TripInfo::from(&trip))
}

/// Records a departed trip's arrival.
///
/// # Errors
///
/// Returns an error if the trip is unknown or has not departed.
pub fn mark_arrived<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    trip_id: i64,
) -> Result<TripInfo, ApiError> {
    let trip = write(retry, || engine.mark_arrived(TripId::new(trip_id)))?;
    Ok(TripInfo::from(&trip))
}

/// Cancels a queued trip that has no paid bookings.
///
/// # Errors
///
/// Returns an error if the trip is unknown, not queued or has paid
/// bookings.
pub fn cancel_trip<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    trip_id: i64,
) -> Result<TripCancellationResponse, ApiError> {
    let cancellation = write(retry, || engine.cancel_trip(TripId::new(trip_id)))?;
    Ok(TripCancellationResponse::from(&cancellation))
}

/// Cancels a queued trip and refunds every paid booking on it.
///
/// # Errors
///
/// Returns an error if the trip is unknown or not queued.
pub fn cancel_trip_with_refunds<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    trip_id: i64,
) -> Result<TripCancellationResponse, ApiError> {
    let cancellation = write(retry, || {
        engine.cancel_trip_with_refunds(TripId::new(trip_id))
    })?;
    Ok(TripCancellationResponse::from(&cancellation))
}

/// Moves a queued trip onto another vehicle.
///
/// # Errors
///
/// Returns an error if the trip or vehicle is unknown, the trip is not
/// queued, or the vehicle is inactive or too small for the booked seats.
pub fn reassign_vehicle<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    trip_id: i64,
    request: &ReassignVehicleRequest,
) -> Result<TripInfo, ApiError> {
    let trip = write(retry, || {
        engine.reassign_vehicle(TripId::new(trip_id), VehicleId::new(request.vehicle_id))
    })?;
    Ok(TripInfo::from(&trip))
}

/// Assigns another driver to a queued trip.
///
/// # Errors
///
/// Returns an error if the trip or driver is unknown, the trip is not
/// queued or the driver is unavailable.
pub fn reassign_driver<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    trip_id: i64,
    request: &ReassignDriverRequest,
) -> Result<TripInfo, ApiError> {
    let trip = write(retry, || {
        engine.reassign_driver(TripId::new(trip_id), DriverId::new(request.driver_id))
    })?;
    Ok(TripInfo::from(&trip))
}

// ============================================================================
// Bookings
// ============================================================================

/// Books seats on the front-most boarding trip of a route.
///
/// Without an explicit booking type the booking is recorded as `online`.
///
/// # Errors
///
/// Returns an error if the request is malformed, the route is unknown or
/// inactive, or no trip can hold the seats.
pub fn smart_book<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    route_id: i64,
    request: &CreateBookingRequest,
) -> Result<BookingConfirmationResponse, ApiError> {
    let booking: BookingRequest = booking_request(request, BookingType::Online)?;
    let confirmation = write(retry, || {
        engine.smart_book(RouteId::new(route_id), &booking)
    })?;
    Ok(BookingConfirmationResponse::from(&confirmation))
}

/// Books seats on a specific trip.
///
/// Without an explicit booking type the booking is recorded as `walk-in`.
///
/// # Errors
///
/// Returns an error if the request is malformed, or the trip is unknown,
/// not boarding or lacks seats.
pub fn book_for_trip<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    trip_id: i64,
    request: &CreateBookingRequest,
) -> Result<BookingConfirmationResponse, ApiError> {
    let booking: BookingRequest = booking_request(request, BookingType::WalkIn)?;
    let confirmation = write(retry, || {
        engine.book_for_trip(TripId::new(trip_id), &booking)
    })?;
    Ok(BookingConfirmationResponse::from(&confirmation))
}

/// Cancels a paid booking and refunds it.
///
/// # Errors
///
/// Returns an error if the booking is unknown or already cancelled.
pub fn cancel_booking<S: Store>(
    engine: &Engine<S>,
    retry: &RetryPolicy,
    booking_id: i64,
) -> Result<BookingCancellationResponse, ApiError> {
    let cancellation = write(retry, || {
        engine.cancel_booking(BookingId::new(booking_id))
    })?;
    Ok(BookingCancellationResponse::from(&cancellation))
}

// ============================================================================
// Read-only queries
// ============================================================================

/// Queued trips per route, or for one route.
///
/// # Errors
///
/// Returns `NotFound` if a given route is unknown.
pub fn get_queue_status<S: Store>(
    engine: &Engine<S>,
    route_id: Option<i64>,
) -> Result<QueueStatusResponse, ApiError> {
    let status = engine
        .queue_status(route_id.map(RouteId::new))
        .map_err(translate_core_error)?;
    Ok(QueueStatusResponse::from(&status))
}

/// A trip with its registry records and manifest.
///
/// # Errors
///
/// Returns `NotFound` if the trip is unknown.
pub fn get_trip_details<S: Store>(
    engine: &Engine<S>,
    trip_id: i64,
) -> Result<TripDetailsResponse, ApiError> {
    let details = engine
        .trip_details(TripId::new(trip_id))
        .map_err(translate_core_error)?;
    Ok(TripDetailsResponse::from(&details))
}

/// The passenger manifest of a trip.
///
/// # Errors
///
/// Returns `NotFound` if the trip is unknown.
pub fn get_trip_manifest<S: Store>(
    engine: &Engine<S>,
    trip_id: i64,
) -> Result<TripManifestResponse, ApiError> {
    let manifest = engine
        .trip_manifest(TripId::new(trip_id))
        .map_err(translate_core_error)?;
    Ok(TripManifestResponse::from(&manifest))
}

/// The passenger manifest of a trip as CSV text.
///
/// # Errors
///
/// Returns `NotFound` if the trip is unknown.
pub fn export_trip_manifest_csv<S: Store>(
    engine: &Engine<S>,
    trip_id: i64,
) -> Result<String, ApiError> {
    let manifest = engine
        .trip_manifest(TripId::new(trip_id))
        .map_err(translate_core_error)?;
    manifest_to_csv(&manifest)
}

/// A booking with its trip, route and payments.
///
/// # Errors
///
/// Returns `NotFound` if the booking is unknown.
pub fn get_booking_details<S: Store>(
    engine: &Engine<S>,
    booking_id: i64,
) -> Result<BookingDetailsResponse, ApiError> {
    let details = engine
        .booking_details(BookingId::new(booking_id))
        .map_err(translate_core_error)?;
    Ok(BookingDetailsResponse::from(&details))
}

/// Looks a booking up by its ticket reference.
///
/// # Errors
///
/// Returns `InvalidInput` for a malformed reference and `NotFound` for an
/// unknown one.
pub fn get_booking_by_reference<S: Store>(
    engine: &Engine<S>,
    ticket_reference: &str,
) -> Result<BookingDetailsResponse, ApiError> {
    let details = engine
        .booking_by_reference(ticket_reference)
        .map_err(translate_core_error)?;
    Ok(BookingDetailsResponse::from(&details))
}

/// The newest payment ledger entry of a booking.
///
/// # Errors
///
/// Returns `NotFound` if the booking is unknown.
pub fn get_latest_payment<S: Store>(
    engine: &Engine<S>,
    booking_id: i64,
) -> Result<LatestPaymentResponse, ApiError> {
    let payment = engine
        .latest_payment(BookingId::new(booking_id))
        .map_err(translate_core_error)?;
    Ok(LatestPaymentResponse {
        booking_id,
        payment: payment.as_ref().map(PaymentRecordInfo::from),
    })
}

/// Bookings made under an email address, newest first.
///
/// # Errors
///
/// Returns `InvalidInput` if the email is blank.
pub fn search_bookings_by_email<S: Store>(
    engine: &Engine<S>,
    query: &EmailSearchQuery,
) -> Result<Vec<BookingInfo>, ApiError> {
    let bookings = engine
        .search_bookings_by_email(&query.email)
        .map_err(translate_core_error)?;
    Ok(bookings.iter().map(BookingInfo::from).collect())
}

/// Bookings whose passenger name contains a fragment, newest first.
///
/// # Errors
///
/// Returns `InvalidInput` if the fragment is blank.
pub fn search_bookings_by_name<S: Store>(
    engine: &Engine<S>,
    query: &NameSearchQuery,
) -> Result<Vec<BookingInfo>, ApiError> {
    let bookings = engine
        .search_bookings_by_name(&query.name)
        .map_err(translate_core_error)?;
    Ok(bookings.iter().map(BookingInfo::from).collect())
}

/// The most recent cancellations.
///
/// # Errors
///
/// Returns `InvalidInput` if the limit is zero.
pub fn get_cancellation_history<S: Store>(
    engine: &Engine<S>,
    query: &CancellationHistoryQuery,
) -> Result<Vec<BookingInfo>, ApiError> {
    let limit: usize = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 {
        return Err(ApiError::invalid_input("limit", "must be at least 1"));
    }

    let bookings = engine
        .cancellation_history(limit)
        .map_err(translate_core_error)?;
    Ok(bookings.iter().map(BookingInfo::from).collect())
}

/// The trip a route booking would currently land on.
///
/// # Errors
///
/// Returns `NotFound` if the route is unknown.
pub fn get_next_available_trip<S: Store>(
    engine: &Engine<S>,
    route_id: i64,
) -> Result<NextTripResponse, ApiError> {
    let trip = engine
        .next_available_trip(RouteId::new(route_id))
        .map_err(translate_core_error)?;
    Ok(NextTripResponse {
        route_id,
        trip: trip.as_ref().map(TripInfo::from),
    })
}

/// Trips of a route that take bookings, earliest departure first.
///
/// # Errors
///
/// Returns `NotFound` if the route is unknown.
pub fn get_available_trips<S: Store>(
    engine: &Engine<S>,
    route_id: i64,
) -> Result<Vec<TripInfo>, ApiError> {
    let trips = engine
        .available_trips(RouteId::new(route_id))
        .map_err(translate_core_error)?;
    Ok(trips.iter().map(TripInfo::from).collect())
}

/// The trip a driver is working now.
///
/// # Errors
///
/// Returns `NotFound` if the driver is unknown.
pub fn get_current_trip_for_driver<S: Store>(
    engine: &Engine<S>,
    driver_id: i64,
) -> Result<DriverTripResponse, ApiError> {
    let trip = engine
        .current_trip_for_driver(DriverId::new(driver_id))
        .map_err(translate_core_error)?;
    Ok(DriverTripResponse {
        driver_id,
        trip: trip.as_ref().map(TripInfo::from),
    })
}

/// Queued trips of a driver, earliest departure first.
///
/// # Errors
///
/// Returns `NotFound` if the driver is unknown.
pub fn get_upcoming_trips_for_driver<S: Store>(
    engine: &Engine<S>,
    driver_id: i64,
) -> Result<Vec<TripInfo>, ApiError> {
    let trips = engine
        .upcoming_trips_for_driver(DriverId::new(driver_id))
        .map_err(translate_core_error)?;
    Ok(trips.iter().map(TripInfo::from).collect())
}

/// Departed and arrived trips of a driver, latest departure first.
///
/// # Errors
///
/// Returns `InvalidInput` if the limit is zero, or `NotFound` if the driver
/// is unknown.
pub fn get_trip_history_for_driver<S: Store>(
    engine: &Engine<S>,
    driver_id: i64,
    query: &TripHistoryQuery,
) -> Result<Vec<TripInfo>, ApiError> {
    let limit: usize = query.limit.unwrap_or(DEFAULT_DRIVER_HISTORY_LIMIT);
    if limit == 0 {
        return Err(ApiError::invalid_input("limit", "must be at least 1"));
    }

    let trips = engine
        .trip_history_for_driver(DriverId::new(driver_id), limit)
        .map_err(translate_core_error)?;
    Ok(trips.iter().map(TripInfo::from).collect())
}

/// Active routes ordered by destination.
///
/// # Errors
///
/// Returns `Internal` if the store fails.
pub fn list_active_routes<S: Store>(engine: &Engine<S>) -> Result<Vec<RouteInfo>, ApiError> {
    let routes = engine.active_routes().map_err(translate_core_error)?;
    Ok(routes.iter().map(RouteInfo::from).collect())
}

/// Paid bookings on queued trips.
///
/// # Errors
///
/// Returns `Internal` if the store fails.
pub fn list_active_bookings<S: Store>(
    engine: &Engine<S>,
) -> Result<Vec<ActiveBookingInfo>, ApiError> {
    let bookings = engine.active_bookings().map_err(translate_core_error)?;
    Ok(bookings.iter().map(ActiveBookingInfo::from).collect())
}

/// Audits every seat ledger and route queue.
///
/// # Errors
///
/// Returns `Internal` describing the first violation found.
pub fn verify_invariants<S: Store>(
    engine: &Engine<S>,
) -> Result<InvariantReportResponse, ApiError> {
    let report = engine.verify_invariants().map_err(translate_core_error)?;
    Ok(InvariantReportResponse::from(&report))
}
