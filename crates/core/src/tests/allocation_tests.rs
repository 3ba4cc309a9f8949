// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Smart booking and direct trip booking.

use super::helpers::{
    BUS, INACTIVE_ROUTE, MAIN_ROUTE, SECOND_VAN, SIDE_ROUTE, SMALL_CAR, SequenceReferenceSource,
    VAN, create_test_engine, create_test_engine_with, create_test_request, enqueue, trip,
};
use crate::{BookingConfirmation, BookingRequest, CoreError, EngineConfig};
use std::sync::Arc;
use trip_queue_domain::{
    BoardingPolicy, BookingType, DomainError, ErrorKind, Money, RouteId, TicketReference, Trip,
    TripStatus,
};

// ============================================================================
// Smart booking
// ============================================================================

#[test]
fn test_smart_book_charges_fare_per_seat() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);

    let confirmation: BookingConfirmation =
        engine.smart_book(MAIN_ROUTE, &create_test_request(7)).unwrap();

    assert_eq!(confirmation.trip_id, first.trip_id);
    assert_eq!(confirmation.total_amount, Money::from_minor_units(70_000));

    let after: Trip = trip(&engine, first.trip_id);
    assert_eq!(after.seats_available, 3);
    assert_eq!(after.seats_booked, 7);
    assert_eq!(after.status, TripStatus::Boarding);
    assert!(after.is_accepting_bookings);
}

#[test]
fn test_smart_book_without_room_fails_no_available_trip() {
    let engine = create_test_engine();
    enqueue(&engine, MAIN_ROUTE, VAN);
    engine.smart_book(MAIN_ROUTE, &create_test_request(7)).unwrap();

    let result = engine.smart_book(MAIN_ROUTE, &create_test_request(5));

    let err: CoreError = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoAvailableTrip);
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::NoAvailableTrip { requested: 5, .. })
    ));
}

#[test]
fn test_smart_book_skips_front_trip_without_enough_seats() {
    let engine = create_test_engine();
    let front: Trip = enqueue(&engine, MAIN_ROUTE, SMALL_CAR);
    let second: Trip = enqueue(&engine, MAIN_ROUTE, VAN);

    let confirmation: BookingConfirmation =
        engine.smart_book(MAIN_ROUTE, &create_test_request(6)).unwrap();

    assert_eq!(confirmation.trip_id, second.trip_id);
    assert_eq!(trip(&engine, front.trip_id).seats_available, 4);
}

#[test]
fn test_smart_book_prefers_front_of_queue() {
    let engine = create_test_engine();
    let front: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    enqueue(&engine, MAIN_ROUTE, BUS);

    let confirmation: BookingConfirmation =
        engine.smart_book(MAIN_ROUTE, &create_test_request(2)).unwrap();

    assert_eq!(confirmation.trip_id, front.trip_id);
}

#[test]
fn test_smart_book_ignores_other_routes() {
    let engine = create_test_engine();
    enqueue(&engine, SIDE_ROUTE, VAN);

    let result = engine.smart_book(MAIN_ROUTE, &create_test_request(1));

    assert_eq!(result.unwrap_err().kind(), ErrorKind::NoAvailableTrip);
}

#[test]
fn test_smart_book_moves_to_next_trip_once_front_is_full() {
    let engine = create_test_engine();
    let front: Trip = enqueue(&engine, MAIN_ROUTE, SMALL_CAR);
    let second: Trip = enqueue(&engine, MAIN_ROUTE, VAN);

    let filled: BookingConfirmation =
        engine.smart_book(MAIN_ROUTE, &create_test_request(4)).unwrap();
    let spilled: BookingConfirmation =
        engine.smart_book(MAIN_ROUTE, &create_test_request(1)).unwrap();

    assert_eq!(filled.trip_id, front.trip_id);
    assert_eq!(spilled.trip_id, second.trip_id);
    assert_eq!(trip(&engine, front.trip_id).status, TripStatus::Full);
}

#[test]
fn test_smart_book_skips_waiting_trips() {
    let engine = create_test_engine_with(EngineConfig {
        boarding_policy: BoardingPolicy::Manual,
        ..EngineConfig::default()
    });
    let waiting: Trip = enqueue(&engine, MAIN_ROUTE, VAN);

    let result = engine.smart_book(MAIN_ROUTE, &create_test_request(1));
    assert_eq!(result.unwrap_err().kind(), ErrorKind::NoAvailableTrip);

    engine.open_boarding(waiting.trip_id).unwrap();
    let confirmation: BookingConfirmation =
        engine.smart_book(MAIN_ROUTE, &create_test_request(1)).unwrap();
    assert_eq!(confirmation.trip_id, waiting.trip_id);
}

#[test]
fn test_smart_book_unknown_route_fails_not_found() {
    let engine = create_test_engine();

    let result = engine.smart_book(RouteId::new(99), &create_test_request(1));

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::RouteNotFound(_))
    ));
}

#[test]
fn test_smart_book_inactive_route_fails_invalid_state() {
    let engine = create_test_engine();

    let result = engine.smart_book(INACTIVE_ROUTE, &create_test_request(1));

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::RouteInactive(_))
    ));
}

#[test]
fn test_smart_book_rejects_zero_seats() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);

    let result = engine.smart_book(MAIN_ROUTE, &create_test_request(0));

    assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(trip(&engine, first.trip_id).seats_available, 10);
}

#[test]
fn test_smart_book_rejects_malformed_email() {
    let engine = create_test_engine();
    enqueue(&engine, MAIN_ROUTE, VAN);
    let mut request: BookingRequest = create_test_request(1);
    request.passenger.email = String::from("not-an-email");

    let result = engine.smart_book(MAIN_ROUTE, &request);

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::InvalidPassenger(_))
    ));
}

// ============================================================================
// Direct booking
// ============================================================================

#[test]
fn test_book_for_trip_fills_trip_then_rejects() {
    let engine = create_test_engine();
    let small: Trip = enqueue(&engine, MAIN_ROUTE, SMALL_CAR);

    engine
        .book_for_trip(small.trip_id, &create_test_request(4))
        .unwrap();

    let full: Trip = trip(&engine, small.trip_id);
    assert_eq!(full.seats_available, 0);
    assert_eq!(full.status, TripStatus::Full);
    assert!(!full.is_accepting_bookings);

    let err: CoreError = engine
        .book_for_trip(small.trip_id, &create_test_request(1))
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::SeatUnavailable | ErrorKind::InvalidState
    ));
    assert_eq!(trip(&engine, small.trip_id).seats_booked, 4);
}

#[test]
fn test_book_for_trip_more_than_available_fails_seat_unavailable() {
    let engine = create_test_engine();
    let small: Trip = enqueue(&engine, MAIN_ROUTE, SMALL_CAR);

    let err: CoreError = engine
        .book_for_trip(small.trip_id, &create_test_request(5))
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::SeatUnavailable {
            requested: 5,
            available: 4,
            ..
        })
    ));
}

#[test]
fn test_book_for_trip_records_walk_in_booking() {
    let engine = create_test_engine();
    let van: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    let mut request: BookingRequest = create_test_request(2);
    request.booking_type = BookingType::WalkIn;
    request.payment.method = String::from("cash");
    request.payment.reference = None;

    let confirmation: BookingConfirmation = engine.book_for_trip(van.trip_id, &request).unwrap();

    let details = engine.booking_details(confirmation.booking_id).unwrap();
    assert_eq!(details.booking.booking_type, BookingType::WalkIn);
    assert_eq!(details.payments.len(), 1);
    assert_eq!(details.payments[0].amount, Money::from_minor_units(20_000));
    assert_eq!(details.payments[0].method, "cash");
}

#[test]
fn test_book_for_departed_trip_fails_invalid_state() {
    let engine = create_test_engine();
    let van: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    engine.advance_queue(van.trip_id).unwrap();

    let err: CoreError = engine
        .book_for_trip(van.trip_id, &create_test_request(1))
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::TripNotAcceptingBookings { .. })
    ));
}

#[test]
fn test_book_for_waiting_trip_fails_invalid_state() {
    let engine = create_test_engine_with(EngineConfig {
        boarding_policy: BoardingPolicy::Manual,
        ..EngineConfig::default()
    });
    let waiting: Trip = enqueue(&engine, MAIN_ROUTE, SECOND_VAN);

    let err: CoreError = engine
        .book_for_trip(waiting.trip_id, &create_test_request(1))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

// ============================================================================
// Ticket references
// ============================================================================

#[test]
fn test_ticket_reference_collision_is_retried() {
    let engine = create_test_engine()
        .with_reference_source(Arc::new(SequenceReferenceSource::new(vec![7, 7, 8])));
    enqueue(&engine, MAIN_ROUTE, VAN);

    let first: BookingConfirmation =
        engine.smart_book(MAIN_ROUTE, &create_test_request(1)).unwrap();
    let second: BookingConfirmation =
        engine.smart_book(MAIN_ROUTE, &create_test_request(1)).unwrap();

    assert_eq!(first.ticket_reference, TicketReference::from_entropy(7));
    assert_eq!(second.ticket_reference, TicketReference::from_entropy(8));
}

#[test]
fn test_ticket_reference_exhaustion_fails_and_rolls_back() {
    let engine = create_test_engine()
        .with_reference_source(Arc::new(SequenceReferenceSource::new(vec![42])));
    let van: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    engine.smart_book(MAIN_ROUTE, &create_test_request(1)).unwrap();

    let err: CoreError = engine
        .smart_book(MAIN_ROUTE, &create_test_request(2))
        .unwrap_err();

    assert!(matches!(err, CoreError::DuplicateReference { attempts: 8 }));
    assert_eq!(err.kind(), ErrorKind::DuplicateReference);

    let after: Trip = trip(&engine, van.trip_id);
    assert_eq!(after.seats_booked, 1);
    assert_eq!(after.seats_available, 9);
}

#[test]
fn test_ticket_reference_lookup_is_case_insensitive() {
    let engine = create_test_engine();
    enqueue(&engine, MAIN_ROUTE, VAN);
    let confirmation: BookingConfirmation =
        engine.smart_book(MAIN_ROUTE, &create_test_request(3)).unwrap();

    let lowered: String = confirmation.ticket_reference.as_str().to_lowercase();
    let details = engine.booking_by_reference(&lowered).unwrap();

    assert_eq!(details.booking.booking_id, confirmation.booking_id);
    assert_eq!(details.booking.seat_count, 3);
}

#[test]
fn test_unknown_ticket_reference_fails_not_found() {
    let engine = create_test_engine();

    let err: CoreError = engine.booking_by_reference("TKT-00000000").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}
