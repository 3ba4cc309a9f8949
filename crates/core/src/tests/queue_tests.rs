// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enqueue, departure, arrival, cancellation and reassignment.

use super::helpers::{
    BUS, DRIVER, INACTIVE_ROUTE, MAIN_ROUTE, OFF_DUTY_DRIVER, RETIRED_VAN, SECOND_DRIVER,
    SECOND_VAN, SIDE_ROUTE, SMALL_CAR, VAN, create_test_engine, create_test_engine_with,
    create_test_enqueue, create_test_request, create_test_start_time, enqueue, trip,
};
use crate::{CoreError, EngineConfig, EnqueueTrip, TripCancellation};
use trip_queue_domain::{
    BoardingPolicy, DomainError, ErrorKind, Money, PaymentStatus, Trip, TripId, TripStatus,
    VehicleId,
};

fn positions(engine: &crate::Engine<crate::MemoryStore>, trips: &[Trip]) -> Vec<u32> {
    trips
        .iter()
        .map(|t| trip(engine, t.trip_id).queue_position)
        .collect()
}

// ============================================================================
// Enqueue
// ============================================================================

#[test]
fn test_enqueue_appends_to_route_tail() {
    let engine = create_test_engine();

    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    let second: Trip = enqueue(&engine, MAIN_ROUTE, SECOND_VAN);
    let other_route: Trip = enqueue(&engine, SIDE_ROUTE, BUS);

    assert_eq!(first.queue_position, 1);
    assert_eq!(second.queue_position, 2);
    assert_eq!(other_route.queue_position, 1);
}

#[test]
fn test_enqueue_copies_capacity_and_fare() {
    let engine = create_test_engine();

    let created: Trip = enqueue(&engine, MAIN_ROUTE, SMALL_CAR);

    assert_eq!(created.capacity, 4);
    assert_eq!(created.seats_available, 4);
    assert_eq!(created.seats_booked, 0);
    assert_eq!(created.fare_price, Money::from_minor_units(10_000));
    assert_eq!(created.status, TripStatus::Boarding);
    assert!(created.is_accepting_bookings);
}

#[test]
fn test_enqueue_with_manual_policy_starts_waiting() {
    let engine = create_test_engine_with(EngineConfig {
        boarding_policy: BoardingPolicy::Manual,
        ..EngineConfig::default()
    });

    let created: Trip = enqueue(&engine, MAIN_ROUTE, VAN);

    assert_eq!(created.status, TripStatus::Waiting);
    assert!(!created.is_accepting_bookings);

    let opened: Trip = engine.open_boarding(created.trip_id).unwrap();
    assert_eq!(opened.status, TripStatus::Boarding);
    assert!(opened.is_accepting_bookings);

    let again = engine.open_boarding(created.trip_id);
    assert_eq!(again.unwrap_err().kind(), ErrorKind::InvalidState);
}

#[test]
fn test_enqueue_rejects_inactive_route() {
    let engine = create_test_engine();

    let result = engine.enqueue_trip(&create_test_enqueue(INACTIVE_ROUTE, VAN));

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::RouteInactive(_))
    ));
}

#[test]
fn test_enqueue_rejects_unknown_vehicle() {
    let engine = create_test_engine();

    let result = engine.enqueue_trip(&create_test_enqueue(MAIN_ROUTE, VehicleId::new(404)));

    assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_enqueue_rejects_inactive_vehicle_and_unavailable_driver() {
    let engine = create_test_engine();

    let inactive = engine.enqueue_trip(&create_test_enqueue(MAIN_ROUTE, RETIRED_VAN));
    assert!(matches!(
        inactive.unwrap_err(),
        CoreError::DomainViolation(DomainError::VehicleInactive(_))
    ));

    let request: EnqueueTrip = EnqueueTrip {
        driver_id: OFF_DUTY_DRIVER,
        ..create_test_enqueue(MAIN_ROUTE, VAN)
    };
    let unavailable = engine.enqueue_trip(&request);
    assert!(matches!(
        unavailable.unwrap_err(),
        CoreError::DomainViolation(DomainError::DriverUnavailable(_))
    ));

    assert!(engine.queue_status(Some(MAIN_ROUTE)).unwrap().routes[0]
        .trips
        .is_empty());
}

// ============================================================================
// Departure and arrival
// ============================================================================

#[test]
fn test_advance_queue_departs_trip_and_renumbers() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    let second: Trip = enqueue(&engine, MAIN_ROUTE, SECOND_VAN);
    engine.smart_book(MAIN_ROUTE, &create_test_request(7)).unwrap();

    let departed: Trip = engine.advance_queue(first.trip_id).unwrap();

    assert_eq!(departed.status, TripStatus::Departed);
    assert_eq!(departed.actual_departure_datetime, Some(create_test_start_time()));
    assert!(!departed.is_accepting_bookings);
    assert_eq!(departed.seats_booked, 7);
    assert_eq!(trip(&engine, second.trip_id).queue_position, 1);
}

#[test]
fn test_advance_from_middle_only_shifts_trips_behind() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    let middle: Trip = enqueue(&engine, MAIN_ROUTE, SECOND_VAN);
    let last: Trip = enqueue(&engine, MAIN_ROUTE, BUS);

    engine.advance_queue(middle.trip_id).unwrap();

    assert_eq!(positions(&engine, &[first, last]), vec![1, 2]);
    engine.verify_invariants().unwrap();
}

#[test]
fn test_advance_waiting_trip_fails_invalid_state() {
    let engine = create_test_engine_with(EngineConfig {
        boarding_policy: BoardingPolicy::Manual,
        ..EngineConfig::default()
    });
    let waiting: Trip = enqueue(&engine, MAIN_ROUTE, VAN);

    let err: CoreError = engine.advance_queue(waiting.trip_id).unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::InvalidTripTransition {
            from: TripStatus::Waiting,
            to: TripStatus::Departed,
            ..
        })
    ));
}

#[test]
fn test_advance_twice_fails_invalid_state() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    engine.advance_queue(first.trip_id).unwrap();

    let err: CoreError = engine.advance_queue(first.trip_id).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn test_advance_unknown_trip_fails_not_found() {
    let engine = create_test_engine();

    let err: CoreError = engine.advance_queue(TripId::new(77)).unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::TripNotFound(_))
    ));
}

#[test]
fn test_mark_arrived_requires_departure() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);

    let early = engine.mark_arrived(first.trip_id);
    assert_eq!(early.unwrap_err().kind(), ErrorKind::InvalidState);

    engine.advance_queue(first.trip_id).unwrap();
    let arrived: Trip = engine.mark_arrived(first.trip_id).unwrap();

    assert_eq!(arrived.status, TripStatus::Arrived);
    assert_eq!(arrived.actual_arrival_datetime, Some(create_test_start_time()));

    let again = engine.mark_arrived(first.trip_id);
    assert_eq!(again.unwrap_err().kind(), ErrorKind::InvalidState);
}

// ============================================================================
// Trip cancellation
// ============================================================================

#[test]
fn test_cancel_trip_without_bookings_renumbers() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    let second: Trip = enqueue(&engine, MAIN_ROUTE, SECOND_VAN);

    let cancelled: TripCancellation = engine.cancel_trip(first.trip_id).unwrap();

    assert_eq!(cancelled.trip.status, TripStatus::Cancelled);
    assert!(cancelled.refunds.is_empty());
    assert_eq!(trip(&engine, second.trip_id).queue_position, 1);

    let next: Trip = enqueue(&engine, MAIN_ROUTE, BUS);
    assert_eq!(next.queue_position, 2);
}

#[test]
fn test_cancel_trip_with_paid_bookings_fails() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    engine.smart_book(MAIN_ROUTE, &create_test_request(2)).unwrap();

    let err: CoreError = engine.cancel_trip(first.trip_id).unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::TripHasPaidBookings {
            paid_bookings: 1,
            ..
        })
    ));
    assert_eq!(trip(&engine, first.trip_id).status, TripStatus::Boarding);
}

#[test]
fn test_cancel_trip_after_all_bookings_cancelled_succeeds() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    let booked = engine.smart_book(MAIN_ROUTE, &create_test_request(2)).unwrap();
    engine.cancel_booking(booked.booking_id).unwrap();

    let cancelled: TripCancellation = engine.cancel_trip(first.trip_id).unwrap();

    assert_eq!(cancelled.trip.status, TripStatus::Cancelled);
}

#[test]
fn test_cancel_departed_trip_fails_invalid_state() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    engine.advance_queue(first.trip_id).unwrap();

    let plain = engine.cancel_trip(first.trip_id);
    let refunding = engine.cancel_trip_with_refunds(first.trip_id);

    assert_eq!(plain.unwrap_err().kind(), ErrorKind::InvalidState);
    assert_eq!(refunding.unwrap_err().kind(), ErrorKind::InvalidState);
}

#[test]
fn test_cancel_trip_with_refunds_refunds_every_paid_booking() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    let second: Trip = enqueue(&engine, MAIN_ROUTE, SECOND_VAN);
    let kept = engine.smart_book(MAIN_ROUTE, &create_test_request(3)).unwrap();
    let already = engine.smart_book(MAIN_ROUTE, &create_test_request(2)).unwrap();
    engine.cancel_booking(already.booking_id).unwrap();

    let cancelled: TripCancellation = engine.cancel_trip_with_refunds(first.trip_id).unwrap();

    assert_eq!(cancelled.trip.status, TripStatus::Cancelled);
    assert_eq!(cancelled.trip.seats_booked, 0);
    assert_eq!(cancelled.trip.seats_available, 10);
    assert_eq!(cancelled.refunds.len(), 1);
    assert_eq!(cancelled.refunds[0].booking_id, kept.booking_id);
    assert_eq!(
        cancelled.refunds[0].refund.amount,
        Money::from_minor_units(-30_000)
    );

    let details = engine.booking_details(kept.booking_id).unwrap();
    assert_eq!(details.booking.payment_status, PaymentStatus::Cancelled);
    assert_eq!(trip(&engine, second.trip_id).queue_position, 1);
    engine.verify_invariants().unwrap();
}

// ============================================================================
// Reassignment
// ============================================================================

#[test]
fn test_reassign_vehicle_resizes_capacity() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    engine.smart_book(MAIN_ROUTE, &create_test_request(4)).unwrap();

    let moved: Trip = engine.reassign_vehicle(first.trip_id, BUS).unwrap();

    assert_eq!(moved.vehicle_id, BUS);
    assert_eq!(moved.capacity, 20);
    assert_eq!(moved.seats_booked, 4);
    assert_eq!(moved.seats_available, 16);
}

#[test]
fn test_reassign_vehicle_to_exact_fit_marks_full() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    engine.smart_book(MAIN_ROUTE, &create_test_request(4)).unwrap();

    let moved: Trip = engine.reassign_vehicle(first.trip_id, SMALL_CAR).unwrap();

    assert_eq!(moved.status, TripStatus::Full);
    assert!(!moved.is_accepting_bookings);
    assert_eq!(moved.seats_available, 0);
}

#[test]
fn test_reassign_vehicle_too_small_fails() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    engine.smart_book(MAIN_ROUTE, &create_test_request(5)).unwrap();

    let err: CoreError = engine.reassign_vehicle(first.trip_id, SMALL_CAR).unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::CapacityBelowBooked { .. })
    ));
    assert_eq!(trip(&engine, first.trip_id).vehicle_id, VAN);
}

#[test]
fn test_reassign_vehicle_rejects_inactive_vehicle_and_departed_trip() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);

    let inactive = engine.reassign_vehicle(first.trip_id, RETIRED_VAN);
    assert_eq!(inactive.unwrap_err().kind(), ErrorKind::InvalidState);

    engine.advance_queue(first.trip_id).unwrap();
    let departed = engine.reassign_vehicle(first.trip_id, BUS);
    assert!(matches!(
        departed.unwrap_err(),
        CoreError::DomainViolation(DomainError::TripNotQueued { .. })
    ));
}

#[test]
fn test_reassign_driver() {
    let engine = create_test_engine();
    let first: Trip = enqueue(&engine, MAIN_ROUTE, VAN);
    assert_eq!(first.driver_id, DRIVER);

    let moved: Trip = engine.reassign_driver(first.trip_id, SECOND_DRIVER).unwrap();
    assert_eq!(moved.driver_id, SECOND_DRIVER);

    let unavailable = engine.reassign_driver(first.trip_id, OFF_DUTY_DRIVER);
    assert!(matches!(
        unavailable.unwrap_err(),
        CoreError::DomainViolation(DomainError::DriverUnavailable(_))
    ));
}
