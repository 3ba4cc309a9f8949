// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use trip_queue_domain::ErrorKind;

use super::helpers::{
    CLOSED_ROUTE, DRIVER, MAIN_ROUTE, SECOND_DRIVER, SMALL_CAR, VAN, create_test_booking_request,
    create_test_engine, create_test_retry, create_test_trip,
};
use crate::{
    ApiError, CancellationHistoryQuery, CreateBookingRequest, DriverTripResponse,
    EmailSearchQuery, NameSearchQuery, TripHistoryQuery, TripInfo, book_for_trip,
    cancel_booking, depart_trip, get_available_trips, get_booking_by_reference,
    get_cancellation_history, get_current_trip_for_driver, get_latest_payment,
    get_next_available_trip, get_trip_history_for_driver, get_trip_manifest,
    get_upcoming_trips_for_driver, list_active_bookings, list_active_routes,
    search_bookings_by_email, search_bookings_by_name, smart_book, verify_invariants,
};

#[test]
fn test_trip_manifest_lists_paid_bookings_only() {
    let engine = create_test_engine();
    let retry = create_test_retry();
    let trip: TripInfo = create_test_trip(&engine, VAN);
    let kept = book_for_trip(&engine, &retry, trip.trip_id, &create_test_booking_request(3))
        .unwrap();
    let dropped = book_for_trip(&engine, &retry, trip.trip_id, &create_test_booking_request(2))
        .unwrap();
    cancel_booking(&engine, &retry, dropped.booking_id).unwrap();

    let manifest = get_trip_manifest(&engine, trip.trip_id).unwrap();

    assert_eq!(manifest.total_bookings, 1);
    assert_eq!(manifest.total_passengers, 3);
    assert_eq!(manifest.entries[0].ticket_reference, kept.ticket_reference);
    assert_eq!(manifest.entries[0].passenger_name, "Gabriela Silang");
    assert_eq!(manifest.entries[0].booking_type, "walk-in");
}

#[test]
fn test_trip_manifest_unknown_trip_is_not_found() {
    let engine = create_test_engine();

    let err: ApiError = get_trip_manifest(&engine, 12).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_booking_by_reference_ignores_letter_case() {
    let engine = create_test_engine();
    let trip: TripInfo = create_test_trip(&engine, VAN);
    let confirmation = book_for_trip(
        &engine,
        &create_test_retry(),
        trip.trip_id,
        &create_test_booking_request(1),
    )
    .unwrap();

    let details =
        get_booking_by_reference(&engine, &confirmation.ticket_reference.to_lowercase()).unwrap();

    assert_eq!(details.booking.booking_id, confirmation.booking_id);
    assert_eq!(details.trip.trip_id, trip.trip_id);
    assert_eq!(details.route.route_id, MAIN_ROUTE);
    assert_eq!(details.payments.len(), 1);
    assert_eq!(details.payments[0].amount, 10_000);
}

#[test]
fn test_booking_by_malformed_reference_is_invalid_input() {
    let engine = create_test_engine();

    let err: ApiError = get_booking_by_reference(&engine, "ABC").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.message().contains("ticket_reference"));
}

#[test]
fn test_booking_by_unknown_reference_is_not_found() {
    let engine = create_test_engine();

    let err: ApiError = get_booking_by_reference(&engine, "TKT-00000000").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.message().contains("TKT-00000000"));
}

#[test]
fn test_latest_payment_is_the_refund_after_cancel() {
    let engine = create_test_engine();
    let retry = create_test_retry();
    let trip: TripInfo = create_test_trip(&engine, VAN);
    let confirmation =
        book_for_trip(&engine, &retry, trip.trip_id, &create_test_booking_request(2)).unwrap();

    let before = get_latest_payment(&engine, confirmation.booking_id).unwrap();
    assert_eq!(before.payment.unwrap().amount, 20_000);

    cancel_booking(&engine, &retry, confirmation.booking_id).unwrap();
    let after = get_latest_payment(&engine, confirmation.booking_id).unwrap();
    assert_eq!(after.booking_id, confirmation.booking_id);
    assert_eq!(after.payment.unwrap().amount, -20_000);
}

#[test]
fn test_latest_payment_unknown_booking_is_not_found() {
    let engine = create_test_engine();

    let err: ApiError = get_latest_payment(&engine, 9).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_search_by_email_ignores_case() {
    let engine = create_test_engine();
    let retry = create_test_retry();
    let trip: TripInfo = create_test_trip(&engine, VAN);
    book_for_trip(&engine, &retry, trip.trip_id, &create_test_booking_request(1)).unwrap();
    let other: CreateBookingRequest = CreateBookingRequest {
        first_name: String::from("Apolinario"),
        last_name: String::from("Mabini"),
        email: String::from("apolinario@example.com"),
        ..create_test_booking_request(1)
    };
    book_for_trip(&engine, &retry, trip.trip_id, &other).unwrap();

    let found = search_bookings_by_email(
        &engine,
        &EmailSearchQuery {
            email: String::from("GABRIELA@example.com"),
        },
    )
    .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].first_name, "Gabriela");
}

#[test]
fn test_search_by_blank_email_is_invalid_input() {
    let engine = create_test_engine();

    let err: ApiError = search_bookings_by_email(
        &engine,
        &EmailSearchQuery {
            email: String::from("   "),
        },
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_search_by_name_matches_across_first_and_last_name() {
    let engine = create_test_engine();
    let trip: TripInfo = create_test_trip(&engine, VAN);
    book_for_trip(
        &engine,
        &create_test_retry(),
        trip.trip_id,
        &create_test_booking_request(1),
    )
    .unwrap();

    let found = search_bookings_by_name(
        &engine,
        &NameSearchQuery {
            name: String::from("riela sil"),
        },
    )
    .unwrap();
    let missing = search_bookings_by_name(
        &engine,
        &NameSearchQuery {
            name: String::from("Bonifacio"),
        },
    )
    .unwrap();

    assert_eq!(found.len(), 1);
    assert!(missing.is_empty());
}

#[test]
fn test_cancellation_history_defaults_and_limits() {
    let engine = create_test_engine();
    let retry = create_test_retry();
    let trip: TripInfo = create_test_trip(&engine, VAN);
    for _ in 0..3 {
        let confirmation =
            book_for_trip(&engine, &retry, trip.trip_id, &create_test_booking_request(1)).unwrap();
        cancel_booking(&engine, &retry, confirmation.booking_id).unwrap();
    }

    let all = get_cancellation_history(&engine, &CancellationHistoryQuery::default()).unwrap();
    let two = get_cancellation_history(&engine, &CancellationHistoryQuery { limit: Some(2) })
        .unwrap();

    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|booking| booking.payment_status == "cancelled"));
    assert_eq!(two.len(), 2);
}

#[test]
fn test_cancellation_history_zero_limit_is_invalid_input() {
    let engine = create_test_engine();

    let err: ApiError =
        get_cancellation_history(&engine, &CancellationHistoryQuery { limit: Some(0) })
            .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_next_available_trip_follows_the_queue() {
    let engine = create_test_engine();
    let retry = create_test_retry();

    let empty = get_next_available_trip(&engine, MAIN_ROUTE).unwrap();
    assert!(empty.trip.is_none());

    let first: TripInfo = create_test_trip(&engine, VAN);
    let second: TripInfo = create_test_trip(&engine, SMALL_CAR);
    assert_eq!(
        get_next_available_trip(&engine, MAIN_ROUTE)
            .unwrap()
            .trip
            .unwrap()
            .trip_id,
        first.trip_id
    );

    depart_trip(&engine, &retry, first.trip_id).unwrap();
    let next = get_next_available_trip(&engine, MAIN_ROUTE).unwrap();
    assert_eq!(next.route_id, MAIN_ROUTE);
    assert_eq!(next.trip.unwrap().trip_id, second.trip_id);
}

#[test]
fn test_available_trips_excludes_departed() {
    let engine = create_test_engine();
    let first: TripInfo = create_test_trip(&engine, VAN);
    let second: TripInfo = create_test_trip(&engine, SMALL_CAR);
    depart_trip(&engine, &create_test_retry(), first.trip_id).unwrap();

    let trips: Vec<TripInfo> = get_available_trips(&engine, MAIN_ROUTE).unwrap();

    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].trip_id, second.trip_id);
    assert!(get_available_trips(&engine, CLOSED_ROUTE).unwrap().is_empty());
}

#[test]
fn test_active_routes_skip_inactive() {
    let engine = create_test_engine();

    let routes = list_active_routes(&engine).unwrap();

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].route_id, MAIN_ROUTE);
    assert_eq!(routes[0].destination, "Baguio");
}

#[test]
fn test_active_bookings_drop_departed_trips() {
    let engine = create_test_engine();
    let retry = create_test_retry();
    let first: TripInfo = create_test_trip(&engine, VAN);
    let second: TripInfo = create_test_trip(&engine, SMALL_CAR);
    book_for_trip(&engine, &retry, first.trip_id, &create_test_booking_request(2)).unwrap();
    let waiting =
        book_for_trip(&engine, &retry, second.trip_id, &create_test_booking_request(1)).unwrap();
    depart_trip(&engine, &retry, first.trip_id).unwrap();

    let active = list_active_bookings(&engine).unwrap();

    assert_eq!(active.len(), 1);
    assert_eq!(active[0].booking.booking_id, waiting.booking_id);
    assert_eq!(active[0].route_id, MAIN_ROUTE);
    assert_eq!(active[0].trip_status, "boarding");
}

#[test]
fn test_verify_invariants_after_activity() {
    let engine = create_test_engine();
    let retry = create_test_retry();
    create_test_trip(&engine, VAN);
    create_test_trip(&engine, SMALL_CAR);
    smart_book(&engine, &retry, MAIN_ROUTE, &create_test_booking_request(9)).unwrap();
    smart_book(&engine, &retry, MAIN_ROUTE, &create_test_booking_request(3)).unwrap();

    let report = verify_invariants(&engine).unwrap();

    assert_eq!(report.trips_checked, 2);
    assert_eq!(report.routes_checked, 2);
}

#[test]
fn test_driver_trip_views() {
    let engine = create_test_engine();
    let retry = create_test_retry();
    let front: TripInfo = create_test_trip(&engine, VAN);
    let behind: TripInfo = create_test_trip(&engine, SMALL_CAR);
    depart_trip(&engine, &retry, front.trip_id).unwrap();

    let current: DriverTripResponse = get_current_trip_for_driver(&engine, DRIVER).unwrap();
    let upcoming: Vec<TripInfo> = get_upcoming_trips_for_driver(&engine, DRIVER).unwrap();
    let history: Vec<TripInfo> =
        get_trip_history_for_driver(&engine, DRIVER, &TripHistoryQuery::default()).unwrap();
    let idle: DriverTripResponse = get_current_trip_for_driver(&engine, SECOND_DRIVER).unwrap();

    assert_eq!(current.driver_id, DRIVER);
    assert_eq!(current.trip.map(|trip| trip.status), Some(String::from("departed")));
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].trip_id, behind.trip_id);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].trip_id, front.trip_id);
    assert!(idle.trip.is_none());
}

#[test]
fn test_driver_trip_history_rejects_zero_limit_and_unknown_driver() {
    let engine = create_test_engine();

    let zero: ApiError =
        get_trip_history_for_driver(&engine, DRIVER, &TripHistoryQuery { limit: Some(0) })
            .unwrap_err();
    let unknown: ApiError =
        get_trip_history_for_driver(&engine, 99, &TripHistoryQuery::default()).unwrap_err();
    let no_current: ApiError = get_current_trip_for_driver(&engine, 99).unwrap_err();

    assert_eq!(zero.kind(), ErrorKind::InvalidInput);
    assert_eq!(unknown.kind(), ErrorKind::NotFound);
    assert_eq!(no_current.kind(), ErrorKind::NotFound);
}
