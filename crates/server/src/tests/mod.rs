// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Router tests driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use serde_json::{Value, json};
use time::macros::datetime;
use tower::ServiceExt;
use trip_queue::FixedClock;
use trip_queue_domain::{
    Driver, DriverId, Money, Route, RouteId, RouteStatus, Vehicle, VehicleId,
};

/// Helper to create test app state over an in-memory database with one
/// active route, a ten-seat van, a four-seat car and one driver.
fn create_test_app_state() -> AppState {
    let store: SqliteStore =
        SqliteStore::new_in_memory().expect("Failed to create in-memory store");
    store
        .upsert_route(&Route {
            route_id: RouteId::new(1),
            origin: String::from("Pasay Terminal"),
            destination: String::from("Batangas Port"),
            fare_price: Money::from_minor_units(10_000),
            status: RouteStatus::Active,
            estimated_duration_minutes: Some(150),
        })
        .unwrap();
    for (vehicle_id, capacity) in [(1, 10), (2, 4)] {
        store
            .upsert_vehicle(&Vehicle {
                vehicle_id: VehicleId::new(vehicle_id),
                plate_number: format!("TQ-{vehicle_id:03}"),
                vehicle_type: String::from("van"),
                capacity,
                is_active: true,
            })
            .unwrap();
    }
    store
        .upsert_driver(&Driver {
            driver_id: DriverId::new(1),
            first_name: String::from("Emilio"),
            last_name: String::from("Jacinto"),
            phone: None,
            is_available: true,
        })
        .unwrap();

    let engine: Engine<SqliteStore> = Engine::new(store, EngineConfig::default())
        .with_clock(Arc::new(FixedClock::new(datetime!(2026-03-02 08:00 UTC))));
    AppState {
        engine: Arc::new(engine),
        retry: RetryPolicy::none(),
    }
}

fn create_test_booking_body(seat_count: u32) -> Value {
    json!({
        "first_name": "Teresa",
        "last_name": "Magbanua",
        "email": "teresa@example.com",
        "seat_count": seat_count,
        "payment_method": "cash",
        "payment_reference": "OR-3001"
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (HttpStatusCode, Vec<u8>) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status: HttpStatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (HttpStatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create_test_trip(app: &Router, vehicle_id: i64) -> i64 {
    let (status, trip) = send_json(
        app,
        "POST",
        "/trips",
        Some(json!({
            "route_id": 1,
            "vehicle_id": vehicle_id,
            "driver_id": 1,
            "estimated_departure_time": "2026-03-02T09:30:00Z"
        })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    trip["trip_id"].as_i64().unwrap()
}

#[test]
fn test_error_kinds_map_to_statuses() {
    assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
    assert_eq!(status_for(ErrorKind::InvalidState), StatusCode::CONFLICT);
    assert_eq!(status_for(ErrorKind::SeatUnavailable), StatusCode::CONFLICT);
    assert_eq!(status_for(ErrorKind::NoAvailableTrip), StatusCode::CONFLICT);
    assert_eq!(
        status_for(ErrorKind::DuplicateReference),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        status_for(ErrorKind::ConcurrencyConflict),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
    assert_eq!(
        status_for(ErrorKind::Internal),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_list_routes() {
    let app: Router = build_router(create_test_app_state());

    let (status, routes) = send_json(&app, "GET", "/routes", None).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(routes.as_array().unwrap().len(), 1);
    assert_eq!(routes[0]["destination"], "Batangas Port");
}

#[tokio::test]
async fn test_enqueue_and_view_queue() {
    let app: Router = build_router(create_test_app_state());
    let first: i64 = create_test_trip(&app, 1).await;
    let second: i64 = create_test_trip(&app, 2).await;

    let (status, queue) = send_json(&app, "GET", "/queue/1", None).await;

    assert_eq!(status, HttpStatusCode::OK);
    let trips = queue["routes"][0]["trips"].as_array().unwrap();
    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0]["trip_id"].as_i64().unwrap(), first);
    assert_eq!(trips[1]["trip_id"].as_i64().unwrap(), second);
    assert_eq!(trips[1]["queue_position"], 2);
}

#[tokio::test]
async fn test_smart_book_then_lookup_by_reference() {
    let app: Router = build_router(create_test_app_state());
    let trip_id: i64 = create_test_trip(&app, 1).await;

    let (status, confirmation) = send_json(
        &app,
        "POST",
        "/routes/1/bookings",
        Some(create_test_booking_body(7)),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(confirmation["trip_id"].as_i64().unwrap(), trip_id);
    assert_eq!(confirmation["total_amount"], 70_000);

    let reference: &str = confirmation["ticket_reference"].as_str().unwrap();
    let (status, details) = send_json(
        &app,
        "GET",
        &format!("/bookings/reference/{reference}"),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(details["booking"]["seat_count"], 7);
    assert_eq!(details["booking"]["booking_type"], "online");
    assert_eq!(details["trip"]["seats_available"], 3);
}

#[tokio::test]
async fn test_zero_seats_is_bad_request() {
    let app: Router = build_router(create_test_app_state());
    create_test_trip(&app, 1).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/routes/1/bookings",
        Some(create_test_booking_body(0)),
    )
    .await;

    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn test_overbooking_a_trip_is_conflict() {
    let app: Router = build_router(create_test_app_state());
    let trip_id: i64 = create_test_trip(&app, 2).await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/trips/{trip_id}/bookings"),
        Some(create_test_booking_body(5)),
    )
    .await;

    assert_eq!(status, HttpStatusCode::CONFLICT);
    assert_eq!(body["kind"], "seat_unavailable");
}

#[tokio::test]
async fn test_unknown_trip_is_not_found() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = send_json(&app, "GET", "/trips/999", None).await;

    assert_eq!(status, HttpStatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    assert!(body["message"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_cancel_booking_twice_is_conflict() {
    let app: Router = build_router(create_test_app_state());
    let trip_id: i64 = create_test_trip(&app, 1).await;
    let (_, confirmation) = send_json(
        &app,
        "POST",
        &format!("/trips/{trip_id}/bookings"),
        Some(create_test_booking_body(2)),
    )
    .await;
    let booking_id: i64 = confirmation["booking_id"].as_i64().unwrap();

    let (status, cancellation) =
        send_json(&app, "POST", &format!("/bookings/{booking_id}/cancel"), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(cancellation["refund"]["amount"], -20_000);

    let (status, body) =
        send_json(&app, "POST", &format!("/bookings/{booking_id}/cancel"), None).await;
    assert_eq!(status, HttpStatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_state");

    let (status, payment) =
        send_json(&app, "GET", &format!("/bookings/{booking_id}/payment"), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(payment["payment"]["amount"], -20_000);
}

#[tokio::test]
async fn test_depart_advances_queue() {
    let app: Router = build_router(create_test_app_state());
    let first: i64 = create_test_trip(&app, 1).await;
    let second: i64 = create_test_trip(&app, 2).await;

    let (status, departed) =
        send_json(&app, "POST", &format!("/trips/{first}/depart"), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(departed["status"], "departed");

    let (_, next) = send_json(&app, "GET", "/routes/1/next-trip", None).await;
    assert_eq!(next["trip"]["trip_id"].as_i64().unwrap(), second);
    assert_eq!(next["trip"]["queue_position"], 1);
}

#[tokio::test]
async fn test_manifest_csv_has_csv_content_type() {
    let app: Router = build_router(create_test_app_state());
    let trip_id: i64 = create_test_trip(&app, 1).await;
    send_json(
        &app,
        "POST",
        &format!("/trips/{trip_id}/bookings"),
        Some(create_test_booking_body(2)),
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/trips/{trip_id}/manifest.csv"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), HttpStatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv: String = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("Teresa Magbanua"));
}

#[tokio::test]
async fn test_search_and_history_queries() {
    let app: Router = build_router(create_test_app_state());
    let trip_id: i64 = create_test_trip(&app, 1).await;
    let (_, confirmation) = send_json(
        &app,
        "POST",
        &format!("/trips/{trip_id}/bookings"),
        Some(create_test_booking_body(1)),
    )
    .await;
    let booking_id: i64 = confirmation["booking_id"].as_i64().unwrap();

    let (status, by_email) =
        send_json(&app, "GET", "/bookings/search?email=TERESA%40example.com", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(by_email.as_array().unwrap().len(), 1);

    let (status, by_name) =
        send_json(&app, "GET", "/bookings/search/name?name=magbanua", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(by_name.as_array().unwrap().len(), 1);

    let (_, active) = send_json(&app, "GET", "/bookings/active", None).await;
    assert_eq!(active.as_array().unwrap().len(), 1);

    send_json(&app, "POST", &format!("/bookings/{booking_id}/cancel"), None).await;
    let (status, history) =
        send_json(&app, "GET", "/bookings/cancellations?limit=5", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(history[0]["booking_id"].as_i64().unwrap(), booking_id);

    let (status, body) = send_json(&app, "GET", "/bookings/cancellations?limit=0", None).await;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn test_reassign_and_cancel_with_refunds() {
    let app: Router = build_router(create_test_app_state());
    let trip_id: i64 = create_test_trip(&app, 1).await;
    send_json(
        &app,
        "POST",
        &format!("/trips/{trip_id}/bookings"),
        Some(create_test_booking_body(3)),
    )
    .await;

    let (status, moved) = send_json(
        &app,
        "PUT",
        &format!("/trips/{trip_id}/vehicle"),
        Some(json!({ "vehicle_id": 2 })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(moved["capacity"], 4);
    assert_eq!(moved["seats_available"], 1);

    let (status, body) =
        send_json(&app, "POST", &format!("/trips/{trip_id}/cancel"), None).await;
    assert_eq!(status, HttpStatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_state");

    let (status, cancellation) = send_json(
        &app,
        "POST",
        &format!("/trips/{trip_id}/cancel-with-refunds"),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(cancellation["trip"]["status"], "cancelled");
    assert_eq!(cancellation["refunds"].as_array().unwrap().len(), 1);

    let (status, report) = send_json(&app, "GET", "/audit/invariants", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(report["trips_checked"], 1);
}

#[tokio::test]
async fn test_driver_trip_views() {
    let app: Router = build_router(create_test_app_state());
    let first: i64 = create_test_trip(&app, 1).await;
    let second: i64 = create_test_trip(&app, 2).await;

    let (status, current) = send_json(&app, "GET", "/drivers/1/current-trip", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(current["trip"]["trip_id"].as_i64().unwrap(), first);

    send_json(&app, "POST", &format!("/trips/{first}/depart"), None).await;

    let (status, upcoming) = send_json(&app, "GET", "/drivers/1/upcoming-trips", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(upcoming.as_array().unwrap().len(), 1);
    assert_eq!(upcoming[0]["trip_id"].as_i64().unwrap(), second);

    let (status, history) =
        send_json(&app, "GET", "/drivers/1/trip-history?limit=5", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(history[0]["trip_id"].as_i64().unwrap(), first);
    assert_eq!(history[0]["status"], "departed");

    let (status, _) = send_json(&app, "GET", "/drivers/1/trip-history?limit=0", None).await;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    let (status, _) = send_json(&app, "GET", "/drivers/9/current-trip", None).await;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_name_search_folds_accented_letters() {
    let app: Router = build_router(create_test_app_state());
    create_test_trip(&app, 1).await;
    let mut body: Value = create_test_booking_body(1);
    body["first_name"] = json!("Élodie");
    let (status, _) = send_json(&app, "POST", "/routes/1/bookings", Some(body)).await;
    assert_eq!(status, HttpStatusCode::OK);

    let (status, found) =
        send_json(&app, "GET", "/bookings/search/name?name=%C3%A9LODIE", None).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["first_name"], "Élodie");
}
