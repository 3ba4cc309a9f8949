// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;
use trip_queue::{Engine, EngineConfig, FixedClock, MemoryStore};
use trip_queue_domain::{
    Driver, DriverId, Money, Route, RouteId, RouteStatus, Vehicle, VehicleId,
};

use crate::{
    CreateBookingRequest, EnqueueTripRequest, RetryPolicy, TripInfo, enqueue_trip,
};

pub const MAIN_ROUTE: i64 = 1;
pub const CLOSED_ROUTE: i64 = 2;
pub const VAN: i64 = 1;
pub const SMALL_CAR: i64 = 2;
pub const DRIVER: i64 = 1;
pub const SECOND_DRIVER: i64 = 2;

pub fn create_test_start_time() -> OffsetDateTime {
    datetime!(2026-03-02 08:00 UTC)
}

fn create_test_route(route_id: i64, destination: &str, status: RouteStatus) -> Route {
    Route {
        route_id: RouteId::new(route_id),
        origin: String::from("Cubao Terminal"),
        destination: destination.to_string(),
        fare_price: Money::from_minor_units(10_000),
        status,
        estimated_duration_minutes: Some(240),
    }
}

fn create_test_vehicle(vehicle_id: i64, capacity: u32) -> Vehicle {
    Vehicle {
        vehicle_id: VehicleId::new(vehicle_id),
        plate_number: format!("NAB-{vehicle_id:04}"),
        vehicle_type: String::from("van"),
        capacity,
        is_active: true,
    }
}

fn create_test_driver(driver_id: i64) -> Driver {
    Driver {
        driver_id: DriverId::new(driver_id),
        first_name: String::from("Juan"),
        last_name: format!("Luna {driver_id}"),
        phone: Some(String::from("09181112222")),
        is_available: true,
    }
}

/// An engine over a memory store with one active and one closed route,
/// a ten-seat van, a four-seat car and two drivers.
pub fn create_test_engine() -> Engine<MemoryStore> {
    let store: MemoryStore = MemoryStore::new();
    store.upsert_route(create_test_route(MAIN_ROUTE, "Baguio", RouteStatus::Active));
    store.upsert_route(create_test_route(CLOSED_ROUTE, "Vigan", RouteStatus::Inactive));
    store.upsert_vehicle(create_test_vehicle(VAN, 10));
    store.upsert_vehicle(create_test_vehicle(SMALL_CAR, 4));
    store.upsert_driver(create_test_driver(DRIVER));
    store.upsert_driver(create_test_driver(SECOND_DRIVER));

    Engine::new(store, EngineConfig::default())
        .with_clock(Arc::new(FixedClock::new(create_test_start_time())))
}

pub fn create_test_retry() -> RetryPolicy {
    RetryPolicy::none()
}

pub fn create_test_enqueue_request(vehicle_id: i64) -> EnqueueTripRequest {
    EnqueueTripRequest {
        route_id: MAIN_ROUTE,
        vehicle_id,
        driver_id: DRIVER,
        estimated_departure_time: String::from("2026-03-02T09:00:00Z"),
    }
}

pub fn create_test_booking_request(seat_count: u32) -> CreateBookingRequest {
    CreateBookingRequest {
        first_name: String::from("Gabriela"),
        last_name: String::from("Silang"),
        email: String::from("gabriela@example.com"),
        phone: Some(String::from("09175550000")),
        address: None,
        seat_count,
        payment_method: String::from("cash"),
        payment_reference: Some(String::from("OR-2001")),
        booking_type: None,
    }
}

/// Enqueues a trip on the main route.
pub fn create_test_trip(engine: &Engine<MemoryStore>, vehicle_id: i64) -> TripInfo {
    enqueue_trip(
        engine,
        &create_test_retry(),
        &create_test_enqueue_request(vehicle_id),
    )
    .unwrap()
}
