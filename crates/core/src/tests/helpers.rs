// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BookingRequest, EnqueueTrip, Engine, EngineConfig, FixedClock, MemoryStore, ReferenceSource,
};
use std::sync::Arc;
use std::sync::Mutex;
use time::OffsetDateTime;
use time::macros::datetime;
use trip_queue_domain::{
    BookingType, Driver, DriverId, Money, PassengerInfo, PaymentInfo, Route, RouteId, RouteStatus,
    TicketReference, Trip, TripId, Vehicle, VehicleId,
};

pub const MAIN_ROUTE: RouteId = RouteId::new(1);
pub const SIDE_ROUTE: RouteId = RouteId::new(2);
pub const INACTIVE_ROUTE: RouteId = RouteId::new(3);

pub const VAN: VehicleId = VehicleId::new(1);
pub const SECOND_VAN: VehicleId = VehicleId::new(2);
pub const SMALL_CAR: VehicleId = VehicleId::new(3);
pub const BUS: VehicleId = VehicleId::new(4);
pub const RETIRED_VAN: VehicleId = VehicleId::new(5);

pub const DRIVER: DriverId = DriverId::new(1);
pub const SECOND_DRIVER: DriverId = DriverId::new(2);
pub const OFF_DUTY_DRIVER: DriverId = DriverId::new(3);

pub fn create_test_start_time() -> OffsetDateTime {
    datetime!(2026-03-02 08:00 UTC)
}

pub fn create_test_route(route_id: RouteId, destination: &str, status: RouteStatus) -> Route {
    Route {
        route_id,
        origin: String::from("Central Terminal"),
        destination: destination.to_string(),
        fare_price: Money::from_minor_units(10_000),
        status,
        estimated_duration_minutes: Some(90),
    }
}

pub fn create_test_vehicle(vehicle_id: VehicleId, capacity: u32, is_active: bool) -> Vehicle {
    Vehicle {
        vehicle_id,
        plate_number: format!("ABC-{}", vehicle_id.value()),
        vehicle_type: String::from("van"),
        capacity,
        is_active,
    }
}

pub fn create_test_driver(driver_id: DriverId, is_available: bool) -> Driver {
    Driver {
        driver_id,
        first_name: String::from("Jose"),
        last_name: format!("Rizal {}", driver_id.value()),
        phone: None,
        is_available,
    }
}

/// A store with three routes, five vehicles and three drivers.
///
/// Main and side routes charge 100.00 per seat; vans seat ten, the small
/// car four and the bus twenty.
pub fn create_test_store() -> MemoryStore {
    let store: MemoryStore = MemoryStore::new();
    store.upsert_route(create_test_route(MAIN_ROUTE, "Baguio", RouteStatus::Active));
    store.upsert_route(create_test_route(SIDE_ROUTE, "Angeles", RouteStatus::Active));
    store.upsert_route(create_test_route(
        INACTIVE_ROUTE,
        "Tarlac",
        RouteStatus::Inactive,
    ));
    store.upsert_vehicle(create_test_vehicle(VAN, 10, true));
    store.upsert_vehicle(create_test_vehicle(SECOND_VAN, 10, true));
    store.upsert_vehicle(create_test_vehicle(SMALL_CAR, 4, true));
    store.upsert_vehicle(create_test_vehicle(BUS, 20, true));
    store.upsert_vehicle(create_test_vehicle(RETIRED_VAN, 10, false));
    store.upsert_driver(create_test_driver(DRIVER, true));
    store.upsert_driver(create_test_driver(SECOND_DRIVER, true));
    store.upsert_driver(create_test_driver(OFF_DUTY_DRIVER, false));
    store
}

pub fn create_test_engine() -> Engine<MemoryStore> {
    create_test_engine_with(EngineConfig::default())
}

pub fn create_test_engine_with(config: EngineConfig) -> Engine<MemoryStore> {
    Engine::new(create_test_store(), config)
        .with_clock(Arc::new(FixedClock::new(create_test_start_time())))
}

pub fn create_test_enqueue(route_id: RouteId, vehicle_id: VehicleId) -> EnqueueTrip {
    EnqueueTrip {
        route_id,
        vehicle_id,
        driver_id: DRIVER,
        estimated_departure_time: create_test_start_time() + time::Duration::hours(1),
    }
}

pub fn create_test_passenger(first_name: &str, last_name: &str) -> PassengerInfo {
    PassengerInfo {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        phone: Some(String::from("09171234567")),
        address: None,
    }
}

pub fn create_test_request(seat_count: u32) -> BookingRequest {
    BookingRequest {
        passenger: create_test_passenger("Maria", "Clara"),
        seat_count,
        payment: PaymentInfo {
            method: String::from("gcash"),
            reference: Some(String::from("GC-0001")),
        },
        booking_type: BookingType::Online,
    }
}

/// Enqueues a trip and returns it.
pub fn enqueue(engine: &Engine<MemoryStore>, route_id: RouteId, vehicle_id: VehicleId) -> Trip {
    engine
        .enqueue_trip(&create_test_enqueue(route_id, vehicle_id))
        .unwrap()
}

pub fn trip(engine: &Engine<MemoryStore>, trip_id: TripId) -> Trip {
    engine.trip_details(trip_id).unwrap().trip
}

/// Hands out a fixed list of references, then repeats the last one.
pub struct SequenceReferenceSource {
    entropy: Mutex<Vec<u64>>,
}

impl SequenceReferenceSource {
    pub fn new(mut entropy: Vec<u64>) -> Self {
        entropy.reverse();
        Self {
            entropy: Mutex::new(entropy),
        }
    }
}

impl ReferenceSource for SequenceReferenceSource {
    fn next_reference(&self) -> TicketReference {
        let mut remaining = self.entropy.lock().unwrap();
        let value: u64 = if remaining.len() > 1 {
            remaining.pop().unwrap()
        } else {
            remaining[0]
        };
        TicketReference::from_entropy(value)
    }
}
