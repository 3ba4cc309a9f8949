// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use crate::SqliteStore;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use time::macros::datetime;
use trip_queue::{BookingRequest, EnqueueTrip, Engine, EngineConfig, FixedClock, ReferenceSource};
use trip_queue_domain::{
    BookingType, Driver, DriverId, Money, NewBooking, NewTrip, PassengerInfo, PaymentInfo, Route,
    RouteId, RouteStatus, TicketReference, TripId, TripStatus, Vehicle, VehicleId,
};

pub const MAIN_ROUTE: RouteId = RouteId::new(1);
pub const SIDE_ROUTE: RouteId = RouteId::new(2);

pub const VAN: VehicleId = VehicleId::new(1);
pub const SMALL_CAR: VehicleId = VehicleId::new(2);

pub const DRIVER: DriverId = DriverId::new(1);

pub fn create_test_start_time() -> OffsetDateTime {
    datetime!(2026-03-02 08:00 UTC)
}

pub fn create_test_route(route_id: RouteId, destination: &str) -> Route {
    Route {
        route_id,
        origin: String::from("Central Terminal"),
        destination: destination.to_string(),
        fare_price: Money::from_minor_units(10_000),
        status: RouteStatus::Active,
        estimated_duration_minutes: Some(90),
    }
}

pub fn create_test_vehicle(vehicle_id: VehicleId, capacity: u32) -> Vehicle {
    Vehicle {
        vehicle_id,
        plate_number: format!("ABC-{}", vehicle_id.value()),
        vehicle_type: String::from("van"),
        capacity,
        is_active: true,
    }
}

pub fn create_test_driver(driver_id: DriverId) -> Driver {
    Driver {
        driver_id,
        first_name: String::from("Jose"),
        last_name: String::from("Rizal"),
        phone: Some(String::from("09170000000")),
        is_available: true,
    }
}

/// An in-memory store with two routes, a ten-seat van, a four-seat car and
/// one driver.
pub fn create_test_store() -> SqliteStore {
    let store: SqliteStore = SqliteStore::new_in_memory().expect("in-memory database");
    store
        .upsert_route(&create_test_route(MAIN_ROUTE, "Baguio"))
        .unwrap();
    store
        .upsert_route(&create_test_route(SIDE_ROUTE, "Angeles"))
        .unwrap();
    store.upsert_vehicle(&create_test_vehicle(VAN, 10)).unwrap();
    store
        .upsert_vehicle(&create_test_vehicle(SMALL_CAR, 4))
        .unwrap();
    store.upsert_driver(&create_test_driver(DRIVER)).unwrap();
    store
}

pub fn create_test_engine() -> Engine<SqliteStore> {
    Engine::new(create_test_store(), EngineConfig::default())
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
        phone: None,
        address: Some(String::from("Quezon City")),
    }
}

pub fn create_test_request(seat_count: u32) -> BookingRequest {
    BookingRequest {
        passenger: create_test_passenger("Maria", "Clara"),
        seat_count,
        payment: PaymentInfo {
            method: String::from("cash"),
            reference: Some(String::from("OR-1001")),
        },
        booking_type: BookingType::WalkIn,
    }
}

pub fn create_test_new_trip(route_id: RouteId, queue_position: u32) -> NewTrip {
    NewTrip {
        route_id,
        vehicle_id: VAN,
        driver_id: DRIVER,
        queue_position,
        estimated_departure_time: create_test_start_time(),
        capacity: 10,
        status: TripStatus::Boarding,
        is_accepting_bookings: true,
        fare_price: Money::from_minor_units(10_000),
    }
}

pub fn create_test_new_booking(trip_id: TripId, reference: &str) -> NewBooking {
    NewBooking {
        trip_id,
        passenger: create_test_passenger("Andres", "Bonifacio"),
        seat_count: 2,
        booking_type: BookingType::Online,
        total_amount: Money::from_minor_units(20_000),
        ticket_reference: TicketReference::parse(reference).unwrap(),
        booking_date: create_test_start_time(),
    }
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
