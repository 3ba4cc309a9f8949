// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory store.
//!
//! All tables sit behind one mutex. A unit of work runs against a cloned
//! working set which replaces the committed set only when the operation
//! succeeds, so a failed or panicking operation leaves no trace.

use crate::store::{
    BookingRepository, DriverRegistry, PaymentRepository, RouteRepository, Store, StoreError,
    TripRepository, UnitOfWork, VehicleRegistry,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use trip_queue_domain::{
    Booking, BookingId, Driver, DriverId, NewBooking, NewPaymentRecord, NewTrip, PaymentId,
    PaymentRecord, Route, RouteId, RouteStatus, TicketReference, Trip, TripId, Vehicle, VehicleId,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    routes: BTreeMap<RouteId, Route>,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    drivers: BTreeMap<DriverId, Driver>,
    trips: BTreeMap<TripId, Trip>,
    bookings: BTreeMap<BookingId, Booking>,
    payments: Vec<PaymentRecord>,
    next_trip_id: i64,
    next_booking_id: i64,
    next_payment_id: i64,
}

/// A [`Store`] holding everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    committed: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // The committed set is only replaced wholesale, so a poisoned lock
        // still guards consistent data.
        self.committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces a route in the route registry.
    pub fn upsert_route(&self, route: Route) {
        self.tables().routes.insert(route.route_id, route);
    }

    /// Adds or replaces a vehicle in the vehicle registry.
    pub fn upsert_vehicle(&self, vehicle: Vehicle) {
        self.tables().vehicles.insert(vehicle.vehicle_id, vehicle);
    }

    /// Adds or replaces a driver in the driver registry.
    pub fn upsert_driver(&self, driver: Driver) {
        self.tables().drivers.insert(driver.driver_id, driver);
    }

    /// Opens or closes a route.
    pub fn set_route_status(&self, route_id: RouteId, status: RouteStatus) {
        if let Some(route) = self.tables().routes.get_mut(&route_id) {
            route.status = status;
        }
    }

    /// Marks a driver available or unavailable.
    pub fn set_driver_available(&self, driver_id: DriverId, is_available: bool) {
        if let Some(driver) = self.tables().drivers.get_mut(&driver_id) {
            driver.is_available = is_available;
        }
    }
}

impl Store for MemoryStore {
    fn transaction<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
    {
        let mut committed: MutexGuard<'_, Tables> = self.tables();
        let mut working: Tables = committed.clone();

        let result: Result<T, E> = operation(&mut MemoryUnit {
            tables: &mut working,
        });
        if result.is_ok() {
            *committed = working;
        }
        result
    }
}

struct MemoryUnit<'a> {
    tables: &'a mut Tables,
}

fn newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| {
        b.booking_date
            .cmp(&a.booking_date)
            .then(b.booking_id.cmp(&a.booking_id))
    });
}

impl RouteRepository for MemoryUnit<'_> {
    fn find_route(&mut self, route_id: RouteId) -> Result<Option<Route>, StoreError> {
        Ok(self.tables.routes.get(&route_id).cloned())
    }

    fn list_routes(&mut self) -> Result<Vec<Route>, StoreError> {
        Ok(self.tables.routes.values().cloned().collect())
    }
}

impl VehicleRegistry for MemoryUnit<'_> {
    fn find_vehicle(&mut self, vehicle_id: VehicleId) -> Result<Option<Vehicle>, StoreError> {
        Ok(self.tables.vehicles.get(&vehicle_id).cloned())
    }
}

impl DriverRegistry for MemoryUnit<'_> {
    fn find_driver(&mut self, driver_id: DriverId) -> Result<Option<Driver>, StoreError> {
        Ok(self.tables.drivers.get(&driver_id).cloned())
    }
}

impl TripRepository for MemoryUnit<'_> {
    fn lock_route_queue(&mut self, _route_id: RouteId) -> Result<(), StoreError> {
        // The store mutex already serializes every unit of work.
        Ok(())
    }

    fn find_trip(&mut self, trip_id: TripId) -> Result<Option<Trip>, StoreError> {
        Ok(self.tables.trips.get(&trip_id).cloned())
    }

    fn trips_for_route(&mut self, route_id: RouteId) -> Result<Vec<Trip>, StoreError> {
        let mut trips: Vec<Trip> = self
            .tables
            .trips
            .values()
            .filter(|trip| trip.route_id == route_id)
            .cloned()
            .collect();
        trips.sort_by_key(|trip| (trip.queue_position, trip.trip_id));
        Ok(trips)
    }

    fn queued_trips(&mut self) -> Result<Vec<Trip>, StoreError> {
        let mut trips: Vec<Trip> = self
            .tables
            .trips
            .values()
            .filter(|trip| trip.status.is_queued())
            .cloned()
            .collect();
        trips.sort_by_key(|trip| (trip.route_id, trip.queue_position, trip.trip_id));
        Ok(trips)
    }

    fn all_trips(&mut self) -> Result<Vec<Trip>, StoreError> {
        Ok(self.tables.trips.values().cloned().collect())
    }

    fn trips_for_driver(&mut self, driver_id: DriverId) -> Result<Vec<Trip>, StoreError> {
        let mut trips: Vec<Trip> = self
            .tables
            .trips
            .values()
            .filter(|trip| trip.driver_id == driver_id)
            .cloned()
            .collect();
        trips.sort_by_key(|trip| (trip.estimated_departure_time, trip.trip_id));
        Ok(trips)
    }

    fn insert_trip(&mut self, new_trip: &NewTrip) -> Result<Trip, StoreError> {
        self.tables.next_trip_id += 1;
        let trip: Trip = Trip::from_new(TripId::new(self.tables.next_trip_id), new_trip);
        self.tables.trips.insert(trip.trip_id, trip.clone());
        Ok(trip)
    }

    fn update_trip(&mut self, trip: &Trip) -> Result<Trip, StoreError> {
        let stored: &mut Trip =
            self.tables
                .trips
                .get_mut(&trip.trip_id)
                .ok_or_else(|| StoreError::Backend(format!("trip {} does not exist", trip.trip_id)))?;
        if stored.version != trip.version {
            return Err(StoreError::Conflict {
                entity: "trip",
                id: trip.trip_id.value(),
            });
        }

        let mut updated: Trip = trip.clone();
        updated.version += 1;
        *stored = updated.clone();
        Ok(updated)
    }
}

impl BookingRepository for MemoryUnit<'_> {
    fn find_booking(&mut self, booking_id: BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(self.tables.bookings.get(&booking_id).cloned())
    }

    fn find_booking_by_reference(
        &mut self,
        reference: &TicketReference,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .tables
            .bookings
            .values()
            .find(|booking| &booking.ticket_reference == reference)
            .cloned())
    }

    fn ticket_reference_exists(&mut self, reference: &TicketReference) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .bookings
            .values()
            .any(|booking| &booking.ticket_reference == reference))
    }

    fn bookings_for_trip(&mut self, trip_id: TripId) -> Result<Vec<Booking>, StoreError> {
        let mut bookings: Vec<Booking> = self
            .tables
            .bookings
            .values()
            .filter(|booking| booking.trip_id == trip_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|booking| (booking.booking_date, booking.booking_id));
        Ok(bookings)
    }

    fn bookings_by_email(&mut self, email: &str) -> Result<Vec<Booking>, StoreError> {
        let mut bookings: Vec<Booking> = self
            .tables
            .bookings
            .values()
            .filter(|booking| booking.passenger.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect();
        newest_first(&mut bookings);
        Ok(bookings)
    }

    fn bookings_by_passenger_name(
        &mut self,
        fragment: &str,
    ) -> Result<Vec<Booking>, StoreError> {
        let needle: String = fragment.to_lowercase();
        let mut bookings: Vec<Booking> = self
            .tables
            .bookings
            .values()
            .filter(|booking| {
                booking
                    .passenger
                    .full_name()
                    .to_lowercase()
                    .contains(&needle)
            })
            .cloned()
            .collect();
        newest_first(&mut bookings);
        Ok(bookings)
    }

    fn cancelled_bookings(&mut self, limit: usize) -> Result<Vec<Booking>, StoreError> {
        let mut bookings: Vec<Booking> = self
            .tables
            .bookings
            .values()
            .filter(|booking| !booking.is_paid())
            .cloned()
            .collect();
        bookings.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(b.booking_id.cmp(&a.booking_id))
        });
        bookings.truncate(limit);
        Ok(bookings)
    }

    fn insert_booking(&mut self, new_booking: NewBooking) -> Result<Booking, StoreError> {
        if self
            .tables
            .bookings
            .values()
            .any(|booking| booking.ticket_reference == new_booking.ticket_reference)
        {
            return Err(StoreError::UniqueViolation(format!(
                "bookings.ticket_reference = {}",
                new_booking.ticket_reference
            )));
        }

        self.tables.next_booking_id += 1;
        let booking: Booking =
            Booking::from_new(BookingId::new(self.tables.next_booking_id), new_booking);
        self.tables.bookings.insert(booking.booking_id, booking.clone());
        Ok(booking)
    }

    fn update_booking(&mut self, booking: &Booking) -> Result<(), StoreError> {
        let stored: &mut Booking = self
            .tables
            .bookings
            .get_mut(&booking.booking_id)
            .ok_or_else(|| {
                StoreError::Backend(format!("booking {} does not exist", booking.booking_id))
            })?;
        stored.payment_status = booking.payment_status;
        stored.updated_at = booking.updated_at;
        Ok(())
    }
}

impl PaymentRepository for MemoryUnit<'_> {
    fn payments_for_booking(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Vec<PaymentRecord>, StoreError> {
        let mut payments: Vec<PaymentRecord> = self
            .tables
            .payments
            .iter()
            .filter(|record| record.booking_id == booking_id)
            .cloned()
            .collect();
        payments.sort_by_key(|record| (record.payment_datetime, record.payment_id));
        Ok(payments)
    }

    fn append_payment(
        &mut self,
        new_payment: NewPaymentRecord,
    ) -> Result<PaymentRecord, StoreError> {
        self.tables.next_payment_id += 1;
        let record: PaymentRecord =
            PaymentRecord::from_new(PaymentId::new(self.tables.next_payment_id), new_payment);
        self.tables.payments.push(record.clone());
        Ok(record)
    }
}
