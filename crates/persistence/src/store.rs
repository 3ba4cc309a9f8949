// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The `SQLite` [`Store`].
//!
//! One connection is shared behind a mutex. Every writing unit of work runs
//! inside `BEGIN IMMEDIATE`, so the write lock is taken up front and two
//! writers never interleave their reads and writes. Read-only units of work
//! run inside a deferred `BEGIN` and only take a shared lock, so under WAL
//! they proceed while another connection holds the write lock.

use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::{Connection, SqliteConnection};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use trip_queue::{
    BookingRepository, DriverRegistry, PaymentRepository, RouteRepository, Store, StoreError,
    TripRepository, UnitOfWork, VehicleRegistry,
};
use trip_queue_domain::{
    Booking, BookingId, Driver, DriverId, NewBooking, NewPaymentRecord, NewTrip, PaymentRecord,
    Route, RouteId, RouteStatus, TicketReference, Trip, TripId, Vehicle, VehicleId,
};

use crate::backend::sqlite::{self, StorageMode};
use crate::error::PersistenceError;
use crate::seed::RegistrySeed;
use crate::{mutations, queries};

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A [`Store`] backed by a single `SQLite` connection.
pub struct SqliteStore {
    conn: Mutex<SqliteConnection>,
}

impl SqliteStore {
    /// Opens a private in-memory database.
    ///
    /// Each call receives its own database, named from a process-wide
    /// counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:trip_queue_mem_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection = sqlite::open(&shared_memory_url, StorageMode::Memory)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (or creates) a database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let conn: SqliteConnection = sqlite::open(path_str, StorageMode::File)?;

        info!(path = path_str, "Opened trip queue database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Locks the connection.
    ///
    /// A unit of work that panicked leaves its transaction open and the
    /// mutex poisoned; that transaction is rolled back before reuse.
    fn connection(&self) -> MutexGuard<'_, SqliteConnection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Recovering connection after a panicked unit of work");
                let mut guard: MutexGuard<'_, SqliteConnection> = poisoned.into_inner();
                if let Err(e) =
                    <AnsiTransactionManager as TransactionManager<SqliteConnection>>::rollback_transaction(
                        &mut *guard,
                    )
                {
                    debug!(error = %e, "No open transaction to roll back");
                }
                self.conn.clear_poison();
                guard
            }
        }
    }

    fn write<F>(&self, operation: F) -> Result<(), PersistenceError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<(), PersistenceError>,
    {
        let mut conn: MutexGuard<'_, SqliteConnection> = self.connection();
        conn.immediate_transaction(operation)
    }

    /// Inserts or replaces a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_route(&self, route: &Route) -> Result<(), PersistenceError> {
        self.write(|conn| mutations::registry::upsert_route(conn, route))
    }

    /// Inserts or replaces a vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_vehicle(&self, vehicle: &Vehicle) -> Result<(), PersistenceError> {
        self.write(|conn| mutations::registry::upsert_vehicle(conn, vehicle))
    }

    /// Inserts or replaces a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_driver(&self, driver: &Driver) -> Result<(), PersistenceError> {
        self.write(|conn| mutations::registry::upsert_driver(conn, driver))
    }

    /// Opens or closes a route.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the route does not exist.
    pub fn set_route_status(
        &self,
        route_id: RouteId,
        status: RouteStatus,
    ) -> Result<(), PersistenceError> {
        self.write(|conn| mutations::registry::set_route_status(conn, route_id, status))
    }

    /// Marks a driver available or unavailable.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the driver does not exist.
    pub fn set_driver_available(
        &self,
        driver_id: DriverId,
        is_available: bool,
    ) -> Result<(), PersistenceError> {
        self.write(|conn| mutations::registry::set_driver_available(conn, driver_id, is_available))
    }

    /// Loads a registry seed in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any record cannot be written; nothing is kept in
    /// that case.
    pub fn seed_registry(&self, seed: &RegistrySeed) -> Result<(), PersistenceError> {
        self.write(|conn| {
            for route in &seed.routes {
                mutations::registry::upsert_route(conn, route)?;
            }
            for vehicle in &seed.vehicles {
                mutations::registry::upsert_vehicle(conn, vehicle)?;
            }
            for driver in &seed.drivers {
                mutations::registry::upsert_driver(conn, driver)?;
            }
            Ok(())
        })?;

        info!(
            routes = seed.routes.len(),
            vehicles = seed.vehicles.len(),
            drivers = seed.drivers.len(),
            "Seeded registry"
        );
        Ok(())
    }
}

/// Splits failures of the caller's operation from failures of the
/// transaction itself.
enum TxError<E> {
    Operation(E),
    Database(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for TxError<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

impl Store for SqliteStore {
    fn transaction<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
    {
        let mut conn: MutexGuard<'_, SqliteConnection> = self.connection();

        let outcome: Result<T, TxError<E>> = conn.immediate_transaction(|conn| {
            operation(&mut SqliteUnit { conn }).map_err(TxError::Operation)
        });

        settle(outcome)
    }

    fn read<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
    {
        let mut conn: MutexGuard<'_, SqliteConnection> = self.connection();

        let outcome: Result<T, TxError<E>> = conn.transaction(|conn| {
            operation(&mut SqliteUnit { conn }).map_err(TxError::Operation)
        });

        settle(outcome)
    }
}

fn settle<T, E: From<StoreError>>(outcome: Result<T, TxError<E>>) -> Result<T, E> {
    match outcome {
        Ok(value) => Ok(value),
        Err(TxError::Operation(err)) => Err(err),
        Err(TxError::Database(err)) => {
            debug!(error = %err, "Unit of work failed to begin or commit");
            Err(E::from(StoreError::from(PersistenceError::from(err))))
        }
    }
}

/// The repositories of one open transaction.
struct SqliteUnit<'a> {
    conn: &'a mut SqliteConnection,
}

impl RouteRepository for SqliteUnit<'_> {
    fn find_route(&mut self, route_id: RouteId) -> Result<Option<Route>, StoreError> {
        Ok(queries::registry::find_route(self.conn, route_id)?)
    }

    fn list_routes(&mut self) -> Result<Vec<Route>, StoreError> {
        Ok(queries::registry::list_routes(self.conn)?)
    }
}

impl VehicleRegistry for SqliteUnit<'_> {
    fn find_vehicle(&mut self, vehicle_id: VehicleId) -> Result<Option<Vehicle>, StoreError> {
        Ok(queries::registry::find_vehicle(self.conn, vehicle_id)?)
    }
}

impl DriverRegistry for SqliteUnit<'_> {
    fn find_driver(&mut self, driver_id: DriverId) -> Result<Option<Driver>, StoreError> {
        Ok(queries::registry::find_driver(self.conn, driver_id)?)
    }
}

impl TripRepository for SqliteUnit<'_> {
    fn lock_route_queue(&mut self, route_id: RouteId) -> Result<(), StoreError> {
        Ok(mutations::trips::lock_route_queue(self.conn, route_id)?)
    }

    fn find_trip(&mut self, trip_id: TripId) -> Result<Option<Trip>, StoreError> {
        Ok(queries::trips::find_trip(self.conn, trip_id)?)
    }

    fn trips_for_route(&mut self, route_id: RouteId) -> Result<Vec<Trip>, StoreError> {
        Ok(queries::trips::trips_for_route(self.conn, route_id)?)
    }

    fn queued_trips(&mut self) -> Result<Vec<Trip>, StoreError> {
        Ok(queries::trips::queued_trips(self.conn)?)
    }

    fn all_trips(&mut self) -> Result<Vec<Trip>, StoreError> {
        Ok(queries::trips::all_trips(self.conn)?)
    }

    fn trips_for_driver(&mut self, driver_id: DriverId) -> Result<Vec<Trip>, StoreError> {
        Ok(queries::trips::trips_for_driver(self.conn, driver_id)?)
    }

    fn insert_trip(&mut self, new_trip: &NewTrip) -> Result<Trip, StoreError> {
        Ok(mutations::trips::insert_trip(self.conn, new_trip)?)
    }

    fn update_trip(&mut self, trip: &Trip) -> Result<Trip, StoreError> {
        Ok(mutations::trips::update_trip(self.conn, trip)?)
    }
}

impl BookingRepository for SqliteUnit<'_> {
    fn find_booking(&mut self, booking_id: BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(queries::bookings::find_booking(self.conn, booking_id)?)
    }

    fn find_booking_by_reference(
        &mut self,
        reference: &TicketReference,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(queries::bookings::find_booking_by_reference(
            self.conn, reference,
        )?)
    }

    fn ticket_reference_exists(&mut self, reference: &TicketReference) -> Result<bool, StoreError> {
        Ok(queries::bookings::ticket_reference_exists(
            self.conn, reference,
        )?)
    }

    fn bookings_for_trip(&mut self, trip_id: TripId) -> Result<Vec<Booking>, StoreError> {
        Ok(queries::bookings::bookings_for_trip(self.conn, trip_id)?)
    }

    fn bookings_by_email(&mut self, email: &str) -> Result<Vec<Booking>, StoreError> {
        Ok(queries::bookings::bookings_by_email(self.conn, email)?)
    }

    fn bookings_by_passenger_name(
        &mut self,
        fragment: &str,
    ) -> Result<Vec<Booking>, StoreError> {
        Ok(queries::bookings::bookings_by_passenger_name(
            self.conn, fragment,
        )?)
    }

    fn cancelled_bookings(&mut self, limit: usize) -> Result<Vec<Booking>, StoreError> {
        Ok(queries::bookings::cancelled_bookings(self.conn, limit)?)
    }

    fn insert_booking(&mut self, new_booking: NewBooking) -> Result<Booking, StoreError> {
        Ok(mutations::bookings::insert_booking(self.conn, new_booking)?)
    }

    fn update_booking(&mut self, booking: &Booking) -> Result<(), StoreError> {
        Ok(mutations::bookings::update_booking(self.conn, booking)?)
    }
}

impl PaymentRepository for SqliteUnit<'_> {
    fn payments_for_booking(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Vec<PaymentRecord>, StoreError> {
        Ok(queries::bookings::payments_for_booking(
            self.conn, booking_id,
        )?)
    }

    fn append_payment(
        &mut self,
        new_payment: NewPaymentRecord,
    ) -> Result<PaymentRecord, StoreError> {
        Ok(mutations::bookings::append_payment(self.conn, new_payment)?)
    }
}
