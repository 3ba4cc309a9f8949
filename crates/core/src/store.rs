// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repository interfaces and the unit-of-work boundary.
//!
//! Every engine operation runs inside exactly one [`Store::transaction`]
//! or [`Store::read`] call. Implementations commit when the closure returns
//! `Ok` and discard every change when it returns `Err` or panics.

use thiserror::Error;
use trip_queue_domain::{
    Booking, BookingId, Driver, DriverId, NewBooking, NewPaymentRecord, NewTrip, PaymentRecord,
    Route, RouteId, TicketReference, Trip, TripId, Vehicle, VehicleId,
};

/// Failures reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An optimistic version check failed.
    #[error("{entity} {id} was modified concurrently")]
    Conflict {
        /// Kind of record.
        entity: &'static str,
        /// Identifier of the record.
        id: i64,
    },
    /// The database could not take the write lock in time.
    #[error("database is busy: {0}")]
    Busy(String),
    /// A unique index rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    /// Any other backend failure.
    #[error("storage backend failure: {0}")]
    Backend(String),
    /// A stored value could not be mapped back into a domain type.
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

/// Read-only lookup of route master data.
pub trait RouteRepository {
    /// Finds a route by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_route(&mut self, route_id: RouteId) -> Result<Option<Route>, StoreError>;

    /// Lists every route ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_routes(&mut self) -> Result<Vec<Route>, StoreError>;
}

/// Read-only lookup of vehicle master data.
pub trait VehicleRegistry {
    /// Finds a vehicle by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_vehicle(&mut self, vehicle_id: VehicleId) -> Result<Option<Vehicle>, StoreError>;
}

/// Read-only lookup of driver master data.
pub trait DriverRegistry {
    /// Finds a driver by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_driver(&mut self, driver_id: DriverId) -> Result<Option<Driver>, StoreError>;
}

/// Trips and the per-route queue lock.
pub trait TripRepository {
    /// Takes the route's queue lock for the rest of the unit of work.
    ///
    /// Every operation that reads and then rewrites queue positions or seat
    /// counters of a route takes this lock first.
    ///
    /// # Errors
    ///
    /// Returns `Busy` or `Conflict` if another writer holds the route.
    fn lock_route_queue(&mut self, route_id: RouteId) -> Result<(), StoreError>;

    /// Finds a trip by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_trip(&mut self, trip_id: TripId) -> Result<Option<Trip>, StoreError>;

    /// Lists every trip of a route in any status, ordered by queue position
    /// then id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn trips_for_route(&mut self, route_id: RouteId) -> Result<Vec<Trip>, StoreError>;

    /// Lists queued trips of every route, ordered by route then position.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn queued_trips(&mut self) -> Result<Vec<Trip>, StoreError>;

    /// Lists every trip in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn all_trips(&mut self) -> Result<Vec<Trip>, StoreError>;

    /// Lists every trip assigned to a driver in any status, ordered by
    /// estimated departure then id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn trips_for_driver(&mut self, driver_id: DriverId) -> Result<Vec<Trip>, StoreError>;

    /// Inserts a trip and returns it with its assigned id and version `0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert_trip(&mut self, new_trip: &NewTrip) -> Result<Trip, StoreError>;

    /// Writes `trip` if the stored version still equals `trip.version`.
    ///
    /// # Returns
    ///
    /// The trip as stored, with its version incremented.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the stored version moved on.
    fn update_trip(&mut self, trip: &Trip) -> Result<Trip, StoreError>;
}

/// Bookings and ticket references.
pub trait BookingRepository {
    /// Finds a booking by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_booking(&mut self, booking_id: BookingId) -> Result<Option<Booking>, StoreError>;

    /// Finds a booking by its ticket reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_booking_by_reference(
        &mut self,
        reference: &TicketReference,
    ) -> Result<Option<Booking>, StoreError>;

    /// Returns true if any booking already carries `reference`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn ticket_reference_exists(&mut self, reference: &TicketReference) -> Result<bool, StoreError>;

    /// Lists the bookings of a trip in any status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn bookings_for_trip(&mut self, trip_id: TripId) -> Result<Vec<Booking>, StoreError>;

    /// Lists bookings whose passenger email matches, ignoring case, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn bookings_by_email(&mut self, email: &str) -> Result<Vec<Booking>, StoreError>;

    /// Lists bookings whose passenger name contains `fragment`, ignoring
    /// case, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn bookings_by_passenger_name(&mut self, fragment: &str)
    -> Result<Vec<Booking>, StoreError>;

    /// Lists cancelled bookings, most recently cancelled first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn cancelled_bookings(&mut self, limit: usize) -> Result<Vec<Booking>, StoreError>;

    /// Inserts a paid booking.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the ticket reference is taken.
    fn insert_booking(&mut self, new_booking: NewBooking) -> Result<Booking, StoreError>;

    /// Rewrites the mutable fields of a booking (status and `updated_at`).
    ///
    /// # Errors
    ///
    /// Returns an error if the booking does not exist or the backend fails.
    fn update_booking(&mut self, booking: &Booking) -> Result<(), StoreError>;
}

/// The append-only payment ledger.
pub trait PaymentRepository {
    /// Lists the ledger entries of a booking, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn payments_for_booking(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Vec<PaymentRecord>, StoreError>;

    /// Appends a ledger entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn append_payment(&mut self, new_payment: NewPaymentRecord)
    -> Result<PaymentRecord, StoreError>;
}

/// Every repository, scoped to one transaction.
pub trait UnitOfWork:
    RouteRepository
    + VehicleRegistry
    + DriverRegistry
    + TripRepository
    + BookingRepository
    + PaymentRepository
{
}

impl<T> UnitOfWork for T where
    T: RouteRepository
        + VehicleRegistry
        + DriverRegistry
        + TripRepository
        + BookingRepository
        + PaymentRepository
{
}

/// A transactional store shared across request threads.
pub trait Store: Send + Sync {
    /// Runs `operation` as one unit of work.
    ///
    /// Changes become visible to other callers only if `operation` returns
    /// `Ok`. On `Err` (or a panic) nothing it wrote survives.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `operation`, or a `StoreError` converted
    /// into `E` if the transaction could not begin or commit.
    fn transaction<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>;

    /// Runs a read-only `operation` against one consistent snapshot.
    ///
    /// Backends with a single writer lock override this so readers do not
    /// queue behind writers. `operation` must not write.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `operation`, or a `StoreError` converted
    /// into `E` if the snapshot could not be opened.
    fn read<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
    {
        self.transaction(operation)
    }
}
