// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The engine facade.
//!
//! Every method runs exactly one operation inside one unit of work of the
//! underlying [`Store`]. Projections use [`Store::read`]. A failing operation
//! leaves the store untouched.

use crate::allocator::{self, AllocationContext};
use crate::clock::{Clock, SystemClock};
use crate::command::{BookingRequest, EnqueueTrip};
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::lifecycle;
use crate::outcome::{BookingCancellation, BookingConfirmation, InvariantReport, TripCancellation};
use crate::projections::{
    self, ActiveBooking, BookingDetails, QueueStatus, TripDetails, TripManifest,
};
use crate::queue;
use crate::reference::{RandomReferenceSource, ReferenceSource};
use crate::store::Store;
use std::sync::Arc;
use tracing::debug;
use trip_queue_domain::{
    Booking, BookingId, DriverId, PaymentRecord, Route, RouteId, Trip, TripId, VehicleId,
};

/// Trip queue and seat allocation engine over a [`Store`].
pub struct Engine<S: Store> {
    store: S,
    clock: Arc<dyn Clock>,
    references: Arc<dyn ReferenceSource>,
    config: EngineConfig,
}

impl<S: Store> Engine<S> {
    /// Creates an engine using the system clock and random ticket references.
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            references: Arc::new(RandomReferenceSource),
            config,
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the ticket reference source.
    #[must_use]
    pub fn with_reference_source(mut self, references: Arc<dyn ReferenceSource>) -> Self {
        self.references = references;
        self
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn allocation_context(&self) -> AllocationContext<'_> {
        AllocationContext {
            now: self.clock.now(),
            references: self.references.as_ref(),
            reference_attempts: self.config.ticket_reference_attempts,
        }
    }

    // ========================================================================
    // Queue
    // ========================================================================

    /// Appends a trip to the tail of its route's queue.
    ///
    /// The trip starts `boarding` or `waiting` according to the configured
    /// boarding policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the route, vehicle or driver is unknown or
    /// unusable.
    pub fn enqueue_trip(&self, request: &EnqueueTrip) -> Result<Trip, CoreError> {
        let policy = self.config.boarding_policy;
        self.store
            .transaction(|uow| queue::enqueue_trip(uow, request, policy))
    }

    /// Opens a waiting trip for bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip is unknown or not `waiting`.
    pub fn open_boarding(&self, trip_id: TripId) -> Result<Trip, CoreError> {
        self.store
            .transaction(|uow| queue::open_boarding(uow, trip_id))
    }

    /// Departs a trip and advances its route's queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip is unknown or not `boarding`/`full`.
    pub fn advance_queue(&self, trip_id: TripId) -> Result<Trip, CoreError> {
        let now = self.clock.now();
        self.store
            .transaction(|uow| queue::advance_queue(uow, trip_id, now))
    }

    /// Records a departed trip's arrival.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip is unknown or not `departed`.
    pub fn mark_arrived(&self, trip_id: TripId) -> Result<Trip, CoreError> {
        let now = self.clock.now();
        self.store
            .transaction(|uow| queue::mark_arrived(uow, trip_id, now))
    }

    /// Cancels a queued trip without paid bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip is unknown, not queued or still has
    /// paid bookings.
    pub fn cancel_trip(&self, trip_id: TripId) -> Result<TripCancellation, CoreError> {
        self.store
            .transaction(|uow| queue::cancel_trip(uow, trip_id))
    }

    /// Cancels a queued trip and refunds all of its paid bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip is unknown or not queued.
    pub fn cancel_trip_with_refunds(&self, trip_id: TripId) -> Result<TripCancellation, CoreError> {
        let now = self.clock.now();
        self.store
            .transaction(|uow| queue::cancel_trip_with_refunds(uow, trip_id, now))
    }

    /// Moves a queued trip onto another vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip or vehicle is unknown, the trip is not
    /// queued, the vehicle is inactive or too small.
    pub fn reassign_vehicle(
        &self,
        trip_id: TripId,
        vehicle_id: VehicleId,
    ) -> Result<Trip, CoreError> {
        self.store
            .transaction(|uow| queue::reassign_vehicle(uow, trip_id, vehicle_id))
    }

    /// Assigns another driver to a queued trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip or driver is unknown, the trip is not
    /// queued or the driver is unavailable.
    pub fn reassign_driver(&self, trip_id: TripId, driver_id: DriverId) -> Result<Trip, CoreError> {
        self.store
            .transaction(|uow| queue::reassign_driver(uow, trip_id, driver_id))
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Books seats on the front-most boarding trip of a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is malformed, the route is unknown
    /// or inactive, no trip can hold the seats, or no ticket reference could
    /// be allocated.
    pub fn smart_book(
        &self,
        route_id: RouteId,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, CoreError> {
        let ctx = self.allocation_context();
        self.store
            .transaction(|uow| allocator::smart_book(uow, route_id, request, ctx))
    }

    /// Books seats on a specific trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is malformed, the trip is unknown,
    /// not boarding or lacks seats, or no ticket reference could be
    /// allocated.
    pub fn book_for_trip(
        &self,
        trip_id: TripId,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, CoreError> {
        let ctx = self.allocation_context();
        self.store
            .transaction(|uow| allocator::book_for_trip(uow, trip_id, request, ctx))
    }

    /// Cancels a paid booking and refunds it.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is unknown or already cancelled.
    pub fn cancel_booking(&self, booking_id: BookingId) -> Result<BookingCancellation, CoreError> {
        let now = self.clock.now();
        self.store
            .transaction(|uow| lifecycle::cancel_booking(uow, booking_id, now))
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Queued trips per route, optionally for a single route.
    ///
    /// # Errors
    ///
    /// Returns `RouteNotFound` if a given route is unknown.
    pub fn queue_status(&self, route_id: Option<RouteId>) -> Result<QueueStatus, CoreError> {
        debug!(route_id = route_id.map(RouteId::value), "Reading queue status");
        self.store
            .read(|uow| projections::queue_status(uow, route_id))
    }

    /// A trip with its registry records and manifest.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error if the trip is unknown.
    pub fn trip_details(&self, trip_id: TripId) -> Result<TripDetails, CoreError> {
        self.store
            .read(|uow| projections::trip_details(uow, trip_id))
    }

    /// The passenger manifest of a trip.
    ///
    /// # Errors
    ///
    /// Returns `TripNotFound` if the trip is unknown.
    pub fn trip_manifest(&self, trip_id: TripId) -> Result<TripManifest, CoreError> {
        self.store
            .read(|uow| projections::trip_manifest(uow, trip_id))
    }

    /// Looks a booking up by ticket reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is malformed or unknown.
    pub fn booking_by_reference(&self, reference: &str) -> Result<BookingDetails, CoreError> {
        self.store
            .read(|uow| projections::booking_by_reference(uow, reference))
    }

    /// A booking with its trip, route and payments.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` if the booking is unknown.
    pub fn booking_details(&self, booking_id: BookingId) -> Result<BookingDetails, CoreError> {
        self.store
            .read(|uow| projections::booking_details(uow, booking_id))
    }

    /// Bookings made under an email address, newest first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPassenger` if the email is blank.
    pub fn search_bookings_by_email(&self, email: &str) -> Result<Vec<Booking>, CoreError> {
        self.store
            .read(|uow| projections::search_by_email(uow, email))
    }

    /// Bookings whose passenger name contains `fragment`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPassenger` if the fragment is blank.
    pub fn search_bookings_by_name(&self, fragment: &str) -> Result<Vec<Booking>, CoreError> {
        self.store
            .read(|uow| projections::search_by_name(uow, fragment))
    }

    /// The `limit` most recent cancellations.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn cancellation_history(&self, limit: usize) -> Result<Vec<Booking>, CoreError> {
        self.store
            .read(|uow| projections::cancellation_history(uow, limit))
    }

    /// The newest payment ledger entry of a booking.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` if the booking is unknown.
    pub fn latest_payment(&self, booking_id: BookingId) -> Result<Option<PaymentRecord>, CoreError> {
        self.store
            .read(|uow| projections::latest_payment(uow, booking_id))
    }

    /// The trip a route-level booking would currently land on.
    ///
    /// # Errors
    ///
    /// Returns `RouteNotFound` if the route is unknown.
    pub fn next_available_trip(&self, route_id: RouteId) -> Result<Option<Trip>, CoreError> {
        self.store
            .read(|uow| projections::next_trip(uow, route_id))
    }

    /// Trips of a route taking bookings, earliest departure first.
    ///
    /// # Errors
    ///
    /// Returns `RouteNotFound` if the route is unknown.
    pub fn available_trips(&self, route_id: RouteId) -> Result<Vec<Trip>, CoreError> {
        self.store
            .read(|uow| projections::available_trips(uow, route_id))
    }

    /// The trip a driver is working now, if any.
    ///
    /// # Errors
    ///
    /// Returns `DriverNotFound` if the driver is unknown.
    pub fn current_trip_for_driver(&self, driver_id: DriverId) -> Result<Option<Trip>, CoreError> {
        self.store
            .read(|uow| projections::current_trip_for_driver(uow, driver_id))
    }

    /// Queued trips of a driver, earliest departure first.
    ///
    /// # Errors
    ///
    /// Returns `DriverNotFound` if the driver is unknown.
    pub fn upcoming_trips_for_driver(&self, driver_id: DriverId) -> Result<Vec<Trip>, CoreError> {
        self.store
            .read(|uow| projections::upcoming_trips_for_driver(uow, driver_id))
    }

    /// The `limit` most recently departed trips of a driver.
    ///
    /// # Errors
    ///
    /// Returns `DriverNotFound` if the driver is unknown.
    pub fn trip_history_for_driver(
        &self,
        driver_id: DriverId,
        limit: usize,
    ) -> Result<Vec<Trip>, CoreError> {
        debug!(driver_id = driver_id.value(), limit, "Reading driver trip history");
        self.store
            .read(|uow| projections::trip_history_for_driver(uow, driver_id, limit))
    }

    /// Active routes by destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn active_routes(&self) -> Result<Vec<Route>, CoreError> {
        self.store.read(projections::active_routes)
    }

    /// Paid bookings on queued trips.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn active_bookings(&self) -> Result<Vec<ActiveBooking>, CoreError> {
        self.store.read(projections::active_bookings)
    }

    /// Audits every seat ledger and route queue.
    ///
    /// # Errors
    ///
    /// Returns an `Internal`-kind error on the first violation found.
    pub fn verify_invariants(&self) -> Result<InvariantReport, CoreError> {
        self.store.read(projections::verify_invariants)
    }
}
