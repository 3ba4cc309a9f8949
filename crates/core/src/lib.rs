// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod allocator;
mod clock;
mod command;
mod config;
mod engine;
mod error;
mod lifecycle;
mod lookup;
mod memory;
mod outcome;
mod projections;
mod queue;
mod reference;
mod store;

#[cfg(test)]
mod tests;

// Re-export public types
pub use clock::{Clock, FixedClock, SystemClock};
pub use command::{BookingRequest, EnqueueTrip};
pub use config::{
    DEFAULT_CANCELLATION_HISTORY_LIMIT, DEFAULT_TICKET_REFERENCE_ATTEMPTS,
    DEFAULT_TRIP_HISTORY_LIMIT, EngineConfig,
};
pub use engine::Engine;
pub use error::CoreError;
pub use memory::MemoryStore;
pub use outcome::{
    BookingCancellation, BookingConfirmation, BookingRefund, InvariantReport, TripCancellation,
};
pub use projections::{
    ActiveBooking, BookingDetails, ManifestEntry, QueueStatus, RouteQueue, TripDetails,
    TripManifest,
};
pub use reference::{RandomReferenceSource, ReferenceSource};
pub use store::{
    BookingRepository, DriverRegistry, PaymentRepository, RouteRepository, Store, StoreError,
    TripRepository, UnitOfWork, VehicleRegistry,
};
