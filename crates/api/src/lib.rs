// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary of the trip queue engine.
//!
//! Translates request DTOs into engine calls and engine outcomes into
//! response DTOs. Failures leave this crate as [`ApiError`], a tagged
//! `{ kind, message }` value the serving layer maps onto its own status
//! codes. Nothing here knows about HTTP.

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

mod csv_export;
mod error;
mod handlers;
mod request_response;
mod retry;

#[cfg(test)]
mod tests;

pub use csv_export::{MANIFEST_CSV_HEADER, manifest_to_csv};
pub use error::{ApiError, translate_core_error, translate_domain_error};
pub use handlers::{
    DEFAULT_DRIVER_HISTORY_LIMIT, DEFAULT_HISTORY_LIMIT, book_for_trip, cancel_booking,
    cancel_trip, cancel_trip_with_refunds, depart_trip, enqueue_trip, export_trip_manifest_csv,
    get_available_trips, get_booking_by_reference, get_booking_details,
    get_cancellation_history, get_current_trip_for_driver, get_latest_payment,
    get_next_available_trip, get_queue_status, get_trip_details, get_trip_history_for_driver,
    get_trip_manifest, get_upcoming_trips_for_driver, list_active_bookings, list_active_routes,
    mark_arrived, open_boarding, reassign_driver, reassign_vehicle, search_bookings_by_email,
    search_bookings_by_name, smart_book, verify_invariants,
};
pub use request_response::{
    ActiveBookingInfo, BookingCancellationResponse, BookingConfirmationResponse,
    BookingDetailsResponse, BookingInfo, BookingRefundInfo, CancellationHistoryQuery,
    CreateBookingRequest, DriverInfo, DriverTripResponse, EmailSearchQuery, EnqueueTripRequest,
    InvariantReportResponse, LatestPaymentResponse, ManifestEntryInfo, NameSearchQuery,
    NextTripResponse, PaymentRecordInfo, QueueStatusResponse, ReassignDriverRequest,
    ReassignVehicleRequest, RouteInfo, RouteQueueInfo, TripCancellationResponse,
    TripDetailsResponse, TripHistoryQuery, TripInfo, TripManifestResponse, VehicleInfo,
};
pub use retry::{DEFAULT_CONFLICT_RETRIES, RetryPolicy};
