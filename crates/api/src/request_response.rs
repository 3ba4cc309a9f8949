// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Amounts are integer minor units. Timestamps are RFC 3339 strings.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use trip_queue::{
    ActiveBooking, BookingCancellation, BookingConfirmation, BookingDetails, BookingRefund,
    InvariantReport, ManifestEntry, QueueStatus, RouteQueue, TripCancellation, TripDetails,
    TripManifest,
};
use trip_queue_domain::{Booking, Driver, PaymentRecord, Route, Trip, Vehicle};

// ============================================================================
// Requests
// ============================================================================

/// API request to append a trip to a route's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueTripRequest {
    /// The route the trip runs on.
    pub route_id: i64,
    /// The vehicle providing the seats.
    pub vehicle_id: i64,
    /// The assigned driver.
    pub driver_id: i64,
    /// Planned departure (RFC 3339).
    pub estimated_departure_time: String,
}

/// API request to book seats, either on a route or on a specific trip.
///
/// This DTO is distinct from domain types and represents the API contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// Passenger first name.
    pub first_name: String,
    /// Passenger last name.
    pub last_name: String,
    /// Passenger email.
    pub email: String,
    /// Passenger phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Passenger address.
    #[serde(default)]
    pub address: Option<String>,
    /// Number of seats.
    pub seat_count: u32,
    /// How the fare was paid (e.g. `cash`, `gcash`).
    pub payment_method: String,
    /// External payment reference.
    #[serde(default)]
    pub payment_reference: Option<String>,
    /// `online` or `walk-in`. Route bookings default to `online`, trip
    /// bookings to `walk-in`.
    #[serde(default)]
    pub booking_type: Option<String>,
}

/// API request to move a trip onto another vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignVehicleRequest {
    /// The replacement vehicle.
    pub vehicle_id: i64,
}

/// API request to assign another driver to a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignDriverRequest {
    /// The replacement driver.
    pub driver_id: i64,
}

/// Query for searching bookings by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSearchQuery {
    /// The passenger email.
    pub email: String,
}

/// Query for searching bookings by passenger name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSearchQuery {
    /// Fragment of "first last".
    pub name: String,
}

/// Query for the cancellation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CancellationHistoryQuery {
    /// Maximum entries to return.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query for a driver's trip history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TripHistoryQuery {
    /// Maximum trips to return.
    #[serde(default)]
    pub limit: Option<usize>,
}

// ============================================================================
// Records
// ============================================================================

/// A route as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub route_id: i64,
    pub origin: String,
    pub destination: String,
    pub fare_price: i64,
    pub status: String,
    pub estimated_duration_minutes: Option<u32>,
}

impl From<&Route> for RouteInfo {
    fn from(route: &Route) -> Self {
        Self {
            route_id: route.route_id.value(),
            origin: route.origin.clone(),
            destination: route.destination.clone(),
            fare_price: route.fare_price.minor_units(),
            status: route.status.to_string(),
            estimated_duration_minutes: route.estimated_duration_minutes,
        }
    }
}

/// A vehicle as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub vehicle_id: i64,
    pub plate_number: String,
    pub vehicle_type: String,
    pub capacity: u32,
    pub is_active: bool,
}

impl From<&Vehicle> for VehicleInfo {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            vehicle_id: vehicle.vehicle_id.value(),
            plate_number: vehicle.plate_number.clone(),
            vehicle_type: vehicle.vehicle_type.clone(),
            capacity: vehicle.capacity,
            is_active: vehicle.is_active,
        }
    }
}

/// A driver as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub driver_id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_available: bool,
}

impl From<&Driver> for DriverInfo {
    fn from(driver: &Driver) -> Self {
        Self {
            driver_id: driver.driver_id.value(),
            full_name: driver.full_name(),
            phone: driver.phone.clone(),
            is_available: driver.is_available,
        }
    }
}

/// A trip as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripInfo {
    pub trip_id: i64,
    pub route_id: i64,
    pub vehicle_id: i64,
    pub driver_id: i64,
    pub queue_position: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub estimated_departure_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub actual_departure_datetime: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub actual_arrival_datetime: Option<OffsetDateTime>,
    pub capacity: u32,
    pub seats_booked: u32,
    pub seats_available: u32,
    pub is_accepting_bookings: bool,
    pub status: String,
    pub fare_price: i64,
}

impl From<&Trip> for TripInfo {
    fn from(trip: &Trip) -> Self {
        Self {
            trip_id: trip.trip_id.value(),
            route_id: trip.route_id.value(),
            vehicle_id: trip.vehicle_id.value(),
            driver_id: trip.driver_id.value(),
            queue_position: trip.queue_position,
            estimated_departure_time: trip.estimated_departure_time,
            actual_departure_datetime: trip.actual_departure_datetime,
            actual_arrival_datetime: trip.actual_arrival_datetime,
            capacity: trip.capacity,
            seats_booked: trip.seats_booked,
            seats_available: trip.seats_available,
            is_accepting_bookings: trip.is_accepting_bookings,
            status: trip.status.to_string(),
            fare_price: trip.fare_price.minor_units(),
        }
    }
}

/// A booking as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInfo {
    pub booking_id: i64,
    pub trip_id: i64,
    pub ticket_reference: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub seat_count: u32,
    pub booking_type: String,
    pub payment_status: String,
    pub total_amount: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub booking_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&Booking> for BookingInfo {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.booking_id.value(),
            trip_id: booking.trip_id.value(),
            ticket_reference: booking.ticket_reference.to_string(),
            first_name: booking.passenger.first_name.clone(),
            last_name: booking.passenger.last_name.clone(),
            email: booking.passenger.email.clone(),
            phone: booking.passenger.phone.clone(),
            address: booking.passenger.address.clone(),
            seat_count: booking.seat_count,
            booking_type: booking.booking_type.to_string(),
            payment_status: booking.payment_status.to_string(),
            total_amount: booking.total_amount.minor_units(),
            booking_date: booking.booking_date,
            updated_at: booking.updated_at,
        }
    }
}

/// A payment ledger entry. Refunds carry a negative amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecordInfo {
    pub payment_id: i64,
    pub booking_id: i64,
    pub amount: i64,
    pub method: String,
    pub reference: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub payment_datetime: OffsetDateTime,
}

impl From<&PaymentRecord> for PaymentRecordInfo {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            payment_id: record.payment_id.value(),
            booking_id: record.booking_id.value(),
            amount: record.amount.minor_units(),
            method: record.method.clone(),
            reference: record.reference.clone(),
            payment_datetime: record.payment_datetime,
        }
    }
}

/// One line of a trip manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntryInfo {
    pub booking_id: i64,
    pub ticket_reference: String,
    pub passenger_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub seat_count: u32,
    pub booking_type: String,
    pub total_amount: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub booking_date: OffsetDateTime,
}

impl From<&ManifestEntry> for ManifestEntryInfo {
    fn from(entry: &ManifestEntry) -> Self {
        Self {
            booking_id: entry.booking_id.value(),
            ticket_reference: entry.ticket_reference.to_string(),
            passenger_name: entry.passenger_name.clone(),
            email: entry.email.clone(),
            phone: entry.phone.clone(),
            seat_count: entry.seat_count,
            booking_type: entry.booking_type.to_string(),
            total_amount: entry.total_amount.minor_units(),
            booking_date: entry.booking_date,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// The queued trips of one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQueueInfo {
    pub route: RouteInfo,
    pub trips: Vec<TripInfo>,
}

impl From<&RouteQueue> for RouteQueueInfo {
    fn from(queue: &RouteQueue) -> Self {
        Self {
            route: RouteInfo::from(&queue.route),
            trips: queue.trips.iter().map(TripInfo::from).collect(),
        }
    }
}

/// API response for the queue status board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatusResponse {
    pub routes: Vec<RouteQueueInfo>,
}

impl From<&QueueStatus> for QueueStatusResponse {
    fn from(status: &QueueStatus) -> Self {
        Self {
            routes: status.routes.iter().map(RouteQueueInfo::from).collect(),
        }
    }
}

/// API response for a trip with its registry records and manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDetailsResponse {
    pub trip: TripInfo,
    pub route: RouteInfo,
    pub vehicle: VehicleInfo,
    pub driver: DriverInfo,
    pub manifest: Vec<ManifestEntryInfo>,
    pub total_passengers: u32,
}

impl From<&TripDetails> for TripDetailsResponse {
    fn from(details: &TripDetails) -> Self {
        Self {
            trip: TripInfo::from(&details.trip),
            route: RouteInfo::from(&details.route),
            vehicle: VehicleInfo::from(&details.vehicle),
            driver: DriverInfo::from(&details.driver),
            manifest: details.manifest.iter().map(ManifestEntryInfo::from).collect(),
            total_passengers: details.total_passengers,
        }
    }
}

/// API response for a trip manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripManifestResponse {
    pub trip: TripInfo,
    pub entries: Vec<ManifestEntryInfo>,
    pub total_passengers: u32,
    pub total_bookings: usize,
}

impl From<&TripManifest> for TripManifestResponse {
    fn from(manifest: &TripManifest) -> Self {
        Self {
            trip: TripInfo::from(&manifest.trip),
            entries: manifest.entries.iter().map(ManifestEntryInfo::from).collect(),
            total_passengers: manifest.total_passengers,
            total_bookings: manifest.total_bookings,
        }
    }
}

/// API response for a successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmationResponse {
    pub booking_id: i64,
    pub trip_id: i64,
    pub ticket_reference: String,
    pub total_amount: i64,
    /// A success message.
    pub message: String,
}

impl From<&BookingConfirmation> for BookingConfirmationResponse {
    fn from(confirmation: &BookingConfirmation) -> Self {
        Self {
            booking_id: confirmation.booking_id.value(),
            trip_id: confirmation.trip_id.value(),
            ticket_reference: confirmation.ticket_reference.to_string(),
            total_amount: confirmation.total_amount.minor_units(),
            message: format!(
                "Booked on trip {}, ticket {}, total {}",
                confirmation.trip_id, confirmation.ticket_reference, confirmation.total_amount
            ),
        }
    }
}

/// API response for a cancelled booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCancellationResponse {
    pub booking: BookingInfo,
    pub refund: PaymentRecordInfo,
    pub trip: TripInfo,
    /// A success message.
    pub message: String,
}

impl From<&BookingCancellation> for BookingCancellationResponse {
    fn from(cancellation: &BookingCancellation) -> Self {
        Self {
            booking: BookingInfo::from(&cancellation.booking),
            refund: PaymentRecordInfo::from(&cancellation.refund),
            trip: TripInfo::from(&cancellation.trip),
            message: format!(
                "Cancelled booking {}, refunded {}",
                cancellation.booking.ticket_reference, cancellation.refund.amount
            ),
        }
    }
}

/// A refund issued while cancelling a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRefundInfo {
    pub booking_id: i64,
    pub ticket_reference: String,
    pub refund: PaymentRecordInfo,
}

impl From<&BookingRefund> for BookingRefundInfo {
    fn from(refund: &BookingRefund) -> Self {
        Self {
            booking_id: refund.booking_id.value(),
            ticket_reference: refund.ticket_reference.to_string(),
            refund: PaymentRecordInfo::from(&refund.refund),
        }
    }
}

/// API response for a cancelled trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripCancellationResponse {
    pub trip: TripInfo,
    pub refunds: Vec<BookingRefundInfo>,
    /// A success message.
    pub message: String,
}

impl From<&TripCancellation> for TripCancellationResponse {
    fn from(cancellation: &TripCancellation) -> Self {
        Self {
            trip: TripInfo::from(&cancellation.trip),
            refunds: cancellation
                .refunds
                .iter()
                .map(BookingRefundInfo::from)
                .collect(),
            message: format!(
                "Cancelled trip {} with {} refund(s)",
                cancellation.trip.trip_id,
                cancellation.refunds.len()
            ),
        }
    }
}

/// API response for a booking with its trip, route and payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetailsResponse {
    pub booking: BookingInfo,
    pub trip: TripInfo,
    pub route: RouteInfo,
    pub payments: Vec<PaymentRecordInfo>,
}

impl From<&BookingDetails> for BookingDetailsResponse {
    fn from(details: &BookingDetails) -> Self {
        Self {
            booking: BookingInfo::from(&details.booking),
            trip: TripInfo::from(&details.trip),
            route: RouteInfo::from(&details.route),
            payments: details
                .payments
                .iter()
                .map(PaymentRecordInfo::from)
                .collect(),
        }
    }
}

/// API response for the newest payment of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestPaymentResponse {
    pub booking_id: i64,
    pub payment: Option<PaymentRecordInfo>,
}

/// API response for the next trip a route booking would land on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTripResponse {
    pub route_id: i64,
    pub trip: Option<TripInfo>,
}

/// API response for the trip a driver is working now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverTripResponse {
    pub driver_id: i64,
    pub trip: Option<TripInfo>,
}

/// A paid booking on a queued trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBookingInfo {
    pub booking: BookingInfo,
    pub route_id: i64,
    pub trip_status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub estimated_departure_time: OffsetDateTime,
}

impl From<&ActiveBooking> for ActiveBookingInfo {
    fn from(active: &ActiveBooking) -> Self {
        Self {
            booking: BookingInfo::from(&active.booking),
            route_id: active.route_id.value(),
            trip_status: active.trip_status.to_string(),
            estimated_departure_time: active.estimated_departure_time,
        }
    }
}

/// API response for the integrity audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantReportResponse {
    pub trips_checked: usize,
    pub routes_checked: usize,
}

impl From<&InvariantReport> for InvariantReportResponse {
    fn from(report: &InvariantReport) -> Self {
        Self {
            trips_checked: report.trips_checked,
            routes_checked: report.routes_checked,
        }
    }
}
