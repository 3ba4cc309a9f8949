// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use trip_queue_domain::{BookingType, DriverId, PassengerInfo, PaymentInfo, RouteId, VehicleId};

/// Request to append a trip to the tail of a route's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueTrip {
    /// The route the trip runs on.
    pub route_id: RouteId,
    /// The vehicle providing the seats.
    pub vehicle_id: VehicleId,
    /// The driver assigned to the trip.
    pub driver_id: DriverId,
    /// Planned departure.
    #[serde(with = "time::serde::rfc3339")]
    pub estimated_departure_time: OffsetDateTime,
}

/// Request to book seats, either on a route or on a specific trip.
///
/// Payment has already been confirmed by the caller; the engine only
/// records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Who is travelling.
    pub passenger: PassengerInfo,
    /// Number of seats, at least one.
    pub seat_count: u32,
    /// How the payment was taken.
    pub payment: PaymentInfo,
    /// Channel of the booking.
    #[serde(default)]
    pub booking_type: BookingType,
}
