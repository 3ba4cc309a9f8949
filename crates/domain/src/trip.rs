// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip status machine and trip construction.
//!
//! A trip moves forward only: it is enqueued as `waiting` or `boarding`,
//! flips between `boarding` and `full` as seats are sold and released,
//! then departs and arrives. Any queued trip may be cancelled.

use crate::error::DomainError;
use crate::types::{Driver, DriverId, Money, Route, RouteId, TripId, Vehicle, VehicleId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Lifecycle states of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    /// Enqueued but not yet open for bookings.
    Waiting,
    /// Open for bookings.
    Boarding,
    /// Every seat is sold.
    Full,
    /// Left the terminal; no longer part of the queue.
    Departed,
    /// Reached the destination.
    Arrived,
    /// Withdrawn from the queue.
    Cancelled,
}

impl TripStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Boarding => "boarding",
            Self::Full => "full",
            Self::Departed => "departed",
            Self::Arrived => "arrived",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Arrived | Self::Cancelled)
    }

    /// Returns true if the trip holds a queue position.
    #[must_use]
    pub const fn is_queued(&self) -> bool {
        matches!(self, Self::Waiting | Self::Boarding | Self::Full)
    }

    /// Returns true if the status machine permits moving to `next`.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        match self {
            Self::Waiting => matches!(next, Self::Boarding | Self::Full | Self::Cancelled),
            Self::Boarding => matches!(next, Self::Full | Self::Departed | Self::Cancelled),
            Self::Full => matches!(next, Self::Boarding | Self::Departed | Self::Cancelled),
            Self::Departed => matches!(next, Self::Arrived),
            Self::Arrived | Self::Cancelled => false,
        }
    }
}

impl FromStr for TripStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "boarding" => Ok(Self::Boarding),
            "full" => Ok(Self::Full),
            "departed" => Ok(Self::Departed),
            "arrived" => Ok(Self::Arrived),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidTripStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decides the status a newly enqueued trip starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardingPolicy {
    /// New trips start boarding and accept bookings at once.
    #[default]
    Immediate,
    /// New trips start waiting and must be opened by a dispatcher.
    Manual,
}

impl BoardingPolicy {
    /// Returns the string representation of the policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Manual => "manual",
        }
    }

    /// Status assigned to a trip at enqueue time.
    #[must_use]
    pub const fn initial_status(&self) -> TripStatus {
        match self {
            Self::Immediate => TripStatus::Boarding,
            Self::Manual => TripStatus::Waiting,
        }
    }
}

impl FromStr for BoardingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "immediate" => Ok(Self::Immediate),
            "manual" => Ok(Self::Manual),
            other => Err(format!(
                "unknown boarding policy '{other}' (expected 'immediate' or 'manual')"
            )),
        }
    }
}

impl std::fmt::Display for BoardingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scheduled departure on a route with its seat inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub vehicle_id: VehicleId,
    pub driver_id: DriverId,
    /// Rank within the route's queue; meaningful only while queued.
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
    pub status: TripStatus,
    /// Per-seat fare copied from the route at enqueue time.
    pub fare_price: Money,
    /// Optimistic concurrency counter, bumped on every write.
    pub version: i64,
}

impl Trip {
    /// Builds the stored trip from a plan and its assigned identifier.
    #[must_use]
    pub const fn from_new(trip_id: TripId, new_trip: &NewTrip) -> Self {
        Self {
            trip_id,
            route_id: new_trip.route_id,
            vehicle_id: new_trip.vehicle_id,
            driver_id: new_trip.driver_id,
            queue_position: new_trip.queue_position,
            estimated_departure_time: new_trip.estimated_departure_time,
            actual_departure_datetime: None,
            actual_arrival_datetime: None,
            capacity: new_trip.capacity,
            seats_booked: 0,
            seats_available: new_trip.capacity,
            is_accepting_bookings: new_trip.is_accepting_bookings,
            status: new_trip.status,
            fare_price: new_trip.fare_price,
            version: 0,
        }
    }

    /// Returns true if the trip currently takes bookings.
    #[must_use]
    pub const fn is_bookable(&self) -> bool {
        matches!(self.status, TripStatus::Boarding) && self.is_accepting_bookings
    }

    /// Fails with `InvalidTripTransition` unless the move to `next` is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the status machine forbids the transition.
    pub fn validate_transition(&self, next: TripStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::InvalidTripTransition {
                trip_id: self.trip_id,
                from: self.status,
                to: next,
            })
        }
    }

    /// Fails with `TripNotQueued` unless the trip still holds a queue position.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip has departed, arrived or been cancelled.
    pub const fn ensure_queued(&self) -> Result<(), DomainError> {
        if self.status.is_queued() {
            Ok(())
        } else {
            Err(DomainError::TripNotQueued {
                trip_id: self.trip_id,
                status: self.status,
            })
        }
    }

    /// Opens a waiting trip for bookings.
    ///
    /// # Errors
    ///
    /// Returns an error unless the trip is `waiting`.
    pub fn open_boarding(&mut self) -> Result<(), DomainError> {
        if self.status != TripStatus::Waiting {
            return Err(DomainError::InvalidTripTransition {
                trip_id: self.trip_id,
                from: self.status,
                to: TripStatus::Boarding,
            });
        }

        if self.seats_available == 0 {
            self.status = TripStatus::Full;
            self.is_accepting_bookings = false;
        } else {
            self.status = TripStatus::Boarding;
            self.is_accepting_bookings = true;
        }
        Ok(())
    }

    /// Marks a boarding or full trip as departed.
    ///
    /// # Errors
    ///
    /// Returns an error unless the trip is `boarding` or `full`.
    pub fn mark_departed(&mut self, at: OffsetDateTime) -> Result<(), DomainError> {
        self.validate_transition(TripStatus::Departed)?;
        self.status = TripStatus::Departed;
        self.is_accepting_bookings = false;
        self.actual_departure_datetime = Some(at);
        Ok(())
    }

    /// Marks a departed trip as arrived.
    ///
    /// # Errors
    ///
    /// Returns an error unless the trip is `departed`.
    pub fn mark_arrived(&mut self, at: OffsetDateTime) -> Result<(), DomainError> {
        self.validate_transition(TripStatus::Arrived)?;
        self.status = TripStatus::Arrived;
        self.actual_arrival_datetime = Some(at);
        Ok(())
    }

    /// Withdraws a queued trip.
    ///
    /// # Errors
    ///
    /// Returns an error unless the trip is `waiting`, `boarding` or `full`.
    pub fn mark_cancelled(&mut self) -> Result<(), DomainError> {
        self.validate_transition(TripStatus::Cancelled)?;
        self.status = TripStatus::Cancelled;
        self.is_accepting_bookings = false;
        Ok(())
    }
}

/// A validated trip ready to be inserted into a route's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrip {
    pub route_id: RouteId,
    pub vehicle_id: VehicleId,
    pub driver_id: DriverId,
    pub queue_position: u32,
    pub estimated_departure_time: OffsetDateTime,
    pub capacity: u32,
    pub status: TripStatus,
    pub is_accepting_bookings: bool,
    pub fare_price: Money,
}

/// Validates the registry records for a new trip and builds it.
///
/// # Arguments
///
/// * `route` - The route the trip runs on
/// * `vehicle` - The vehicle assigned to the trip
/// * `driver` - The driver assigned to the trip
/// * `queue_position` - Position at the tail of the route's queue
/// * `estimated_departure_time` - Planned departure
/// * `policy` - Decides whether the trip starts boarding
///
/// # Errors
///
/// Returns an error if:
/// - The route is inactive
/// - The vehicle is inactive or has no seats
/// - The driver is unavailable
pub fn plan_trip(
    route: &Route,
    vehicle: &Vehicle,
    driver: &Driver,
    queue_position: u32,
    estimated_departure_time: OffsetDateTime,
    policy: BoardingPolicy,
) -> Result<NewTrip, DomainError> {
    if !route.is_active() {
        return Err(DomainError::RouteInactive(route.route_id));
    }
    validate_vehicle(vehicle)?;
    validate_driver(driver)?;

    let status: TripStatus = policy.initial_status();
    Ok(NewTrip {
        route_id: route.route_id,
        vehicle_id: vehicle.vehicle_id,
        driver_id: driver.driver_id,
        queue_position,
        estimated_departure_time,
        capacity: vehicle.capacity,
        status,
        is_accepting_bookings: status == TripStatus::Boarding,
        fare_price: route.fare_price,
    })
}

/// Checks that a vehicle may be assigned to a trip.
///
/// # Errors
///
/// Returns an error if the vehicle is inactive or has no seats.
pub const fn validate_vehicle(vehicle: &Vehicle) -> Result<(), DomainError> {
    if !vehicle.is_active {
        return Err(DomainError::VehicleInactive(vehicle.vehicle_id));
    }
    if vehicle.capacity == 0 {
        return Err(DomainError::InvalidCapacity(vehicle.capacity));
    }
    Ok(())
}

/// Checks that a driver may be assigned to a trip.
///
/// # Errors
///
/// Returns an error if the driver is unavailable.
pub const fn validate_driver(driver: &Driver) -> Result<(), DomainError> {
    if driver.is_available {
        Ok(())
    } else {
        Err(DomainError::DriverUnavailable(driver.driver_id))
    }
}
