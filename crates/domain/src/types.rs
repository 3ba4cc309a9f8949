// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Generates a transparent integer identifier newtype.
///
/// Identifiers are assigned by the store and never constructed from user
/// input without a lookup.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a route in the route registry.
    RouteId
);
entity_id!(
    /// Identifier of a vehicle in the vehicle registry.
    VehicleId
);
entity_id!(
    /// Identifier of a driver in the driver registry.
    DriverId
);
entity_id!(
    /// Identifier of a scheduled trip.
    TripId
);
entity_id!(
    /// Internal identifier of a booking.
    BookingId
);
entity_id!(
    /// Identifier of a payment ledger entry.
    PaymentId
);

/// An amount of money in minor currency units (100.00 is `10_000`).
///
/// Amounts are signed so that refunds can be recorded as negative entries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from minor units.
    #[must_use]
    pub const fn from_minor_units(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Creates an amount from whole major units (e.g. `100` for 100.00).
    #[must_use]
    pub const fn from_major_units(major_units: i64) -> Option<Self> {
        match major_units.checked_mul(100) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Multiplies the amount by a seat count, returning `None` on overflow.
    #[must_use]
    pub const fn checked_mul_seats(self, seats: u32) -> Option<Self> {
        match self.0.checked_mul(seats as i64) {
            Some(total) => Some(Self(total)),
            None => None,
        }
    }

    /// Returns the negated amount, returning `None` on overflow.
    #[must_use]
    pub const fn checked_neg(self) -> Option<Self> {
        match self.0.checked_neg() {
            Some(negated) => Some(Self(negated)),
            None => None,
        }
    }

    /// Returns true if this amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign: &str = if self.0 < 0 { "-" } else { "" };
        let magnitude: u64 = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", magnitude / 100, magnitude % 100)
    }
}

/// Whether a route is open for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    /// Trips may be enqueued and booked.
    Active,
    /// Route is closed by an administrator.
    Inactive,
}

impl RouteStatus {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for RouteStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(DomainError::InvalidRouteStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A route as published by the route registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: RouteId,
    pub origin: String,
    pub destination: String,
    /// Fixed fare per seat.
    pub fare_price: Money,
    pub status: RouteStatus,
    pub estimated_duration_minutes: Option<u32>,
}

impl Route {
    /// Returns true if trips may be enqueued and booked on this route.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, RouteStatus::Active)
    }
}

/// A vehicle as published by the vehicle registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: VehicleId,
    pub plate_number: String,
    pub vehicle_type: String,
    /// Number of passenger seats.
    pub capacity: u32,
    pub is_active: bool,
}

/// A driver as published by the driver registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: DriverId,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub is_available: bool,
}

impl Driver {
    /// Returns the driver's display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
