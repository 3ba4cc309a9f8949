// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::ticket_reference::TicketReference;
use crate::types::{BookingId, Money, PaymentId, TripId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Prefix applied to the payment reference of a refund entry.
pub const REFUND_REFERENCE_PREFIX: &str = "REFUND-";

/// Channel through which a booking was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BookingType {
    /// Self-service booking by the passenger.
    #[default]
    #[serde(rename = "online")]
    Online,
    /// Booking taken by a dispatcher at the terminal.
    #[serde(rename = "walk-in")]
    WalkIn,
}

impl BookingType {
    /// Returns the string representation of the booking type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::WalkIn => "walk-in",
        }
    }
}

impl FromStr for BookingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "walk-in" | "walk_in" => Ok(Self::WalkIn),
            _ => Err(DomainError::InvalidBookingType(s.to_string())),
        }
    }
}

impl std::fmt::Display for BookingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment state of a booking once it has entered the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Seats are held and the fare was charged.
    Paid,
    /// Seats were released and the fare refunded.
    Cancelled,
}

impl PaymentStatus {
    /// Returns the string representation of the payment status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidPaymentStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity and contact details of the passenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl PassengerInfo {
    /// Returns the passenger's display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payment facts supplied by the caller for a confirmed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// Payment method, e.g. `cash` or `card`.
    pub method: String,
    /// External transaction reference, if any.
    #[serde(default)]
    pub reference: Option<String>,
}

/// A seat reservation on a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: BookingId,
    pub trip_id: TripId,
    pub passenger: PassengerInfo,
    pub seat_count: u32,
    pub booking_type: BookingType,
    pub payment_status: PaymentStatus,
    pub total_amount: Money,
    pub ticket_reference: TicketReference,
    #[serde(with = "time::serde::rfc3339")]
    pub booking_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Booking {
    /// Builds the stored booking from its plan and assigned identifier.
    #[must_use]
    pub fn from_new(booking_id: BookingId, new_booking: NewBooking) -> Self {
        Self {
            booking_id,
            trip_id: new_booking.trip_id,
            passenger: new_booking.passenger,
            seat_count: new_booking.seat_count,
            booking_type: new_booking.booking_type,
            payment_status: PaymentStatus::Paid,
            total_amount: new_booking.total_amount,
            ticket_reference: new_booking.ticket_reference,
            booking_date: new_booking.booking_date,
            updated_at: new_booking.booking_date,
        }
    }

    /// Returns true if the booking still holds seats.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self.payment_status, PaymentStatus::Paid)
    }

    /// Marks the booking cancelled.
    ///
    /// The caller is responsible for releasing the seats and recording the
    /// refund in the same unit of work.
    ///
    /// # Errors
    ///
    /// Returns `BookingAlreadyCancelled` if the booking was cancelled before.
    pub fn cancel(&mut self, at: OffsetDateTime) -> Result<(), DomainError> {
        if !self.is_paid() {
            return Err(DomainError::BookingAlreadyCancelled(self.booking_id));
        }
        self.payment_status = PaymentStatus::Cancelled;
        self.updated_at = at;
        Ok(())
    }
}

/// A paid booking ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub trip_id: TripId,
    pub passenger: PassengerInfo,
    pub seat_count: u32,
    pub booking_type: BookingType,
    pub total_amount: Money,
    pub ticket_reference: TicketReference,
    pub booking_date: OffsetDateTime,
}

/// Append-only payment ledger entry. Negative amounts are refunds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: PaymentId,
    pub booking_id: BookingId,
    pub amount: Money,
    pub method: String,
    pub reference: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub payment_datetime: OffsetDateTime,
}

impl PaymentRecord {
    /// Builds the stored entry from its plan and assigned identifier.
    #[must_use]
    pub fn from_new(payment_id: PaymentId, new_payment: NewPaymentRecord) -> Self {
        Self {
            payment_id,
            booking_id: new_payment.booking_id,
            amount: new_payment.amount,
            method: new_payment.method,
            reference: new_payment.reference,
            payment_datetime: new_payment.payment_datetime,
        }
    }

    /// Returns true if this entry reverses an earlier charge.
    #[must_use]
    pub const fn is_refund(&self) -> bool {
        self.amount.is_negative()
    }
}

/// A payment ledger entry ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentRecord {
    pub booking_id: BookingId,
    pub amount: Money,
    pub method: String,
    pub reference: Option<String>,
    pub payment_datetime: OffsetDateTime,
}

impl NewPaymentRecord {
    /// The charge recorded when a booking is created.
    #[must_use]
    pub fn charge(booking: &Booking, payment: &PaymentInfo) -> Self {
        Self {
            booking_id: booking.booking_id,
            amount: booking.total_amount,
            method: payment.method.clone(),
            reference: payment.reference.clone(),
            payment_datetime: booking.booking_date,
        }
    }

    /// The full refund recorded when a booking is cancelled.
    ///
    /// The refund reuses the method of the original charge and prefixes its
    /// reference with `REFUND-`. Without a charge on file the ticket reference
    /// stands in for the payment reference.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if the total cannot be negated.
    pub fn refund(
        booking: &Booking,
        original: Option<&PaymentRecord>,
        at: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        let amount: Money = booking
            .total_amount
            .checked_neg()
            .ok_or(DomainError::AmountOverflow)?;
        let method: String =
            original.map_or_else(|| String::from("refund"), |record| record.method.clone());
        let source_reference: String = original
            .and_then(|record| record.reference.clone())
            .unwrap_or_else(|| booking.ticket_reference.to_string());

        Ok(Self {
            booking_id: booking.booking_id,
            amount,
            method,
            reference: Some(format!("{REFUND_REFERENCE_PREFIX}{source_reference}")),
            payment_datetime: at,
        })
    }
}
