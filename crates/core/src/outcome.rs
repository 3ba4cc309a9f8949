// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::Serialize;
use trip_queue_domain::{Booking, BookingId, Money, PaymentRecord, TicketReference, Trip, TripId};

/// Result of a successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingConfirmation {
    pub booking_id: BookingId,
    pub trip_id: TripId,
    pub total_amount: Money,
    pub ticket_reference: TicketReference,
}

/// Result of cancelling a single booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingCancellation {
    /// The booking, now cancelled.
    pub booking: Booking,
    /// The refund entry appended to the ledger.
    pub refund: PaymentRecord,
    /// The trip after its seats were released.
    pub trip: Trip,
}

/// A refund issued while cancelling a whole trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRefund {
    pub booking_id: BookingId,
    pub ticket_reference: TicketReference,
    pub refund: PaymentRecord,
}

/// Result of cancelling a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripCancellation {
    /// The trip, now cancelled.
    pub trip: Trip,
    /// One entry per paid booking that was refunded; empty for a plain cancel.
    pub refunds: Vec<BookingRefund>,
}

/// Summary of a successful invariant audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvariantReport {
    pub trips_checked: usize,
    pub routes_checked: usize,
}
