// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::lookup;
use crate::outcome::BookingCancellation;
use crate::store::UnitOfWork;
use time::OffsetDateTime;
use tracing::info;
use trip_queue_domain::{
    Booking, BookingId, DomainError, NewPaymentRecord, PaymentRecord, Trip, release_seats,
};

/// Cancels a paid booking, releasing its seats and refunding it in full.
///
/// Seats are released even if the trip has already departed; only the
/// ledger numbers change in that case.
///
/// # Errors
///
/// Returns an error if:
/// - The booking or its trip does not exist
/// - The booking is already cancelled
pub fn cancel_booking(
    uow: &mut dyn UnitOfWork,
    booking_id: BookingId,
    now: OffsetDateTime,
) -> Result<BookingCancellation, CoreError> {
    let unlocked: Booking = lookup::booking(uow, booking_id)?;
    let mut trip: Trip = lookup::locked_trip(uow, unlocked.trip_id)?;
    let booking: Booking = lookup::booking(uow, booking_id)?;

    let (booking, refund) = cancel_paid_booking(uow, &mut trip, booking, now)?;
    let trip: Trip = uow.update_trip(&trip)?;

    info!(
        booking_id = booking_id.value(),
        trip_id = trip.trip_id.value(),
        seats_released = booking.seat_count,
        refund = %refund.amount,
        "Cancelled booking"
    );
    Ok(BookingCancellation {
        booking,
        refund,
        trip,
    })
}

/// Cancels `booking`, releases its seats on `trip` and appends the refund.
///
/// The caller holds the route's queue lock and persists `trip` afterwards.
pub fn cancel_paid_booking(
    uow: &mut dyn UnitOfWork,
    trip: &mut Trip,
    mut booking: Booking,
    now: OffsetDateTime,
) -> Result<(Booking, PaymentRecord), CoreError> {
    if booking.trip_id != trip.trip_id {
        return Err(DomainError::LedgerInconsistent {
            trip_id: trip.trip_id,
            reason: format!(
                "booking {} belongs to trip {}",
                booking.booking_id, booking.trip_id
            ),
        }
        .into());
    }

    booking.cancel(now)?;
    release_seats(trip, booking.seat_count)?;
    uow.update_booking(&booking)?;

    let original: Option<PaymentRecord> = uow
        .payments_for_booking(booking.booking_id)?
        .into_iter()
        .find(|record| !record.is_refund());
    let refund: NewPaymentRecord = NewPaymentRecord::refund(&booking, original.as_ref(), now)?;
    let refund: PaymentRecord = uow.append_payment(refund)?;

    Ok((booking, refund))
}
