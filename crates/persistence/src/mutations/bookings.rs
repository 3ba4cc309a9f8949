// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking and payment ledger mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use trip_queue_domain::{
    Booking, BookingId, NewBooking, NewPaymentRecord, PaymentId, PaymentRecord,
};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{format_timestamp, to_i32};
use crate::diesel_schema::{bookings, payments};
use crate::error::PersistenceError;

/// Inserts a booking and returns it with its assigned id.
///
/// # Errors
///
/// Returns `UniqueViolation` if the ticket reference is already taken.
pub fn insert_booking(
    conn: &mut SqliteConnection,
    new_booking: NewBooking,
) -> Result<Booking, PersistenceError> {
    let draft: Booking = Booking::from_new(BookingId::new(0), new_booking);

    diesel::insert_into(bookings::table)
        .values((
            bookings::trip_id.eq(draft.trip_id.value()),
            bookings::first_name.eq(&draft.passenger.first_name),
            bookings::last_name.eq(&draft.passenger.last_name),
            bookings::email.eq(&draft.passenger.email),
            bookings::phone.eq(draft.passenger.phone.as_deref()),
            bookings::address.eq(draft.passenger.address.as_deref()),
            bookings::seat_count.eq(to_i32("bookings.seat_count", draft.seat_count)?),
            bookings::booking_type.eq(draft.booking_type.as_str()),
            bookings::payment_status.eq(draft.payment_status.as_str()),
            bookings::total_amount.eq(draft.total_amount.minor_units()),
            bookings::ticket_reference.eq(draft.ticket_reference.as_str()),
            bookings::booking_date.eq(format_timestamp(draft.booking_date)?),
            bookings::updated_at.eq(format_timestamp(draft.updated_at)?),
        ))
        .execute(conn)?;

    let booking_id: i64 = get_last_insert_rowid(conn)?;
    debug!(
        booking_id,
        trip_id = draft.trip_id.value(),
        reference = draft.ticket_reference.as_str(),
        "Inserted booking"
    );

    Ok(Booking {
        booking_id: BookingId::new(booking_id),
        ..draft
    })
}

/// Rewrites a booking's payment status and `updated_at`.
///
/// # Errors
///
/// Returns `NotFound` if the booking does not exist.
pub fn update_booking(conn: &mut SqliteConnection, booking: &Booking) -> Result<(), PersistenceError> {
    let affected: usize =
        diesel::update(bookings::table.filter(bookings::booking_id.eq(booking.booking_id.value())))
            .set((
                bookings::payment_status.eq(booking.payment_status.as_str()),
                bookings::updated_at.eq(format_timestamp(booking.updated_at)?),
            ))
            .execute(conn)?;

    if affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "booking {}",
            booking.booking_id
        )));
    }
    Ok(())
}

/// Appends a payment ledger entry.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn append_payment(
    conn: &mut SqliteConnection,
    new_payment: NewPaymentRecord,
) -> Result<PaymentRecord, PersistenceError> {
    let draft: PaymentRecord = PaymentRecord::from_new(PaymentId::new(0), new_payment);

    diesel::insert_into(payments::table)
        .values((
            payments::booking_id.eq(draft.booking_id.value()),
            payments::amount.eq(draft.amount.minor_units()),
            payments::method.eq(&draft.method),
            payments::reference.eq(draft.reference.as_deref()),
            payments::payment_datetime.eq(format_timestamp(draft.payment_datetime)?),
        ))
        .execute(conn)?;

    let payment_id: i64 = get_last_insert_rowid(conn)?;
    debug!(
        payment_id,
        booking_id = draft.booking_id.value(),
        amount = draft.amount.minor_units(),
        "Appended payment record"
    );

    Ok(PaymentRecord {
        payment_id: PaymentId::new(payment_id),
        ..draft
    })
}
