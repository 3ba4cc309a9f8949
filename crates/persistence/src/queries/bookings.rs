// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking and payment ledger queries.

use diesel::SqliteConnection;
use diesel::dsl::count_star;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use trip_queue_domain::{
    Booking, BookingId, PaymentRecord, PaymentStatus, TicketReference, TripId,
};

use crate::data_models::{BookingRow, PaymentRow, map_rows};
use crate::diesel_schema::{bookings, payments};
use crate::error::PersistenceError;

fn newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| {
        b.booking_date
            .cmp(&a.booking_date)
            .then(b.booking_id.cmp(&a.booking_id))
    });
}

/// Finds a booking by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_booking(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<Option<Booking>, PersistenceError> {
    bookings::table
        .filter(bookings::booking_id.eq(booking_id.value()))
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?
        .map(Booking::try_from)
        .transpose()
}

/// Finds a booking by ticket reference.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_booking_by_reference(
    conn: &mut SqliteConnection,
    reference: &TicketReference,
) -> Result<Option<Booking>, PersistenceError> {
    bookings::table
        .filter(bookings::ticket_reference.eq(reference.as_str()))
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?
        .map(Booking::try_from)
        .transpose()
}

/// Returns true if a booking already carries `reference`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn ticket_reference_exists(
    conn: &mut SqliteConnection,
    reference: &TicketReference,
) -> Result<bool, PersistenceError> {
    let count: i64 = bookings::table
        .filter(bookings::ticket_reference.eq(reference.as_str()))
        .select(count_star())
        .first(conn)?;
    Ok(count > 0)
}

/// Lists the bookings of a trip, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn bookings_for_trip(
    conn: &mut SqliteConnection,
    trip_id: TripId,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::trip_id.eq(trip_id.value()))
        .select(BookingRow::as_select())
        .load(conn)?;
    let mut found: Vec<Booking> = map_rows(rows)?;
    found.sort_by_key(|booking| (booking.booking_date, booking.booking_id));
    Ok(found)
}

/// Lists bookings under an email address, newest first.
///
/// The `email` column is declared `COLLATE NOCASE`.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn bookings_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::email.eq(email))
        .select(BookingRow::as_select())
        .load(conn)?;
    let mut found: Vec<Booking> = map_rows(rows)?;
    newest_first(&mut found);
    Ok(found)
}

/// Lists bookings whose "first last" name contains `fragment`, newest first.
///
/// `SQLite` only folds ASCII letters, so the match runs on Unicode
/// lowercase forms after the rows are loaded. The fragment is matched
/// literally.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn bookings_by_passenger_name(
    conn: &mut SqliteConnection,
    fragment: &str,
) -> Result<Vec<Booking>, PersistenceError> {
    let needle: String = fragment.to_lowercase();
    let rows: Vec<BookingRow> = bookings::table
        .select(BookingRow::as_select())
        .load(conn)?;
    let mut found: Vec<Booking> = map_rows(rows)?
        .into_iter()
        .filter(|booking: &Booking| {
            booking
                .passenger
                .full_name()
                .to_lowercase()
                .contains(&needle)
        })
        .collect();
    newest_first(&mut found);
    Ok(found)
}

/// Lists cancelled bookings, most recently cancelled first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn cancelled_bookings(
    conn: &mut SqliteConnection,
    limit: usize,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::payment_status.eq(PaymentStatus::Cancelled.as_str()))
        .order((bookings::updated_at.desc(), bookings::booking_id.desc()))
        .limit(limit.to_i64().unwrap_or(i64::MAX))
        .select(BookingRow::as_select())
        .load(conn)?;
    map_rows(rows)
}

/// Lists the ledger entries of a booking, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn payments_for_booking(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<Vec<PaymentRecord>, PersistenceError> {
    let rows: Vec<PaymentRow> = payments::table
        .filter(payments::booking_id.eq(booking_id.value()))
        .select(PaymentRow::as_select())
        .load(conn)?;
    let mut found: Vec<PaymentRecord> = map_rows(rows)?;
    found.sort_by_key(|record| (record.payment_datetime, record.payment_id));
    Ok(found)
}
