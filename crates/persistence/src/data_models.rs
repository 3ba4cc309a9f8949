// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row shapes of the persisted tables and their mapping to domain values.
//!
//! Timestamps are stored as fixed-width UTC RFC 3339 text with nanosecond
//! precision, so ordering the column orders the instants. Money is stored as
//! integer minor units and booleans as `0`/`1` integers.

use diesel::prelude::*;
use num_traits::ToPrimitive;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use trip_queue_domain::{
    Booking, BookingId, Driver, DriverId, Money, PassengerInfo, PaymentId, PaymentRecord, Route,
    RouteId, TicketReference, Trip, TripId, Vehicle, VehicleId,
};

use crate::diesel_schema::{bookings, drivers, payments, routes, trips, vehicles};
use crate::error::PersistenceError;

/// Formats a timestamp for storage as `YYYY-MM-DDTHH:MM:SS.nnnnnnnnnZ`.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be represented in that form.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    at.to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z"
        ))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Formats an optional timestamp for storage.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be represented in RFC 3339.
pub fn format_optional_timestamp(
    at: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    at.map(format_timestamp).transpose()
}

fn parse_timestamp(column: &str, value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| PersistenceError::CorruptRow(format!("{column} '{value}': {e}")))
}

fn parse_optional_timestamp(
    column: &str,
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(|v| parse_timestamp(column, v)).transpose()
}

fn parse_enum<T: std::str::FromStr>(column: &str, value: &str) -> Result<T, PersistenceError> {
    value
        .parse::<T>()
        .map_err(|_| PersistenceError::CorruptRow(format!("{column} '{value}'")))
}

/// Converts a stored non-negative integer column to `u32`.
pub fn to_u32(column: &str, value: i32) -> Result<u32, PersistenceError> {
    value
        .to_u32()
        .ok_or_else(|| PersistenceError::CorruptRow(format!("{column} {value} is negative")))
}

/// Converts a `u32` domain count to its integer column.
pub fn to_i32(column: &str, value: u32) -> Result<i32, PersistenceError> {
    value
        .to_i32()
        .ok_or_else(|| PersistenceError::SerializationError(format!("{column} {value} too large")))
}

/// Stores a boolean flag.
pub const fn flag(value: bool) -> i32 {
    if value { 1 } else { 0 }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = routes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RouteRow {
    pub route_id: i64,
    pub origin: String,
    pub destination: String,
    pub fare_price: i64,
    pub status: String,
    pub estimated_duration_minutes: Option<i32>,
}

impl TryFrom<RouteRow> for Route {
    type Error = PersistenceError;

    fn try_from(row: RouteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            route_id: RouteId::new(row.route_id),
            origin: row.origin,
            destination: row.destination,
            fare_price: Money::from_minor_units(row.fare_price),
            status: parse_enum("routes.status", &row.status)?,
            estimated_duration_minutes: row
                .estimated_duration_minutes
                .map(|minutes| to_u32("routes.estimated_duration_minutes", minutes))
                .transpose()?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = vehicles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VehicleRow {
    pub vehicle_id: i64,
    pub plate_number: String,
    pub vehicle_type: String,
    pub capacity: i32,
    pub is_active: i32,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = PersistenceError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            vehicle_id: VehicleId::new(row.vehicle_id),
            plate_number: row.plate_number,
            vehicle_type: row.vehicle_type,
            capacity: to_u32("vehicles.capacity", row.capacity)?,
            is_active: row.is_active != 0,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = drivers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DriverRow {
    pub driver_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub is_available: i32,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Self {
            driver_id: DriverId::new(row.driver_id),
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            is_available: row.is_available != 0,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = trips)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TripRow {
    pub trip_id: i64,
    pub route_id: i64,
    pub vehicle_id: i64,
    pub driver_id: i64,
    pub queue_position: i32,
    pub estimated_departure_time: String,
    pub actual_departure_datetime: Option<String>,
    pub actual_arrival_datetime: Option<String>,
    pub capacity: i32,
    pub seats_booked: i32,
    pub seats_available: i32,
    pub is_accepting_bookings: i32,
    pub status: String,
    pub fare_price: i64,
    pub version: i64,
}

impl TryFrom<TripRow> for Trip {
    type Error = PersistenceError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        Ok(Self {
            trip_id: TripId::new(row.trip_id),
            route_id: RouteId::new(row.route_id),
            vehicle_id: VehicleId::new(row.vehicle_id),
            driver_id: DriverId::new(row.driver_id),
            queue_position: to_u32("trips.queue_position", row.queue_position)?,
            estimated_departure_time: parse_timestamp(
                "trips.estimated_departure_time",
                &row.estimated_departure_time,
            )?,
            actual_departure_datetime: parse_optional_timestamp(
                "trips.actual_departure_datetime",
                row.actual_departure_datetime.as_deref(),
            )?,
            actual_arrival_datetime: parse_optional_timestamp(
                "trips.actual_arrival_datetime",
                row.actual_arrival_datetime.as_deref(),
            )?,
            capacity: to_u32("trips.capacity", row.capacity)?,
            seats_booked: to_u32("trips.seats_booked", row.seats_booked)?,
            seats_available: to_u32("trips.seats_available", row.seats_available)?,
            is_accepting_bookings: row.is_accepting_bookings != 0,
            status: parse_enum("trips.status", &row.status)?,
            fare_price: Money::from_minor_units(row.fare_price),
            version: row.version,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookingRow {
    pub booking_id: i64,
    pub trip_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub seat_count: i32,
    pub booking_type: String,
    pub payment_status: String,
    pub total_amount: i64,
    pub ticket_reference: String,
    pub booking_date: String,
    pub updated_at: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = PersistenceError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let ticket_reference: TicketReference = TicketReference::parse(&row.ticket_reference)
            .map_err(|e| PersistenceError::CorruptRow(e.to_string()))?;

        Ok(Self {
            booking_id: BookingId::new(row.booking_id),
            trip_id: TripId::new(row.trip_id),
            passenger: PassengerInfo {
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                phone: row.phone,
                address: row.address,
            },
            seat_count: to_u32("bookings.seat_count", row.seat_count)?,
            booking_type: parse_enum("bookings.booking_type", &row.booking_type)?,
            payment_status: parse_enum("bookings.payment_status", &row.payment_status)?,
            total_amount: Money::from_minor_units(row.total_amount),
            ticket_reference,
            booking_date: parse_timestamp("bookings.booking_date", &row.booking_date)?,
            updated_at: parse_timestamp("bookings.updated_at", &row.updated_at)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PaymentRow {
    pub payment_id: i64,
    pub booking_id: i64,
    pub amount: i64,
    pub method: String,
    pub reference: Option<String>,
    pub payment_datetime: String,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = PersistenceError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            payment_id: PaymentId::new(row.payment_id),
            booking_id: BookingId::new(row.booking_id),
            amount: Money::from_minor_units(row.amount),
            method: row.method,
            reference: row.reference,
            payment_datetime: parse_timestamp("payments.payment_datetime", &row.payment_datetime)?,
        })
    }
}

/// Maps every row of a query result, failing on the first corrupt row.
///
/// # Errors
///
/// Returns `CorruptRow` if any row cannot be mapped.
pub fn map_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, PersistenceError>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}
