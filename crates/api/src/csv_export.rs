// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV export of trip manifests.
//!
//! One row per paid booking, in booking order, with a header row. Amounts
//! are rendered in major units (`"350.00"`) and dates in RFC 3339.

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use trip_queue::{ManifestEntry, TripManifest};

use crate::error::ApiError;

/// Header of an exported manifest.
pub const MANIFEST_CSV_HEADER: [&str; 8] = [
    "ticket_reference",
    "passenger_name",
    "email",
    "phone",
    "seat_count",
    "booking_type",
    "total_amount",
    "booking_date",
];

#[derive(Debug, Serialize)]
struct ManifestCsvRow<'a> {
    ticket_reference: &'a str,
    passenger_name: &'a str,
    email: &'a str,
    phone: &'a str,
    seat_count: u32,
    booking_type: &'static str,
    total_amount: String,
    booking_date: String,
}

impl<'a> ManifestCsvRow<'a> {
    fn from_entry(entry: &'a ManifestEntry) -> Result<Self, ApiError> {
        let booking_date: String = entry.booking_date.format(&Rfc3339).map_err(|e| {
            ApiError::new(
                trip_queue_domain::ErrorKind::Internal,
                format!("Failed to format booking date: {e}"),
            )
        })?;

        Ok(Self {
            ticket_reference: entry.ticket_reference.as_str(),
            passenger_name: &entry.passenger_name,
            email: &entry.email,
            phone: entry.phone.as_deref().unwrap_or_default(),
            seat_count: entry.seat_count,
            booking_type: entry.booking_type.as_str(),
            total_amount: entry.total_amount.to_string(),
            booking_date,
        })
    }
}

fn csv_failure(err: impl std::fmt::Display) -> ApiError {
    ApiError::new(
        trip_queue_domain::ErrorKind::Internal,
        format!("Failed to write manifest CSV: {err}"),
    )
}

/// Renders a trip manifest as CSV text.
///
/// # Errors
///
/// Returns an `Internal` error if a row cannot be written.
pub fn manifest_to_csv(manifest: &TripManifest) -> Result<String, ApiError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(MANIFEST_CSV_HEADER).map_err(csv_failure)?;
    for entry in &manifest.entries {
        writer
            .serialize(ManifestCsvRow::from_entry(entry)?)
            .map_err(csv_failure)?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(csv_failure)?;
    String::from_utf8(bytes).map_err(csv_failure)
}
