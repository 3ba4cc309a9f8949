// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `registry` - Routes, vehicles and drivers
//! - `trips` - Trips by id, route and queue membership
//! - `bookings` - Bookings, ticket references and the payment ledger
//!
//! Timestamp columns hold RFC 3339 text, which does not sort reliably once
//! fractional seconds appear, so time-ordered results are sorted after
//! mapping.

pub mod bookings;
pub mod registry;
pub mod trips;
