// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations.
//!
//! Every function here expects to run inside the transaction opened by
//! [`crate::SqliteStore`]; none of them commit on their own.

pub mod bookings;
pub mod registry;
pub mod trips;
