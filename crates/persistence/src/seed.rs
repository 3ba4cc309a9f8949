// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::Deserialize;
use trip_queue_domain::{Driver, Route, Vehicle};

use crate::error::PersistenceError;

/// Registry master data loaded at startup.
///
/// ```json
/// {
///   "routes": [{ "route_id": 1, "origin": "Manila", "destination": "Baguio",
///                "fare_price": 75000, "status": "active",
///                "estimated_duration_minutes": 360 }],
///   "vehicles": [{ "vehicle_id": 1, "plate_number": "NAB-1234",
///                  "vehicle_type": "van", "capacity": 14, "is_active": true }],
///   "drivers": [{ "driver_id": 1, "first_name": "Jose", "last_name": "Rizal",
///                 "phone": null, "is_available": true }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrySeed {
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
}

impl RegistrySeed {
    /// Parses a seed document.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if the document is malformed.
    pub fn from_json(document: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(document)?)
    }
}
