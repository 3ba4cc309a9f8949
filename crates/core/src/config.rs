// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use trip_queue_domain::BoardingPolicy;

/// Default number of ticket references tried before giving up.
pub const DEFAULT_TICKET_REFERENCE_ATTEMPTS: u32 = 8;

/// Default size of a cancellation history page.
pub const DEFAULT_CANCELLATION_HISTORY_LIMIT: usize = 50;

/// Default number of trips in a driver's trip history.
pub const DEFAULT_TRIP_HISTORY_LIMIT: usize = 20;

/// Tunables of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Whether new trips start boarding or waiting.
    pub boarding_policy: BoardingPolicy,
    /// Ticket references tried per booking before `DuplicateReference`.
    pub ticket_reference_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            boarding_policy: BoardingPolicy::Immediate,
            ticket_reference_attempts: DEFAULT_TICKET_REFERENCE_ATTEMPTS,
        }
    }
}
