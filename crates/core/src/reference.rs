// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use trip_queue_domain::TicketReference;

/// Supplies candidate ticket references.
///
/// Candidates need not be unique; the allocator checks each one against
/// the store and asks again on a clash.
pub trait ReferenceSource: Send + Sync {
    /// Returns the next candidate.
    fn next_reference(&self) -> TicketReference;
}

/// Draws references from the thread-local random generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomReferenceSource;

impl ReferenceSource for RandomReferenceSource {
    fn next_reference(&self) -> TicketReference {
        TicketReference::from_entropy(rand::random::<u64>())
    }
}
