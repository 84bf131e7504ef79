// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Duration, OffsetDateTime};

/// Tunable reservation limits and timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationPolicy {
    /// How long a gateway reservation may stay `Pending` before the sweeper
    /// reclaims its seats.
    pub pending_ttl: Duration,
    /// How often the sweeper runs.
    pub sweep_interval: Duration,
    /// Pending reservations a user may hold at once.
    pub max_pending_per_user: usize,
}

impl ReservationPolicy {
    /// Reservations created at or before this instant are stale at `now`.
    #[must_use]
    pub fn expiry_cutoff(&self, now: OffsetDateTime) -> OffsetDateTime {
        now - self.pending_ttl
    }

    /// Returns true once a reservation created at `created_at` has been
    /// pending for the full TTL.
    #[must_use]
    pub fn is_stale(&self, created_at: OffsetDateTime, now: OffsetDateTime) -> bool {
        created_at <= self.expiry_cutoff(now)
    }
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self {
            pending_ttl: Duration::minutes(15),
            sweep_interval: Duration::minutes(5),
            max_pending_per_user: 3,
        }
    }
}
