// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reclaiming seats held by abandoned gateway reservations.
//!
//! A sweep lists the pending gateway bookings older than the hold period and
//! expires each one in its own transaction. The expiry decision is re-made
//! inside that transaction, so a booking settled after it was listed is left
//! alone. A booking whose transaction fails is counted and picked up again by
//! the next sweep.

use time::OffsetDateTime;
use tourbook::{Command, ReservationPolicy, apply};
use tourbook_audit::{Actor, Cause};
use tourbook_persistence::{Persistence, PersistenceError, Transitioned};
use tracing::{debug, error, info};

use crate::error::{ReservationError, translate_persistence_error};

/// Actor recorded on expiries.
pub const EXPIRY_SWEEPER: &str = "expiry-sweeper";

/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SweepReport {
    /// Candidates listed.
    pub examined: usize,
    /// Candidates expired and their seats released.
    pub expired: usize,
    /// Candidates that no longer needed expiring.
    pub skipped: usize,
    /// Candidates whose transaction failed.
    pub failed: usize,
}

/// Runs one sweep.
///
/// # Arguments
///
/// * `persistence` - The booking store
/// * `policy` - Supplies the hold period
/// * `now` - The sweep time; bookings created at or before `now - ttl` expire
///
/// # Errors
///
/// Returns `ReservationError::Internal` if the candidates cannot be listed.
/// Failures on individual bookings do not fail the sweep.
pub fn run_sweep(
    persistence: &Persistence,
    policy: &ReservationPolicy,
    now: OffsetDateTime,
) -> Result<SweepReport, ReservationError> {
    let cutoff: OffsetDateTime = policy.expiry_cutoff(now);
    let candidates: Vec<i64> = persistence.list_expiry_candidates(cutoff).map_err(|e| {
        let err: ReservationError = translate_persistence_error(e);
        error!(error = %err, "Expiry sweep could not list candidates");
        err
    })?;

    let mut report: SweepReport = SweepReport {
        examined: candidates.len(),
        ..SweepReport::default()
    };
    let sweep_id: String = format!("sweep:{}", now.unix_timestamp());

    for booking_id in candidates {
        let cause: Cause = Cause::new(
            sweep_id.clone(),
            String::from("Pending reservation exceeded its hold period"),
        );
        let result: Result<Transitioned, PersistenceError> =
            persistence.transition(booking_id, |current| {
                apply(
                    current,
                    Command::Expire,
                    Actor::system(EXPIRY_SWEEPER),
                    cause,
                    policy,
                    now,
                )
            });

        match result {
            Ok(Transitioned::Applied(reservation)) => {
                report.expired += 1;
                info!(
                    booking_id,
                    tour_id = reservation.tour_id,
                    user_id = %reservation.user_id,
                    guest_size = reservation.guest_size,
                    "Reservation expired"
                );
            }
            Ok(Transitioned::Unchanged { reason, .. }) => {
                report.skipped += 1;
                debug!(booking_id, reason, "Expiry candidate skipped");
            }
            Err(PersistenceError::StatusConflict { current, .. }) => {
                report.skipped += 1;
                debug!(booking_id, current = %current, "Expiry candidate settled concurrently");
            }
            Err(e) => {
                report.failed += 1;
                error!(booking_id, error = %e, "Expiry failed; will retry next sweep");
            }
        }
    }

    if report.examined > 0 {
        info!(
            examined = report.examined,
            expired = report.expired,
            skipped = report.skipped,
            failed = report.failed,
            "Expiry sweep finished"
        );
    }
    Ok(report)
}
