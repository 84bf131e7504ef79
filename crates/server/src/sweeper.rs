// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Periodic expiry of abandoned gateway reservations.
//!
//! The sweep itself is synchronous database work, so each tick hands it to
//! the blocking pool. A failed sweep is logged and retried on the next tick.

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Interval, MissedTickBehavior};
use tourbook::ReservationPolicy;
use tourbook_api::{SweepReport, run_sweep};
use tourbook_persistence::Persistence;
use tracing::{debug, error, info};

/// Starts the sweeper on the current runtime.
///
/// The first sweep runs immediately so holds left over from before a restart
/// are reclaimed without waiting a full interval.
pub fn spawn_expiry_sweeper(persistence: Persistence, policy: ReservationPolicy) -> JoinHandle<()> {
    let period: Duration = policy.sweep_interval.unsigned_abs();
    info!(
        interval_secs = period.as_secs(),
        pending_ttl_secs = policy.pending_ttl.whole_seconds(),
        "Starting expiry sweeper"
    );

    tokio::spawn(async move {
        let mut ticker: Interval = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&persistence, policy, OffsetDateTime::now_utc()).await;
        }
    })
}

/// Runs a single sweep on the blocking pool.
///
/// Returns `None` if the sweep could not run.
pub async fn sweep_once(
    persistence: &Persistence,
    policy: ReservationPolicy,
    now: OffsetDateTime,
) -> Option<SweepReport> {
    let persistence: Persistence = persistence.clone();
    let outcome = tokio::task::spawn_blocking(move || run_sweep(&persistence, &policy, now)).await;

    match outcome {
        Ok(Ok(report)) => {
            debug!(
                examined = report.examined,
                expired = report.expired,
                "Sweep tick finished"
            );
            Some(report)
        }
        Ok(Err(err)) => {
            error!(error = %err, "Expiry sweep failed");
            None
        }
        Err(join_err) => {
            error!(error = %join_err, "Expiry sweep task panicked");
            None
        }
    }
}
