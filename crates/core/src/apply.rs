// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use tourbook_audit::{Action, Actor, AuditEvent, Cause};
use tourbook_domain::{Cancellation, PaymentMethod, PaymentStatus, Reservation, SettlementOutcome};

use crate::command::Command;
use crate::error::CoreError;
use crate::policy::ReservationPolicy;
use crate::state::{TransitionOutcome, TransitionPlan};

/// Reason recorded when the payment notifier reports a failure.
pub const PAYMENT_FAILED_REASON: &str = "payment failed";

/// Reason recorded when the sweeper reclaims an abandoned reservation.
pub const RESERVATION_EXPIRED_REASON: &str = "reservation expired";

/// Applies a command to a booking as read, producing the change to make.
///
/// This function never touches storage. The returned plan is applied by the
/// persistence layer as a compare-and-set, so a plan built from a stale read
/// simply fails to land.
///
/// # Arguments
///
/// * `reservation` - The booking as currently stored
/// * `command` - The requested change
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `policy` - Reservation timings, used by `Expire`
/// * `now` - The current time
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not act on the booking
/// - A cancellation targets a booking that is already cancelled
/// - A cancellation targets a failed booking
///
/// Settlement and expiry never fail here; when nothing applies they return
/// `TransitionOutcome::NoOp`.
#[allow(clippy::too_many_lines)]
pub fn apply(
    reservation: &Reservation,
    command: Command,
    actor: Actor,
    cause: Cause,
    policy: &ReservationPolicy,
    now: OffsetDateTime,
) -> Result<TransitionOutcome, CoreError> {
    let current: PaymentStatus = reservation.payment_status;

    match command {
        Command::Cancel { reason } => {
            if !actor.may_act_for(&reservation.user_id) {
                return Err(CoreError::Unauthorized {
                    actor_id: actor.id,
                    booking_id: reservation.booking_id,
                });
            }
            match current {
                PaymentStatus::Cancelled => {
                    return Err(CoreError::AlreadyCancelled {
                        booking_id: reservation.booking_id,
                    });
                }
                PaymentStatus::Failed => {
                    return Err(CoreError::InvalidTransition {
                        booking_id: reservation.booking_id,
                        from: current,
                        to: PaymentStatus::Cancelled,
                    });
                }
                PaymentStatus::Pending | PaymentStatus::Confirmed => {}
            }
            current.validate_transition(PaymentStatus::Cancelled)?;

            Ok(TransitionOutcome::Apply(release_plan(
                reservation,
                PaymentStatus::ACTIVE.to_vec(),
                Action::Cancelled,
                reason,
                actor,
                cause,
                now,
            )))
        }
        Command::Settle { outcome } => {
            if current != PaymentStatus::Pending {
                return Ok(no_op(reservation, settled_reason(current)));
            }
            match outcome {
                SettlementOutcome::Success => {
                    let audit_event: AuditEvent = AuditEvent::new(
                        actor,
                        cause,
                        Action::Confirmed,
                        Some(current),
                        PaymentStatus::Confirmed,
                        now,
                    )
                    .for_booking(reservation.booking_id);
                    Ok(TransitionOutcome::Apply(TransitionPlan {
                        booking_id: reservation.booking_id,
                        tour_id: reservation.tour_id,
                        allowed_from: vec![PaymentStatus::Pending],
                        target: PaymentStatus::Confirmed,
                        cancellation: None,
                        release_seats: 0,
                        audit_event,
                    }))
                }
                SettlementOutcome::Failed => Ok(TransitionOutcome::Apply(release_plan(
                    reservation,
                    vec![PaymentStatus::Pending],
                    Action::PaymentFailed,
                    String::from(PAYMENT_FAILED_REASON),
                    actor,
                    cause,
                    now,
                ))),
            }
        }
        Command::Expire => {
            if current != PaymentStatus::Pending {
                return Ok(no_op(reservation, "no longer pending"));
            }
            if reservation.payment_method != PaymentMethod::Gateway {
                return Ok(no_op(reservation, "not awaiting gateway settlement"));
            }
            if !policy.is_stale(reservation.created_at, now) {
                return Ok(no_op(reservation, "reservation still within its hold period"));
            }
            Ok(TransitionOutcome::Apply(release_plan(
                reservation,
                vec![PaymentStatus::Pending],
                Action::Expired,
                String::from(RESERVATION_EXPIRED_REASON),
                actor,
                cause,
                now,
            )))
        }
    }
}

const fn settled_reason(current: PaymentStatus) -> &'static str {
    match current {
        PaymentStatus::Confirmed => "already confirmed",
        PaymentStatus::Cancelled => "already cancelled",
        PaymentStatus::Failed => "already failed",
        PaymentStatus::Pending => "pending",
    }
}

fn no_op(reservation: &Reservation, reason: &'static str) -> TransitionOutcome {
    TransitionOutcome::NoOp {
        current: Box::new(reservation.clone()),
        reason,
    }
}

/// Builds a move into `Cancelled` that hands the booking's seats back.
fn release_plan(
    reservation: &Reservation,
    allowed_from: Vec<PaymentStatus>,
    action: Action,
    reason: String,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> TransitionPlan {
    let cancellation: Cancellation = Cancellation {
        reason,
        cancelled_at: now,
        cancelled_by: actor.id.clone(),
    };
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        Some(reservation.payment_status),
        PaymentStatus::Cancelled,
        now,
    )
    .for_booking(reservation.booking_id);

    TransitionPlan {
        booking_id: reservation.booking_id,
        tour_id: reservation.tour_id,
        allowed_from,
        target: PaymentStatus::Cancelled,
        cancellation: Some(cancellation),
        release_seats: reservation.guest_size,
        audit_event,
    }
}
