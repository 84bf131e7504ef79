// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Duration, OffsetDateTime};
use tourbook_audit::{Action, Actor};
use tourbook_domain::{Cancellation, PaymentMethod, PaymentStatus, Reservation, SettlementOutcome};

use crate::tests::helpers::{NOW, create_test_admin, create_test_cause, create_test_reservation};
use crate::{
    Command, CoreError, PAYMENT_FAILED_REASON, RESERVATION_EXPIRED_REASON, ReservationPolicy,
    TransitionOutcome, TransitionPlan, apply,
};

fn run(
    reservation: &Reservation,
    command: Command,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionOutcome, CoreError> {
    apply(
        reservation,
        command,
        actor,
        create_test_cause(),
        &ReservationPolicy::default(),
        now,
    )
}

fn expect_plan(outcome: Result<TransitionOutcome, CoreError>) -> TransitionPlan {
    match outcome {
        Ok(TransitionOutcome::Apply(plan)) => plan,
        other => panic!("expected a transition plan, got {other:?}"),
    }
}

fn cancel(reason: &str) -> Command {
    Command::Cancel {
        reason: reason.to_string(),
    }
}

#[test]
fn test_owner_cancels_pending_booking_and_releases_seats() {
    let reservation: Reservation =
        create_test_reservation(PaymentStatus::Pending, PaymentMethod::Gateway, NOW);

    let plan: TransitionPlan = expect_plan(run(
        &reservation,
        cancel("change of plans"),
        Actor::customer("user-1"),
        NOW,
    ));

    assert_eq!(plan.target, PaymentStatus::Cancelled);
    assert_eq!(plan.release_seats, 2);
    assert_eq!(
        plan.allowed_from,
        vec![PaymentStatus::Pending, PaymentStatus::Confirmed]
    );
    let cancellation: Cancellation = plan.cancellation.unwrap();
    assert_eq!(cancellation.reason, "change of plans");
    assert_eq!(cancellation.cancelled_by, "user-1");
    assert_eq!(plan.audit_event.action, Action::Cancelled);
    assert_eq!(plan.audit_event.booking_id, Some(42));
    assert_eq!(plan.audit_event.from_status, Some(PaymentStatus::Pending));
}

#[test]
fn test_admin_cancels_confirmed_booking() {
    let reservation: Reservation =
        create_test_reservation(PaymentStatus::Confirmed, PaymentMethod::CashOnArrival, NOW);

    let plan: TransitionPlan = expect_plan(run(
        &reservation,
        cancel("tour rescheduled"),
        create_test_admin(),
        NOW,
    ));

    assert_eq!(plan.release_seats, 2);
    assert_eq!(plan.cancellation.unwrap().cancelled_by, "admin-123");
}

#[test]
fn test_other_customer_cannot_cancel() {
    let reservation: Reservation =
        create_test_reservation(PaymentStatus::Pending, PaymentMethod::Gateway, NOW);

    let result: Result<TransitionOutcome, CoreError> = run(
        &reservation,
        cancel("not mine"),
        Actor::customer("user-2"),
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::Unauthorized {
            actor_id: String::from("user-2"),
            booking_id: 42,
        })
    );
}

#[test]
fn test_cancel_of_cancelled_booking_is_already_cancelled() {
    let reservation: Reservation =
        create_test_reservation(PaymentStatus::Cancelled, PaymentMethod::Gateway, NOW);

    let result: Result<TransitionOutcome, CoreError> =
        run(&reservation, cancel("again"), Actor::customer("user-1"), NOW);

    assert_eq!(result, Err(CoreError::AlreadyCancelled { booking_id: 42 }));
}

#[test]
fn test_cancel_of_failed_booking_is_invalid_transition() {
    let reservation: Reservation =
        create_test_reservation(PaymentStatus::Failed, PaymentMethod::Gateway, NOW);

    let result: Result<TransitionOutcome, CoreError> =
        run(&reservation, cancel("late"), create_test_admin(), NOW);

    assert_eq!(
        result,
        Err(CoreError::InvalidTransition {
            booking_id: 42,
            from: PaymentStatus::Failed,
            to: PaymentStatus::Cancelled,
        })
    );
}

#[test]
fn test_successful_settlement_confirms_without_releasing() {
    let reservation: Reservation =
        create_test_reservation(PaymentStatus::Pending, PaymentMethod::Gateway, NOW);

    let plan: TransitionPlan = expect_plan(run(
        &reservation,
        Command::Settle {
            outcome: SettlementOutcome::Success,
        },
        Actor::system("payment-notifier"),
        NOW,
    ));

    assert_eq!(plan.target, PaymentStatus::Confirmed);
    assert_eq!(plan.allowed_from, vec![PaymentStatus::Pending]);
    assert_eq!(plan.release_seats, 0);
    assert!(plan.cancellation.is_none());
    assert_eq!(plan.audit_event.action, Action::Confirmed);
}

#[test]
fn test_failed_settlement_cancels_and_releases() {
    let reservation: Reservation =
        create_test_reservation(PaymentStatus::Pending, PaymentMethod::Gateway, NOW);

    let plan: TransitionPlan = expect_plan(run(
        &reservation,
        Command::Settle {
            outcome: SettlementOutcome::Failed,
        },
        Actor::system("payment-notifier"),
        NOW,
    ));

    assert_eq!(plan.target, PaymentStatus::Cancelled);
    assert_eq!(plan.release_seats, 2);
    assert_eq!(plan.cancellation.unwrap().reason, PAYMENT_FAILED_REASON);
    assert_eq!(plan.audit_event.action, Action::PaymentFailed);
}

#[test]
fn test_settlement_of_settled_booking_is_no_op() {
    for (status, outcome) in [
        (PaymentStatus::Confirmed, SettlementOutcome::Success),
        (PaymentStatus::Confirmed, SettlementOutcome::Failed),
        (PaymentStatus::Cancelled, SettlementOutcome::Success),
        (PaymentStatus::Failed, SettlementOutcome::Failed),
    ] {
        let reservation: Reservation =
            create_test_reservation(status, PaymentMethod::Gateway, NOW);

        let outcome: Result<TransitionOutcome, CoreError> = run(
            &reservation,
            Command::Settle { outcome },
            Actor::system("payment-notifier"),
            NOW,
        );

        match outcome {
            Ok(TransitionOutcome::NoOp { current, .. }) => {
                assert_eq!(current.payment_status, status);
            }
            other => panic!("expected a no-op for {status}, got {other:?}"),
        }
    }
}

#[test]
fn test_expiry_respects_ttl_boundary() {
    let created_at: OffsetDateTime = NOW;
    let reservation: Reservation =
        create_test_reservation(PaymentStatus::Pending, PaymentMethod::Gateway, created_at);

    let early: Result<TransitionOutcome, CoreError> = run(
        &reservation,
        Command::Expire,
        Actor::system("expiry-sweeper"),
        created_at + Duration::minutes(14),
    );
    assert!(matches!(early, Ok(TransitionOutcome::NoOp { .. })));

    let plan: TransitionPlan = expect_plan(run(
        &reservation,
        Command::Expire,
        Actor::system("expiry-sweeper"),
        created_at + Duration::minutes(15),
    ));
    assert_eq!(plan.audit_event.action, Action::Expired);
    assert_eq!(plan.release_seats, 2);
    assert_eq!(
        plan.cancellation.unwrap().reason,
        RESERVATION_EXPIRED_REASON
    );
}

#[test]
fn test_expiry_skips_cash_and_settled_bookings() {
    let later: OffsetDateTime = NOW + Duration::hours(2);

    let cash: Reservation =
        create_test_reservation(PaymentStatus::Pending, PaymentMethod::CashOnArrival, NOW);
    let confirmed: Reservation =
        create_test_reservation(PaymentStatus::Confirmed, PaymentMethod::Gateway, NOW);

    for reservation in [cash, confirmed] {
        let outcome: Result<TransitionOutcome, CoreError> = run(
            &reservation,
            Command::Expire,
            Actor::system("expiry-sweeper"),
            later,
        );
        assert!(matches!(outcome, Ok(TransitionOutcome::NoOp { .. })));
    }
}
