// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking operations.
//!
//! Every operation that changes a booking runs as one write transaction in
//! the persistence layer. The rules deciding what to write are evaluated
//! inside that transaction against state read there. Admission also runs
//! once against a plain read beforehand, so rejected bookings never wait on
//! the write lock.

use time::{Date, OffsetDateTime, UtcOffset};
use tourbook::{Command, ReservationPolicy, ReservationRequest, admit, apply};
use tourbook_audit::{Actor, AuditEvent, Cause};
use tourbook_domain::{
    PriceBreakdown, PricingContext, PricingRule, Reservation, SettlementOutcome, Tour,
    compute_price, validate_guests,
};
use tourbook_persistence::{Persistence, PersistenceError, Transitioned};
use tracing::{info, warn};

use crate::error::{
    ReservationError, log_failure, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
use crate::request_response::{CreateReservationRequest, PreviewPriceRequest};

/// Actor recorded on settlements reported by the payment gateway.
pub const PAYMENT_NOTIFIER: &str = "payment-notifier";

/// The result of a settlement callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The booking changed state.
    Applied(Reservation),
    /// The booking was already settled or terminal; nothing changed.
    NoOp {
        /// The booking as stored.
        current: Reservation,
        /// Why nothing changed.
        reason: &'static str,
    },
}

impl Settlement {
    /// The booking after the callback.
    #[must_use]
    pub const fn reservation(&self) -> &Reservation {
        match self {
            Self::Applied(reservation) | Self::NoOp {
                current: reservation,
                ..
            } => reservation,
        }
    }

    /// Returns true if the callback changed the booking.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Books seats on a departure.
///
/// The price is computed from the departure's active rules as they stand
/// inside the admission transaction. A gateway booking starts `Pending`; a
/// cash-on-arrival booking starts `Confirmed`.
///
/// # Arguments
///
/// * `persistence` - The booking store
/// * `policy` - Reservation limits
/// * `request` - The booking request
/// * `now` - The current time
///
/// # Errors
///
/// Returns an error if:
/// - The departure does not exist or has ended
/// - The guests, contact or address are invalid
/// - The user holds too many pending reservations
/// - The user already holds this departure or an overlapping one
/// - The departure has too few seats left
/// - Storage fails
pub fn create_reservation(
    persistence: &Persistence,
    policy: &ReservationPolicy,
    request: CreateReservationRequest,
    now: OffsetDateTime,
) -> Result<Reservation, ReservationError> {
    let user_id: String = request.user_id.clone();
    let tour_id: i64 = request.tour_id;
    let core_request: ReservationRequest = ReservationRequest {
        user_id: request.user_id,
        tour_id: request.tour_id,
        guest_size: request.guest_size,
        guests: request.guests,
        contact: request.contact,
        address: request.address,
        payment_method: request.payment_method,
        book_at: request.book_at.unwrap_or(now),
        single_room_count: request.single_room_count,
    };
    let cause: Cause = Cause::new(
        format!("booking-request:{user_id}:{tour_id}"),
        String::from("Customer booking request"),
    );

    // A plain read first, so requests that admission rejects never take the
    // write lock. The transaction re-runs every check against fresh state.
    let precheck: Result<(), ReservationError> = persistence
        .load_admission_context(&user_id, tour_id)
        .map_err(translate_persistence_error)
        .and_then(|context| {
            admit(&context, core_request.clone(), policy, cause.clone(), now)
                .map(|_| ())
                .map_err(translate_core_error)
        });
    if let Err(err) = precheck {
        log_failure("create_reservation", &err);
        return Err(err);
    }

    let result: Result<Reservation, PersistenceError> =
        persistence.admit(&user_id, tour_id, |context| {
            admit(context, core_request, policy, cause, now)
        });

    result.map_err(|e| {
        let err: ReservationError = translate_persistence_error(e);
        log_failure("create_reservation", &err);
        err
    })
}

/// Cancels a booking and returns its seats to the departure.
///
/// # Arguments
///
/// * `persistence` - The booking store
/// * `booking_id` - The booking to cancel
/// * `actor` - Who is cancelling: the owner, an admin or the system
/// * `reason` - Free-text reason recorded on the booking
/// * `now` - The current time
///
/// # Errors
///
/// Returns an error if:
/// - The booking does not exist
/// - The actor may not act on it
/// - It is already cancelled (benign) or has failed
/// - Storage fails
pub fn cancel_reservation(
    persistence: &Persistence,
    booking_id: i64,
    actor: &Actor,
    reason: &str,
    now: OffsetDateTime,
) -> Result<Reservation, ReservationError> {
    let policy: ReservationPolicy = ReservationPolicy::default();
    let cause: Cause = Cause::new(
        format!("cancel:{booking_id}"),
        format!("Cancellation requested by {}", actor.id),
    );
    let command: Command = Command::Cancel {
        reason: reason.to_string(),
    };

    let result: Result<Transitioned, PersistenceError> =
        persistence.transition(booking_id, |current| {
            apply(current, command, actor.clone(), cause, &policy, now)
        });

    match result {
        Ok(Transitioned::Applied(reservation)) => Ok(reservation),
        Ok(Transitioned::Unchanged { current, .. }) => {
            let err: ReservationError = translate_persistence_error(
                PersistenceError::StatusConflict {
                    booking_id,
                    current: current.payment_status,
                },
            );
            log_failure("cancel_reservation", &err);
            Err(err)
        }
        Err(e) => {
            let err: ReservationError = translate_persistence_error(e);
            log_failure("cancel_reservation", &err);
            Err(err)
        }
    }
}

/// Applies a payment gateway outcome to a booking.
///
/// `Success` confirms a pending booking. `Failed` cancels it with reason
/// `payment failed` and returns its seats. Callbacks for bookings that are no
/// longer pending are benign no-ops, so the gateway may repeat a callback
/// safely.
///
/// # Errors
///
/// Returns an error if the booking does not exist or storage fails.
pub fn settle_payment(
    persistence: &Persistence,
    booking_id: i64,
    outcome: SettlementOutcome,
    now: OffsetDateTime,
) -> Result<Settlement, ReservationError> {
    let policy: ReservationPolicy = ReservationPolicy::default();
    let cause: Cause = Cause::new(
        format!("settlement:{booking_id}"),
        format!("Payment gateway reported {outcome:?}"),
    );

    let result: Result<Transitioned, PersistenceError> =
        persistence.transition(booking_id, |current| {
            apply(
                current,
                Command::Settle { outcome },
                Actor::system(PAYMENT_NOTIFIER),
                cause,
                &policy,
                now,
            )
        });

    match result {
        Ok(Transitioned::Applied(reservation)) => {
            info!(
                booking_id,
                outcome = ?outcome,
                status = %reservation.payment_status,
                "Settlement applied"
            );
            Ok(Settlement::Applied(reservation))
        }
        Ok(Transitioned::Unchanged { current, reason }) => {
            warn!(
                booking_id,
                outcome = ?outcome,
                status = %current.payment_status,
                reason,
                "Settlement ignored"
            );
            Ok(Settlement::NoOp { current, reason })
        }
        Err(PersistenceError::StatusConflict { .. }) => {
            let current: Reservation = get_reservation(persistence, booking_id)?;
            warn!(
                booking_id,
                outcome = ?outcome,
                status = %current.payment_status,
                "Settlement raced another transition"
            );
            Ok(Settlement::NoOp {
                current,
                reason: "settled concurrently",
            })
        }
        Err(e) => {
            let err: ReservationError = translate_persistence_error(e);
            log_failure("settle_payment", &err);
            Err(err)
        }
    }
}

/// Retrieves a booking.
///
/// # Errors
///
/// Returns an error if the booking does not exist or storage fails.
pub fn get_reservation(
    persistence: &Persistence,
    booking_id: i64,
) -> Result<Reservation, ReservationError> {
    persistence
        .get_reservation(booking_id)
        .map_err(translate_persistence_error)
}

/// Lists a user's bookings, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list_reservations(
    persistence: &Persistence,
    user_id: &str,
) -> Result<Vec<Reservation>, ReservationError> {
    persistence
        .list_reservations(user_id)
        .map_err(translate_persistence_error)
}

/// Retrieves the audit trail of a booking, oldest first.
///
/// # Errors
///
/// Returns an error if the booking does not exist or storage fails.
pub fn list_booking_events(
    persistence: &Persistence,
    booking_id: i64,
) -> Result<Vec<AuditEvent>, ReservationError> {
    persistence
        .get_reservation(booking_id)
        .and_then(|_| persistence.list_booking_events(booking_id))
        .map_err(translate_persistence_error)
}

/// Prices a prospective booking with the departure's active rules.
///
/// Nothing is reserved and nothing is written.
///
/// # Errors
///
/// Returns an error if the departure does not exist, the guest list is
/// invalid or cannot be priced, or storage fails.
pub fn preview_price(
    persistence: &Persistence,
    request: &PreviewPriceRequest,
    today: Date,
) -> Result<PriceBreakdown, ReservationError> {
    let declared: u32 = u32::try_from(request.guests.len()).map_err(|_| {
        ReservationError::InvalidGuests {
            message: String::from("too many guests"),
        }
    })?;
    validate_guests(&request.guests, declared).map_err(translate_domain_error)?;

    let tour: Tour = persistence
        .get_tour(request.tour_id)
        .map_err(translate_persistence_error)?;
    let rules: Vec<PricingRule> = persistence
        .list_pricing_rules(request.tour_id, true)
        .map_err(translate_persistence_error)?;

    let context: PricingContext = PricingContext {
        booking_date: request.booking_date,
        today,
        departure_start: tour.dates.start,
        single_room_count: request.single_room_count,
    };
    compute_price(tour.base_price, &rules, &request.guests, &context)
        .map_err(translate_domain_error)
}

/// Today's date in UTC.
#[must_use]
pub fn utc_today(now: OffsetDateTime) -> Date {
    now.to_offset(UtcOffset::UTC).date()
}
