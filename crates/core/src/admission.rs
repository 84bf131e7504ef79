// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Date, OffsetDateTime, UtcOffset};
use tourbook_audit::{Action, Actor, AuditEvent, Cause};
use tourbook_domain::{
    DomainError, NewReservation, PaymentStatus, PriceBreakdown, PricingContext, Tour,
    compute_price, validate_address, validate_contact, validate_guests,
};
use tracing::debug;

use crate::error::CoreError;
use crate::policy::ReservationPolicy;
use crate::state::{AdmissionContext, AdmissionPlan, ReservationRequest};

/// Runs every admission precondition and prices the booking.
///
/// Checks run in a fixed order and the first failure is returned:
///
/// 1. the departure has not ended
/// 2. the guest list is well formed
/// 3. every guest resolves to a non-negative price and the total stays in
///    range
/// 4. the contact is complete
/// 5. the address is complete
/// 6. the user is below the pending reservation limit
/// 7. the user has no active booking on this departure
/// 8. the user has no active booking on an overlapping departure
///
/// Capacity is not checked here; the admission transaction's conditional
/// update decides whether seats are free.
///
/// # Errors
///
/// Returns the first failed precondition.
pub fn admit(
    context: &AdmissionContext,
    request: ReservationRequest,
    policy: &ReservationPolicy,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<AdmissionPlan, CoreError> {
    let tour: &Tour = &context.tour;
    let today: Date = now.to_offset(UtcOffset::UTC).date();

    if tour.has_ended(today) {
        return Err(CoreError::TourEnded {
            tour_id: tour.tour_id,
        });
    }

    validate_guests(&request.guests, request.guest_size)?;

    let pricing_context: PricingContext = PricingContext {
        booking_date: request.book_at,
        today,
        departure_start: tour.dates.start,
        single_room_count: request.single_room_count,
    };
    let price: PriceBreakdown = compute_price(
        tour.base_price,
        &context.rules,
        &request.guests,
        &pricing_context,
    )?;
    if let Some((index, guest)) = price
        .per_guest
        .iter()
        .enumerate()
        .find(|(_, guest)| guest.price.is_sign_negative() && !guest.price.is_zero())
    {
        return Err(CoreError::DomainViolation(DomainError::InvalidGuests(
            format!("guest {index} resolves to negative price {}", guest.price),
        )));
    }

    validate_contact(&request.contact)?;
    validate_address(&request.address)?;

    let pending: usize = context
        .active_bookings
        .iter()
        .filter(|booking| booking.payment_status == PaymentStatus::Pending)
        .count();
    if pending >= policy.max_pending_per_user {
        debug!(user_id = %request.user_id, pending, "Pending reservation limit reached");
        return Err(CoreError::ThrottleExceeded {
            user_id: request.user_id,
            pending,
            limit: policy.max_pending_per_user,
        });
    }

    if context
        .active_bookings
        .iter()
        .any(|booking| booking.tour_id == tour.tour_id)
    {
        return Err(CoreError::DuplicateBooking {
            user_id: request.user_id,
            tour_id: tour.tour_id,
        });
    }

    if let Some(conflict) = context
        .active_bookings
        .iter()
        .find(|booking| booking.dates.overlaps(&tour.dates))
    {
        return Err(CoreError::OverlappingDates {
            existing_booking_id: conflict.booking_id,
            existing_tour_id: conflict.tour_id,
        });
    }

    let status: PaymentStatus = request.payment_method.initial_status();
    let audit_event: AuditEvent = AuditEvent::new(
        Actor::customer(&request.user_id),
        cause,
        Action::Created,
        None,
        status,
        now,
    );

    let reservation: NewReservation = NewReservation {
        user_id: request.user_id,
        tour_id: tour.tour_id,
        tour_name: tour.name.clone(),
        contact: request.contact,
        address: request.address,
        price,
        payment_method: request.payment_method,
        payment_status: status,
        book_at: request.book_at,
        created_at: now,
    };

    Ok(AdmissionPlan {
        reservation,
        audit_event,
    })
}
