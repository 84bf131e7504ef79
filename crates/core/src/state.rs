// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use tourbook_audit::AuditEvent;
use tourbook_domain::{
    ActiveBookingSummary, Address, Cancellation, Contact, Guest, NewReservation, PaymentMethod,
    PaymentStatus, PricingRule, Reservation, Tour,
};

/// A request to book seats on a departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    /// Booking user.
    pub user_id: String,
    /// Requested departure.
    pub tour_id: i64,
    /// Declared number of guests.
    pub guest_size: u32,
    /// Guests to price and seat.
    pub guests: Vec<Guest>,
    /// Contact details.
    pub contact: Contact,
    /// Contact address.
    pub address: Address,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Date the booking is priced for.
    pub book_at: OffsetDateTime,
    /// Requested single rooms.
    pub single_room_count: u32,
}

/// Everything admission needs to know, read before the write transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionContext {
    /// The requested departure.
    pub tour: Tour,
    /// The user's active bookings on any departure.
    pub active_bookings: Vec<ActiveBookingSummary>,
    /// Pricing rules of the departure, read in one query.
    pub rules: Vec<PricingRule>,
}

/// A validated, priced booking ready for the admission transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionPlan {
    /// The booking to insert.
    pub reservation: NewReservation,
    /// The `Created` audit event.
    pub audit_event: AuditEvent,
}

impl AdmissionPlan {
    /// Seats the admission transaction must take from the departure.
    #[must_use]
    pub fn seats(&self) -> u32 {
        self.reservation.guest_size()
    }
}

/// A status change ready for the transition transaction.
///
/// The transaction applies it as a compare-and-set: the update only lands
/// while the stored status is one of `allowed_from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// The booking to update.
    pub booking_id: i64,
    /// Its departure.
    pub tour_id: i64,
    /// Statuses the booking may be in when the update lands.
    pub allowed_from: Vec<PaymentStatus>,
    /// Status after the update.
    pub target: PaymentStatus,
    /// Cancellation details for transitions into `Cancelled`.
    pub cancellation: Option<Cancellation>,
    /// Seats returned to the departure (0 for none).
    pub release_seats: u32,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// The result of applying a command to a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The booking must change.
    Apply(TransitionPlan),
    /// Nothing to do; the booking is left as it is.
    NoOp {
        /// The booking as read.
        current: Box<Reservation>,
        /// Why nothing happens.
        reason: &'static str,
    },
}
