// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Timestamps cross the API boundary as RFC 3339 strings and calendar dates
//! as `YYYY-MM-DD`. Amounts are decimal strings.

use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tourbook_audit::AuditEvent;
use tourbook_domain::{
    Adjustment, Address, BookedGuest, Contact, Guest, PaymentMethod, PaymentStatus, PricingRule,
    Reservation, RulePayload, Tour, format_date,
};

use crate::error::ReservationError;

/// API request to book seats on a departure.
///
/// This DTO is distinct from domain types and represents the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReservationRequest {
    /// Booking user.
    pub user_id: String,
    /// Requested departure.
    pub tour_id: i64,
    /// Declared number of guests; must match `guests`.
    pub guest_size: u32,
    /// Guests to price and seat.
    pub guests: Vec<Guest>,
    /// Contact details.
    pub contact: Contact,
    /// Contact address.
    pub address: Address,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Date to price the booking for. Defaults to the request time.
    pub book_at: Option<OffsetDateTime>,
    /// Requested single rooms.
    pub single_room_count: u32,
}

/// API request to price a prospective booking without reserving anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPriceRequest {
    /// The departure.
    pub tour_id: i64,
    /// Date to price the booking for.
    pub booking_date: OffsetDateTime,
    /// Guests to price.
    pub guests: Vec<Guest>,
    /// Requested single rooms.
    pub single_room_count: u32,
}

/// API request to register a departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTourRequest {
    /// Display name.
    pub name: String,
    /// First day (`YYYY-MM-DD`).
    pub start_date: String,
    /// Last day (`YYYY-MM-DD`).
    pub end_date: String,
    /// Per-guest base price as a decimal string.
    pub base_price: String,
    /// Capacity ceiling.
    pub max_group_size: u32,
}

/// Cancellation details of a booking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CancellationInfo {
    /// Free-text reason.
    pub reason: String,
    /// When the booking was cancelled (RFC 3339).
    pub cancelled_at: String,
    /// Identifier of the cancelling actor.
    pub cancelled_by: String,
}

/// API response describing a booking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReservationResponse {
    /// Booking identifier.
    pub booking_id: i64,
    /// Booking user.
    pub user_id: String,
    /// Booked departure.
    pub tour_id: i64,
    /// Tour name at booking time.
    pub tour_name: String,
    /// Contact details.
    pub contact: Contact,
    /// Contact address.
    pub address: Address,
    /// Seats held.
    pub guest_size: u32,
    /// Guests with their resolved prices.
    pub guests: Vec<BookedGuest>,
    /// Per-guest base price at booking time.
    pub base_price: Decimal,
    /// Final total.
    pub total_amount: Decimal,
    /// Discount ledger.
    pub applied_discounts: Vec<Adjustment>,
    /// Surcharge ledger.
    pub applied_surcharges: Vec<Adjustment>,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Current status.
    pub payment_status: PaymentStatus,
    /// Date the booking was priced for (RFC 3339).
    pub book_at: String,
    /// Admission time (RFC 3339).
    pub created_at: String,
    /// Present once cancelled.
    pub cancellation: Option<CancellationInfo>,
}

impl ReservationResponse {
    /// Builds the response for a stored booking.
    ///
    /// # Errors
    ///
    /// Returns `ReservationError::Internal` if a timestamp cannot be
    /// formatted.
    pub fn from_reservation(reservation: &Reservation) -> Result<Self, ReservationError> {
        let cancellation: Option<CancellationInfo> = match &reservation.cancellation {
            Some(c) => Some(CancellationInfo {
                reason: c.reason.clone(),
                cancelled_at: format_timestamp(c.cancelled_at)?,
                cancelled_by: c.cancelled_by.clone(),
            }),
            None => None,
        };

        Ok(Self {
            booking_id: reservation.booking_id,
            user_id: reservation.user_id.clone(),
            tour_id: reservation.tour_id,
            tour_name: reservation.tour_name.clone(),
            contact: reservation.contact.clone(),
            address: reservation.address.clone(),
            guest_size: reservation.guest_size,
            guests: reservation.guests.clone(),
            base_price: reservation.base_price,
            total_amount: reservation.total_amount,
            applied_discounts: reservation.applied_discounts.clone(),
            applied_surcharges: reservation.applied_surcharges.clone(),
            payment_method: reservation.payment_method,
            payment_status: reservation.payment_status,
            book_at: format_timestamp(reservation.book_at)?,
            created_at: format_timestamp(reservation.created_at)?,
            cancellation,
        })
    }
}

/// API response for a settlement callback.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SettlementResponse {
    /// False when the callback changed nothing.
    pub applied: bool,
    /// Why nothing changed, for no-op settlements.
    pub reason: Option<String>,
    /// The booking after the callback.
    pub reservation: ReservationResponse,
}

/// API response describing a departure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TourResponse {
    /// Tour identifier.
    pub tour_id: i64,
    /// Display name.
    pub name: String,
    /// First day.
    pub start_date: String,
    /// Last day.
    pub end_date: String,
    /// Per-guest base price.
    pub base_price: Decimal,
    /// Capacity ceiling.
    pub max_group_size: u32,
    /// Seats held by active bookings.
    pub current_bookings: u32,
    /// Seats left.
    pub remaining: u32,
}

impl From<&Tour> for TourResponse {
    fn from(tour: &Tour) -> Self {
        Self {
            tour_id: tour.tour_id,
            name: tour.name.clone(),
            start_date: format_date(tour.dates.start),
            end_date: format_date(tour.dates.end),
            base_price: tour.base_price,
            max_group_size: tour.max_group_size,
            current_bookings: tour.current_bookings,
            remaining: tour.remaining_capacity(),
        }
    }
}

/// API response describing a pricing rule.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PricingRuleResponse {
    /// Rule identifier.
    pub rule_id: i64,
    /// Departure the rule belongs to.
    pub tour_id: i64,
    /// Whether the rule participates in pricing.
    pub is_active: bool,
    /// Payload version.
    pub version: u32,
    /// Kind and payload.
    #[serde(flatten)]
    pub rule: RulePayload,
}

impl From<&PricingRule> for PricingRuleResponse {
    fn from(rule: &PricingRule) -> Self {
        Self {
            rule_id: rule.rule_id,
            tour_id: rule.tour_id,
            is_active: rule.is_active,
            version: rule.version,
            rule: rule.payload.clone(),
        }
    }
}

/// API response for one entry of a booking's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingEventResponse {
    /// Event identifier.
    pub event_id: Option<i64>,
    /// What happened.
    pub action: String,
    /// Status before the transition.
    pub from_status: Option<PaymentStatus>,
    /// Status after the transition.
    pub to_status: PaymentStatus,
    /// Acting principal.
    pub actor_id: String,
    /// Role of the acting principal.
    pub actor_role: String,
    /// Cause identifier.
    pub cause_id: String,
    /// Cause description.
    pub cause_description: String,
    /// When it happened (RFC 3339).
    pub occurred_at: String,
}

impl BookingEventResponse {
    /// Builds the response for a stored event.
    ///
    /// # Errors
    ///
    /// Returns `ReservationError::Internal` if the timestamp cannot be
    /// formatted.
    pub fn from_event(event: &AuditEvent) -> Result<Self, ReservationError> {
        Ok(Self {
            event_id: event.event_id,
            action: event.action.to_string(),
            from_status: event.from_status,
            to_status: event.to_status,
            actor_id: event.actor.id.clone(),
            actor_role: event.actor.role.to_string(),
            cause_id: event.cause.id.clone(),
            cause_description: event.cause.description.clone(),
            occurred_at: format_timestamp(event.occurred_at)?,
        })
    }
}

/// Formats a timestamp as RFC 3339.
///
/// # Errors
///
/// Returns `ReservationError::Internal` if the timestamp is outside the range
/// RFC 3339 can express.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, ReservationError> {
    at.format(&Rfc3339).map_err(|e| ReservationError::Internal {
        message: format!("cannot format timestamp {at}: {e}"),
    })
}

/// Parses an RFC 3339 timestamp submitted as `field`.
///
/// # Errors
///
/// Returns `ReservationError::InvalidInput` if the text is not RFC 3339.
pub fn parse_timestamp(field: &str, value: &str) -> Result<OffsetDateTime, ReservationError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| ReservationError::InvalidInput {
        field: field.to_string(),
        message: format!("'{value}' is not an RFC 3339 timestamp: {e}"),
    })
}
