// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::payment_status::{PaymentMethod, PaymentStatus};
use crate::pricing::{Adjustment, PriceBreakdown};

/// A guest as submitted with a booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    /// Full name of the guest.
    pub full_name: String,
    /// Age in whole years.
    pub age: u32,
    /// Declared guest type, matched against age bracket names (`adult`, `child`, ...).
    pub guest_type: String,
}

impl Guest {
    /// Creates a new guest.
    #[must_use]
    pub fn new(full_name: &str, age: u32, guest_type: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            age,
            guest_type: guest_type.to_string(),
        }
    }
}

/// A guest as stored on a booking, with the price resolved at admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedGuest {
    /// Full name of the guest.
    pub full_name: String,
    /// Age in whole years.
    pub age: u32,
    /// Declared guest type.
    pub guest_type: String,
    /// Resolved price for this guest.
    pub price: Decimal,
    /// Whether a matched age bracket requires identity documents.
    pub requires_id: bool,
    /// Age bracket discounts applied to this guest.
    pub discounts: Vec<Adjustment>,
}

/// Contact person for a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Name of the person making the booking.
    pub full_name: String,
    /// Phone number.
    pub phone: String,
}

/// Postal address of the booking contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street and house number.
    pub street: String,
    /// Ward.
    pub ward: String,
    /// District.
    pub district: String,
    /// Province or city.
    pub province: String,
}

/// Who cancelled a booking, when, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    /// Free-text reason.
    pub reason: String,
    /// When the booking was cancelled.
    pub cancelled_at: OffsetDateTime,
    /// Identifier of the cancelling actor.
    pub cancelled_by: String,
}

/// A booking ready to be inserted, produced by admission.
///
/// Carries the full price snapshot; nothing about the price is recomputed
/// after this point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    /// Booking user.
    pub user_id: String,
    /// Booked tour.
    pub tour_id: i64,
    /// Tour name at booking time.
    pub tour_name: String,
    /// Contact details.
    pub contact: Contact,
    /// Contact address.
    pub address: Address,
    /// Full price snapshot, including the guests with their resolved prices.
    pub price: PriceBreakdown,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Initial status derived from the payment method.
    pub payment_status: PaymentStatus,
    /// Date the booking was priced for.
    pub book_at: OffsetDateTime,
    /// Admission time.
    pub created_at: OffsetDateTime,
}

impl NewReservation {
    /// Number of seats this booking holds.
    #[must_use]
    pub fn guest_size(&self) -> u32 {
        u32::try_from(self.price.per_guest.len()).unwrap_or(u32::MAX)
    }
}

/// A persisted booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Booking identifier.
    pub booking_id: i64,
    /// Booking user.
    pub user_id: String,
    /// Booked tour.
    pub tour_id: i64,
    /// Tour name at booking time.
    pub tour_name: String,
    /// Contact details.
    pub contact: Contact,
    /// Contact address.
    pub address: Address,
    /// Number of seats held.
    pub guest_size: u32,
    /// Guests with their resolved prices.
    pub guests: Vec<BookedGuest>,
    /// Per-guest base price at booking time.
    pub base_price: Decimal,
    /// Final rounded total.
    pub total_amount: Decimal,
    /// Discount ledger.
    pub applied_discounts: Vec<Adjustment>,
    /// Surcharge ledger.
    pub applied_surcharges: Vec<Adjustment>,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Current status.
    pub payment_status: PaymentStatus,
    /// Date the booking was priced for.
    pub book_at: OffsetDateTime,
    /// Admission time.
    pub created_at: OffsetDateTime,
    /// Present once the booking has been cancelled.
    pub cancellation: Option<Cancellation>,
}

impl Reservation {
    /// Returns true if the booking still holds seats.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.payment_status.holds_seats()
    }
}

/// Minimal view of another active booking of the same user, used for the
/// duplicate, overlap and throttle checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBookingSummary {
    /// Booking identifier.
    pub booking_id: i64,
    /// Tour of the booking.
    pub tour_id: i64,
    /// Current status (always `Pending` or `Confirmed`).
    pub payment_status: PaymentStatus,
    /// Departure dates of the booked tour.
    pub dates: crate::tour::DateRange,
}
