// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod booking;
mod error;
mod money;
mod payment_status;
mod pricing;
mod pricing_rule;
mod tour;
mod validation;

#[cfg(test)]
mod tests;

pub use booking::{
    ActiveBookingSummary, Address, BookedGuest, Cancellation, Contact, Guest, NewReservation,
    Reservation,
};
pub use error::DomainError;
pub use money::{
    MAX_AMOUNT, MoneyError, format_amount, parse_amount, parse_non_negative_amount, round_total,
};
pub use payment_status::{PaymentMethod, PaymentStatus, SettlementOutcome};
pub use pricing::{Adjustment, AdjustmentSource, PriceBreakdown, PricingContext, compute_price};
pub use pricing_rule::{
    AgeBracket, DiscountType, MAX_PRICE_MULTIPLIER, PricingRule, Promotion, RuleKind, RulePayload,
    SeasonWindow, Surcharge, SurchargeType,
};
pub use tour::{DateRange, NewTour, Tour, format_date, parse_date};
pub use validation::{MAX_GUEST_AGE, validate_address, validate_contact, validate_guests};
