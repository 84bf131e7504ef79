// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Public operations of the tour booking system.
//!
//! This crate is the boundary between callers (the HTTP server, the payment
//! notifier, the catalog) and the booking core. It owns the error contract:
//! domain, core and persistence errors are translated into
//! `ReservationError` and never leak past this layer.
//!
//! ## Operations
//!
//! - Booking: `create_reservation`, `cancel_reservation`, `settle_payment`,
//!   `get_reservation`, `list_reservations`, `list_booking_events`
//! - Pricing: `preview_price`
//! - Catalog: departures and pricing rules
//! - Expiry: `run_sweep`

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
#![allow(clippy::multiple_crate_versions)]

mod catalog;
mod error;
mod request_response;
mod reservations;
mod sweeper;

#[cfg(test)]
mod tests;

pub use catalog::{
    create_pricing_rule, create_tour, get_tour, list_pricing_rules, list_tours,
    set_pricing_rule_active, update_pricing_rule,
};
pub use error::{
    ErrorKind, ReservationError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use request_response::{
    BookingEventResponse, CancellationInfo, CreateReservationRequest, CreateTourRequest,
    PreviewPriceRequest, PricingRuleResponse, ReservationResponse, SettlementResponse,
    TourResponse, format_timestamp, parse_timestamp,
};
pub use reservations::{
    PAYMENT_NOTIFIER, Settlement, cancel_reservation, create_reservation, get_reservation,
    list_booking_events, list_reservations, preview_price, settle_payment, utc_today,
};
pub use sweeper::{EXPIRY_SWEEPER, SweepReport, run_sweep};
