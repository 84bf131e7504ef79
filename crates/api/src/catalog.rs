// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Departure and pricing rule maintenance.
//!
//! These operations serve the catalog collaborator. They validate input and
//! hand it to the store; none of them touches a seat counter.

use rust_decimal::Decimal;
use time::Date;
use tourbook_domain::{
    DateRange, NewTour, PricingRule, RulePayload, Tour, parse_date, parse_non_negative_amount,
};
use tourbook_persistence::Persistence;
use tracing::info;

use crate::error::{
    ReservationError, log_failure, translate_domain_error, translate_persistence_error,
};
use crate::request_response::CreateTourRequest;

/// Registers a departure.
///
/// # Errors
///
/// Returns `ReservationError::InvalidInput` if a date or the price cannot be
/// parsed, the dates are reversed, the name is blank or the capacity is
/// zero. Returns `ReservationError::Internal` if storage fails.
pub fn create_tour(
    persistence: &Persistence,
    request: &CreateTourRequest,
) -> Result<Tour, ReservationError> {
    let start: Date = parse_date(&request.start_date).map_err(translate_domain_error)?;
    let end: Date = parse_date(&request.end_date).map_err(translate_domain_error)?;
    let base_price: Decimal = parse_non_negative_amount(&request.base_price)
        .map_err(|e| translate_domain_error(e.into()))?;

    let new_tour: NewTour = NewTour {
        name: request.name.trim().to_string(),
        dates: DateRange::new(start, end).map_err(translate_domain_error)?,
        base_price,
        max_group_size: request.max_group_size,
    };
    new_tour.validate().map_err(translate_domain_error)?;

    let tour: Tour = persistence.create_tour(&new_tour).map_err(|e| {
        let err: ReservationError = translate_persistence_error(e);
        log_failure("create_tour", &err);
        err
    })?;

    info!(
        tour_id = tour.tour_id,
        name = %tour.name,
        max_group_size = tour.max_group_size,
        "Tour registered"
    );
    Ok(tour)
}

/// Retrieves a departure.
///
/// # Errors
///
/// Returns `ReservationError::TourNotFound` if it does not exist.
pub fn get_tour(persistence: &Persistence, tour_id: i64) -> Result<Tour, ReservationError> {
    persistence
        .get_tour(tour_id)
        .map_err(translate_persistence_error)
}

/// Lists every departure.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list_tours(persistence: &Persistence) -> Result<Vec<Tour>, ReservationError> {
    persistence.list_tours().map_err(translate_persistence_error)
}

/// Adds an active pricing rule to a departure.
///
/// # Errors
///
/// Returns `ReservationError::InvalidInput` if the payload is malformed,
/// `ReservationError::TourNotFound` if the departure does not exist.
pub fn create_pricing_rule(
    persistence: &Persistence,
    tour_id: i64,
    payload: &RulePayload,
) -> Result<PricingRule, ReservationError> {
    payload.validate().map_err(translate_domain_error)?;

    let rule: PricingRule = persistence
        .create_pricing_rule(tour_id, payload)
        .map_err(|e| {
            let err: ReservationError = translate_persistence_error(e);
            log_failure("create_pricing_rule", &err);
            err
        })?;

    info!(
        rule_id = rule.rule_id,
        tour_id,
        kind = %rule.kind(),
        "Pricing rule added"
    );
    Ok(rule)
}

/// Replaces a rule's payload. The rule's version goes up by one; bookings
/// priced earlier keep the version they were priced with.
///
/// # Errors
///
/// Returns `ReservationError::InvalidInput` if the payload is malformed or
/// changes the rule's kind, `ReservationError::ResourceNotFound` if the rule
/// does not exist.
pub fn update_pricing_rule(
    persistence: &Persistence,
    rule_id: i64,
    payload: &RulePayload,
) -> Result<PricingRule, ReservationError> {
    payload.validate().map_err(translate_domain_error)?;

    let rule: PricingRule = persistence
        .update_pricing_rule_payload(rule_id, payload)
        .map_err(|e| {
            let err: ReservationError = translate_persistence_error(e);
            log_failure("update_pricing_rule", &err);
            err
        })?;

    info!(rule_id, version = rule.version, "Pricing rule updated");
    Ok(rule)
}

/// Activates or deactivates a rule.
///
/// # Errors
///
/// Returns `ReservationError::ResourceNotFound` if the rule does not exist.
pub fn set_pricing_rule_active(
    persistence: &Persistence,
    rule_id: i64,
    active: bool,
) -> Result<PricingRule, ReservationError> {
    let rule: PricingRule = persistence
        .set_pricing_rule_active(rule_id, active)
        .map_err(translate_persistence_error)?;
    info!(rule_id, active, "Pricing rule toggled");
    Ok(rule)
}

/// Lists a departure's pricing rules.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list_pricing_rules(
    persistence: &Persistence,
    tour_id: i64,
    active_only: bool,
) -> Result<Vec<PricingRule>, ReservationError> {
    persistence
        .list_pricing_rules(tour_id, active_only)
        .map_err(translate_persistence_error)
}
