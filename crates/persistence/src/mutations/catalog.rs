// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog mutations: departures and their pricing rules.
//!
//! Rule edits never touch bookings. A booking keeps the ledger it was priced
//! with, and each ledger entry names the rule version that produced it.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tourbook_domain::{NewTour, PricingRule, RulePayload, format_amount, format_date};
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::count_to_i32;
use crate::diesel_schema::{pricing_rules, tours};
use crate::error::PersistenceError;
use crate::queries::pricing_rules::get_pricing_rule;
use crate::queries::tours::get_tour;

/// Inserts a departure with an empty seat counter.
///
/// # Returns
///
/// The tour ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert violates a constraint or fails.
pub fn insert_tour(conn: &mut SqliteConnection, tour: &NewTour) -> Result<i64, PersistenceError> {
    diesel::insert_into(tours::table)
        .values((
            tours::name.eq(&tour.name),
            tours::start_date.eq(format_date(tour.dates.start)),
            tours::end_date.eq(format_date(tour.dates.end)),
            tours::base_price.eq(format_amount(tour.base_price)),
            tours::max_group_size.eq(count_to_i32(tour.max_group_size, "max_group_size")?),
            tours::current_bookings.eq(0),
        ))
        .execute(conn)?;

    let tour_id: i64 = get_last_insert_rowid(conn)?;
    debug!(tour_id, name = %tour.name, "Inserted tour");
    Ok(tour_id)
}

/// Inserts an active pricing rule at version 1.
///
/// # Errors
///
/// Returns `PersistenceError::TourNotFound` if the departure does not exist,
/// or an error if serialization or the insert fails.
pub fn insert_pricing_rule(
    conn: &mut SqliteConnection,
    tour_id: i64,
    payload: &RulePayload,
) -> Result<PricingRule, PersistenceError> {
    get_tour(conn, tour_id)?;

    let payload_json: String = serde_json::to_string(payload)?;
    diesel::insert_into(pricing_rules::table)
        .values((
            pricing_rules::tour_id.eq(tour_id),
            pricing_rules::kind.eq(payload.kind().as_str()),
            pricing_rules::is_active.eq(1),
            pricing_rules::version.eq(1),
            pricing_rules::payload_json.eq(payload_json),
        ))
        .execute(conn)?;

    let rule_id: i64 = get_last_insert_rowid(conn)?;
    debug!(rule_id, tour_id, kind = %payload.kind(), "Inserted pricing rule");
    get_pricing_rule(conn, rule_id)
}

/// Replaces a rule's payload and bumps its version.
///
/// The payload must keep the rule's kind.
///
/// # Errors
///
/// Returns an error if the rule does not exist, the kind changes, or the
/// update fails.
pub fn update_pricing_rule_payload(
    conn: &mut SqliteConnection,
    rule_id: i64,
    payload: &RulePayload,
) -> Result<PricingRule, PersistenceError> {
    let existing: PricingRule = get_pricing_rule(conn, rule_id)?;
    if existing.kind() != payload.kind() {
        return Err(PersistenceError::RuleKindMismatch {
            rule_id,
            stored: existing.kind(),
            submitted: payload.kind(),
        });
    }

    let payload_json: String = serde_json::to_string(payload)?;
    diesel::update(pricing_rules::table.filter(pricing_rules::rule_id.eq(rule_id)))
        .set((
            pricing_rules::payload_json.eq(payload_json),
            pricing_rules::version.eq(pricing_rules::version + 1),
        ))
        .execute(conn)?;

    get_pricing_rule(conn, rule_id)
}

/// Activates or deactivates a rule.
///
/// # Errors
///
/// Returns `PersistenceError::PricingRuleNotFound` if the rule does not exist.
pub fn set_pricing_rule_active(
    conn: &mut SqliteConnection,
    rule_id: i64,
    active: bool,
) -> Result<PricingRule, PersistenceError> {
    let updated: usize =
        diesel::update(pricing_rules::table.filter(pricing_rules::rule_id.eq(rule_id)))
            .set(pricing_rules::is_active.eq(i32::from(active)))
            .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::PricingRuleNotFound(rule_id));
    }

    get_pricing_rule(conn, rule_id)
}
