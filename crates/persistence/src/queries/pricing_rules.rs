// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pricing rule queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tourbook_domain::{PricingRule, RuleKind, RulePayload};

use crate::data_models::count_from_i32;
use crate::diesel_schema::pricing_rules;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = pricing_rules)]
struct PricingRuleRow {
    rule_id: i64,
    tour_id: i64,
    kind: String,
    is_active: i32,
    version: i32,
    payload_json: String,
}

impl PricingRuleRow {
    fn into_rule(self) -> Result<PricingRule, PersistenceError> {
        let kind: RuleKind = self.kind.parse()?;
        let payload: RulePayload = serde_json::from_str(&self.payload_json)?;
        if payload.kind() != kind {
            return Err(PersistenceError::ReconstructionError(format!(
                "rule {} is stored as '{kind}' but carries a '{}' payload",
                self.rule_id,
                payload.kind()
            )));
        }

        Ok(PricingRule {
            rule_id: self.rule_id,
            tour_id: self.tour_id,
            is_active: self.is_active != 0,
            version: count_from_i32(self.version, "version")?,
            payload,
        })
    }
}

/// Retrieves a pricing rule by ID.
///
/// # Errors
///
/// Returns `PersistenceError::PricingRuleNotFound` if no such rule exists.
pub fn get_pricing_rule(
    conn: &mut SqliteConnection,
    rule_id: i64,
) -> Result<PricingRule, PersistenceError> {
    let row: Option<PricingRuleRow> = pricing_rules::table
        .filter(pricing_rules::rule_id.eq(rule_id))
        .select(PricingRuleRow::as_select())
        .first::<PricingRuleRow>(conn)
        .optional()?;

    row.ok_or(PersistenceError::PricingRuleNotFound(rule_id))?
        .into_rule()
}

/// Lists the pricing rules of a departure in one query, in creation order.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `tour_id` - The departure
/// * `active_only` - Skip deactivated rules
///
/// # Errors
///
/// Returns an error if the query fails or a stored payload cannot be decoded.
pub fn list_pricing_rules(
    conn: &mut SqliteConnection,
    tour_id: i64,
    active_only: bool,
) -> Result<Vec<PricingRule>, PersistenceError> {
    let query = pricing_rules::table
        .filter(pricing_rules::tour_id.eq(tour_id))
        .select(PricingRuleRow::as_select())
        .order(pricing_rules::rule_id.asc());
    let rows: Vec<PricingRuleRow> = if active_only {
        query
            .filter(pricing_rules::is_active.eq(1))
            .load::<PricingRuleRow>(conn)?
    } else {
        query.load::<PricingRuleRow>(conn)?
    };

    rows.into_iter().map(PricingRuleRow::into_rule).collect()
}
