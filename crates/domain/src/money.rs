// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Monetary amounts.
//!
//! Amounts are `rust_decimal::Decimal` everywhere and are persisted as text
//! so that no precision is lost through a floating point column.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::DomainError;

/// Largest base price, fixed discount or fixed charge the catalog accepts.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Errors produced when reading a stored or submitted amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The text is not a decimal number.
    #[error("'{value}' is not a decimal amount: {reason}")]
    Malformed {
        /// The offending text.
        value: String,
        /// Parser message.
        reason: String,
    },
    /// The amount is negative where only non-negative amounts are allowed.
    #[error("amount {0} must not be negative")]
    Negative(Decimal),
}

impl From<MoneyError> for DomainError {
    fn from(err: MoneyError) -> Self {
        let value: String = match &err {
            MoneyError::Malformed { value, .. } => value.clone(),
            MoneyError::Negative(amount) => amount.to_string(),
        };
        Self::MoneyParseError {
            value,
            error: err.to_string(),
        }
    }
}

/// Parses an amount from its text form.
///
/// # Errors
///
/// Returns an error if the text is not a decimal number.
pub fn parse_amount(value: &str) -> Result<Decimal, MoneyError> {
    Decimal::from_str(value.trim()).map_err(|e| MoneyError::Malformed {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parses an amount that must not be negative (prices, charges).
///
/// # Errors
///
/// Returns an error if the text is malformed or negative.
pub fn parse_non_negative_amount(value: &str) -> Result<Decimal, MoneyError> {
    let amount: Decimal = parse_amount(value)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative(amount));
    }
    Ok(amount)
}

/// Formats an amount for storage.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    amount.to_string()
}

/// Rounds a final total to cents, half away from zero. The result always
/// carries exactly two decimal places.
#[must_use]
pub fn round_total(amount: Decimal) -> Decimal {
    let mut rounded: Decimal =
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
