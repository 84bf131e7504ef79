// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pricing rules attached to a tour departure.
//!
//! A rule is one of four kinds, each with its own payload shape. Rules are
//! versioned: every payload edit bumps `version`, and bookings record the
//! `(rule_id, version)` pair of every adjustment they were priced with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

use crate::error::DomainError;
use crate::money::MAX_AMOUNT;

/// Largest seasonal multiplier a rule may carry.
pub const MAX_PRICE_MULTIPLIER: Decimal = Decimal::ONE_HUNDRED;

/// How a discount or charge value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `value` is a percentage (10 = 10%).
    Percentage,
    /// `value` is an absolute amount.
    Fixed,
}

impl DiscountType {
    /// Resolves the amount this value represents against `reference`.
    ///
    /// Returns `None` if the percentage overflows.
    #[must_use]
    pub fn amount_of(self, value: Decimal, reference: Decimal) -> Option<Decimal> {
        match self {
            Self::Percentage => reference
                .checked_mul(value)?
                .checked_div(Decimal::ONE_HUNDRED),
            Self::Fixed => Some(value),
        }
    }
}

/// One bracket of an age-bracket rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBracket {
    /// Bracket name, matched case-insensitively against the guest type.
    pub name: String,
    /// Lowest age included, open when absent.
    #[serde(default)]
    pub min_age: Option<u32>,
    /// Highest age included, open when absent.
    #[serde(default)]
    pub max_age: Option<u32>,
    /// How `discount_value` is interpreted.
    pub discount_type: DiscountType,
    /// Discount taken off the base price.
    pub discount_value: Decimal,
    /// Whether guests in this bracket must show identity documents.
    #[serde(default)]
    pub required_id: bool,
}

impl AgeBracket {
    /// Returns true if the bracket applies to a guest of this age and type.
    #[must_use]
    pub fn matches(&self, age: u32, guest_type: &str) -> bool {
        self.min_age.is_none_or(|min| age >= min)
            && self.max_age.is_none_or(|max| age <= max)
            && self.name.eq_ignore_ascii_case(guest_type.trim())
    }
}

/// One window of a seasonal rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWindow {
    /// Season name, used as the ledger entry name.
    pub name: String,
    /// First day of the season (inclusive).
    pub start_date: Date,
    /// Last day of the season (inclusive).
    pub end_date: Date,
    /// Multiplier applied to the running total (1.2 = +20%).
    pub price_multiplier: Decimal,
}

impl SeasonWindow {
    /// Returns true if `date` falls inside the season.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// A time-boxed promotion.
///
/// `days_before_departure` makes it an early-bird offer and
/// `days_before_departure_max` a last-minute offer. Both may be set; the two
/// halves are evaluated independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// Promotion name.
    pub name: String,
    /// First day the promotion can be used, open when absent.
    #[serde(default)]
    pub start_date: Option<Date>,
    /// Last day the promotion can be used, open when absent.
    #[serde(default)]
    pub end_date: Option<Date>,
    /// Early-bird threshold in days.
    #[serde(default)]
    pub days_before_departure: Option<i64>,
    /// Last-minute threshold in days.
    #[serde(default)]
    pub days_before_departure_max: Option<i64>,
    /// How `discount_value` is interpreted.
    pub discount_type: DiscountType,
    /// Discount taken off the running total.
    pub discount_value: Decimal,
}

impl Promotion {
    /// Returns true if the promotion can be used on `today`.
    #[must_use]
    pub fn is_available_on(&self, today: Date) -> bool {
        self.start_date.is_none_or(|start| start <= today)
            && self.end_date.is_none_or(|end| today <= end)
    }
}

/// What a surcharge is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeType {
    /// Charged per requested single room.
    SingleRoom,
    /// Charged when the booking date falls on a listed weekday.
    Weekend,
    /// Charged when the booking date is a listed holiday.
    Holiday,
    /// Never applied automatically.
    Other,
}

/// A surcharge rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surcharge {
    /// Surcharge name.
    pub name: String,
    /// Trigger for the surcharge.
    pub applicable_type: SurchargeType,
    /// Holiday dates.
    #[serde(default)]
    pub dates: Vec<Date>,
    /// Weekdays, 0 = Sunday through 6 = Saturday.
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    /// How `charge_value` is interpreted. Percentages are of the base price.
    pub charge_type: DiscountType,
    /// Charge added to the running total.
    pub charge_value: Decimal,
}

/// Kind discriminator of a pricing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Per-guest age discounts.
    AgeBracket,
    /// Date-window multipliers.
    Seasonal,
    /// Early-bird and last-minute discounts.
    Promotion,
    /// Additional charges.
    Surcharge,
}

impl RuleKind {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AgeBracket => "age_bracket",
            Self::Seasonal => "seasonal",
            Self::Promotion => "promotion",
            Self::Surcharge => "surcharge",
        }
    }
}

impl FromStr for RuleKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "age_bracket" => Ok(Self::AgeBracket),
            "seasonal" => Ok(Self::Seasonal),
            "promotion" => Ok(Self::Promotion),
            "surcharge" => Ok(Self::Surcharge),
            _ => Err(DomainError::InvalidRuleKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Type-specific rule payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum RulePayload {
    /// Ordered list of brackets; the first match per guest wins.
    AgeBracket(Vec<AgeBracket>),
    /// Ordered list of seasons; the first window containing the booking date wins.
    Seasonal(Vec<SeasonWindow>),
    /// A single promotion.
    Promotion(Promotion),
    /// A single surcharge.
    Surcharge(Surcharge),
}

impl RulePayload {
    /// The kind discriminator of this payload.
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::AgeBracket(_) => RuleKind::AgeBracket,
            Self::Seasonal(_) => RuleKind::Seasonal,
            Self::Promotion(_) => RuleKind::Promotion,
            Self::Surcharge(_) => RuleKind::Surcharge,
        }
    }

    /// Validates the payload.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRulePayload` describing the first problem found.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::AgeBracket(brackets) => {
                if brackets.is_empty() {
                    return Err(invalid("age bracket rule has no brackets"));
                }
                for bracket in brackets {
                    require_name(&bracket.name)?;
                    if let Some((min, max)) = bracket
                        .min_age
                        .zip(bracket.max_age)
                        .filter(|(min, max)| min > max)
                    {
                        return Err(invalid(&format!(
                            "bracket '{}' has min_age {min} above max_age {max}",
                            bracket.name
                        )));
                    }
                    require_value(bracket.discount_type, bracket.discount_value, &bracket.name)?;
                }
            }
            Self::Seasonal(windows) => {
                if windows.is_empty() {
                    return Err(invalid("seasonal rule has no windows"));
                }
                for window in windows {
                    require_name(&window.name)?;
                    if window.end_date < window.start_date {
                        return Err(invalid(&format!(
                            "season '{}' ends before it starts",
                            window.name
                        )));
                    }
                    if window.price_multiplier <= Decimal::ZERO {
                        return Err(invalid(&format!(
                            "season '{}' multiplier must be positive",
                            window.name
                        )));
                    }
                    if window.price_multiplier > MAX_PRICE_MULTIPLIER {
                        return Err(invalid(&format!(
                            "season '{}' multiplier exceeds {MAX_PRICE_MULTIPLIER}",
                            window.name
                        )));
                    }
                }
            }
            Self::Promotion(promotion) => {
                require_name(&promotion.name)?;
                if promotion
                    .start_date
                    .zip(promotion.end_date)
                    .is_some_and(|(start, end)| end < start)
                {
                    return Err(invalid(&format!(
                        "promotion '{}' ends before it starts",
                        promotion.name
                    )));
                }
                if promotion.days_before_departure.is_none()
                    && promotion.days_before_departure_max.is_none()
                {
                    return Err(invalid(&format!(
                        "promotion '{}' needs days_before_departure or days_before_departure_max",
                        promotion.name
                    )));
                }
                require_value(
                    promotion.discount_type,
                    promotion.discount_value,
                    &promotion.name,
                )?;
            }
            Self::Surcharge(surcharge) => {
                require_name(&surcharge.name)?;
                if let Some(day) = surcharge.days_of_week.iter().find(|day| **day > 6) {
                    return Err(invalid(&format!(
                        "surcharge '{}' lists weekday {day}, expected 0..=6",
                        surcharge.name
                    )));
                }
                if surcharge.charge_value.is_sign_negative() {
                    return Err(invalid(&format!(
                        "surcharge '{}' charge must not be negative",
                        surcharge.name
                    )));
                }
                if surcharge.charge_value > MAX_AMOUNT {
                    return Err(invalid(&format!(
                        "surcharge '{}' charge exceeds {MAX_AMOUNT}",
                        surcharge.name
                    )));
                }
            }
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> DomainError {
    DomainError::InvalidRulePayload {
        reason: reason.to_string(),
    }
}

fn require_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(invalid("name must not be blank"));
    }
    Ok(())
}

fn require_value(kind: DiscountType, value: Decimal, name: &str) -> Result<(), DomainError> {
    if value.is_sign_negative() {
        return Err(invalid(&format!("'{name}' discount must not be negative")));
    }
    if kind == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
        return Err(invalid(&format!("'{name}' discount exceeds 100%")));
    }
    if value > MAX_AMOUNT {
        return Err(invalid(&format!("'{name}' discount exceeds {MAX_AMOUNT}")));
    }
    Ok(())
}

/// A stored pricing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingRule {
    /// Rule identifier.
    pub rule_id: i64,
    /// Departure the rule belongs to.
    pub tour_id: i64,
    /// Inactive rules never participate in pricing.
    pub is_active: bool,
    /// Bumped on every payload edit.
    pub version: u32,
    /// Type-specific payload.
    pub payload: RulePayload,
}

impl PricingRule {
    /// The kind discriminator of this rule.
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        self.payload.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn bracket(name: &str, min: Option<u32>, max: Option<u32>) -> AgeBracket {
        AgeBracket {
            name: name.to_string(),
            min_age: min,
            max_age: max,
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from(50),
            required_id: false,
        }
    }

    #[test]
    fn test_bracket_matching_uses_optional_bounds_and_type() {
        let child: AgeBracket = bracket("Child", Some(2), Some(11));

        assert!(child.matches(2, "child"));
        assert!(child.matches(11, "CHILD"));
        assert!(!child.matches(12, "child"));
        assert!(!child.matches(1, "child"));
        assert!(!child.matches(5, "adult"));

        let senior: AgeBracket = bracket("senior", Some(65), None);
        assert!(senior.matches(150, "senior"));
    }

    #[test]
    fn test_promotion_window_is_open_when_unset() {
        let mut promotion: Promotion = Promotion {
            name: String::from("early bird"),
            start_date: None,
            end_date: Some(date!(2026 - 06 - 30)),
            days_before_departure: Some(30),
            days_before_departure_max: None,
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::TEN,
        };

        assert!(promotion.is_available_on(date!(2020 - 01 - 01)));
        assert!(promotion.is_available_on(date!(2026 - 06 - 30)));
        assert!(!promotion.is_available_on(date!(2026 - 07 - 01)));

        promotion.end_date = None;
        assert!(promotion.is_available_on(date!(2099 - 01 - 01)));
    }

    #[test]
    fn test_payload_validation() {
        assert!(RulePayload::AgeBracket(vec![]).validate().is_err());
        assert!(
            RulePayload::AgeBracket(vec![bracket("child", Some(12), Some(2))])
                .validate()
                .is_err()
        );
        assert!(
            RulePayload::AgeBracket(vec![bracket("child", Some(2), Some(12))])
                .validate()
                .is_ok()
        );

        let surcharge: Surcharge = Surcharge {
            name: String::from("weekend"),
            applicable_type: SurchargeType::Weekend,
            dates: vec![],
            days_of_week: vec![0, 7],
            charge_type: DiscountType::Fixed,
            charge_value: Decimal::from(100),
        };
        assert!(RulePayload::Surcharge(surcharge).validate().is_err());
    }

    #[test]
    fn test_payload_amounts_are_bounded() {
        let season = |multiplier: Decimal| {
            RulePayload::Seasonal(vec![SeasonWindow {
                name: String::from("peak"),
                start_date: date!(2026 - 06 - 01),
                end_date: date!(2026 - 08 - 31),
                price_multiplier: multiplier,
            }])
        };
        assert!(season(MAX_PRICE_MULTIPLIER).validate().is_ok());
        assert!(season(MAX_PRICE_MULTIPLIER + Decimal::ONE).validate().is_err());

        let mut fixed: AgeBracket = bracket("adult", None, None);
        fixed.discount_type = DiscountType::Fixed;
        fixed.discount_value = MAX_AMOUNT;
        assert!(
            RulePayload::AgeBracket(vec![fixed.clone()])
                .validate()
                .is_ok()
        );
        fixed.discount_value = MAX_AMOUNT + Decimal::ONE;
        assert!(RulePayload::AgeBracket(vec![fixed]).validate().is_err());

        let surcharge: Surcharge = Surcharge {
            name: String::from("single room"),
            applicable_type: SurchargeType::SingleRoom,
            dates: vec![],
            days_of_week: vec![],
            charge_type: DiscountType::Fixed,
            charge_value: MAX_AMOUNT + Decimal::ONE,
        };
        assert!(RulePayload::Surcharge(surcharge).validate().is_err());
    }

    #[test]
    fn test_payload_json_shape() {
        let payload: RulePayload = RulePayload::Seasonal(vec![SeasonWindow {
            name: String::from("high season"),
            start_date: date!(2026 - 06 - 01),
            end_date: date!(2026 - 08 - 31),
            price_multiplier: Decimal::new(12, 1),
        }]);

        let json: serde_json::Value =
            serde_json::to_value(&payload).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(json["kind"], "seasonal");
        assert_eq!(json["payload"][0]["name"], "high season");

        let back: RulePayload = serde_json::from_value(json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(back, payload);
        assert_eq!(back.kind(), RuleKind::Seasonal);
    }

    #[test]
    fn test_rule_kind_parsing() {
        assert_eq!("promotion".parse::<RuleKind>(), Ok(RuleKind::Promotion));
        assert!("coupon".parse::<RuleKind>().is_err());
    }
}
