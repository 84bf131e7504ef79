// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The pricing engine.
//!
//! `compute_price` is a pure function of its inputs. Stages run in a fixed
//! order:
//!
//! 1. every guest starts at the base price
//! 2. age brackets adjust individual guests
//! 3. guest prices are summed into the running total
//! 4. seasonal multipliers scale the running total
//! 5. promotions discount the running total
//! 6. surcharges are added
//! 7. the total is rounded to cents
//!
//! Every adjustment is recorded as a signed ledger entry. Discounts are
//! negative and surcharges positive, so the per-guest prices plus the
//! tour-level entries always sum to the unrounded total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::booking::{BookedGuest, Guest};
use crate::error::DomainError;
use crate::money::round_total;
use crate::pricing_rule::{
    AgeBracket, PricingRule, Promotion, RulePayload, SeasonWindow, Surcharge, SurchargeType,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// What produced a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentSource {
    /// Per-guest age bracket discount.
    AgeBracket,
    /// Seasonal multiplier.
    Seasonal,
    /// Promotion booked far enough ahead.
    EarlyBird,
    /// Promotion booked close to departure.
    LastMinute,
    /// Single room surcharge.
    SingleRoom,
    /// Weekday surcharge.
    Weekend,
    /// Holiday surcharge.
    Holiday,
}

/// One entry in a booking's discount or surcharge ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Rule that produced the entry.
    pub rule_id: i64,
    /// Rule version at pricing time.
    pub rule_version: u32,
    /// Bracket, season, promotion or surcharge name.
    pub name: String,
    /// Stage that produced the entry.
    pub source: AdjustmentSource,
    /// Signed amount: negative for discounts, positive for surcharges.
    pub amount: Decimal,
    /// Guest the entry applies to, for per-guest entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_index: Option<usize>,
}

impl Adjustment {
    /// Returns true if the entry lowers the price.
    #[must_use]
    pub fn is_discount(&self) -> bool {
        self.amount.is_sign_negative()
    }
}

/// Inputs to pricing that are not rules or guests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingContext {
    /// The date the booking is priced for. Drives seasons, surcharges and
    /// the days-to-departure count.
    pub booking_date: OffsetDateTime,
    /// Today's date, used for promotion availability windows.
    pub today: Date,
    /// First day of the departure.
    pub departure_start: Date,
    /// Requested single rooms.
    pub single_room_count: u32,
}

impl PricingContext {
    /// Whole days from the booking date until departure, rounded up.
    ///
    /// Departure is taken as midnight UTC on its first day. The result is
    /// negative when the booking date is past departure.
    #[must_use]
    pub fn days_to_departure(&self) -> i64 {
        let departure: OffsetDateTime = self.departure_start.midnight().assume_utc();
        let gap: Duration = departure - self.booking_date;
        let seconds: i64 = gap.whole_seconds();
        let whole_days: i64 = seconds.div_euclid(SECONDS_PER_DAY);
        if seconds.rem_euclid(SECONDS_PER_DAY) == 0 {
            whole_days
        } else {
            whole_days + 1
        }
    }
}

/// The authoritative price of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Per-guest base price used.
    pub base_price: Decimal,
    /// Guests with their resolved prices, in request order.
    pub per_guest: Vec<BookedGuest>,
    /// Final total, rounded to cents.
    pub total_amount: Decimal,
    /// Discount ledger (negative amounts).
    pub applied_discounts: Vec<Adjustment>,
    /// Surcharge ledger (positive amounts).
    pub applied_surcharges: Vec<Adjustment>,
}

impl PriceBreakdown {
    /// Sum of the resolved per-guest prices.
    #[must_use]
    pub fn guest_subtotal(&self) -> Decimal {
        self.per_guest.iter().map(|guest| guest.price).sum()
    }

    /// Returns true if per-guest prices plus tour-level ledger entries equal
    /// the total.
    #[must_use]
    pub fn reconciles(&self) -> bool {
        let tour_level: Decimal = self
            .applied_discounts
            .iter()
            .chain(self.applied_surcharges.iter())
            .filter(|entry| entry.guest_index.is_none())
            .map(|entry| entry.amount)
            .sum();
        round_total(self.guest_subtotal() + tour_level) == self.total_amount
    }

    /// Returns true if any priced guest must show identity documents.
    #[must_use]
    pub fn requires_id(&self) -> bool {
        self.per_guest.iter().any(|guest| guest.requires_id)
    }
}

/// Prices a booking.
///
/// Only active rules participate. With no active rules the breakdown is
/// simply `base_price` per guest. A promotion never takes the running total
/// below zero; a larger fixed discount is capped at the running total.
///
/// # Errors
///
/// Returns `DomainError::PriceOverflow` if any stage leaves the decimal
/// range.
pub fn compute_price(
    base_price: Decimal,
    rules: &[PricingRule],
    guests: &[Guest],
    context: &PricingContext,
) -> Result<PriceBreakdown, DomainError> {
    let active: Vec<&PricingRule> = rules.iter().filter(|rule| rule.is_active).collect();
    let mut ledger: Vec<Adjustment> = Vec::new();

    let mut per_guest: Vec<BookedGuest> = guests
        .iter()
        .map(|guest| BookedGuest {
            full_name: guest.full_name.clone(),
            age: guest.age,
            guest_type: guest.guest_type.clone(),
            price: base_price,
            requires_id: false,
            discounts: Vec::new(),
        })
        .collect();

    for rule in &active {
        if let RulePayload::AgeBracket(brackets) = &rule.payload {
            apply_age_brackets(rule, brackets, base_price, &mut per_guest)?;
        }
    }

    let mut running: Decimal = per_guest.iter().try_fold(Decimal::ZERO, |sum, guest| {
        checked(sum.checked_add(guest.price), "guest subtotal")
    })?;

    for rule in &active {
        let RulePayload::Seasonal(windows) = &rule.payload else {
            continue;
        };
        if let Some(entry) = seasonal_adjustment(rule, windows, running, context)? {
            running = checked(running.checked_add(entry.amount), "seasonal")?;
            ledger.push(entry);
        }
    }

    for rule in &active {
        if let RulePayload::Promotion(promotion) = &rule.payload {
            ledger.extend(promotion_adjustments(rule, promotion, &mut running, context)?);
        }
    }

    for rule in &active {
        let RulePayload::Surcharge(surcharge) = &rule.payload else {
            continue;
        };
        if let Some(entry) = surcharge_adjustment(rule, surcharge, base_price, context)? {
            running = checked(running.checked_add(entry.amount), "surcharge")?;
            ledger.push(entry);
        }
    }

    let mut applied_discounts: Vec<Adjustment> = per_guest
        .iter()
        .flat_map(|guest| guest.discounts.iter().cloned())
        .collect();
    let mut applied_surcharges: Vec<Adjustment> = Vec::new();
    for entry in ledger {
        if entry.is_discount() {
            applied_discounts.push(entry);
        } else {
            applied_surcharges.push(entry);
        }
    }

    Ok(PriceBreakdown {
        base_price,
        per_guest,
        total_amount: round_total(running),
        applied_discounts,
        applied_surcharges,
    })
}

fn checked(value: Option<Decimal>, stage: &'static str) -> Result<Decimal, DomainError> {
    value.ok_or(DomainError::PriceOverflow { stage })
}

fn ledger_entry(
    rule: &PricingRule,
    name: &str,
    source: AdjustmentSource,
    amount: Decimal,
    guest_index: Option<usize>,
) -> Adjustment {
    Adjustment {
        rule_id: rule.rule_id,
        rule_version: rule.version,
        name: name.to_string(),
        source,
        amount,
        guest_index,
    }
}

fn apply_age_brackets(
    rule: &PricingRule,
    brackets: &[AgeBracket],
    base_price: Decimal,
    per_guest: &mut [BookedGuest],
) -> Result<(), DomainError> {
    for (index, guest) in per_guest.iter_mut().enumerate() {
        let Some(bracket) = brackets
            .iter()
            .find(|bracket| bracket.matches(guest.age, &guest.guest_type))
        else {
            continue;
        };

        let discount: Decimal = checked(
            bracket
                .discount_type
                .amount_of(bracket.discount_value, base_price),
            "age bracket",
        )?;
        guest.price = checked(guest.price.checked_sub(discount), "age bracket")?;
        guest.requires_id |= bracket.required_id;
        if !discount.is_zero() {
            guest.discounts.push(ledger_entry(
                rule,
                &bracket.name,
                AdjustmentSource::AgeBracket,
                -discount,
                Some(index),
            ));
        }
    }
    Ok(())
}

fn seasonal_adjustment(
    rule: &PricingRule,
    windows: &[SeasonWindow],
    running: Decimal,
    context: &PricingContext,
) -> Result<Option<Adjustment>, DomainError> {
    let booking_day: Date = context.booking_date.date();
    let Some(window) = windows.iter().find(|window| window.contains(booking_day)) else {
        return Ok(None);
    };
    let scaled: Decimal = checked(running.checked_mul(window.price_multiplier), "seasonal")?;
    let delta: Decimal = checked(scaled.checked_sub(running), "seasonal")?;
    if delta.is_zero() {
        return Ok(None);
    }
    Ok(Some(ledger_entry(
        rule,
        &window.name,
        AdjustmentSource::Seasonal,
        delta,
        None,
    )))
}

fn promotion_adjustments(
    rule: &PricingRule,
    promotion: &Promotion,
    running: &mut Decimal,
    context: &PricingContext,
) -> Result<Vec<Adjustment>, DomainError> {
    let mut entries: Vec<Adjustment> = Vec::new();
    if !promotion.is_available_on(context.today) {
        return Ok(entries);
    }

    let days: i64 = context.days_to_departure();
    let early_bird: bool = promotion
        .days_before_departure
        .is_some_and(|threshold| days >= threshold);
    let last_minute: bool = promotion
        .days_before_departure_max
        .is_some_and(|threshold| days <= threshold);

    // Early-bird and last-minute are evaluated independently and may both fire.
    for (fires, source) in [
        (early_bird, AdjustmentSource::EarlyBird),
        (last_minute, AdjustmentSource::LastMinute),
    ] {
        if !fires {
            continue;
        }
        let requested: Decimal = checked(
            promotion
                .discount_type
                .amount_of(promotion.discount_value, *running),
            "promotion",
        )?;
        let discount: Decimal = requested.min((*running).max(Decimal::ZERO));
        if discount.is_zero() {
            continue;
        }
        *running = checked(running.checked_sub(discount), "promotion")?;
        entries.push(ledger_entry(rule, &promotion.name, source, -discount, None));
    }
    Ok(entries)
}

fn surcharge_adjustment(
    rule: &PricingRule,
    surcharge: &Surcharge,
    base_price: Decimal,
    context: &PricingContext,
) -> Result<Option<Adjustment>, DomainError> {
    let unit: Decimal = checked(
        surcharge
            .charge_type
            .amount_of(surcharge.charge_value, base_price),
        "surcharge",
    )?;

    let (amount, source): (Decimal, AdjustmentSource) = match surcharge.applicable_type {
        SurchargeType::SingleRoom => (
            checked(
                unit.checked_mul(Decimal::from(context.single_room_count)),
                "surcharge",
            )?,
            AdjustmentSource::SingleRoom,
        ),
        SurchargeType::Weekend => {
            let weekday: u8 = context.booking_date.weekday().number_days_from_sunday();
            if !surcharge.days_of_week.contains(&weekday) {
                return Ok(None);
            }
            (unit, AdjustmentSource::Weekend)
        }
        SurchargeType::Holiday => {
            if !surcharge.dates.contains(&context.booking_date.date()) {
                return Ok(None);
            }
            (unit, AdjustmentSource::Holiday)
        }
        SurchargeType::Other => return Ok(None),
    };

    if amount.is_zero() {
        return Ok(None);
    }
    Ok(Some(ledger_entry(rule, &surcharge.name, source, amount, None)))
}
