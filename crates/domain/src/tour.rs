// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tour departures and their seat inventory.
//!
//! A departure owns two capacity numbers: the immutable ceiling
//! (`max_group_size`) and the live counter (`current_bookings`). The counter
//! is only ever changed in storage through conditional updates; the values
//! held here are a read snapshot.

use rust_decimal::Decimal;
use time::Date;
use time::macros::format_description;

use crate::error::DomainError;
use crate::money::MAX_AMOUNT;

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    /// First day (inclusive).
    pub start: Date,
    /// Last day (inclusive).
    pub end: Date,
}

impl DateRange {
    /// Creates a new date range.
    ///
    /// # Errors
    ///
    /// Returns an error if `end` precedes `start`.
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidTour(format!(
                "end date {end} precedes start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Returns true if the two ranges share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Returns true if `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A scheduled departure of a tour with its own dates and capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    /// Tour identifier.
    pub tour_id: i64,
    /// Display name, denormalized onto bookings.
    pub name: String,
    /// Departure date range.
    pub dates: DateRange,
    /// Per-guest base price before any rule is applied.
    pub base_price: Decimal,
    /// Capacity ceiling.
    pub max_group_size: u32,
    /// Seats currently held by non-terminal bookings.
    pub current_bookings: u32,
}

impl Tour {
    /// Seats still available according to this snapshot.
    #[must_use]
    pub const fn remaining_capacity(&self) -> u32 {
        self.max_group_size.saturating_sub(self.current_bookings)
    }

    /// Returns true once the last day of the departure is in the past.
    #[must_use]
    pub fn has_ended(&self, today: Date) -> bool {
        self.dates.end < today
    }
}

/// Input for registering a departure in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTour {
    /// Display name.
    pub name: String,
    /// Departure date range.
    pub dates: DateRange,
    /// Per-guest base price.
    pub base_price: Decimal,
    /// Capacity ceiling.
    pub max_group_size: u32,
}

impl NewTour {
    /// Validates the catalog input.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the capacity is zero, or the
    /// base price is negative or above `MAX_AMOUNT`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidTour(String::from(
                "name must not be blank",
            )));
        }
        if self.max_group_size == 0 {
            return Err(DomainError::InvalidTour(String::from(
                "max_group_size must be positive",
            )));
        }
        if self.base_price.is_sign_negative() {
            return Err(DomainError::InvalidTour(String::from(
                "base_price must not be negative",
            )));
        }
        if self.base_price > MAX_AMOUNT {
            return Err(DomainError::InvalidTour(format!(
                "base_price must not exceed {MAX_AMOUNT}"
            )));
        }
        Ok(())
    }
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns an error if the string is not a valid calendar date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, &format).map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}
