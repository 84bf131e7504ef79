// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The guest list is empty, mismatched, or contains an unpriceable guest.
    InvalidGuests(String),
    /// A required contact field is blank.
    InvalidContact {
        /// The offending field.
        field: &'static str,
    },
    /// A required address field is blank.
    InvalidAddress {
        /// The offending field.
        field: &'static str,
    },
    /// Tour definition is inconsistent.
    InvalidTour(String),
    /// Payment status string is not recognized.
    InvalidPaymentStatus {
        /// The invalid status value.
        status: String,
    },
    /// Payment method string is not recognized.
    InvalidPaymentMethod {
        /// The invalid method value.
        method: String,
    },
    /// A payment status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was rejected.
        reason: String,
    },
    /// Pricing rule kind string is not recognized.
    InvalidRuleKind(String),
    /// Pricing rule payload is malformed.
    InvalidRulePayload {
        /// Description of the problem.
        reason: String,
    },
    /// Actor role string is not recognized.
    InvalidActorRole(String),
    /// Failed to parse a date.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// A pricing stage produced an amount outside the decimal range.
    PriceOverflow {
        /// The stage that overflowed.
        stage: &'static str,
    },
    /// Failed to parse a monetary amount.
    MoneyParseError {
        /// The invalid amount string.
        value: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGuests(msg) => write!(f, "Invalid guests: {msg}"),
            Self::InvalidContact { field } => {
                write!(f, "Invalid contact: '{field}' must not be blank")
            }
            Self::InvalidAddress { field } => {
                write!(f, "Invalid address: '{field}' must not be blank")
            }
            Self::InvalidTour(msg) => write!(f, "Invalid tour: {msg}"),
            Self::InvalidPaymentStatus { status } => {
                write!(f, "Invalid payment status: '{status}'")
            }
            Self::InvalidPaymentMethod { method } => {
                write!(f, "Invalid payment method: '{method}'")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition from '{from}' to '{to}': {reason}")
            }
            Self::InvalidRuleKind(kind) => write!(f, "Invalid pricing rule kind: '{kind}'"),
            Self::InvalidRulePayload { reason } => {
                write!(f, "Invalid pricing rule payload: {reason}")
            }
            Self::InvalidActorRole(role) => write!(f, "Invalid actor role: '{role}'"),
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::PriceOverflow { stage } => {
                write!(f, "Price is out of range during the {stage} stage")
            }
            Self::MoneyParseError { value, error } => {
                write!(f, "Failed to parse amount '{value}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
