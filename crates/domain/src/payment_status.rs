// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment status tracking and transition logic.
//!
//! A booking starts `Pending` or `Confirmed` depending on how it is paid.
//! `Failed` and `Cancelled` are terminal: no transition leaves them.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the guest intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid in cash when the tour starts. The seat is confirmed immediately.
    CashOnArrival,
    /// Settled later by an external payment gateway.
    Gateway,
}

impl PaymentMethod {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnArrival => "cash_on_arrival",
            Self::Gateway => "gateway",
        }
    }

    /// The status a freshly admitted booking starts in.
    #[must_use]
    pub const fn initial_status(&self) -> PaymentStatus {
        match self {
            Self::CashOnArrival => PaymentStatus::Confirmed,
            Self::Gateway => PaymentStatus::Pending,
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash_on_arrival" => Ok(Self::CashOnArrival),
            "gateway" => Ok(Self::Gateway),
            _ => Err(DomainError::InvalidPaymentMethod {
                method: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting external settlement. Seats are held.
    Pending,
    /// Paid or payable on arrival. Seats are held.
    Confirmed,
    /// Settlement failed.
    Failed,
    /// Cancelled by a user, an admin, the payment notifier or the sweeper.
    Cancelled,
}

impl PaymentStatus {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses that hold seats and count toward the one-active-booking rule.
    pub const ACTIVE: [Self; 2] = [Self::Pending, Self::Confirmed];

    /// Returns true if this status is terminal (cannot transition to another state).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }

    /// Returns true if the booking still holds seats.
    #[must_use]
    pub const fn holds_seats(&self) -> bool {
        !self.is_terminal()
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid: bool = match self {
            Self::Pending => matches!(
                new_status,
                Self::Confirmed | Self::Failed | Self::Cancelled
            ),
            Self::Confirmed => matches!(new_status, Self::Cancelled),
            Self::Failed | Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by payment lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidPaymentStatus {
                status: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome reported by the external payment notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// The gateway captured the payment.
    Success,
    /// The gateway rejected or abandoned the payment.
    Failed,
}

impl SettlementOutcome {
    /// The status a pending booking moves to for this outcome.
    ///
    /// A failed settlement cancels the booking so that its seats are released
    /// through the same path as any other cancellation.
    #[must_use]
    pub const fn target_status(&self) -> PaymentStatus {
        match self {
            Self::Success => PaymentStatus::Confirmed,
            Self::Failed => PaymentStatus::Cancelled,
        }
    }
}
