// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::str::FromStr;
use time::OffsetDateTime;
use tourbook_domain::{DomainError, PaymentStatus};

/// The kind of principal behind an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRole {
    /// A customer acting on their own bookings.
    Customer,
    /// Staff with authority over every booking.
    Admin,
    /// An automated process (payment notifier, expiry sweeper).
    System,
}

impl ActorRole {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::System => "system",
        }
    }
}

impl FromStr for ActorRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            "system" => Ok(Self::System),
            _ => Err(DomainError::InvalidActorRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The kind of principal.
    pub role: ActorRole,
}

impl Actor {
    /// Creates a new Actor.
    #[must_use]
    pub const fn new(id: String, role: ActorRole) -> Self {
        Self { id, role }
    }

    /// A customer identified by their user id.
    #[must_use]
    pub fn customer(user_id: &str) -> Self {
        Self::new(user_id.to_string(), ActorRole::Customer)
    }

    /// An administrator.
    #[must_use]
    pub fn admin(id: &str) -> Self {
        Self::new(id.to_string(), ActorRole::Admin)
    }

    /// An automated process.
    #[must_use]
    pub fn system(process: &str) -> Self {
        Self::new(process.to_string(), ActorRole::System)
    }

    /// Returns true if this actor may act on a booking owned by `owner_id`.
    ///
    /// Admins and system processes may act on any booking; customers only
    /// on their own.
    #[must_use]
    pub fn may_act_for(&self, owner_id: &str) -> bool {
        match self.role {
            ActorRole::Admin | ActorRole::System => true,
            ActorRole::Customer => self.id == owner_id,
        }
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID, sweep ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// The booking transition that was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// The booking was admitted.
    Created,
    /// A pending booking was settled successfully.
    Confirmed,
    /// The booking was cancelled by a customer or an admin.
    Cancelled,
    /// The payment notifier reported a failed settlement.
    PaymentFailed,
    /// The sweeper expired an abandoned reservation.
    Expired,
}

impl Action {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
            Self::PaymentFailed => "PaymentFailed",
            Self::Expired => "Expired",
        }
    }

    /// Returns true if this transition returns seats to the departure.
    #[must_use]
    pub const fn releases_seats(&self) -> bool {
        matches!(self, Self::Cancelled | Self::PaymentFailed | Self::Expired)
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Self::Created),
            "Confirmed" => Ok(Self::Confirmed),
            "Cancelled" => Ok(Self::Cancelled),
            "PaymentFailed" => Ok(Self::PaymentFailed),
            "Expired" => Ok(Self::Expired),
            _ => Err(format!("unknown audit action '{s}'")),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable audit event representing a booking state transition.
///
/// Every successful state change produces exactly one audit event, written
/// in the same transaction as the change it records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The persisted event ID, if this event has been persisted.
    pub event_id: Option<i64>,
    /// The booking this event belongs to. `None` until the booking row exists.
    pub booking_id: Option<i64>,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The transition that was performed.
    pub action: Action,
    /// Status before the transition. `None` for creation.
    pub from_status: Option<PaymentStatus>,
    /// Status after the transition.
    pub to_status: PaymentStatus,
    /// When the transition happened.
    pub occurred_at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates a new, unpersisted `AuditEvent`.
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        from_status: Option<PaymentStatus>,
        to_status: PaymentStatus,
        occurred_at: OffsetDateTime,
    ) -> Self {
        Self {
            event_id: None,
            booking_id: None,
            actor,
            cause,
            action,
            from_status,
            to_status,
            occurred_at,
        }
    }

    /// Returns a copy of this event attached to `booking_id`.
    #[must_use]
    pub fn for_booking(mut self, booking_id: i64) -> Self {
        self.booking_id = Some(booking_id);
        self
    }
}
