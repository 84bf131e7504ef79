// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tourbook::CoreError;
use tourbook_domain::{DomainError, PaymentStatus, RuleKind};

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// No pooled connection could be obtained.
    PoolError(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// A stored row could not be turned back into a domain value.
    ReconstructionError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The requested departure does not exist.
    TourNotFound(i64),
    /// The requested booking does not exist.
    BookingNotFound(i64),
    /// The requested pricing rule does not exist.
    PricingRuleNotFound(i64),
    /// The conditional seat update matched no row.
    CapacityExceeded {
        /// The departure.
        tour_id: i64,
        /// Seats requested.
        requested: u32,
        /// Seats free when the update was attempted.
        remaining: u32,
    },
    /// The one-active-booking index rejected the insert.
    ActiveBookingExists {
        /// Booking user.
        user_id: String,
        /// The departure.
        tour_id: i64,
    },
    /// The compare-and-set status update matched no row.
    StatusConflict {
        /// The booking.
        booking_id: i64,
        /// Its status when re-read after the failed update.
        current: PaymentStatus,
    },
    /// Releasing seats would take the counter below zero.
    InventoryUnderflow {
        /// The departure.
        tour_id: i64,
        /// Seats that were to be released.
        seats: u32,
    },
    /// A payload edit would change the kind of a stored rule.
    RuleKindMismatch {
        /// The rule.
        rule_id: i64,
        /// Kind of the stored rule.
        stored: RuleKind,
        /// Kind of the submitted payload.
        submitted: RuleKind,
    },
    /// The decision made inside a transaction rejected the change.
    Rejected(CoreError),
    /// The requested resource was not found.
    NotFound(String),
    /// A general error occurred.
    Other(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::PoolError(msg) => write!(f, "Connection pool error: {msg}"),
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::ReconstructionError(msg) => write!(f, "Row reconstruction error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::TourNotFound(id) => write!(f, "Tour not found: {id}"),
            Self::BookingNotFound(id) => write!(f, "Booking not found: {id}"),
            Self::PricingRuleNotFound(id) => write!(f, "Pricing rule not found: {id}"),
            Self::CapacityExceeded {
                tour_id,
                requested,
                remaining,
            } => write!(
                f,
                "Tour {tour_id} cannot seat {requested} guests: {remaining} seats remaining"
            ),
            Self::ActiveBookingExists { user_id, tour_id } => write!(
                f,
                "User '{user_id}' already holds an active booking on tour {tour_id}"
            ),
            Self::StatusConflict {
                booking_id,
                current,
            } => write!(
                f,
                "Booking {booking_id} changed concurrently; status is now '{current}'"
            ),
            Self::InventoryUnderflow { tour_id, seats } => write!(
                f,
                "Releasing {seats} seats would take tour {tour_id} below zero"
            ),
            Self::RuleKindMismatch {
                rule_id,
                stored,
                submitted,
            } => write!(
                f,
                "Rule {rule_id} is a '{stored}' rule and cannot take a '{submitted}' payload"
            ),
            Self::Rejected(err) => write!(f, "{err}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for PersistenceError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::PoolError(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::ReconstructionError(err.to_string())
    }
}

impl From<CoreError> for PersistenceError {
    fn from(err: CoreError) -> Self {
        Self::Rejected(err)
    }
}
