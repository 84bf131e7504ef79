// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use tourbook::CoreError;
use tourbook_domain::{DomainError, PaymentStatus};
use tourbook_persistence::PersistenceError;
use tracing::{debug, error, info};

/// How a caller should treat a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request was malformed. Retrying it unchanged cannot succeed.
    Validation,
    /// The addressed resource does not exist.
    NotFound,
    /// Another booking won a shared resource. A normal outcome.
    Contention,
    /// The request asked for something that already happened.
    Benign,
    /// The departure is in the past.
    TourEnded,
    /// The actor may not perform the operation.
    Unauthorized,
    /// The booking's status does not allow the operation.
    Conflict,
    /// Storage failed. Nothing was written; safe to retry.
    Internal,
}

/// API-level errors.
///
/// These are distinct from domain, core and persistence errors and represent
/// the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// The user already holds an active booking on the departure.
    DuplicateBooking {
        /// The booking user.
        user_id: String,
        /// The departure.
        tour_id: i64,
    },
    /// Not enough seats are left on the departure.
    CapacityExceeded {
        /// The departure.
        tour_id: i64,
        /// Seats requested.
        requested: u32,
        /// Seats left when the request was refused.
        remaining: u32,
    },
    /// The user holds an active booking on a departure with overlapping dates.
    OverlappingDates {
        /// The conflicting booking.
        existing_booking_id: i64,
    },
    /// A required address field is blank.
    InvalidAddress {
        /// The offending field.
        field: String,
    },
    /// A required contact field is blank.
    InvalidContact {
        /// The offending field.
        field: String,
    },
    /// The guest list is malformed or a guest cannot be priced.
    InvalidGuests {
        /// A human-readable description of the problem.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The departure has already ended.
    TourEnded {
        /// The departure.
        tour_id: i64,
    },
    /// The departure does not exist.
    TourNotFound {
        /// The departure.
        tour_id: i64,
    },
    /// The user holds too many pending reservations.
    ThrottleExceeded {
        /// The booking user.
        user_id: String,
        /// Configured limit.
        limit: usize,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The booking is already cancelled.
    AlreadyCancelled {
        /// The booking.
        booking_id: i64,
    },
    /// The booking's status does not allow the requested change.
    InvalidTransition {
        /// The booking.
        booking_id: i64,
        /// Current status.
        from: PaymentStatus,
        /// Requested status.
        to: PaymentStatus,
    },
    /// The actor may not act on the booking.
    Unauthorized {
        /// The acting principal.
        actor_id: String,
        /// The booking.
        booking_id: i64,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ReservationError {
    /// Classifies the error for callers deciding how to respond.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAddress { .. }
            | Self::InvalidContact { .. }
            | Self::InvalidGuests { .. }
            | Self::InvalidInput { .. } => ErrorKind::Validation,
            Self::TourNotFound { .. } | Self::ResourceNotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateBooking { .. }
            | Self::CapacityExceeded { .. }
            | Self::OverlappingDates { .. }
            | Self::ThrottleExceeded { .. } => ErrorKind::Contention,
            Self::AlreadyCancelled { .. } => ErrorKind::Benign,
            Self::TourEnded { .. } => ErrorKind::TourEnded,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidTransition { .. } => ErrorKind::Conflict,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateBooking { .. } => "duplicate_booking",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::OverlappingDates { .. } => "overlapping_dates",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::InvalidContact { .. } => "invalid_contact",
            Self::InvalidGuests { .. } => "invalid_guests",
            Self::InvalidInput { .. } => "invalid_input",
            Self::TourEnded { .. } => "tour_ended",
            Self::TourNotFound { .. } => "tour_not_found",
            Self::ThrottleExceeded { .. } => "throttle_exceeded",
            Self::ResourceNotFound { .. } => "not_found",
            Self::AlreadyCancelled { .. } => "already_cancelled",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Internal { .. } => "internal",
        }
    }
}

impl std::fmt::Display for ReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateBooking { user_id, tour_id } => write!(
                f,
                "User '{user_id}' already has an active booking for tour {tour_id}"
            ),
            Self::CapacityExceeded {
                tour_id,
                requested,
                remaining,
            } => write!(
                f,
                "Tour {tour_id} cannot seat {requested} guests ({remaining} seats left)"
            ),
            Self::OverlappingDates {
                existing_booking_id,
            } => write!(
                f,
                "Tour dates overlap existing booking {existing_booking_id}"
            ),
            Self::InvalidAddress { field } => {
                write!(f, "Invalid address: '{field}' must not be blank")
            }
            Self::InvalidContact { field } => {
                write!(f, "Invalid contact: '{field}' must not be blank")
            }
            Self::InvalidGuests { message } => write!(f, "Invalid guests: {message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::TourEnded { tour_id } => write!(f, "Tour {tour_id} has already ended"),
            Self::TourNotFound { tour_id } => write!(f, "Tour not found: {tour_id}"),
            Self::ThrottleExceeded { user_id, limit } => write!(
                f,
                "User '{user_id}' already holds {limit} pending reservations"
            ),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::AlreadyCancelled { booking_id } => {
                write!(f, "Booking {booking_id} is already cancelled")
            }
            Self::InvalidTransition {
                booking_id,
                from,
                to,
            } => write!(
                f,
                "Booking {booking_id} cannot move from '{from}' to '{to}'"
            ),
            Self::Unauthorized {
                actor_id,
                booking_id,
            } => write!(f, "Actor '{actor_id}' may not act on booking {booking_id}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ReservationError {}

/// Translates a domain error into an API error.
///
/// This function provides explicit mapping from domain errors to API errors,
/// ensuring domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ReservationError {
    match err {
        DomainError::InvalidGuests(message) => ReservationError::InvalidGuests { message },
        DomainError::InvalidContact { field } => ReservationError::InvalidContact {
            field: field.to_string(),
        },
        DomainError::InvalidAddress { field } => ReservationError::InvalidAddress {
            field: field.to_string(),
        },
        DomainError::InvalidTour(message) => ReservationError::InvalidInput {
            field: String::from("tour"),
            message,
        },
        DomainError::InvalidPaymentStatus { status } => ReservationError::InvalidInput {
            field: String::from("payment_status"),
            message: format!("unknown payment status '{status}'"),
        },
        DomainError::InvalidPaymentMethod { method } => ReservationError::InvalidInput {
            field: String::from("payment_method"),
            message: format!("unknown payment method '{method}'"),
        },
        DomainError::InvalidStatusTransition { from, to, reason } => {
            ReservationError::InvalidInput {
                field: String::from("payment_status"),
                message: format!("cannot move from '{from}' to '{to}': {reason}"),
            }
        }
        DomainError::InvalidRuleKind(kind) => ReservationError::InvalidInput {
            field: String::from("kind"),
            message: format!("unknown pricing rule kind '{kind}'"),
        },
        DomainError::InvalidRulePayload { reason } => ReservationError::InvalidInput {
            field: String::from("payload"),
            message: reason,
        },
        DomainError::InvalidActorRole(role) => ReservationError::InvalidInput {
            field: String::from("actor"),
            message: format!("unknown actor role '{role}'"),
        },
        DomainError::DateParseError { date_string, error } => ReservationError::InvalidInput {
            field: String::from("date"),
            message: format!("'{date_string}': {error}"),
        },
        DomainError::PriceOverflow { stage } => ReservationError::InvalidGuests {
            message: format!("the party cannot be priced: {stage} amount is out of range"),
        },
        DomainError::MoneyParseError { value, error } => ReservationError::InvalidInput {
            field: String::from("amount"),
            message: format!("'{value}': {error}"),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ReservationError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::TourEnded { tour_id } => ReservationError::TourEnded { tour_id },
        CoreError::ThrottleExceeded { user_id, limit, .. } => {
            ReservationError::ThrottleExceeded { user_id, limit }
        }
        CoreError::DuplicateBooking { user_id, tour_id } => {
            ReservationError::DuplicateBooking { user_id, tour_id }
        }
        CoreError::OverlappingDates {
            existing_booking_id,
            ..
        } => ReservationError::OverlappingDates {
            existing_booking_id,
        },
        CoreError::AlreadyCancelled { booking_id } => {
            ReservationError::AlreadyCancelled { booking_id }
        }
        CoreError::InvalidTransition {
            booking_id,
            from,
            to,
        } => ReservationError::InvalidTransition {
            booking_id,
            from,
            to,
        },
        CoreError::Unauthorized {
            actor_id,
            booking_id,
        } => ReservationError::Unauthorized {
            actor_id,
            booking_id,
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Refusals raised by the write transaction keep their meaning; everything
/// else is an infrastructure failure and becomes `Internal`.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ReservationError {
    match err {
        PersistenceError::Rejected(core_err) => translate_core_error(core_err),
        PersistenceError::TourNotFound(tour_id) => ReservationError::TourNotFound { tour_id },
        PersistenceError::BookingNotFound(booking_id) => ReservationError::ResourceNotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {booking_id} does not exist"),
        },
        PersistenceError::PricingRuleNotFound(rule_id) => ReservationError::ResourceNotFound {
            resource_type: String::from("Pricing rule"),
            message: format!("Pricing rule {rule_id} does not exist"),
        },
        PersistenceError::NotFound(message) => ReservationError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message,
        },
        PersistenceError::CapacityExceeded {
            tour_id,
            requested,
            remaining,
        } => ReservationError::CapacityExceeded {
            tour_id,
            requested,
            remaining,
        },
        PersistenceError::RuleKindMismatch {
            rule_id,
            stored,
            submitted,
        } => ReservationError::InvalidInput {
            field: String::from("kind"),
            message: format!(
                "rule {rule_id} is a '{stored}' rule and cannot take a '{submitted}' payload"
            ),
        },
        PersistenceError::ActiveBookingExists { user_id, tour_id } => {
            ReservationError::DuplicateBooking { user_id, tour_id }
        }
        PersistenceError::StatusConflict {
            booking_id,
            current: PaymentStatus::Cancelled,
        } => ReservationError::AlreadyCancelled { booking_id },
        PersistenceError::StatusConflict {
            booking_id,
            current,
        } => ReservationError::InvalidTransition {
            booking_id,
            from: current,
            to: PaymentStatus::Cancelled,
        },
        other => ReservationError::Internal {
            message: other.to_string(),
        },
    }
}

impl From<DomainError> for ReservationError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<CoreError> for ReservationError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}

impl From<PersistenceError> for ReservationError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

/// Logs a failed operation at the level its kind calls for.
///
/// Infrastructure failures are errors. Refusals are normal outcomes and stay
/// at `info`; malformed requests only show up at `debug`.
pub(crate) fn log_failure(operation: &'static str, err: &ReservationError) {
    match err.kind() {
        ErrorKind::Internal => error!(operation, error = %err, "Operation failed"),
        ErrorKind::Validation => {
            debug!(operation, code = err.code(), error = %err, "Request rejected");
        }
        ErrorKind::NotFound
        | ErrorKind::Contention
        | ErrorKind::Benign
        | ErrorKind::TourEnded
        | ErrorKind::Unauthorized
        | ErrorKind::Conflict => {
            info!(operation, code = err.code(), error = %err, "Request refused");
        }
    }
}
