// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tourbook_domain::{DomainError, PaymentStatus};

/// Errors that can occur while admitting or transitioning a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The departure's last day is in the past.
    TourEnded {
        /// The departure.
        tour_id: i64,
    },
    /// The user already holds the maximum number of pending reservations.
    ThrottleExceeded {
        /// The booking user.
        user_id: String,
        /// Pending reservations currently held.
        pending: usize,
        /// Configured limit.
        limit: usize,
    },
    /// The user already holds an active booking on this departure.
    DuplicateBooking {
        /// The booking user.
        user_id: String,
        /// The departure.
        tour_id: i64,
    },
    /// The user holds an active booking on a departure with overlapping dates.
    OverlappingDates {
        /// The conflicting booking.
        existing_booking_id: i64,
        /// The conflicting departure.
        existing_tour_id: i64,
    },
    /// The booking is already cancelled.
    AlreadyCancelled {
        /// The booking.
        booking_id: i64,
    },
    /// The booking's status does not allow the requested transition.
    InvalidTransition {
        /// The booking.
        booking_id: i64,
        /// Current status.
        from: PaymentStatus,
        /// Requested status.
        to: PaymentStatus,
    },
    /// The actor may not act on this booking.
    Unauthorized {
        /// The acting principal.
        actor_id: String,
        /// The booking.
        booking_id: i64,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::TourEnded { tour_id } => write!(f, "Tour {tour_id} has already ended"),
            Self::ThrottleExceeded {
                user_id,
                pending,
                limit,
            } => write!(
                f,
                "User '{user_id}' has {pending} pending reservations (limit {limit})"
            ),
            Self::DuplicateBooking { user_id, tour_id } => write!(
                f,
                "User '{user_id}' already has an active booking for tour {tour_id}"
            ),
            Self::OverlappingDates {
                existing_booking_id,
                existing_tour_id,
            } => write!(
                f,
                "Dates overlap booking {existing_booking_id} on tour {existing_tour_id}"
            ),
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
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
