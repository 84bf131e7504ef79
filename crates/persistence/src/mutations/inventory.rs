// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Seat counter updates.
//!
//! The counter is never read, modified in memory and written back. Both
//! directions are single conditional `UPDATE` statements, and the number of
//! matched rows decides the outcome.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tourbook_domain::Tour;
use tracing::debug;

use crate::data_models::count_to_i32;
use crate::diesel_schema::tours;
use crate::error::PersistenceError;
use crate::queries::tours::get_tour;

/// Takes `seats` from a departure if they fit under its ceiling.
///
/// # Errors
///
/// Returns `PersistenceError::CapacityExceeded` if the seats do not fit,
/// `PersistenceError::TourNotFound` if the departure does not exist.
pub fn take_seats(
    conn: &mut SqliteConnection,
    tour_id: i64,
    seats: u32,
) -> Result<(), PersistenceError> {
    let delta: i32 = count_to_i32(seats, "seats")?;

    let updated: usize = diesel::update(
        tours::table
            .filter(tours::tour_id.eq(tour_id))
            .filter((tours::current_bookings + delta).le(tours::max_group_size)),
    )
    .set(tours::current_bookings.eq(tours::current_bookings + delta))
    .execute(conn)?;

    if updated == 0 {
        let tour: Tour = get_tour(conn, tour_id)?;
        debug!(
            tour_id,
            requested = seats,
            remaining = tour.remaining_capacity(),
            "Seat reservation rejected"
        );
        return Err(PersistenceError::CapacityExceeded {
            tour_id,
            requested: seats,
            remaining: tour.remaining_capacity(),
        });
    }

    Ok(())
}

/// Returns `seats` to a departure.
///
/// # Errors
///
/// Returns `PersistenceError::InventoryUnderflow` if the counter holds fewer
/// than `seats`, `PersistenceError::TourNotFound` if the departure does not
/// exist.
pub fn release_seats(
    conn: &mut SqliteConnection,
    tour_id: i64,
    seats: u32,
) -> Result<(), PersistenceError> {
    if seats == 0 {
        return Ok(());
    }
    let delta: i32 = count_to_i32(seats, "seats")?;

    let updated: usize = diesel::update(
        tours::table
            .filter(tours::tour_id.eq(tour_id))
            .filter(tours::current_bookings.ge(delta)),
    )
    .set(tours::current_bookings.eq(tours::current_bookings - delta))
    .execute(conn)?;

    if updated == 0 {
        get_tour(conn, tour_id)?;
        return Err(PersistenceError::InventoryUnderflow { tour_id, seats });
    }

    Ok(())
}
