// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Departure queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use rust_decimal::Decimal;
use time::Date;
use tourbook_domain::{DateRange, Tour, parse_amount, parse_date};

use crate::data_models::count_from_i32;
use crate::diesel_schema::tours;
use crate::error::PersistenceError;

/// Diesel Queryable struct for departure rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = tours)]
pub struct TourRow {
    pub tour_id: i64,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub base_price: String,
    pub max_group_size: i32,
    pub current_bookings: i32,
}

impl TourRow {
    /// Rebuilds the domain departure from its row.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored date, amount or counter is malformed.
    pub fn into_tour(self) -> Result<Tour, PersistenceError> {
        let start: Date = parse_date(&self.start_date)?;
        let end: Date = parse_date(&self.end_date)?;
        let base_price: Decimal = parse_amount(&self.base_price)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

        Ok(Tour {
            tour_id: self.tour_id,
            name: self.name,
            dates: DateRange::new(start, end)?,
            base_price,
            max_group_size: count_from_i32(self.max_group_size, "max_group_size")?,
            current_bookings: count_from_i32(self.current_bookings, "current_bookings")?,
        })
    }
}

/// Retrieves a departure by ID.
///
/// # Errors
///
/// Returns `PersistenceError::TourNotFound` if no such departure exists.
pub fn get_tour(conn: &mut SqliteConnection, tour_id: i64) -> Result<Tour, PersistenceError> {
    let row: Option<TourRow> = tours::table
        .filter(tours::tour_id.eq(tour_id))
        .select(TourRow::as_select())
        .first::<TourRow>(conn)
        .optional()?;

    row.ok_or(PersistenceError::TourNotFound(tour_id))?
        .into_tour()
}

/// Lists every departure ordered by start date.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_tours(conn: &mut SqliteConnection) -> Result<Vec<Tour>, PersistenceError> {
    tours::table
        .order((tours::start_date.asc(), tours::tour_id.asc()))
        .select(TourRow::as_select())
        .load::<TourRow>(conn)?
        .into_iter()
        .map(TourRow::into_tour)
        .collect()
}
