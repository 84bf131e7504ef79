// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking queries.
//!
//! Bookings keep their guests and price ledgers as JSON columns; everything
//! the engine filters on (user, departure, status, method, creation time)
//! is a plain column.

use diesel::SqliteConnection;
use diesel::prelude::*;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tourbook_domain::{
    ActiveBookingSummary, Address, Adjustment, BookedGuest, Cancellation, Contact, DateRange,
    PaymentMethod, PaymentStatus, Reservation, parse_amount, parse_date,
};

use crate::data_models::{count_from_i32, from_unix_seconds};
use crate::diesel_schema::{bookings, tours};
use crate::error::PersistenceError;

/// Diesel Queryable struct for full booking rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = bookings)]
struct BookingRow {
    booking_id: i64,
    user_id: String,
    tour_id: i64,
    tour_name: String,
    contact_full_name: String,
    contact_phone: String,
    address_street: String,
    address_ward: String,
    address_district: String,
    address_province: String,
    guest_size: i32,
    guests_json: String,
    base_price: String,
    total_amount: String,
    discounts_json: String,
    surcharges_json: String,
    payment_method: String,
    payment_status: String,
    book_at: i64,
    created_at: i64,
    cancel_reason: Option<String>,
    cancelled_at: Option<i64>,
    cancelled_by: Option<String>,
}

fn amount(value: &str) -> Result<Decimal, PersistenceError> {
    parse_amount(value).map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}

impl BookingRow {
    fn into_reservation(self) -> Result<Reservation, PersistenceError> {
        let guests: Vec<BookedGuest> = serde_json::from_str(&self.guests_json)?;
        let applied_discounts: Vec<Adjustment> = serde_json::from_str(&self.discounts_json)?;
        let applied_surcharges: Vec<Adjustment> = serde_json::from_str(&self.surcharges_json)?;
        let payment_method: PaymentMethod = self.payment_method.parse()?;
        let payment_status: PaymentStatus = self.payment_status.parse()?;

        let cancellation: Option<Cancellation> = match (self.cancel_reason, self.cancelled_at) {
            (Some(reason), Some(at)) => Some(Cancellation {
                reason,
                cancelled_at: from_unix_seconds(at)?,
                cancelled_by: self.cancelled_by.unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Reservation {
            booking_id: self.booking_id,
            user_id: self.user_id,
            tour_id: self.tour_id,
            tour_name: self.tour_name,
            contact: Contact {
                full_name: self.contact_full_name,
                phone: self.contact_phone,
            },
            address: Address {
                street: self.address_street,
                ward: self.address_ward,
                district: self.address_district,
                province: self.address_province,
            },
            guest_size: count_from_i32(self.guest_size, "guest_size")?,
            guests,
            base_price: amount(&self.base_price)?,
            total_amount: amount(&self.total_amount)?,
            applied_discounts,
            applied_surcharges,
            payment_method,
            payment_status,
            book_at: from_unix_seconds(self.book_at)?,
            created_at: from_unix_seconds(self.created_at)?,
            cancellation,
        })
    }
}

/// Retrieves a booking by ID.
///
/// # Errors
///
/// Returns `PersistenceError::BookingNotFound` if no such booking exists.
pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Reservation, PersistenceError> {
    let row: Option<BookingRow> = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?;

    row.ok_or(PersistenceError::BookingNotFound(booking_id))?
        .into_reservation()
}

/// Reads only the status column of a booking.
///
/// # Errors
///
/// Returns `PersistenceError::BookingNotFound` if no such booking exists.
pub fn get_booking_status(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<PaymentStatus, PersistenceError> {
    let status: Option<String> = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(bookings::payment_status)
        .first::<String>(conn)
        .optional()?;

    Ok(status
        .ok_or(PersistenceError::BookingNotFound(booking_id))?
        .parse()?)
}

/// Lists a user's bookings, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_bookings_for_user(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<Reservation>, PersistenceError> {
    bookings::table
        .filter(bookings::user_id.eq(user_id))
        .order((bookings::created_at.desc(), bookings::booking_id.desc()))
        .select(BookingRow::as_select())
        .load::<BookingRow>(conn)?
        .into_iter()
        .map(BookingRow::into_reservation)
        .collect()
}

/// Lists a user's `pending` and `confirmed` bookings with their departure dates.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_active_bookings_for_user(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<ActiveBookingSummary>, PersistenceError> {
    let active: Vec<&'static str> = PaymentStatus::ACTIVE
        .iter()
        .map(PaymentStatus::as_str)
        .collect();

    let rows: Vec<ActiveRow> = bookings::table
        .inner_join(tours::table)
        .filter(bookings::user_id.eq(user_id))
        .filter(bookings::payment_status.eq_any(active))
        .order(bookings::booking_id.asc())
        .select((
            bookings::booking_id,
            bookings::tour_id,
            bookings::payment_status,
            tours::start_date,
            tours::end_date,
        ))
        .load(conn)?;

    rows.into_iter().map(ActiveRow::into_summary).collect()
}

/// An active booking joined with its departure dates.
#[derive(Queryable)]
struct ActiveRow {
    booking_id: i64,
    tour_id: i64,
    payment_status: String,
    start_date: String,
    end_date: String,
}

impl ActiveRow {
    fn into_summary(self) -> Result<ActiveBookingSummary, PersistenceError> {
        Ok(ActiveBookingSummary {
            booking_id: self.booking_id,
            tour_id: self.tour_id,
            payment_status: self.payment_status.parse()?,
            dates: DateRange::new(parse_date(&self.start_date)?, parse_date(&self.end_date)?)?,
        })
    }
}

/// Lists gateway bookings still `pending` that were created at or before
/// `cutoff`, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_expiry_candidates(
    conn: &mut SqliteConnection,
    cutoff: OffsetDateTime,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(bookings::table
        .filter(bookings::payment_status.eq(PaymentStatus::Pending.as_str()))
        .filter(bookings::payment_method.eq(PaymentMethod::Gateway.as_str()))
        .filter(bookings::created_at.le(cutoff.unix_timestamp()))
        .order((bookings::created_at.asc(), bookings::booking_id.asc()))
        .select(bookings::booking_id)
        .load::<i64>(conn)?)
}

/// Counts a departure's bookings that hold seats, summing their guests.
///
/// Used to check the seat counter against the bookings that justify it.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn sum_held_seats(conn: &mut SqliteConnection, tour_id: i64) -> Result<u32, PersistenceError> {
    let active: Vec<&'static str> = PaymentStatus::ACTIVE
        .iter()
        .map(PaymentStatus::as_str)
        .collect();

    let sizes: Vec<i32> = bookings::table
        .filter(bookings::tour_id.eq(tour_id))
        .filter(bookings::payment_status.eq_any(active))
        .select(bookings::guest_size)
        .load::<i32>(conn)?;

    sizes
        .into_iter()
        .try_fold(0_u32, |total, size| -> Result<u32, PersistenceError> {
            Ok(total + count_from_i32(size, "guest_size")?)
        })
}
