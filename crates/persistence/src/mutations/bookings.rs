// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking mutations.
//!
//! These functions must run inside a write transaction opened by the
//! caller. Each one is a sequence of statements that only makes sense as a
//! unit: seats and bookings move together or not at all.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use tourbook::{AdmissionPlan, TransitionPlan};
use tourbook_audit::AuditEvent;
use tourbook_domain::{NewReservation, PaymentStatus, Reservation, format_amount};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::count_to_i32;
use crate::diesel_schema::bookings;
use crate::error::PersistenceError;
use crate::mutations::audit::persist_booking_event;
use crate::mutations::inventory::{release_seats, take_seats};
use crate::queries::bookings::{get_booking, get_booking_status};

/// Inserts a booking row.
///
/// # Returns
///
/// The booking ID assigned by the database.
///
/// # Errors
///
/// Returns `PersistenceError::ActiveBookingExists` if the user already holds
/// an active booking on the departure, or an error if serialization or the
/// insert fails.
pub fn insert_booking(
    conn: &mut SqliteConnection,
    reservation: &NewReservation,
) -> Result<i64, PersistenceError> {
    let guests_json: String = serde_json::to_string(&reservation.price.per_guest)?;
    let discounts_json: String = serde_json::to_string(&reservation.price.applied_discounts)?;
    let surcharges_json: String = serde_json::to_string(&reservation.price.applied_surcharges)?;

    diesel::insert_into(bookings::table)
        .values((
            bookings::user_id.eq(&reservation.user_id),
            bookings::tour_id.eq(reservation.tour_id),
            bookings::tour_name.eq(&reservation.tour_name),
            bookings::contact_full_name.eq(&reservation.contact.full_name),
            bookings::contact_phone.eq(&reservation.contact.phone),
            bookings::address_street.eq(&reservation.address.street),
            bookings::address_ward.eq(&reservation.address.ward),
            bookings::address_district.eq(&reservation.address.district),
            bookings::address_province.eq(&reservation.address.province),
            bookings::guest_size.eq(count_to_i32(reservation.guest_size(), "guest_size")?),
            bookings::guests_json.eq(guests_json),
            bookings::base_price.eq(format_amount(reservation.price.base_price)),
            bookings::total_amount.eq(format_amount(reservation.price.total_amount)),
            bookings::discounts_json.eq(discounts_json),
            bookings::surcharges_json.eq(surcharges_json),
            bookings::payment_method.eq(reservation.payment_method.as_str()),
            bookings::payment_status.eq(reservation.payment_status.as_str()),
            bookings::book_at.eq(reservation.book_at.unix_timestamp()),
            bookings::created_at.eq(reservation.created_at.unix_timestamp()),
        ))
        .execute(conn)
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                PersistenceError::ActiveBookingExists {
                    user_id: reservation.user_id.clone(),
                    tour_id: reservation.tour_id,
                }
            }
            other => PersistenceError::from(other),
        })?;

    get_last_insert_rowid(conn)
}

/// Writes an admitted booking: takes its seats, inserts the row and records
/// the `Created` event.
///
/// # Errors
///
/// Returns `PersistenceError::CapacityExceeded` or
/// `PersistenceError::ActiveBookingExists` when the write is refused; the
/// caller's transaction must then roll back.
pub fn admit_reservation(
    conn: &mut SqliteConnection,
    plan: &AdmissionPlan,
) -> Result<Reservation, PersistenceError> {
    let reservation: &NewReservation = &plan.reservation;

    take_seats(conn, reservation.tour_id, plan.seats())?;
    let booking_id: i64 = insert_booking(conn, reservation)?;

    let event: AuditEvent = plan.audit_event.clone().for_booking(booking_id);
    let event_id: i64 = persist_booking_event(conn, &event)?;

    info!(
        booking_id,
        event_id,
        tour_id = reservation.tour_id,
        user_id = %reservation.user_id,
        guest_size = plan.seats(),
        status = %reservation.payment_status,
        "Booking admitted"
    );

    get_booking(conn, booking_id)
}

/// Applies a status change as a compare-and-set and returns the updated
/// booking.
///
/// The update only matches while the stored status is one of
/// `plan.allowed_from`. Seats are released after the status update lands, in
/// the same transaction, and the event is recorded last.
///
/// # Errors
///
/// Returns `PersistenceError::StatusConflict` carrying the current status if
/// the update matched no row, `PersistenceError::InventoryUnderflow` if the
/// seat counter cannot give the seats back.
pub fn apply_transition(
    conn: &mut SqliteConnection,
    plan: &TransitionPlan,
) -> Result<Reservation, PersistenceError> {
    let allowed: Vec<&'static str> = plan.allowed_from.iter().map(PaymentStatus::as_str).collect();
    let (reason, cancelled_at, cancelled_by): (Option<&str>, Option<i64>, Option<&str>) =
        plan.cancellation.as_ref().map_or((None, None, None), |c| {
            (
                Some(c.reason.as_str()),
                Some(c.cancelled_at.unix_timestamp()),
                Some(c.cancelled_by.as_str()),
            )
        });

    let updated: usize = diesel::update(
        bookings::table
            .filter(bookings::booking_id.eq(plan.booking_id))
            .filter(bookings::payment_status.eq_any(allowed)),
    )
    .set((
        bookings::payment_status.eq(plan.target.as_str()),
        bookings::cancel_reason.eq(reason),
        bookings::cancelled_at.eq(cancelled_at),
        bookings::cancelled_by.eq(cancelled_by),
    ))
    .execute(conn)?;

    if updated == 0 {
        let current: PaymentStatus = get_booking_status(conn, plan.booking_id)?;
        debug!(
            booking_id = plan.booking_id,
            current = %current,
            target = %plan.target,
            "Status compare-and-set matched no row"
        );
        return Err(PersistenceError::StatusConflict {
            booking_id: plan.booking_id,
            current,
        });
    }

    release_seats(conn, plan.tour_id, plan.release_seats)?;
    let event_id: i64 = persist_booking_event(conn, &plan.audit_event)?;

    info!(
        booking_id = plan.booking_id,
        event_id,
        tour_id = plan.tour_id,
        action = %plan.audit_event.action,
        to = %plan.target,
        released = plan.release_seats,
        "Booking transitioned"
    );

    get_booking(conn, plan.booking_id)
}
