// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tourbook_audit::AuditEvent;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{ActorData, CauseData};
use crate::diesel_schema;
use crate::error::PersistenceError;

/// Persists a booking event.
///
/// The event must already be attached to its booking.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event` - The audit event to persist
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the event has no booking, or if persistence or
/// serialization fails.
pub fn persist_booking_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let booking_id: i64 = event.booking_id.ok_or_else(|| {
        PersistenceError::Other(format!(
            "'{}' audit event is not attached to a booking",
            event.action
        ))
    })?;

    let actor_json: String = serde_json::to_string(&ActorData::from_actor(&event.actor))?;
    let cause_json: String = serde_json::to_string(&CauseData::from_cause(&event.cause))?;

    diesel::insert_into(diesel_schema::booking_events::table)
        .values((
            diesel_schema::booking_events::booking_id.eq(booking_id),
            diesel_schema::booking_events::action.eq(event.action.as_str()),
            diesel_schema::booking_events::from_status
                .eq(event.from_status.map(|status| status.as_str())),
            diesel_schema::booking_events::to_status.eq(event.to_status.as_str()),
            diesel_schema::booking_events::actor_json.eq(actor_json),
            diesel_schema::booking_events::cause_json.eq(cause_json),
            diesel_schema::booking_events::created_at.eq(event.occurred_at.unix_timestamp()),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}
