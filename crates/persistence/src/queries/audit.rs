// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit trail queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tourbook_audit::{Action, AuditEvent};
use tourbook_domain::PaymentStatus;

use crate::data_models::{ActorData, CauseData, from_unix_seconds};
use crate::diesel_schema::booking_events;
use crate::error::PersistenceError;

/// Diesel Queryable struct for booking event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_events)]
struct BookingEventRow {
    event_id: i64,
    booking_id: i64,
    action: String,
    from_status: Option<String>,
    to_status: String,
    actor_json: String,
    cause_json: String,
    created_at: i64,
}

impl BookingEventRow {
    fn into_event(self) -> Result<AuditEvent, PersistenceError> {
        let actor_data: ActorData = serde_json::from_str(&self.actor_json)?;
        let cause_data: CauseData = serde_json::from_str(&self.cause_json)?;
        let action: Action = self
            .action
            .parse()
            .map_err(PersistenceError::ReconstructionError)?;
        let from_status: Option<PaymentStatus> = self
            .from_status
            .as_deref()
            .map(str::parse::<PaymentStatus>)
            .transpose()?;

        Ok(AuditEvent {
            event_id: Some(self.event_id),
            booking_id: Some(self.booking_id),
            actor: actor_data.into_actor()?,
            cause: cause_data.into_cause(),
            action,
            from_status,
            to_status: self.to_status.parse()?,
            occurred_at: from_unix_seconds(self.created_at)?,
        })
    }
}

/// Retrieves the audit trail of a booking in the order it was written.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn list_booking_events(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    booking_events::table
        .filter(booking_events::booking_id.eq(booking_id))
        .order(booking_events::event_id.asc())
        .select(BookingEventRow::as_select())
        .load::<BookingEventRow>(conn)?
        .into_iter()
        .map(BookingEventRow::into_event)
        .collect()
}
