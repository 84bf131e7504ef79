// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tourbook_audit::{Actor, ActorRole, Cause};

use crate::error::PersistenceError;

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub role: String,
}

impl ActorData {
    pub fn from_actor(actor: &Actor) -> Self {
        Self {
            id: actor.id.clone(),
            role: actor.role.as_str().to_string(),
        }
    }

    pub fn into_actor(self) -> Result<Actor, PersistenceError> {
        let role: ActorRole = self.role.parse()?;
        Ok(Actor::new(self.id, role))
    }
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

impl CauseData {
    pub fn from_cause(cause: &Cause) -> Self {
        Self {
            id: cause.id.clone(),
            description: cause.description.clone(),
        }
    }

    pub fn into_cause(self) -> Cause {
        Cause::new(self.id, self.description)
    }
}

/// Reads a stored unix timestamp (whole seconds, UTC).
pub fn from_unix_seconds(seconds: i64) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|e| {
        PersistenceError::ReconstructionError(format!("timestamp {seconds} out of range: {e}"))
    })
}

/// Converts a count to the `INTEGER` column type.
pub fn count_to_i32(value: u32, column: &str) -> Result<i32, PersistenceError> {
    value.to_i32().ok_or_else(|| {
        PersistenceError::Other(format!("{column} value {value} does not fit the column"))
    })
}

/// Converts a stored `INTEGER` count back to `u32`.
pub fn count_from_i32(value: i32, column: &str) -> Result<u32, PersistenceError> {
    value.to_u32().ok_or_else(|| {
        PersistenceError::ReconstructionError(format!("{column} holds negative value {value}"))
    })
}
