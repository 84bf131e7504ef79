// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tourbook_domain::SettlementOutcome;

/// A command represents user or system intent against an existing booking
/// as data only.
///
/// Commands are the only way to request a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Cancel the booking.
    Cancel {
        /// Free-text reason recorded on the booking.
        reason: String,
    },
    /// Apply a payment notifier outcome.
    Settle {
        /// What the gateway reported.
        outcome: SettlementOutcome,
    },
    /// Reclaim an abandoned gateway reservation.
    Expire,
}

impl Command {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cancel { .. } => "cancel",
            Self::Settle { .. } => "settle",
            Self::Expire => "expire",
        }
    }
}
