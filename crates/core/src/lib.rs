// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod admission;
mod apply;
mod command;
mod error;
mod policy;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use admission::admit;
pub use apply::{PAYMENT_FAILED_REASON, RESERVATION_EXPIRED_REASON, apply};
pub use command::Command;
pub use error::CoreError;
pub use policy::ReservationPolicy;
pub use state::{
    AdmissionContext, AdmissionPlan, ReservationRequest, TransitionOutcome, TransitionPlan,
};
