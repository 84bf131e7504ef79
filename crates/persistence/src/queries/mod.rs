// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every function takes the connection it runs on, so the same query serves
//! both standalone reads and reads inside a write transaction.

pub mod audit;
pub mod bookings;
pub mod pricing_rules;
pub mod tours;

pub use audit::list_booking_events;
pub use bookings::{
    get_booking, list_active_bookings_for_user, list_bookings_for_user, list_expiry_candidates,
    sum_held_seats,
};
pub use pricing_rules::list_pricing_rules;
pub use tours::{get_tour, list_tours};
