// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations.
//!
//! Mutations run on a connection the caller has already put inside a
//! transaction; none of them opens one itself.

pub mod audit;
pub mod bookings;
pub mod catalog;
pub mod inventory;

pub use bookings::{admit_reservation, apply_transition};
pub use catalog::{
    insert_pricing_rule, insert_tour, set_pricing_rule_active, update_pricing_rule_payload,
};
