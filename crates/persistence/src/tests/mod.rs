// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;

use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::macros::{date, datetime};
use tourbook::{AdmissionContext, ReservationPolicy, ReservationRequest};
use tourbook_audit::Cause;
use tourbook_domain::{Address, Contact, DateRange, Guest, NewTour, PaymentMethod, Tour};

use crate::{Persistence, PersistenceError};

/// "Now" for every persistence test.
pub const NOW: OffsetDateTime = datetime!(2026-07-01 9:00 UTC);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

/// Departure on July 10-15 with `seats` seats at 1,000,000.
pub fn create_test_new_tour(seats: u32) -> NewTour {
    NewTour {
        name: String::from("Ha Long Bay Cruise"),
        dates: DateRange::new(date!(2026 - 07 - 10), date!(2026 - 07 - 15)).unwrap(),
        base_price: Decimal::from(1_000_000),
        max_group_size: seats,
    }
}

pub fn create_test_tour(persistence: &Persistence, seats: u32) -> Tour {
    persistence
        .create_tour(&create_test_new_tour(seats))
        .expect("Failed to create test tour")
}

/// A request for `guests` adults on `tour_id`.
pub fn create_test_request(user_id: &str, tour_id: i64, guests: u32) -> ReservationRequest {
    ReservationRequest {
        user_id: user_id.to_string(),
        tour_id,
        guest_size: guests,
        guests: (0..guests)
            .map(|i| Guest::new(&format!("Guest {i}"), 30, "adult"))
            .collect(),
        contact: Contact {
            full_name: String::from("Tran Van Cuong"),
            phone: String::from("0912345678"),
        },
        address: Address {
            street: String::from("5 Tran Hung Dao"),
            ward: String::from("Phan Chu Trinh"),
            district: String::from("Hoan Kiem"),
            province: String::from("Ha Noi"),
        },
        payment_method: PaymentMethod::Gateway,
        book_at: NOW,
        single_room_count: 0,
    }
}

/// Admits `request` through the engine's admission rules at `now`.
pub fn admit_at(
    persistence: &Persistence,
    request: ReservationRequest,
    now: OffsetDateTime,
) -> Result<tourbook_domain::Reservation, PersistenceError> {
    let user_id: String = request.user_id.clone();
    let tour_id: i64 = request.tour_id;
    persistence.admit(&user_id, tour_id, |context: &AdmissionContext| {
        tourbook::admit(
            context,
            request,
            &ReservationPolicy::default(),
            create_test_cause(),
            now,
        )
    })
}
