// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::macros::{date, datetime};
use tourbook::ReservationPolicy;
use tourbook_domain::{
    Address, AgeBracket, Contact, DiscountType, Guest, PaymentMethod, Promotion, Reservation,
    RulePayload, SeasonWindow, Tour,
};
use tourbook_persistence::Persistence;

use crate::{CreateReservationRequest, CreateTourRequest, create_reservation, create_tour};

/// "Now" for every API test: July 1st 2026, 09:00 UTC.
pub const NOW: OffsetDateTime = datetime!(2026-07-01 9:00 UTC);

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_test_policy() -> ReservationPolicy {
    ReservationPolicy::default()
}

pub fn tour_request(start: &str, end: &str, seats: u32) -> CreateTourRequest {
    CreateTourRequest {
        name: format!("Tour {start} to {end}"),
        start_date: start.to_string(),
        end_date: end.to_string(),
        base_price: String::from("1000000"),
        max_group_size: seats,
    }
}

/// Registers a departure on `start..=end` (days of July 2026).
pub fn create_july_tour(persistence: &Persistence, start: u8, end: u8, seats: u32) -> Tour {
    create_tour(
        persistence,
        &tour_request(
            &format!("2026-07-{start:02}"),
            &format!("2026-07-{end:02}"),
            seats,
        ),
    )
    .expect("Failed to create test tour")
}

/// Departure on July 10-15 with `seats` seats at 1,000,000.
pub fn create_test_tour(persistence: &Persistence, seats: u32) -> Tour {
    create_july_tour(persistence, 10, 15, seats)
}

pub fn create_test_contact() -> Contact {
    Contact {
        full_name: String::from("Le Thi Dung"),
        phone: String::from("0987654321"),
    }
}

pub fn create_test_address() -> Address {
    Address {
        street: String::from("88 Nguyen Hue"),
        ward: String::from("Ben Nghe"),
        district: String::from("District 1"),
        province: String::from("Ho Chi Minh City"),
    }
}

/// A gateway booking request for `guests` adults.
pub fn create_valid_request(user_id: &str, tour_id: i64, guests: u32) -> CreateReservationRequest {
    CreateReservationRequest {
        user_id: user_id.to_string(),
        tour_id,
        guest_size: guests,
        guests: (0..guests)
            .map(|i| Guest::new(&format!("Guest {i}"), 30, "adult"))
            .collect(),
        contact: create_test_contact(),
        address: create_test_address(),
        payment_method: PaymentMethod::Gateway,
        book_at: None,
        single_room_count: 0,
    }
}

/// Books `guests` adults on `tour_id` at `now`.
pub fn book(
    persistence: &Persistence,
    user_id: &str,
    tour_id: i64,
    guests: u32,
    now: OffsetDateTime,
) -> Reservation {
    create_reservation(
        persistence,
        &create_test_policy(),
        create_valid_request(user_id, tour_id, guests),
        now,
    )
    .expect("Failed to create test reservation")
}

pub fn child_half_price() -> RulePayload {
    RulePayload::AgeBracket(vec![AgeBracket {
        name: String::from("child"),
        min_age: Some(2),
        max_age: Some(11),
        discount_type: DiscountType::Percentage,
        discount_value: Decimal::from(50),
        required_id: false,
    }])
}

pub fn high_season() -> RulePayload {
    RulePayload::Seasonal(vec![SeasonWindow {
        name: String::from("high season"),
        start_date: date!(2026 - 06 - 01),
        end_date: date!(2026 - 08 - 31),
        price_multiplier: Decimal::new(12, 1),
    }])
}

/// Ten percent off when booked at least seven days ahead.
pub fn early_bird() -> RulePayload {
    RulePayload::Promotion(Promotion {
        name: String::from("early bird"),
        start_date: None,
        end_date: None,
        days_before_departure: Some(7),
        days_before_departure_max: None,
        discount_type: DiscountType::Percentage,
        discount_value: Decimal::from(10),
    })
}
