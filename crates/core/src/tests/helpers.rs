// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};
use tourbook_audit::{Actor, Cause};
use tourbook_domain::{
    ActiveBookingSummary, Address, Contact, DateRange, Guest, PaymentMethod, PaymentStatus,
    Reservation, Tour,
};

use crate::{AdmissionContext, ReservationRequest};

/// "Now" for every core test.
pub const NOW: OffsetDateTime = datetime!(2026-07-01 9:00 UTC);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Customer request"))
}

pub fn create_test_admin() -> Actor {
    Actor::admin("admin-123")
}

pub fn range(start: Date, end: Date) -> DateRange {
    DateRange::new(start, end).unwrap()
}

/// Departure on July 10-15 with 20 seats at 1,000,000.
pub fn create_test_tour() -> Tour {
    Tour {
        tour_id: 1,
        name: String::from("Ha Long Bay Cruise"),
        dates: range(date!(2026 - 07 - 10), date!(2026 - 07 - 15)),
        base_price: Decimal::from(1_000_000),
        max_group_size: 20,
        current_bookings: 0,
    }
}

pub fn create_test_context() -> AdmissionContext {
    AdmissionContext {
        tour: create_test_tour(),
        active_bookings: Vec::new(),
        rules: Vec::new(),
    }
}

pub fn create_test_request() -> ReservationRequest {
    ReservationRequest {
        user_id: String::from("user-1"),
        tour_id: 1,
        guest_size: 2,
        guests: vec![
            Guest::new("Nguyen Van An", 34, "adult"),
            Guest::new("Nguyen Thi Binh", 7, "child"),
        ],
        contact: Contact {
            full_name: String::from("Nguyen Van An"),
            phone: String::from("0901234567"),
        },
        address: Address {
            street: String::from("12 Ly Thuong Kiet"),
            ward: String::from("Hang Bai"),
            district: String::from("Hoan Kiem"),
            province: String::from("Ha Noi"),
        },
        payment_method: PaymentMethod::Gateway,
        book_at: NOW,
        single_room_count: 0,
    }
}

pub fn active_booking(
    booking_id: i64,
    tour_id: i64,
    status: PaymentStatus,
    dates: DateRange,
) -> ActiveBookingSummary {
    ActiveBookingSummary {
        booking_id,
        tour_id,
        payment_status: status,
        dates,
    }
}

/// A stored two-guest booking owned by `user-1`.
pub fn create_test_reservation(
    status: PaymentStatus,
    method: PaymentMethod,
    created_at: OffsetDateTime,
) -> Reservation {
    let request: ReservationRequest = create_test_request();
    Reservation {
        booking_id: 42,
        user_id: request.user_id,
        tour_id: 1,
        tour_name: String::from("Ha Long Bay Cruise"),
        contact: request.contact,
        address: request.address,
        guest_size: 2,
        guests: Vec::new(),
        base_price: Decimal::from(1_000_000),
        total_amount: Decimal::from(2_000_000),
        applied_discounts: Vec::new(),
        applied_surcharges: Vec::new(),
        payment_method: method,
        payment_status: status,
        book_at: created_at,
        created_at,
        cancellation: None,
    }
}
