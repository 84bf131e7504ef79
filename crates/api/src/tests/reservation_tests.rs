// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking admission through the public API.

use rust_decimal::Decimal;
use tourbook_audit::{Action, AuditEvent};
use tourbook_domain::{
    Guest, PaymentMethod, PaymentStatus, PricingRule, Reservation, RulePayload, Tour,
};
use tourbook_persistence::Persistence;

use crate::{
    CreateReservationRequest, ErrorKind, ReservationError, create_pricing_rule,
    create_reservation, create_tour, get_reservation, get_tour, list_booking_events,
    list_reservations, update_pricing_rule,
};

use super::helpers::{
    NOW, book, child_half_price, create_july_tour, create_test_persistence, create_test_policy,
    create_test_tour, create_valid_request, tour_request,
};

fn try_create(
    persistence: &Persistence,
    request: CreateReservationRequest,
) -> Result<Reservation, ReservationError> {
    create_reservation(persistence, &create_test_policy(), request, NOW)
}

// ============================================================================
// Successful admission
// ============================================================================

#[test]
fn test_gateway_booking_starts_pending_and_takes_seats() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);

    let reservation: Reservation = book(&persistence, "user-1", tour.tour_id, 3, NOW);

    assert_eq!(reservation.payment_status, PaymentStatus::Pending);
    assert_eq!(reservation.guest_size, 3);
    assert_eq!(reservation.total_amount, Decimal::new(300_000_000, 2));
    assert_eq!(reservation.book_at, NOW);
    assert_eq!(reservation.created_at, NOW);
    assert_eq!(
        get_tour(&persistence, tour.tour_id).unwrap().current_bookings,
        3
    );
}

#[test]
fn test_cash_on_arrival_booking_is_confirmed_immediately() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);
    let mut request: CreateReservationRequest = create_valid_request("user-1", tour.tour_id, 2);
    request.payment_method = PaymentMethod::CashOnArrival;

    let reservation: Reservation = try_create(&persistence, request).unwrap();

    assert_eq!(reservation.payment_status, PaymentStatus::Confirmed);
}

#[test]
fn test_admission_records_created_event() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);
    let reservation: Reservation = book(&persistence, "user-1", tour.tour_id, 1, NOW);

    let events: Vec<AuditEvent> =
        list_booking_events(&persistence, reservation.booking_id).unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, Action::Created);
    assert_eq!(events[0].from_status, None);
    assert_eq!(events[0].to_status, PaymentStatus::Pending);
    assert_eq!(events[0].actor.id, "user-1");
}

#[test]
fn test_stored_booking_matches_returned_booking() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);
    let reservation: Reservation = book(&persistence, "user-1", tour.tour_id, 2, NOW);

    assert_eq!(
        get_reservation(&persistence, reservation.booking_id).unwrap(),
        reservation
    );
    assert_eq!(
        list_reservations(&persistence, "user-1").unwrap(),
        vec![reservation]
    );
    assert!(list_reservations(&persistence, "user-2").unwrap().is_empty());
}

#[test]
fn test_price_snapshot_survives_rule_edit() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);
    let rule: PricingRule = create_pricing_rule(&persistence, tour.tour_id, &child_half_price())
        .unwrap();
    let mut request: CreateReservationRequest = create_valid_request("user-1", tour.tour_id, 1);
    request.guests = vec![Guest::new("Pham Minh Khoa", 6, "child")];
    let reservation: Reservation = try_create(&persistence, request).unwrap();

    let mut cheaper: RulePayload = child_half_price();
    if let RulePayload::AgeBracket(brackets) = &mut cheaper {
        brackets[0].discount_value = Decimal::from(90);
    }
    update_pricing_rule(&persistence, rule.rule_id, &cheaper).unwrap();

    let stored: Reservation = get_reservation(&persistence, reservation.booking_id).unwrap();
    assert_eq!(stored.total_amount, Decimal::new(50_000_000, 2));
    assert_eq!(stored.guests[0].price, Decimal::from(500_000));
    assert_eq!(stored.applied_discounts[0].rule_version, 1);
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_unknown_tour_is_rejected() {
    let persistence: Persistence = create_test_persistence();

    let result = try_create(&persistence, create_valid_request("user-1", 999, 1));

    assert_eq!(
        result.unwrap_err(),
        ReservationError::TourNotFound { tour_id: 999 }
    );
}

#[test]
fn test_ended_tour_is_rejected() {
    let persistence: Persistence = create_test_persistence();
    let past: Tour =
        create_tour(&persistence, &tour_request("2026-06-20", "2026-06-25", 10)).unwrap();

    let err: ReservationError =
        try_create(&persistence, create_valid_request("user-1", past.tour_id, 1)).unwrap_err();

    assert_eq!(err, ReservationError::TourEnded { tour_id: past.tour_id });
    assert_eq!(err.kind(), ErrorKind::TourEnded);
}

#[test]
fn test_guest_count_mismatch_is_rejected_without_taking_seats() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);
    let mut request: CreateReservationRequest = create_valid_request("user-1", tour.tour_id, 2);
    request.guest_size = 3;

    let err: ReservationError = try_create(&persistence, request).unwrap_err();

    assert!(matches!(err, ReservationError::InvalidGuests { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        get_tour(&persistence, tour.tour_id).unwrap().current_bookings,
        0
    );
}

#[test]
fn test_empty_guest_list_is_rejected() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);
    let request: CreateReservationRequest = create_valid_request("user-1", tour.tour_id, 0);

    let err: ReservationError = try_create(&persistence, request).unwrap_err();

    assert!(matches!(err, ReservationError::InvalidGuests { .. }));
}

#[test]
fn test_guest_over_maximum_age_is_rejected() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);
    let mut request: CreateReservationRequest = create_valid_request("user-1", tour.tour_id, 1);
    request.guests = vec![Guest::new("Old Timer", 151, "adult")];

    let err: ReservationError = try_create(&persistence, request).unwrap_err();

    assert!(matches!(err, ReservationError::InvalidGuests { .. }));
}

#[test]
fn test_blank_phone_is_rejected() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);
    let mut request: CreateReservationRequest = create_valid_request("user-1", tour.tour_id, 1);
    request.contact.phone = String::from("   ");

    let err: ReservationError = try_create(&persistence, request).unwrap_err();

    assert_eq!(
        err,
        ReservationError::InvalidContact {
            field: String::from("phone")
        }
    );
}

#[test]
fn test_blank_ward_is_rejected() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);
    let mut request: CreateReservationRequest = create_valid_request("user-1", tour.tour_id, 1);
    request.address.ward = String::new();

    let err: ReservationError = try_create(&persistence, request).unwrap_err();

    assert_eq!(
        err,
        ReservationError::InvalidAddress {
            field: String::from("ward")
        }
    );
}

#[test]
fn test_second_active_booking_on_same_tour_is_rejected() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 10);
    book(&persistence, "user-1", tour.tour_id, 1, NOW);

    let err: ReservationError =
        try_create(&persistence, create_valid_request("user-1", tour.tour_id, 1)).unwrap_err();

    assert_eq!(
        err,
        ReservationError::DuplicateBooking {
            user_id: String::from("user-1"),
            tour_id: tour.tour_id
        }
    );
    assert_eq!(err.kind(), ErrorKind::Contention);
    assert_eq!(
        get_tour(&persistence, tour.tour_id).unwrap().current_bookings,
        1
    );
}

#[test]
fn test_overlapping_departures_are_rejected_and_adjacent_ones_accepted() {
    let persistence: Persistence = create_test_persistence();
    let first: Tour = create_july_tour(&persistence, 10, 15, 10);
    let overlapping: Tour = create_july_tour(&persistence, 12, 14, 10);
    let later: Tour = create_july_tour(&persistence, 16, 20, 10);
    let booked: Reservation = book(&persistence, "user-1", first.tour_id, 1, NOW);

    let err: ReservationError = try_create(
        &persistence,
        create_valid_request("user-1", overlapping.tour_id, 1),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ReservationError::OverlappingDates {
            existing_booking_id: booked.booking_id
        }
    );

    let accepted: Reservation = book(&persistence, "user-1", later.tour_id, 1, NOW);
    assert_eq!(accepted.tour_id, later.tour_id);
}

#[test]
fn test_fourth_pending_booking_is_throttled() {
    let persistence: Persistence = create_test_persistence();
    for (start, end) in [(2, 3), (4, 5), (6, 7)] {
        let tour: Tour = create_july_tour(&persistence, start, end, 10);
        book(&persistence, "user-1", tour.tour_id, 1, NOW);
    }
    let fourth: Tour = create_july_tour(&persistence, 8, 9, 10);

    let err: ReservationError =
        try_create(&persistence, create_valid_request("user-1", fourth.tour_id, 1)).unwrap_err();

    assert_eq!(
        err,
        ReservationError::ThrottleExceeded {
            user_id: String::from("user-1"),
            limit: 3
        }
    );
}

#[test]
fn test_confirmed_bookings_do_not_count_toward_throttle() {
    let persistence: Persistence = create_test_persistence();
    for (start, end) in [(2, 3), (4, 5), (6, 7)] {
        let tour: Tour = create_july_tour(&persistence, start, end, 10);
        let mut request: CreateReservationRequest =
            create_valid_request("user-1", tour.tour_id, 1);
        request.payment_method = PaymentMethod::CashOnArrival;
        try_create(&persistence, request).unwrap();
    }
    let fourth: Tour = create_july_tour(&persistence, 8, 9, 10);

    let result = try_create(&persistence, create_valid_request("user-1", fourth.tour_id, 1));

    assert!(result.is_ok());
}

#[test]
fn test_capacity_exceeded_leaves_counter_unchanged() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 4);
    book(&persistence, "user-1", tour.tour_id, 3, NOW);

    let err: ReservationError =
        try_create(&persistence, create_valid_request("user-2", tour.tour_id, 2)).unwrap_err();

    assert_eq!(
        err,
        ReservationError::CapacityExceeded {
            tour_id: tour.tour_id,
            requested: 2,
            remaining: 1
        }
    );
    assert_eq!(err.kind(), ErrorKind::Contention);
    assert_eq!(
        get_tour(&persistence, tour.tour_id).unwrap().current_bookings,
        3
    );
    assert!(list_reservations(&persistence, "user-2").unwrap().is_empty());
}

#[test]
fn test_last_seat_can_be_taken_exactly() {
    let persistence: Persistence = create_test_persistence();
    let tour: Tour = create_test_tour(&persistence, 4);
    book(&persistence, "user-1", tour.tour_id, 3, NOW);

    book(&persistence, "user-2", tour.tour_id, 1, NOW);

    assert_eq!(
        get_tour(&persistence, tour.tour_id).unwrap().remaining_capacity(),
        0
    );
}
