// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Address, Contact, DomainError, Guest, MAX_GUEST_AGE, validate_address, validate_contact,
    validate_guests,
};

fn create_test_guests() -> Vec<Guest> {
    vec![
        Guest::new("Nguyen Van An", 34, "adult"),
        Guest::new("Nguyen Thi Binh", 7, "child"),
    ]
}

fn create_test_address() -> Address {
    Address {
        street: String::from("12 Ly Thuong Kiet"),
        ward: String::from("Hang Bai"),
        district: String::from("Hoan Kiem"),
        province: String::from("Ha Noi"),
    }
}

#[test]
fn test_validate_guests_accepts_matching_list() {
    let guests: Vec<Guest> = create_test_guests();

    let result: Result<(), DomainError> = validate_guests(&guests, 2);
    assert!(result.is_ok());
}

#[test]
fn test_validate_guests_rejects_empty_list() {
    let result: Result<(), DomainError> = validate_guests(&[], 0);
    assert!(matches!(result, Err(DomainError::InvalidGuests(_))));
}

#[test]
fn test_validate_guests_rejects_count_mismatch() {
    let guests: Vec<Guest> = create_test_guests();

    let result: Result<(), DomainError> = validate_guests(&guests, 3);
    assert!(matches!(result, Err(DomainError::InvalidGuests(_))));
}

#[test]
fn test_validate_guests_age_bounds() {
    let oldest: Vec<Guest> = vec![Guest::new("Tran Van Cu", MAX_GUEST_AGE, "senior")];
    assert!(validate_guests(&oldest, 1).is_ok());

    let newborn: Vec<Guest> = vec![Guest::new("Tran Be", 0, "infant")];
    assert!(validate_guests(&newborn, 1).is_ok());

    let too_old: Vec<Guest> = vec![Guest::new("Tran Van Cu", MAX_GUEST_AGE + 1, "senior")];
    assert!(matches!(
        validate_guests(&too_old, 1),
        Err(DomainError::InvalidGuests(_))
    ));
}

#[test]
fn test_validate_guests_rejects_blank_type() {
    let guests: Vec<Guest> = vec![Guest::new("Le Thi Dao", 30, "  ")];

    assert!(matches!(
        validate_guests(&guests, 1),
        Err(DomainError::InvalidGuests(_))
    ));
}

#[test]
fn test_validate_contact_requires_name_and_phone() {
    let mut contact: Contact = Contact {
        full_name: String::from("Nguyen Van An"),
        phone: String::from("0901234567"),
    };
    assert!(validate_contact(&contact).is_ok());

    contact.phone = String::from(" ");
    assert_eq!(
        validate_contact(&contact),
        Err(DomainError::InvalidContact { field: "phone" })
    );

    contact.full_name = String::new();
    assert_eq!(
        validate_contact(&contact),
        Err(DomainError::InvalidContact { field: "full_name" })
    );
}

#[test]
fn test_validate_address_reports_first_missing_field() {
    assert!(validate_address(&create_test_address()).is_ok());

    let mut address: Address = create_test_address();
    address.district = String::new();
    address.province = String::new();
    assert_eq!(
        validate_address(&address),
        Err(DomainError::InvalidAddress { field: "district" })
    );

    let mut address: Address = create_test_address();
    address.ward = String::from("\t");
    assert_eq!(
        validate_address(&address),
        Err(DomainError::InvalidAddress { field: "ward" })
    );
}
