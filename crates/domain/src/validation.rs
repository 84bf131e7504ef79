// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking::{Address, Contact, Guest};
use crate::error::DomainError;

/// Oldest age a guest can be priced at.
pub const MAX_GUEST_AGE: u32 = 150;

/// Validates the submitted guest list.
///
/// It does NOT check resolved prices; those only exist after pricing.
///
/// # Errors
///
/// Returns an error if:
/// - The guest list is empty
/// - The list length differs from the declared guest count
/// - A guest is older than `MAX_GUEST_AGE`
/// - A guest's name or type is blank
pub fn validate_guests(guests: &[Guest], declared_guest_size: u32) -> Result<(), DomainError> {
    if guests.is_empty() {
        return Err(DomainError::InvalidGuests(String::from(
            "at least one guest is required",
        )));
    }

    let submitted: usize = guests.len();
    if u32::try_from(submitted).ok() != Some(declared_guest_size) {
        return Err(DomainError::InvalidGuests(format!(
            "declared {declared_guest_size} guests but {submitted} were listed"
        )));
    }

    for (index, guest) in guests.iter().enumerate() {
        if guest.age > MAX_GUEST_AGE {
            return Err(DomainError::InvalidGuests(format!(
                "guest {index} has age {} outside 0..={MAX_GUEST_AGE}",
                guest.age
            )));
        }
        if guest.full_name.trim().is_empty() {
            return Err(DomainError::InvalidGuests(format!(
                "guest {index} has no name"
            )));
        }
        if guest.guest_type.trim().is_empty() {
            return Err(DomainError::InvalidGuests(format!(
                "guest {index} has no guest type"
            )));
        }
    }

    Ok(())
}

/// Validates the booking contact.
///
/// # Errors
///
/// Returns `DomainError::InvalidContact` naming the first blank field.
pub fn validate_contact(contact: &Contact) -> Result<(), DomainError> {
    if contact.full_name.trim().is_empty() {
        return Err(DomainError::InvalidContact { field: "full_name" });
    }
    if contact.phone.trim().is_empty() {
        return Err(DomainError::InvalidContact { field: "phone" });
    }
    Ok(())
}

/// Validates that every address component is present.
///
/// # Errors
///
/// Returns `DomainError::InvalidAddress` naming the first blank field.
pub fn validate_address(address: &Address) -> Result<(), DomainError> {
    let fields: [(&'static str, &str); 4] = [
        ("street", &address.street),
        ("ward", &address.ward),
        ("district", &address.district),
        ("province", &address.province),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(DomainError::InvalidAddress { field });
        }
    }
    Ok(())
}
