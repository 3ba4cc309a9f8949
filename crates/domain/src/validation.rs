// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking::{PassengerInfo, PaymentInfo};
use crate::error::DomainError;

/// Validates a requested seat count.
///
/// # Errors
///
/// Returns `InvalidSeatCount` if `count` is zero.
pub const fn validate_seat_count(count: u32) -> Result<(), DomainError> {
    if count == 0 {
        return Err(DomainError::InvalidSeatCount(count));
    }
    Ok(())
}

/// Validates that a passenger's basic field constraints are met.
///
/// # Arguments
///
/// * `passenger` - The passenger to validate
///
/// # Errors
///
/// Returns an error if:
/// - The first or last name is blank
/// - The email is blank or has no `@` between a local part and a domain
pub fn validate_passenger(passenger: &PassengerInfo) -> Result<(), DomainError> {
    // Rule: names must not be blank
    if passenger.first_name.trim().is_empty() {
        return Err(DomainError::InvalidPassenger(String::from(
            "First name cannot be empty",
        )));
    }
    if passenger.last_name.trim().is_empty() {
        return Err(DomainError::InvalidPassenger(String::from(
            "Last name cannot be empty",
        )));
    }

    // Rule: email must look like local@domain
    let email: &str = passenger.email.trim();
    let well_formed: bool = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(DomainError::InvalidPassenger(format!(
            "Email '{email}' is not a valid address"
        )));
    }

    Ok(())
}

/// Validates the payment facts supplied with a booking.
///
/// # Errors
///
/// Returns `InvalidPayment` if the payment method is blank.
pub fn validate_payment(payment: &PaymentInfo) -> Result<(), DomainError> {
    if payment.method.trim().is_empty() {
        return Err(DomainError::InvalidPayment(String::from(
            "Payment method cannot be empty",
        )));
    }
    Ok(())
}
