//! Password composition policy.
//!
//! Gates interactively entered passwords before they become key material.

use hexseal_common::{Error, Result};

/// Minimum password length in characters.
pub const MIN_LENGTH: usize = 8;

/// Special characters accepted by the policy.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*";

const POLICY_MESSAGE: &str = "Password must be at least 8 characters long and include at least \
one lowercase letter, one uppercase letter, one digit, and one special character from !@#$%^&*, \
using no other characters";

/// Validate a candidate password against the composition policy.
///
/// Accepts only strings of at least [`MIN_LENGTH`] characters, drawn
/// entirely from ASCII letters, ASCII digits and [`SPECIAL_CHARACTERS`],
/// containing at least one character of each of those four classes.
///
/// # Errors
/// - `PolicyViolation` with one combined message when any rule fails
pub fn validate_password(password: &str) -> Result<()> {
    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut special = false;
    let mut count = 0usize;

    for c in password.chars() {
        count += 1;
        match c {
            'a'..='z' => lower = true,
            'A'..='Z' => upper = true,
            '0'..='9' => digit = true,
            c if SPECIAL_CHARACTERS.contains(c) => special = true,
            _ => return Err(Error::PolicyViolation(POLICY_MESSAGE.to_string())),
        }
    }

    if count >= MIN_LENGTH && lower && upper && digit && special {
        Ok(())
    } else {
        Err(Error::PolicyViolation(POLICY_MESSAGE.to_string()))
    }
}
