//! Player identity validation.
//!
//! Player identities are long numeric platform ids. The check here is a
//! structural filter only: a string must parse as an unsigned 64-bit integer
//! with at least [`MIN_IDENTITY_DIGITS`] decimal digits.

use std::sync::Arc;

/// Minimum number of decimal digits in a valid identity.
pub const MIN_IDENTITY_DIGITS: u32 = 17;

/// Predicate registered with the permission store.
pub type IdentityValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Number of decimal digits in `value`. Zero has one digit.
pub fn identity_digits(value: u64) -> u32 {
    value.checked_ilog10().map_or(1, |log| log + 1)
}

/// Returns true if `candidate` looks like a player identity.
///
/// Surrounding whitespace, signs other than a leading `+`, and values above
/// `u64::MAX` are all parse failures and reject.
pub fn is_valid_identity(candidate: &str) -> bool {
    match candidate.parse::<u64>() {
        Ok(value) => identity_digits(value) >= MIN_IDENTITY_DIGITS,
        Err(_) => false,
    }
}

/// The identity predicate as a value that can be handed to a store.
pub fn identity_validator() -> IdentityValidator {
    Arc::new(is_valid_identity)
}
