//! Password strength policy.
//!
//! Checked before any key derivation work; rejecting weak input is a local,
//! non-retryable failure.

use crate::error::{CoreError, CoreResult};

/// Length floor for user passwords.
pub const MIN_PASSWORD_LEN: usize = 12;

/// Character classes required (any three of four).
const MIN_CHAR_CLASSES: usize = 3;

pub fn check_strength(password: &str) -> CoreResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::WeakPassword(format!(
            "shorter than {MIN_PASSWORD_LEN} characters"
        )));
    }

    let classes = [
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ]
    .iter()
    .filter(|present| **present)
    .count();

    if classes < MIN_CHAR_CLASSES {
        return Err(CoreError::WeakPassword(format!(
            "needs at least {MIN_CHAR_CLASSES} of: lowercase, uppercase, digits, symbols"
        )));
    }

    Ok(())
}
