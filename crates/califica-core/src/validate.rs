//! Local form checks run before anything is sent to the API.

use thiserror::Error;

/// Minimum password length accepted by the signup and settings forms.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Text that must be typed to confirm account deletion.
pub const DELETE_CONFIRMATION: &str = "ELIMINAR";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("Type '{}' to confirm", DELETE_CONFIRMATION)]
    ConfirmationMismatch,
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// Mismatch is reported before length, matching the order users see on the form.
pub fn new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub fn rating(value: u8) -> Result<u8, ValidationError> {
    if (1..=5).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::RatingOutOfRange(value))
    }
}

pub fn delete_confirmation(typed: &str) -> Result<(), ValidationError> {
    if typed == DELETE_CONFIRMATION {
        Ok(())
    } else {
        Err(ValidationError::ConfirmationMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_password() {
        assert_eq!(new_password("abc", "abd"), Err(ValidationError::PasswordMismatch));
        assert_eq!(new_password("abc", "abc"), Err(ValidationError::PasswordTooShort));
        assert_eq!(new_password("secret", "secret"), Ok(()));
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(rating(0), Err(ValidationError::RatingOutOfRange(0)));
        assert_eq!(rating(1), Ok(1));
        assert_eq!(rating(5), Ok(5));
        assert_eq!(rating(6), Err(ValidationError::RatingOutOfRange(6)));
    }

    #[test]
    fn test_require_and_confirmation() {
        assert_eq!(require("Email", "  "), Err(ValidationError::Required("Email")));
        assert!(require("Email", "a@b.c").is_ok());
        assert!(delete_confirmation("ELIMINAR").is_ok());
        assert_eq!(delete_confirmation("eliminar"), Err(ValidationError::ConfirmationMismatch));
    }
}
