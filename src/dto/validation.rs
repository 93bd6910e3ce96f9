//! Validation helpers for DTOs.

use validator::ValidationError;

/// Rejects strings made only of whitespace.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("Great game") // Ok
/// validate_not_blank(" \t ")       // Err
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must contain non-whitespace characters".into());
        return Err(err);
    }
    Ok(())
}

/// Usernames are 3 to 32 ASCII letters, digits, `_`, `-` or `.`.
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if !(3..=32).contains(&len) {
        let mut err = ValidationError::new("username_length");
        err.message = Some(format!("Username must be 3 to 32 characters (got {len})").into());
        return Err(err);
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        let mut err = ValidationError::new("username_format");
        err.message =
            Some("Username may only contain letters, digits, '_', '-' and '.'".into());
        return Err(err);
    }

    Ok(())
}
