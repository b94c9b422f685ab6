//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits live here.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: driver, client, product, expense label
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a money amount is finite and non-negative
pub fn validate_money(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Validate a money amount is finite and strictly positive
pub fn validate_positive_money(value: f64, field: &str) -> Result<(), AppError> {
    validate_money(value, field)?;
    if value <= 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be positive, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank_and_oversized() {
        assert!(validate_required_text("Anna", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn money_guards() {
        assert!(validate_money(0.0, "amount").is_ok());
        assert!(validate_money(-1.0, "amount").is_err());
        assert!(validate_money(f64::NAN, "amount").is_err());
        assert!(validate_positive_money(0.0, "amount").is_err());
        assert!(validate_positive_money(12.5, "amount").is_ok());
    }
}
