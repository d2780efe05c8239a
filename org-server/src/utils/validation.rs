//! Input validation helpers
//!
//! Turn raw request fields into their stored form, or an [`AppError`]
//! carrying the offending field name in `details.field`.

use shared::validation::{self, NationalIdError};

use crate::utils::{AppError, ErrorCode};

/// Employee and department names
pub const MAX_NAME_LEN: usize = 200;

/// Validate that a required string is non-empty and within the length limit.
///
/// Returns the trimmed value.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_field(
            ErrorCode::RequiredField,
            field,
            format!("{field} must not be empty"),
        ));
    }
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(AppError::invalid_field(
            ErrorCode::ValueOutOfRange,
            field,
            format!("{field} is too long ({len} chars, max {max_len})"),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_name(value: &str) -> Result<String, AppError> {
    validate_required_text(value, "name", MAX_NAME_LEN)
}

/// Checksum-validate a national ID and return its 11-digit form
pub fn validate_national_id(value: &str) -> Result<String, AppError> {
    validation::normalize_national_id(value).map_err(|e| {
        let message = match e {
            NationalIdError::Length(_) => e.to_string(),
            NationalIdError::RepeatedDigits | NationalIdError::CheckDigits => {
                "Invalid national ID".to_string()
            }
        };
        AppError::invalid_field(ErrorCode::InvalidNationalId, "national_id", message)
    })
}

/// Format-validate a secondary ID; blank input means "no secondary ID"
pub fn validate_secondary_id(value: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    validation::normalize_secondary_id(value).map_err(|e| {
        AppError::invalid_field(ErrorCode::InvalidSecondaryId, "secondary_id", e.to_string())
    })
}
