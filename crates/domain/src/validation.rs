// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Lowest value accepted on any 1–5 scale (probability, severity, rating).
pub const SCALE_MIN: u8 = 1;
/// Highest value accepted on any 1–5 scale.
pub const SCALE_MAX: u8 = 5;

/// Validates that a required text field is present.
///
/// Whitespace-only values count as missing.
///
/// # Errors
///
/// Returns `DomainError::MissingField` if the value is blank.
pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField { field });
    }
    Ok(())
}

/// Validates that a value lies on the 1–5 scale.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` if the value is outside `[1, 5]`.
pub fn validate_scale(field: &'static str, value: u8) -> Result<(), DomainError> {
    if !(SCALE_MIN..=SCALE_MAX).contains(&value) {
        return Err(DomainError::InvalidInput {
            field,
            message: format!("must be between {SCALE_MIN} and {SCALE_MAX}, got {value}"),
        });
    }
    Ok(())
}

/// Validates that a record code is not already in use.
///
/// Codes are compared after trimming; comparison is case-sensitive.
///
/// This function is pure and has no side effects.
///
/// # Arguments
///
/// * `entity` - The kind of record, used in the error
/// * `code` - The candidate code
/// * `existing_codes` - Codes already persisted for this kind of record
///
/// # Errors
///
/// Returns `DomainError::DuplicateCode` if the code is already taken.
pub fn validate_code_unique<S: AsRef<str>>(
    entity: &'static str,
    code: &str,
    existing_codes: &[S],
) -> Result<(), DomainError> {
    let candidate: &str = code.trim();
    if existing_codes
        .iter()
        .any(|existing| existing.as_ref().trim() == candidate)
    {
        return Err(DomainError::DuplicateCode {
            entity,
            code: candidate.to_string(),
        });
    }
    Ok(())
}
