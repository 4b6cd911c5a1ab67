//! # Input Validation
//!
//! Caller-facing validation rules applied before scoping or storage work
//! runs. The repositories assume these checks already happened.

use uuid::Uuid;

use crate::error::{ValidationError, ValidationResult};
use crate::MAX_NAME_LENGTH;

// =============================================================================
// Page Input Normalization
// =============================================================================

/// Normalizes a raw requested page size.
///
/// Zero and negative sizes are treated as "absent" so the class default
/// applies; the per-class ceiling is enforced later by
/// [`crate::pagination::PaginationConfig::resolve_page_size`].
pub fn normalize_page_size(requested: Option<i64>) -> Option<u32> {
    match requested {
        Some(size) if size > 0 => Some(size.min(u32::MAX as i64) as u32),
        _ => None,
    }
}

/// Normalizes a raw requested page index to a 1-based page.
pub fn normalize_page(requested: Option<i64>) -> u32 {
    match requested {
        Some(page) if page > 0 => page.min(u32::MAX as i64) as u32,
        _ => 1,
    }
}

// =============================================================================
// Field Checks
// =============================================================================

/// Validates a display name (shop, branch, product).
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates that a value parses as a UUID.
pub fn validate_id(field: &str, value: &str) -> ValidationResult<()> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::invalid_format(field, "expected a UUID"))
}

/// Validates an amount in cents (must not be negative).
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_page_size() {
        assert_eq!(normalize_page_size(None), None);
        assert_eq!(normalize_page_size(Some(0)), None);
        assert_eq!(normalize_page_size(Some(-5)), None);
        assert_eq!(normalize_page_size(Some(25)), Some(25));
    }

    #[test]
    fn test_normalize_page() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some(0)), 1);
        assert_eq!(normalize_page(Some(-1)), 1);
        assert_eq!(normalize_page(Some(3)), 3);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Kariakoo Branch").is_ok());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(121)).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("shop_id", "0d2c9496-9e24-4b84-9dd0-d8bd2d3d0f6a").is_ok());
        assert!(validate_id("shop_id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount_cents("total_cents", 0).is_ok());
        assert!(validate_amount_cents("total_cents", -1).is_err());
    }
}
