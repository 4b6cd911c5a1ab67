//! # Error Types
//!
//! Domain-specific error types for duka-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  duka-core errors (this file + config.rs)                              │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ConfigError      - Startup configuration failures                 │
//! │                                                                         │
//! │  duka-db errors (separate crate)                                       │
//! │  └── DbError          - Storage failures + the collapsed NotFound      │
//! │                                                                         │
//! │  Flow: ValidationError → caller-facing 422                             │
//! │        DbError::NotFound → caller-facing 404 (never 403, by design)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, value, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements. They are
/// raised before any scoping or storage work runs; a request that fails
/// validation never reaches the repositories.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error for a field.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::required("sku");
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 120,
        };
        assert_eq!(err.to_string(), "name must be at most 120 characters");
    }

    #[test]
    fn test_invalid_format_message() {
        let err = ValidationError::invalid_format("shop_id", "not a UUID");
        assert_eq!(err.to_string(), "shop_id has invalid format: not a UUID");
    }
}
