//! # Error Types
//!
//! Domain-specific error types for construflow-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  construflow-core errors (this file)                                   │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Form input failures                            │
//! │                                                                         │
//! │  construflow-db errors (separate crate)                                │
//! │  └── DbError          - Storage read/write failures                    │
//! │                                                                         │
//! │  backoffice errors (app)                                               │
//! │  └── ApiError         - What the caller sees (code + message)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError                          │
//! │        DbError ─────────────────────► ApiError                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Client id is not registered.
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Ledger record id is not in the ledger.
    #[error("Ledger record not found: {0}")]
    LedgerRecordNotFound(String),

    /// Product is deactivated and cannot be sold.
    ///
    /// ## When This Occurs
    /// - Adding an inactive product to the cart
    #[error("Product {0} is not available for sale")]
    ProductInactive(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are the inline form errors: the operation is aborted and nothing
/// is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., unparsable amount or date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate product code or login).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A computed amount or quantity does not fit the fixed-point range.
    #[error("{field} is out of range")]
    OutOfRange { field: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }

    pub fn must_not_be_negative(field: impl Into<String>) -> Self {
        ValidationError::MustNotBeNegative {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn out_of_range(field: impl Into<String>) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ProductNotFound("42".to_string());
        assert_eq!(err.to_string(), "Product not found: 42");

        let err = CoreError::ProductInactive("7".to_string());
        assert_eq!(err.to_string(), "Product 7 is not available for sale");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("description").to_string(),
            "description is required"
        );
        assert_eq!(
            ValidationError::must_be_positive("amount").to_string(),
            "amount must be positive"
        );
        assert_eq!(
            ValidationError::invalid_format("amount", "not a number").to_string(),
            "amount has invalid format: not a number"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("code").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
