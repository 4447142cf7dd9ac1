//! # Validation Module
//!
//! Input validation for the back office forms.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command input (backoffice)                                   │
//! │  ├── Text parsing (Money::parse, Quantity::parse)                      │
//! │  └── Enum parsing (PaymentMethod, UnitOfMeasure, ...)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required / length rules on text fields                            │
//! │  └── Sign rules on prices, stock and amounts                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Domain builders (inventory, finance)                         │
//! │  └── Uniqueness against the current collection                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use construflow_core::validation::{validate_code, validate_password};
//!
//! validate_code("001").unwrap();
//! assert!(validate_password("123").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length for back office accounts.
pub const MIN_PASSWORD_LEN: usize = 6;

const MAX_CODE_LEN: usize = 20;
const MAX_NAME_LEN: usize = 200;
const MAX_LOGIN_LEN: usize = 50;
const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most 20 characters
/// - No whitespace inside the code
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::required("code"));
    }

    if code.chars().count() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if code.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format("code", "must not contain spaces"));
    }

    Ok(())
}

/// Validates a display name (product, client, user).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a login: non-empty, no whitespace, at most 50 characters.
pub fn validate_login(login: &str) -> ValidationResult<()> {
    let login = login.trim();

    if login.is_empty() {
        return Err(ValidationError::required("login"));
    }

    if login.chars().count() > MAX_LOGIN_LEN {
        return Err(ValidationError::TooLong {
            field: "login".to_string(),
            max: MAX_LOGIN_LEN,
        });
    }

    if login.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format("login", "must not contain spaces"));
    }

    Ok(())
}

/// Validates a new password. Only length is checked.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Trims a search query. Empty is allowed and matches everything.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Prices and limits may be zero, never negative.
pub fn validate_non_negative_money(field: &str, value: Money) -> ValidationResult<()> {
    if value.is_negative() {
        return Err(ValidationError::must_not_be_negative(field));
    }
    Ok(())
}

/// Stock levels entered in a form may be zero, never negative.
///
/// Stock can still go negative through sales; this only guards typed input.
pub fn validate_non_negative_quantity(field: &str, value: Quantity) -> ValidationResult<()> {
    if value.is_negative() {
        return Err(ValidationError::must_not_be_negative(field));
    }
    Ok(())
}

/// Ledger amounts must be strictly positive.
pub fn validate_amount(value: Money) -> ValidationResult<()> {
    if !value.is_positive() {
        return Err(ValidationError::must_be_positive("amount"));
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
    fn test_validate_code() {
        assert!(validate_code("001").is_ok());
        assert!(validate_code(" 002 ").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("0 1").is_err());
        assert!(validate_code(&"9".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Cimento CP II 50kg").is_ok());
        assert_eq!(
            validate_name("name", "  ").unwrap_err(),
            ValidationError::required("name")
        );
        assert!(validate_name("name", &"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_login() {
        assert!(validate_login("admin").is_ok());
        assert!(validate_login("").is_err());
        assert!(validate_login("jo ao").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert_eq!(
            validate_password("12345").unwrap_err(),
            ValidationError::TooShort {
                field: "password".to_string(),
                min: MIN_PASSWORD_LEN
            }
        );
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  cim ").unwrap(), "cim");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_numeric_validators() {
        assert!(validate_non_negative_money("price", Money::zero()).is_ok());
        assert!(validate_non_negative_money("price", Money::from_cents(-1)).is_err());

        assert!(validate_non_negative_quantity("stock", Quantity::zero()).is_ok());
        assert!(validate_non_negative_quantity("stock", Quantity::from_milli(-1)).is_err());

        assert!(validate_amount(Money::from_cents(1)).is_ok());
        assert!(validate_amount(Money::zero()).is_err());
    }
}
