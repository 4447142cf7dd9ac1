//! # API Error Type
//!
//! Unified error type for back office commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in ConstruFlow                            │
//! │                                                                         │
//! │  Command Function: Result<T, ApiError>                                 │
//! │         │                                                               │
//! │         ├── ValidationError ─────────► VALIDATION_ERROR (form message)  │
//! │         ├── CoreError::*NotFound ────► NOT_FOUND                        │
//! │         ├── DbError ─────────────────► STORAGE_ERROR (details logged)   │
//! │         ├── bad login / password ────► AUTH_FAILED                      │
//! │         └── no users yet ────────────► SETUP_REQUIRED                   │
//! │                                                                         │
//! │  Front end / CLI shows `message`, branches on `code`.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage details never reach the caller: they are logged with `error!`
//! and replaced by a generic message.

use serde::Serialize;
use thiserror::Error;

use construflow_core::{CoreError, ValidationError};
use construflow_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 42"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed; nothing was written
    ValidationError,

    /// Storage read or write failed
    StorageError,

    /// Unknown login or wrong password
    AuthFailed,

    /// Account exists but is deactivated
    AccountDisabled,

    /// No session: log in first
    NotAuthenticated,

    /// No users exist yet: run setup first
    SetupRequired,

    /// Setup attempted when users already exist
    AlreadyInitialized,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn invalid_credentials() -> Self {
        ApiError::new(ErrorCode::AuthFailed, "Invalid login or password")
    }

    pub fn account_disabled() -> Self {
        ApiError::new(ErrorCode::AccountDisabled, "This account is disabled")
    }

    pub fn not_authenticated() -> Self {
        ApiError::new(ErrorCode::NotAuthenticated, "Not logged in")
    }

    pub fn setup_required() -> Self {
        ApiError::new(
            ErrorCode::SetupRequired,
            "No users exist yet: create the administrator account first",
        )
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Corrupt { key, message } => {
                tracing::error!(key = %key, "Corrupt collection: {}", message);
                ApiError::new(
                    ErrorCode::StorageError,
                    format!("Stored {} data is unreadable", key),
                )
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database migration failed")
            }
            DbError::WriteFailed(e) => {
                tracing::error!("Write failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Could not save changes")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::StorageError, "Database pool exhausted")
            }
            other => {
                tracing::error!("Storage error: {}", other);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::ClientNotFound(id) => ApiError::not_found("Client", &id),
            CoreError::LedgerRecordNotFound(id) => ApiError::not_found("Ledger record", &id),
            CoreError::ProductInactive(id) => {
                ApiError::validation(format!("Product {} is not available for sale", id))
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Result type for commands.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_code_and_message() {
        let json = serde_json::to_value(ApiError::not_found("Product", "42")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: 42");
    }

    #[test]
    fn test_storage_details_are_hidden() {
        let err: ApiError = DbError::WriteFailed("disk I/O error at page 7".to_string()).into();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(!err.message.contains("page 7"));
    }

    #[test]
    fn test_core_errors_map() {
        let err: ApiError = CoreError::LedgerRecordNotFound("FIN-1".to_string()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ApiError = ValidationError::required("description").into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "description is required");
    }
}
