//! Custom error types for ledgerdash
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for ledgerdash operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Budget-related errors
    #[error("Budget error: {0}")]
    Budget(String),

    /// A single remote call failed; eligible for retry
    #[error("Store error on '{table}': {message}")]
    Store { table: String, message: String },

    /// A remote call kept failing until the retry policy gave up
    #[error("Store call on '{table}' failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        table: String,
        attempts: u32,
        message: String,
    },

    /// A mutation needed a signed-in principal and there was none
    #[error("Not authenticated: sign in before changing budget data")]
    Unauthenticated,

    /// Category hierarchy deeper than one level
    #[error("Category '{category}' cannot nest under '{parent}': only one level of nesting is supported")]
    Nesting { category: String, parent: String },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl LedgerError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budget limits
    pub fn budget_limit_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget limit",
            identifier: identifier.into(),
        }
    }

    /// Create a store error for a table
    pub fn store(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the retry policy may try the call again
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store { .. })
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for ledgerdash operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::category_not_found("Groceries");
        assert_eq!(err.to_string(), "Category not found: Groceries");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_retries_exhausted_display() {
        let err = LedgerError::RetriesExhausted {
            table: "transactions".into(),
            attempts: 3,
            message: "timeout".into(),
        };
        assert_eq!(
            err.to_string(),
            "Store call on 'transactions' failed after 3 attempts: timeout"
        );
    }

    #[test]
    fn test_only_store_errors_are_transient() {
        assert!(LedgerError::store("categories", "connection reset").is_transient());
        assert!(!LedgerError::Unauthenticated.is_transient());
        assert!(!LedgerError::Validation("bad".into()).is_transient());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LedgerError = io_err.into();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
