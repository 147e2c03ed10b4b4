//! Core error types for the Pricewatch collector.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use thiserror::Error;

use pricewatch_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the collector.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True for failures reported by the sample store.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Error::Database(_))
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The configured table name cannot be used.
    #[error("Invalid table name: {0}")]
    InvalidTable(String),

    /// The single writer is gone (shut down or crashed).
    #[error("Database writer unavailable: {0}")]
    WriterUnavailable(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for configuration and parsed data.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_decimal_errors_become_validation_errors() {
        let err: Error = rust_decimal::Decimal::from_str("not-a-price")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Validation(ValidationError::DecimalParse(_))));
        assert!(!err.is_persistence());
    }

    #[test]
    fn test_database_errors_are_persistence_errors() {
        let err: Error = DatabaseError::QueryFailed("disk I/O error".to_string()).into();
        assert!(err.is_persistence());
        assert_eq!(
            err.to_string(),
            "Database operation failed: Database query failed: disk I/O error"
        );
    }
}
