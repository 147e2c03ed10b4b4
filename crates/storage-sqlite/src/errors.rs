//! Storage-specific error types for SQLite operations.
//!
//! This module wraps Diesel and r2d2 errors and converts them to the
//! database-agnostic error types defined in `pricewatch_core`.

use diesel::result::Error as DieselError;
use pricewatch_core::errors::{DatabaseError, Error};
use thiserror::Error;

/// Storage-specific errors that wrap Diesel, r2d2 and filesystem types.
///
/// These errors are internal to the storage layer and are converted to
/// `pricewatch_core::Error` before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored row is malformed: {0}")]
    MalformedRow(String),

    #[error("Core error: {0}")]
    CoreError(String),
}

/// Convert core Error to StorageError (for write_actor transaction wrapper)
impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::CoreError(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
            }
            StorageError::PoolError(e) => {
                Error::Database(DatabaseError::PoolCreationFailed(e.to_string()))
            }
            StorageError::QueryFailed(e) => {
                Error::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            StorageError::Io(e) => Error::Database(DatabaseError::ConnectionFailed(e.to_string())),
            StorageError::MalformedRow(e) => Error::Database(DatabaseError::Internal(e)),
            // Already a stringified core error
            StorageError::CoreError(e) => Error::Database(DatabaseError::Internal(e)),
        }
    }
}

/// Extension trait for converting Diesel and r2d2 results to core results.
pub trait IntoCore<T> {
    fn into_core(self) -> pricewatch_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> pricewatch_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> pricewatch_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_failures_surface_as_database_errors() {
        let err: Error = StorageError::QueryFailed(DieselError::NotFound).into();
        assert!(err.is_persistence());
        assert!(matches!(err, Error::Database(DatabaseError::QueryFailed(_))));
    }

    #[test]
    fn test_core_errors_round_trip_through_the_writer() {
        let core = Error::Database(DatabaseError::InvalidTable("1abc".to_string()));
        let err: Error = StorageError::from(core).into();
        match err {
            Error::Database(DatabaseError::Internal(message)) => {
                assert!(message.contains("1abc"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
