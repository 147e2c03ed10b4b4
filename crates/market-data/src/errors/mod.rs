//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which tells a polling loop whether waiting for its next tick can help.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The request never produced an HTTP response (DNS, connect, TLS, reset).
    #[error("Transport error on {endpoint}: {message}")]
    Transport {
        /// The endpoint path that was being called
        endpoint: String,
        /// The underlying transport failure
        message: String,
    },

    /// The request to the endpoint timed out.
    #[error("Timeout: {endpoint}")]
    Timeout {
        /// The endpoint path that timed out
        endpoint: String,
    },

    /// The endpoint answered HTTP 429.
    /// The rate gate has already been penalized when this is returned.
    #[error("Throttled by {endpoint}")]
    Throttled {
        /// The endpoint path that throttled the request
        endpoint: String,
    },

    /// The endpoint answered with any other non-success status.
    #[error("HTTP {status} from {endpoint}: {body}")]
    HttpStatus {
        /// The endpoint path that was being called
        endpoint: String,
        /// The numeric HTTP status code
        status: u16,
        /// The (possibly truncated) response body
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to parse response from {endpoint}: {message}")]
    Parse {
        /// The endpoint path whose body was malformed
        endpoint: String,
        /// Description of the decoding failure
        message: String,
    },

    /// The caller was waiting for admission when shutdown was requested.
    #[error("Request cancelled before admission")]
    Cancelled,

    /// A configuration value was rejected at construction time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricewatch_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::Throttled { endpoint: "/api/v3/ticker/price".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::NextTick);
    ///
    /// let error = MarketDataError::InvalidConfig("limit must be positive".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Transport { .. }
            | Self::Timeout { .. }
            | Self::Throttled { .. }
            | Self::HttpStatus { .. }
            | Self::Parse { .. } => RetryClass::NextTick,

            Self::Cancelled | Self::InvalidConfig(_) => RetryClass::Never,
        }
    }

    /// True when the endpoint reported that the caller exceeded its rate.
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    /// True when the error only reflects a shutdown in progress.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
