//! Sample storage trait.
//!
//! This module defines the persistence contract the poll scheduler writes
//! through. Implementations own their concurrency discipline: the scheduler
//! calls `insert_sample` from many tasks at once and never serializes writes
//! itself.

use async_trait::async_trait;

use super::model::PriceSample;
use crate::errors::Result;

/// Storage interface for price samples.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Durably persists one sample.
    ///
    /// Errors are reported as [`crate::Error::Database`]. Whether a failure
    /// stops the polling task is decided by the scheduler's failure policy.
    async fn insert_sample(&self, sample: &PriceSample) -> Result<()>;
}
