//! Pricewatch Core - polling engine, sample model and storage traits.
//!
//! This crate drives the periodic price collection. It is database-agnostic
//! and defines the [`SampleStore`] trait implemented by the `storage-sqlite`
//! crate.

pub mod errors;
pub mod samples;
pub mod scheduler;

pub use samples::{PriceSample, SampleStore};
pub use scheduler::{
    AlwaysRecover, FailureAction, FailurePolicy, MaxConsecutiveFailures, PollScheduler,
    SchedulerConfig, SchedulerError, SchedulerReport,
};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
