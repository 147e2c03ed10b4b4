//! Poll scheduler.
//!
//! On start the scheduler runs one discovery call, then spawns one task per
//! instrument. Every task polls once immediately and then on a fixed period,
//! sharing the market API's rate gate and the sample store with its siblings.
//!
//! ```text
//! PollScheduler::start
//!       │ discover_instruments (weight 20)
//!       ▼
//! InstrumentTask × N ──► MarketApi::price (weight 2) ──► SampleStore::insert_sample
//! ```
//!
//! Task lifecycle: `Idle → Polling → {Stopped | Failed}`. Cancellation is a
//! single token shared by all tasks; a fatal task failure cancels the rest.

mod config;
mod errors;
mod policy;
mod service;
mod task;


pub use config::{SchedulerConfig, DEFAULT_POLL_INTERVAL};
pub use errors::SchedulerError;
pub use policy::{AlwaysRecover, FailureAction, FailurePolicy, MaxConsecutiveFailures};
pub use service::{PollScheduler, SchedulerReport};
pub use task::TaskState;
