//! Price samples produced by the poll scheduler.
//!
//! - [`model`] - The immutable `PriceSample` value
//! - [`store`] - The `SampleStore` persistence trait

pub mod model;
pub mod store;

pub use model::PriceSample;
pub use store::SampleStore;
