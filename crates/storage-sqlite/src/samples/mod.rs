//! SQLite persistence for price samples.

mod model;
mod repository;

pub use model::{SampleRowDB, SampleTable, DEFAULT_SAMPLES_TABLE};
pub use repository::SqliteSampleStore;
