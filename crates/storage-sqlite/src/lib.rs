//! SQLite storage implementation for Pricewatch.
//!
//! This crate provides the database side of the collector using Diesel with
//! SQLite. It implements the `SampleStore` trait defined in `pricewatch-core`
//! and contains:
//! - Database initialization and connection pooling
//! - The single writer actor that serializes all writes
//! - The samples table model and repository
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist. The core crate is database-agnostic and works with traits.
//!
//! ```text
//!   PollScheduler tasks (core)
//!            │ insert_sample
//!            ▼
//!   SqliteSampleStore ──► WriteHandle ──► writer actor (one connection)
//!            │                                  │
//!            └── reads via r2d2 pool ──► SQLite DB (WAL)
//! ```

pub mod db;
pub mod errors;
pub mod samples;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, spawn_writer, DbConnection, DbPool, WriteHandle};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use samples::{SampleTable, SqliteSampleStore, DEFAULT_SAMPLES_TABLE};

// Re-export from pricewatch-core for convenience
pub use pricewatch_core::errors::{DatabaseError, Error, Result};
