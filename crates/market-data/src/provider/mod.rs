//! Market API abstraction and the exchange implementation.
//!
//! This module contains:
//! - The `MarketApi` trait the scheduler polls through
//! - The Binance spot REST client, its configuration and discovery filter

mod traits;

pub mod binance;

// Re-exports
pub use traits::MarketApi;
