//! Pricewatch Market Data Crate
//!
//! This crate talks to the exchange's REST API on behalf of the collector
//! while keeping every outbound request inside the provider's weight budget.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  Poll scheduler  |  (pricewatch-core)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |    MarketApi     | --> |     RateGate     |  (weighted fixed window)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |  BinanceClient   |  (exchangeInfo, avgPrice, ticker/price)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`RateGate`] - Shared weighted admission gate with throttle penalty
//! - [`MarketApi`] - Discovery and price operations used by the scheduler
//! - [`BinanceClient`] - The REST implementation of [`MarketApi`]
//! - [`Instrument`] - A discovered, pollable instrument
//! - [`MarketDataError`] - Classified request failures

pub mod errors;
pub mod gate;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use gate::{RateGate, RateGateConfig, WindowSnapshot};
pub use models::{Instrument, PriceKind};
pub use provider::binance::{ApiConfig, BinanceClient, DiscoveryFilter};
pub use provider::MarketApi;
