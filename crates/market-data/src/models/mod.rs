//! Market data models
//!
//! This module contains the provider-agnostic types handed to callers:
//! - `instrument` - A tradable instrument returned by discovery (Instrument)
//! - `price` - A raw price observation (PriceKind)

mod instrument;
mod price;

pub use instrument::Instrument;
pub use price::PriceKind;
