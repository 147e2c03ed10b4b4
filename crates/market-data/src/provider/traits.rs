//! Market API trait definition.
//!
//! This module defines the `MarketApi` trait implemented by the exchange
//! client and by test doubles.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Instrument, PriceKind};

/// Remote market data operations used by the poll scheduler.
///
/// Implementations must admit every request through the shared rate gate
/// before sending it.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Fetch the instrument catalogue and keep the instruments worth polling.
    ///
    /// The result is sorted by symbol and free of duplicates, so the same
    /// catalogue always yields the same universe.
    async fn discover_instruments(&self) -> Result<Vec<Instrument>, MarketDataError>;

    /// Fetch the rolling average price for `symbol` as the raw decimal string.
    async fn average_price(&self, symbol: &str) -> Result<String, MarketDataError>;

    /// Fetch the last traded price for `symbol` as the raw decimal string.
    async fn latest_price(&self, symbol: &str) -> Result<String, MarketDataError>;

    /// Fetch a price of the requested kind.
    async fn price(&self, symbol: &str, kind: PriceKind) -> Result<String, MarketDataError> {
        match kind {
            PriceKind::Latest => self.latest_price(symbol).await,
            PriceKind::Average => self.average_price(symbol).await,
        }
    }
}
