use thiserror::Error;

use pricewatch_market_data::MarketDataError;

use crate::errors::Error;

/// Terminal errors that stop the poll scheduler.
///
/// Recoverable poll and store failures never show up here; they are logged
/// inside their task and retried on the next tick.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Startup discovery failed, so there is no instrument universe to poll.
    #[error("Instrument discovery failed: {0}")]
    Discovery(#[source] MarketDataError),

    /// A task hit an error its failure policy classified as fatal.
    #[error("Polling task for {symbol} failed: {source}")]
    TaskFailed {
        symbol: String,
        #[source]
        source: Error,
    },

    /// A task panicked.
    #[error("Polling task panicked: {0}")]
    TaskPanicked(String),
}
