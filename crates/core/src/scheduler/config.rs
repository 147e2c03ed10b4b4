use std::time::Duration;

use pricewatch_market_data::PriceKind;

use crate::errors::{Result, ValidationError};

/// Default period between two polls of the same instrument.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Poll scheduler settings, uniform across all instrument tasks.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    pub poll_interval: Duration,
    pub price_kind: PriceKind,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            price_kind: PriceKind::Latest,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(ValidationError::InvalidInput(
                "poll interval must be longer than zero".to_string(),
            )
            .into());
        }
        Ok(())
    }
}
