//! Price sample domain model.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// One successful observation of an instrument's price.
///
/// Serialized as the persisted sample document
/// `{symbol, price, timestamp}` with `price` as a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    pub symbol: String,
    pub price: Decimal,
    #[serde(rename = "timestamp")]
    pub observed_at: DateTime<Utc>,
}

impl PriceSample {
    pub fn new(symbol: impl Into<String>, price: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            observed_at,
        }
    }

    /// Build a sample from the raw decimal string an endpoint returned.
    ///
    /// Rejects strings that are not decimals and negative prices.
    pub fn parse(symbol: impl Into<String>, raw_price: &str, observed_at: DateTime<Utc>) -> Result<Self> {
        let price = Decimal::from_str(raw_price.trim())?;
        if price.is_sign_negative() {
            return Err(ValidationError::InvalidInput(format!("negative price '{}'", raw_price)).into());
        }
        Ok(Self::new(symbol, price.normalize(), observed_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_exchange_price_string() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let sample = PriceSample::parse("ETHUSDT", "2302.10000000", at).unwrap();

        assert_eq!(sample.symbol, "ETHUSDT");
        assert_eq!(sample.price, dec!(2302.1));
        assert_eq!(sample.observed_at, at);
    }

    #[test]
    fn test_parse_rejects_garbage_and_negative_prices() {
        let at = Utc::now();
        assert!(PriceSample::parse("ETHUSDT", "", at).is_err());
        assert!(PriceSample::parse("ETHUSDT", "n/a", at).is_err());
        assert!(PriceSample::parse("ETHUSDT", "-1.5", at).is_err());
    }

    #[test]
    fn test_serializes_as_sample_document() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
        let sample = PriceSample::new("ETHUSDT", dec!(2302.1), at);

        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(value["symbol"], "ETHUSDT");
        assert_eq!(value["price"].as_f64(), Some(2302.1));
        assert_eq!(value["timestamp"], "2024-01-01T12:30:00Z");
    }
}
