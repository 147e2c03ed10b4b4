//! Binance spot REST response models.
//!
//! Only the fields the collector reads are declared; serde ignores the rest.

use serde::Deserialize;

/// Response from /api/v3/exchangeInfo
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfoResponse {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub server_time: Option<i64>,
    pub symbols: Vec<SymbolInfo>,
}

/// Individual catalogue entry from /api/v3/exchangeInfo
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub base_asset: String,
    #[serde(default)]
    pub quote_asset: String,
    #[serde(default)]
    pub is_spot_trading_allowed: bool,
    // Note: precision, order types, permissions etc. exist but are not used
}

/// Response from /api/v3/avgPrice
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvgPriceResponse {
    /// Averaging window in minutes
    #[serde(default)]
    pub mins: Option<u32>,
    pub price: String,
    #[serde(default)]
    pub close_time: Option<i64>,
}

/// Response from /api/v3/ticker/price
#[derive(Debug, Deserialize)]
pub struct TickerPriceResponse {
    pub symbol: String,
    pub price: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_info_parsing() {
        let json = r#"{
            "timezone": "UTC",
            "serverTime": 1704067200000,
            "rateLimits": [],
            "symbols": [
                {
                    "symbol": "ETHUSDT",
                    "status": "TRADING",
                    "baseAsset": "ETH",
                    "baseAssetPrecision": 8,
                    "quoteAsset": "USDT",
                    "quotePrecision": 8,
                    "orderTypes": ["LIMIT", "MARKET"],
                    "isSpotTradingAllowed": true,
                    "isMarginTradingAllowed": true,
                    "permissions": ["SPOT"]
                }
            ]
        }"#;

        let response: ExchangeInfoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.timezone.as_deref(), Some("UTC"));
        assert_eq!(response.symbols.len(), 1);
        assert_eq!(response.symbols[0].symbol, "ETHUSDT");
        assert_eq!(response.symbols[0].base_asset, "ETH");
        assert!(response.symbols[0].is_spot_trading_allowed);
    }

    #[test]
    fn test_avg_price_parsing() {
        let json = r#"{"mins": 5, "price": "2301.45000000", "closeTime": 1704067200000}"#;

        let response: AvgPriceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.mins, Some(5));
        assert_eq!(response.price, "2301.45000000");
    }

    #[test]
    fn test_ticker_price_parsing() {
        let json = r#"{"symbol": "ETHUSDT", "price": "2302.10000000"}"#;

        let response: TickerPriceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.symbol, "ETHUSDT");
        assert_eq!(response.price, "2302.10000000");
    }
}
