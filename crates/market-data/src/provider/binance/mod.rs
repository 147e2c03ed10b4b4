//! Binance spot market data client.
//!
//! This module provides the three calls the collector needs:
//! - Instrument discovery via /api/v3/exchangeInfo (weight 20)
//! - Average price via /api/v3/avgPrice (weight 2)
//! - Latest price via /api/v3/ticker/price (weight 2)
//!
//! Every call is admitted through the shared [`RateGate`] first. A 429 answer
//! poisons the gate's window before the error is returned.
//! API documentation: https://developers.binance.com/docs/binance-spot-api-docs/rest-api

mod config;
mod models;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::errors::MarketDataError;
use crate::gate::RateGate;
use crate::models::Instrument;
use crate::provider::MarketApi;

pub use config::{
    ApiConfig, DiscoveryFilter, AVG_PRICE_PATH, DEFAULT_ASSET_DENYLIST, DEFAULT_BASE_URL,
    DEFAULT_QUOTE_ASSET, DISCOVERY_WEIGHT, EXCHANGE_INFO_PATH, PRICE_WEIGHT, TICKER_PRICE_PATH,
};
pub use models::{AvgPriceResponse, ExchangeInfoResponse, SymbolInfo, TickerPriceResponse};

/// Longest error body kept in [`MarketDataError::HttpStatus`].
const MAX_ERROR_BODY_LEN: usize = 512;

/// Binance spot REST client guarded by a shared rate gate.
pub struct BinanceClient {
    client: Client,
    config: ApiConfig,
    gate: Arc<RateGate>,
}

impl BinanceClient {
    /// Create a client that admits all of its requests through `gate`.
    pub fn new(config: ApiConfig, gate: Arc<RateGate>) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            config,
            gate,
        }
    }

    /// The gate this client reserves request weight on.
    pub fn gate(&self) -> &Arc<RateGate> {
        &self.gate
    }

    /// Admit `weight`, GET `path` and decode the JSON body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        weight: u64,
        params: &[(&str, &str)],
    ) -> Result<T, MarketDataError> {
        self.gate.admit(weight).await?;

        let url = self.config.url(path);
        debug!(endpoint = path, weight, "Binance request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        endpoint: path.to_string(),
                    }
                } else {
                    MarketDataError::Transport {
                        endpoint: path.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            self.gate.penalize();
            return Err(MarketDataError::Throttled {
                endpoint: path.to_string(),
            });
        }

        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY_LEN {
                let cut = (0..=MAX_ERROR_BODY_LEN)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            warn!(endpoint = path, status = status.as_u16(), "Binance returned an error status");
            return Err(MarketDataError::HttpStatus {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::Transport {
                endpoint: path.to_string(),
                message: format!("Failed to read response: {}", e),
            })?;

        serde_json::from_str(&body).map_err(|e| MarketDataError::Parse {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl MarketApi for BinanceClient {
    async fn discover_instruments(&self) -> Result<Vec<Instrument>, MarketDataError> {
        let response: ExchangeInfoResponse = self
            .fetch(&self.config.exchange_info_path, DISCOVERY_WEIGHT, &[])
            .await?;

        let instruments = self.config.discovery.select(&response.symbols);
        info!(
            catalogue = response.symbols.len(),
            kept = instruments.len(),
            "Discovered instruments"
        );
        Ok(instruments)
    }

    async fn average_price(&self, symbol: &str) -> Result<String, MarketDataError> {
        let response: AvgPriceResponse = self
            .fetch(&self.config.avg_price_path, PRICE_WEIGHT, &[("symbol", symbol)])
            .await?;
        Ok(response.price)
    }

    async fn latest_price(&self, symbol: &str) -> Result<String, MarketDataError> {
        let response: TickerPriceResponse = self
            .fetch(&self.config.ticker_price_path, PRICE_WEIGHT, &[("symbol", symbol)])
            .await?;
        Ok(response.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::RateGateConfig;
    use crate::models::PriceKind;
    use serde_json::json;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, limit: u64) -> BinanceClient {
        let gate = RateGate::new(
            RateGateConfig {
                limit,
                window: Duration::from_secs(60),
            },
            CancellationToken::new(),
        )
        .unwrap();
        BinanceClient::new(ApiConfig::with_base_url(server.uri()), Arc::new(gate))
    }

    #[tokio::test]
    async fn test_discovery_filters_catalogue() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EXCHANGE_INFO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "timezone": "UTC",
                "serverTime": 1704067200000i64,
                "symbols": [
                    {"symbol": "BTCUSDT", "status": "TRADING", "baseAsset": "BTC", "quoteAsset": "USDT", "isSpotTradingAllowed": true},
                    {"symbol": "ETHUSDT", "status": "TRADING", "baseAsset": "ETH", "quoteAsset": "USDT", "isSpotTradingAllowed": true},
                    {"symbol": "SOLUSDT", "status": "BREAK", "baseAsset": "SOL", "quoteAsset": "USDT", "isSpotTradingAllowed": false},
                    {"symbol": "ETHBNB", "status": "TRADING", "baseAsset": "ETH", "quoteAsset": "BNB", "isSpotTradingAllowed": true},
                    {"symbol": "ADAUSDT", "status": "TRADING", "baseAsset": "ADA", "quoteAsset": "USDT", "isSpotTradingAllowed": true}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 5900);
        let instruments = client.discover_instruments().await.unwrap();

        let symbols: Vec<&str> = instruments.iter().map(|i| i.symbol.as_ref()).collect();
        assert_eq!(symbols, vec!["ADAUSDT", "ETHUSDT"]);
        assert_eq!(instruments[1].base_asset, "ETH");
        assert_eq!(client.gate().snapshot().consumed, DISCOVERY_WEIGHT);

        // Same catalogue, same universe
        let again = client.discover_instruments().await.unwrap();
        assert_eq!(instruments, again);
    }

    #[tokio::test]
    async fn test_latest_and_average_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TICKER_PRICE_PATH))
            .and(query_param("symbol", "ETHUSDT"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"symbol": "ETHUSDT", "price": "2302.10000000"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(AVG_PRICE_PATH))
            .and(query_param("symbol", "ETHUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"mins": 5, "price": "2301.45000000", "closeTime": 1704067200000i64}),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server, 5900);
        assert_eq!(client.latest_price("ETHUSDT").await.unwrap(), "2302.10000000");
        assert_eq!(
            client.price("ETHUSDT", PriceKind::Average).await.unwrap(),
            "2301.45000000"
        );
        assert_eq!(client.gate().snapshot().consumed, 2 * PRICE_WEIGHT);
    }

    #[tokio::test]
    async fn test_too_many_requests_penalizes_gate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TICKER_PRICE_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
            .mount(&server)
            .await;

        let client = client_for(&server, 5900);
        let err = client.latest_price("ETHUSDT").await.unwrap_err();

        assert!(err.is_throttled());
        // Window is poisoned: nothing else gets through until it resets
        assert!(!client.gate().try_admit(PRICE_WEIGHT));
        let blocked =
            tokio::time::timeout(Duration::from_millis(100), client.latest_price("BNBUSDT")).await;
        assert!(blocked.is_err());
    }

    #[tokio::test]
    async fn test_error_status_is_reported_without_penalty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(AVG_PRICE_PATH))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"code":-1121,"msg":"Invalid symbol."}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 5900);
        let err = client.average_price("NOPEUSDT").await.unwrap_err();

        match err {
            MarketDataError::HttpStatus { status, body, .. } => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid symbol."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(client.gate().try_admit(PRICE_WEIGHT));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TICKER_PRICE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, 5900);
        let err = client.latest_price("ETHUSDT").await.unwrap_err();
        assert!(matches!(err, MarketDataError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_transport_error() {
        let gate = RateGate::new(RateGateConfig::default(), CancellationToken::new()).unwrap();
        // Port 1 is never listening on the loopback interface in test environments
        let client = BinanceClient::new(
            ApiConfig::with_base_url("http://127.0.0.1:1"),
            Arc::new(gate),
        );

        let err = client.latest_price("ETHUSDT").await.unwrap_err();
        assert!(matches!(
            err,
            MarketDataError::Transport { .. } | MarketDataError::Timeout { .. }
        ));
    }
}
