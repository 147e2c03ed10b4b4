//! Client configuration and the discovery filter policy.

use std::collections::BTreeSet;
use std::time::Duration;

use super::models::SymbolInfo;
use crate::models::Instrument;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
pub const EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";
pub const AVG_PRICE_PATH: &str = "/api/v3/avgPrice";
pub const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";

/// Request weight of /exchangeInfo without a symbol filter.
pub const DISCOVERY_WEIGHT: u64 = 20;
/// Request weight of a single-symbol price lookup.
pub const PRICE_WEIGHT: u64 = 2;

pub const DEFAULT_QUOTE_ASSET: &str = "USDT";

/// Asset codes whose symbols are never polled: fiat legs, other stablecoins,
/// leveraged tokens and delisted pairs.
pub const DEFAULT_ASSET_DENYLIST: &[&str] = &[
    "AUD", "BTC", "UP", "DOWN", "USDC", "BULL", "BEAR", "TUSD", "PLN", "ZAR", "TRY", "RUB", "NGN",
    "UAH", "GBP", "EUR", "IDRT", "TBRL", "TARS", "DCR", "USDS", "BIDR", "BKRW", "ABC", "FDUSD",
    "BUSD",
];

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which catalogue entries are worth polling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveryFilter {
    /// Substring every kept symbol must contain.
    pub quote_asset_marker: String,
    /// Substrings that exclude a symbol outright.
    pub asset_denylist: Vec<String>,
}

impl Default for DiscoveryFilter {
    fn default() -> Self {
        Self {
            quote_asset_marker: DEFAULT_QUOTE_ASSET.to_string(),
            asset_denylist: DEFAULT_ASSET_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DiscoveryFilter {
    /// True if the entry passes the marker, trading and denylist checks.
    ///
    /// A denylist hit wins over a marker hit.
    pub fn accepts(&self, info: &SymbolInfo) -> bool {
        info.is_spot_trading_allowed
            && info.symbol.contains(self.quote_asset_marker.as_str())
            && !self
                .asset_denylist
                .iter()
                .any(|banned| !banned.is_empty() && info.symbol.contains(banned.as_str()))
    }

    /// Apply the filter to a catalogue.
    ///
    /// Output is sorted by symbol with duplicates removed, independent of the
    /// catalogue's order.
    pub fn select<'a>(&self, catalogue: impl IntoIterator<Item = &'a SymbolInfo>) -> Vec<Instrument> {
        catalogue
            .into_iter()
            .filter(|info| self.accepts(info))
            .map(|info| {
                Instrument::new(
                    info.symbol.as_str(),
                    info.base_asset.as_str(),
                    info.quote_asset.as_str(),
                )
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Everything the exchange client needs to know about the remote API.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub exchange_info_path: String,
    pub avg_price_path: String,
    pub ticker_price_path: String,
    pub request_timeout: Duration,
    pub discovery: DiscoveryFilter,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            exchange_info_path: EXCHANGE_INFO_PATH.to_string(),
            avg_price_path: AVG_PRICE_PATH.to_string(),
            ticker_price_path: TICKER_PRICE_PATH.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            discovery: DiscoveryFilter::default(),
        }
    }
}

impl ApiConfig {
    /// Default configuration pointed at another host (e.g. a mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(symbol: &str, allowed: bool) -> SymbolInfo {
        SymbolInfo {
            symbol: symbol.to_string(),
            status: "TRADING".to_string(),
            base_asset: String::new(),
            quote_asset: String::new(),
            is_spot_trading_allowed: allowed,
        }
    }

    fn filter(marker: &str, denylist: &[&str]) -> DiscoveryFilter {
        DiscoveryFilter {
            quote_asset_marker: marker.to_string(),
            asset_denylist: denylist.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_denylist_takes_precedence_over_marker() {
        let filter = filter("USDT", &["BTC"]);
        assert!(!filter.accepts(&info("BTCUSDT", true)));
        assert!(filter.accepts(&info("ETHUSDT", true)));
    }

    #[test]
    fn test_requires_marker_and_trading_flag() {
        let filter = filter("USDT", &[]);
        assert!(!filter.accepts(&info("ETHBNB", true)));
        assert!(!filter.accepts(&info("ETHUSDT", false)));
    }

    #[test]
    fn test_default_denylist_excludes_leveraged_and_fiat() {
        let filter = DiscoveryFilter::default();
        assert!(!filter.accepts(&info("ETHUPUSDT", true)));
        assert!(!filter.accepts(&info("EURUSDT", true)));
        assert!(!filter.accepts(&info("USDCUSDT", true)));
        assert!(filter.accepts(&info("SOLUSDT", true)));
    }

    #[test]
    fn test_select_is_order_independent() {
        let filter = filter("USDT", &["BTC"]);
        let forward = vec![
            info("SOLUSDT", true),
            info("BTCUSDT", true),
            info("ETHUSDT", true),
            info("ADAUSDT", true),
            info("ETHUSDT", true),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = filter.select(&forward);
        let b = filter.select(&reversed);
        assert_eq!(a, b);

        let symbols: Vec<&str> = a.iter().map(|i| i.symbol.as_ref()).collect();
        assert_eq!(symbols, vec!["ADAUSDT", "ETHUSDT", "SOLUSDT"]);
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let config = ApiConfig::with_base_url("http://localhost:8080/");
        assert_eq!(
            config.url(TICKER_PRICE_PATH),
            "http://localhost:8080/api/v3/ticker/price"
        );
    }
}
