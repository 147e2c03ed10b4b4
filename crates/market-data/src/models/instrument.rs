use std::fmt;
use std::sync::Arc;

/// A tradable instrument kept by discovery.
///
/// Ordered and compared by symbol only, so a discovered universe sorts and
/// de-duplicates on the identifier the endpoints are queried with.
#[derive(Clone, Debug)]
pub struct Instrument {
    /// Exchange symbol, e.g. "ETHUSDT".
    pub symbol: Arc<str>,
    /// Base asset code, e.g. "ETH".
    pub base_asset: String,
    /// Quote asset code, e.g. "USDT".
    pub quote_asset: String,
}

impl Instrument {
    pub fn new(symbol: impl Into<Arc<str>>, base_asset: impl Into<String>, quote_asset: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            base_asset: base_asset.into(),
            quote_asset: quote_asset.into(),
        }
    }
}

impl PartialEq for Instrument {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Instrument {}

impl PartialOrd for Instrument {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instrument {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.symbol.cmp(&other.symbol)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruments_compare_by_symbol() {
        let a = Instrument::new("ETHUSDT", "ETH", "USDT");
        let b = Instrument::new("ETHUSDT", "", "");
        let c = Instrument::new("ADAUSDT", "ADA", "USDT");

        assert_eq!(a, b);
        assert!(c < a);
        assert_eq!(a.to_string(), "ETHUSDT");
    }
}
