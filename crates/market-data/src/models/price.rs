use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which price endpoint a poll reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriceKind {
    /// Last traded price (`/ticker/price`).
    #[default]
    Latest,
    /// Rolling average price (`/avgPrice`).
    Average,
}

impl fmt::Display for PriceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Average => f.write_str("average"),
        }
    }
}

impl FromStr for PriceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" | "ticker" => Ok(Self::Latest),
            "average" | "avg" => Ok(Self::Average),
            other => Err(format!("unknown price kind '{}'", other)),
        }
    }
}
