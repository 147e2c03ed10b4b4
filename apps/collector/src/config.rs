use std::str::FromStr;
use std::time::Duration;

use pricewatch_core::{MaxConsecutiveFailures, SchedulerConfig};
use pricewatch_market_data::{ApiConfig, DiscoveryFilter, RateGateConfig};
use pricewatch_storage_sqlite::{SampleTable, DEFAULT_SAMPLES_TABLE};
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "./db/pricewatch.db";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: '{value}' is not a valid {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{key}: {reason}")]
    Rejected { key: &'static str, reason: String },
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Collector settings read from `PW_*` environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    pub db_path: String,
    pub samples_table: SampleTable,
    pub gate: RateGateConfig,
    pub api: ApiConfig,
    pub scheduler: SchedulerConfig,
    /// Consecutive store failures after which a task stops the collector.
    pub max_store_failures: Option<MaxConsecutiveFailures>,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = var("PW_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into());

        let table_name = var("PW_SAMPLES_TABLE").unwrap_or_else(|| DEFAULT_SAMPLES_TABLE.into());
        let samples_table =
            SampleTable::new(table_name).map_err(|e| ConfigError::Rejected {
                key: "PW_SAMPLES_TABLE",
                reason: e.to_string(),
            })?;

        let gate_defaults = RateGateConfig::default();
        let gate = RateGateConfig {
            limit: parse_or(
                "PW_REQUEST_LIMIT",
                var("PW_REQUEST_LIMIT"),
                gate_defaults.limit,
                "request weight",
            )?,
            window: Duration::from_secs(parse_or(
                "PW_REQUEST_WINDOW_SECS",
                var("PW_REQUEST_WINDOW_SECS"),
                gate_defaults.window.as_secs(),
                "number of seconds",
            )?),
        };
        if gate.limit == 0 {
            return Err(rejected("PW_REQUEST_LIMIT", "must be at least 1"));
        }
        if gate.window.is_zero() {
            return Err(rejected("PW_REQUEST_WINDOW_SECS", "must be at least 1"));
        }

        let mut discovery = DiscoveryFilter::default();
        if let Some(quote) = var("PW_QUOTE_ASSET") {
            discovery.quote_asset_marker = quote;
        }
        if let Some(denylist) = var("PW_ASSET_DENYLIST") {
            discovery.asset_denylist = denylist
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        let http_timeout_secs = parse_or(
            "PW_HTTP_TIMEOUT_SECS",
            var("PW_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
            "number of seconds",
        )?;
        if http_timeout_secs == 0 {
            return Err(rejected("PW_HTTP_TIMEOUT_SECS", "must be at least 1"));
        }
        let mut api = match var("PW_API_BASE_URL") {
            Some(url) => ApiConfig::with_base_url(url),
            None => ApiConfig::default(),
        };
        api.request_timeout = Duration::from_secs(http_timeout_secs);
        api.discovery = discovery;

        let scheduler_defaults = SchedulerConfig::default();
        let poll_interval_secs = parse_or(
            "PW_POLL_INTERVAL_SECS",
            var("PW_POLL_INTERVAL_SECS"),
            scheduler_defaults.poll_interval.as_secs(),
            "number of seconds",
        )?;
        if poll_interval_secs == 0 {
            return Err(rejected("PW_POLL_INTERVAL_SECS", "must be at least 1"));
        }
        let scheduler = SchedulerConfig {
            poll_interval: Duration::from_secs(poll_interval_secs),
            price_kind: parse_or(
                "PW_PRICE_SOURCE",
                var("PW_PRICE_SOURCE"),
                scheduler_defaults.price_kind,
                "price source (latest or average)",
            )?,
        };

        let max_store_failures = var("PW_MAX_STORE_FAILURES")
            .map(|raw| parse::<u32>("PW_MAX_STORE_FAILURES", raw, "failure count"))
            .transpose()?
            .map(|max| {
                if max == 0 {
                    Err(rejected("PW_MAX_STORE_FAILURES", "must be at least 1"))
                } else {
                    Ok(MaxConsecutiveFailures::new(max))
                }
            })
            .transpose()?;

        let log_format = match var("PW_LOG_FORMAT") {
            None => LogFormat::Text,
            Some(raw) if raw.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) => {
                return Err(ConfigError::Invalid {
                    key: "PW_LOG_FORMAT",
                    value: raw,
                    expected: "log format (text or json)",
                })
            }
        };

        Ok(Self {
            db_path,
            samples_table,
            gate,
            api,
            scheduler,
            max_store_failures,
            log_format,
        })
    }
}

fn rejected(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Rejected {
        key,
        reason: reason.to_string(),
    }
}

fn parse<T: FromStr>(key: &'static str, raw: String, expected: &'static str) -> Result<T, ConfigError> {
    match raw.parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) => Err(ConfigError::Invalid {
            key,
            value: raw,
            expected,
        }),
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    raw.map_or(Ok(default), |raw| parse(key, raw, expected))
}
