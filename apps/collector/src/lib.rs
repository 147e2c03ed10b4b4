pub mod config;
pub mod main_lib;

pub use config::{Config, ConfigError, LogFormat};
pub use main_lib::{build_collector, init_tracing, open_store, Collector};
