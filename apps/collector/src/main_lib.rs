use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use pricewatch_core::{PollScheduler, SampleStore, SchedulerReport};
use pricewatch_market_data::{BinanceClient, MarketApi, RateGate};
use pricewatch_storage_sqlite::{create_pool, db, spawn_writer, SqliteSampleStore};

use crate::config::{Config, LogFormat};

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

/// Opens the database, starts the writer and prepares the samples table.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<SqliteSampleStore>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = create_pool(&db_path)?;
    let writer = spawn_writer((*pool).clone());
    let store = SqliteSampleStore::open(pool, writer, config.samples_table.clone()).await?;
    Ok(Arc::new(store))
}

/// Everything a collector run needs, wired together.
pub struct Collector {
    pub gate: Arc<RateGate>,
    pub scheduler: PollScheduler,
    pub shutdown: CancellationToken,
}

pub async fn build_collector(config: &Config) -> anyhow::Result<Collector> {
    let shutdown = CancellationToken::new();

    let gate = Arc::new(RateGate::new(config.gate.clone(), shutdown.clone())?);
    let api: Arc<dyn MarketApi> = Arc::new(BinanceClient::new(config.api.clone(), Arc::clone(&gate)));
    let store: Arc<dyn SampleStore> = open_store(config).await?;

    let mut scheduler = PollScheduler::new(config.scheduler.clone(), api, store)?;
    if let Some(policy) = config.max_store_failures {
        tracing::info!(max = policy.max, "Store failures escalate after consecutive rejections");
        scheduler = scheduler.with_failure_policy(Arc::new(policy));
    }

    Ok(Collector {
        gate,
        scheduler,
        shutdown,
    })
}

impl Collector {
    /// Runs until a shutdown signal arrives or the scheduler fails.
    pub async fn run(self) -> anyhow::Result<SchedulerReport> {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.cancel();
        });

        let report = self.scheduler.start(self.shutdown.clone()).await;
        // Unblocks anything still parked on the gate
        self.shutdown.cancel();

        let window = self.gate.snapshot();
        tracing::debug!(
            consumed = window.consumed,
            limit = window.limit,
            "Final rate window"
        );
        Ok(report?)
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
