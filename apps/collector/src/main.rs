use pricewatch_collector::{build_collector, init_tracing, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        api = %config.api.base_url,
        table = %config.samples_table,
        limit = config.gate.limit,
        window = ?config.gate.window,
        poll_interval = ?config.scheduler.poll_interval,
        "Starting collector"
    );

    let collector = build_collector(&config).await?;
    let report = collector.run().await?;

    tracing::info!(
        instruments = report.instruments,
        samples = report.samples_stored,
        "Collector stopped"
    );
    Ok(())
}
