use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use pricewatch_market_data::MarketApi;

use super::config::SchedulerConfig;
use super::errors::SchedulerError;
use super::policy::{AlwaysRecover, FailurePolicy};
use super::task::{InstrumentTask, TaskContext};
use crate::errors::Result;
use crate::samples::SampleStore;

/// Summary of a scheduler run that ended by cancellation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    /// Instruments returned by discovery (one task each).
    pub instruments: usize,
    /// Tasks that reached `Stopped`.
    pub tasks_stopped: usize,
    /// Samples accepted by the store across all tasks.
    pub samples_stored: u64,
}

/// Runs one periodic polling task per discovered instrument.
///
/// All tasks share the same [`MarketApi`] (and therefore the same rate gate)
/// and the same [`SampleStore`].
pub struct PollScheduler {
    config: SchedulerConfig,
    api: Arc<dyn MarketApi>,
    store: Arc<dyn SampleStore>,
    policy: Arc<dyn FailurePolicy>,
}

impl PollScheduler {
    pub fn new(
        config: SchedulerConfig,
        api: Arc<dyn MarketApi>,
        store: Arc<dyn SampleStore>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            api,
            store,
            policy: Arc::new(AlwaysRecover),
        })
    }

    /// Replace the default store failure policy ([`AlwaysRecover`]).
    pub fn with_failure_policy(mut self, policy: Arc<dyn FailurePolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Discover instruments, then poll each of them until `cancel` fires.
    ///
    /// Returns once every task has stopped. If a task fails, the remaining
    /// tasks are cancelled and the first failure is returned once they have
    /// wound down.
    pub async fn start(&self, cancel: CancellationToken) -> std::result::Result<SchedulerReport, SchedulerError> {
        let instruments = match self.api.discover_instruments().await {
            Ok(instruments) => instruments,
            Err(err) if err.is_cancelled() => {
                info!("Shutdown requested during discovery");
                return Ok(SchedulerReport::default());
            }
            Err(err) => {
                error!(error = %err, "Instrument discovery failed");
                return Err(SchedulerError::Discovery(err));
            }
        };

        if instruments.is_empty() {
            warn!("Discovery returned no instruments to poll");
            return Ok(SchedulerReport::default());
        }

        info!(
            instruments = instruments.len(),
            poll_interval = ?self.config.poll_interval,
            price_kind = %self.config.price_kind,
            "Starting polling tasks"
        );

        // Child token: a fatal task cancels its siblings without touching the caller's token.
        let tasks_cancel = cancel.child_token();
        let samples_stored = Arc::new(AtomicU64::new(0));
        let ctx = TaskContext {
            api: Arc::clone(&self.api),
            store: Arc::clone(&self.store),
            policy: Arc::clone(&self.policy),
            cancel: tasks_cancel.clone(),
            samples_stored: Arc::clone(&samples_stored),
        };

        let mut tasks = JoinSet::new();
        for instrument in &instruments {
            let task = InstrumentTask::new(
                Arc::clone(&instrument.symbol),
                self.config.poll_interval,
                self.config.price_kind,
            );
            tasks.spawn(task.run(ctx.clone()));
        }

        let mut report = SchedulerReport {
            instruments: instruments.len(),
            ..SchedulerReport::default()
        };
        let mut first_failure: Option<SchedulerError> = None;

        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok(Ok(_)) => {
                    report.tasks_stopped += 1;
                    continue;
                }
                Ok(Err(err)) => err,
                Err(join_err) => SchedulerError::TaskPanicked(join_err.to_string()),
            };

            error!(error = %failure, "Polling task failed");
            if first_failure.is_none() {
                tasks_cancel.cancel();
                first_failure = Some(failure);
            }
        }

        report.samples_stored = samples_stored.load(Ordering::Relaxed);
        match first_failure {
            Some(err) => Err(err),
            None => {
                info!(
                    tasks = report.tasks_stopped,
                    samples = report.samples_stored,
                    "All polling tasks stopped"
                );
                Ok(report)
            }
        }
    }
}
