//! One polling loop bound to a single instrument.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use pricewatch_market_data::{MarketApi, PriceKind, RetryClass};

use super::errors::SchedulerError;
use super::policy::{FailureAction, FailurePolicy};
use crate::errors::Error;
use crate::samples::{PriceSample, SampleStore};

/// Lifecycle of an instrument task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Polling,
    Stopped,
    Failed,
}

/// Collaborators shared by every task of one scheduler run.
#[derive(Clone)]
pub(crate) struct TaskContext {
    pub api: Arc<dyn MarketApi>,
    pub store: Arc<dyn SampleStore>,
    pub policy: Arc<dyn FailurePolicy>,
    pub cancel: CancellationToken,
    pub samples_stored: Arc<AtomicU64>,
}

/// Result of a single poll.
enum PollOutcome {
    Stored,
    Skipped,
    Cancelled,
    StoreFailed(Error),
    Fatal(Error),
}

/// Immutable description of one instrument's polling loop.
pub(crate) struct InstrumentTask {
    symbol: Arc<str>,
    poll_interval: Duration,
    price_kind: PriceKind,
    state: TaskState,
}

impl InstrumentTask {
    pub fn new(symbol: Arc<str>, poll_interval: Duration, price_kind: PriceKind) -> Self {
        Self {
            symbol,
            poll_interval,
            price_kind,
            state: TaskState::Idle,
        }
    }

    fn transition(&mut self, next: TaskState) {
        if self.state != next {
            trace!(symbol = %self.symbol, from = ?self.state, to = ?next, "Task state change");
            self.state = next;
        }
    }

    /// Poll immediately, then once per interval, until cancelled or failed.
    ///
    /// Returns the final state (`Stopped`) or the fatal error (`Failed`).
    pub async fn run(mut self, ctx: TaskContext) -> Result<TaskState, SchedulerError> {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_store_failures: u32 = 0;

        loop {
            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.transition(TaskState::Polling);

            match self.poll_once(&ctx).await {
                PollOutcome::Stored => consecutive_store_failures = 0,
                PollOutcome::Skipped => {}
                PollOutcome::Cancelled => break,
                PollOutcome::StoreFailed(err) => {
                    consecutive_store_failures = consecutive_store_failures.saturating_add(1);
                    let action =
                        ctx.policy
                            .on_store_failure(&self.symbol, consecutive_store_failures, &err);
                    if action == FailureAction::Fatal {
                        return Err(self.fail(err));
                    }
                }
                PollOutcome::Fatal(err) => return Err(self.fail(err)),
            }
        }

        self.transition(TaskState::Stopped);
        debug!(symbol = %self.symbol, "Stopping polling task");
        Ok(self.state)
    }

    fn fail(&mut self, source: Error) -> SchedulerError {
        self.transition(TaskState::Failed);
        SchedulerError::TaskFailed {
            symbol: self.symbol.to_string(),
            source,
        }
    }

    async fn poll_once(&self, ctx: &TaskContext) -> PollOutcome {
        // Also abandons a fetch still parked in the rate gate.
        let fetched = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return PollOutcome::Cancelled,
            fetched = ctx.api.price(&self.symbol, self.price_kind) => fetched,
        };

        let raw_price = match fetched {
            Ok(price) => price,
            Err(err) if err.is_cancelled() => return PollOutcome::Cancelled,
            Err(err) => {
                if err.retry_class() == RetryClass::Never {
                    return PollOutcome::Fatal(err.into());
                }
                warn!(
                    symbol = %self.symbol,
                    throttled = err.is_throttled(),
                    error = %err,
                    "Price poll failed, retrying next tick"
                );
                return PollOutcome::Skipped;
            }
        };

        let sample = match PriceSample::parse(self.symbol.as_ref(), &raw_price, Utc::now()) {
            Ok(sample) => sample,
            Err(err) => {
                warn!(symbol = %self.symbol, raw_price = %raw_price, error = %err, "Unparseable price, retrying next tick");
                return PollOutcome::Skipped;
            }
        };

        match ctx.store.insert_sample(&sample).await {
            Ok(()) => {
                ctx.samples_stored.fetch_add(1, Ordering::Relaxed);
                trace!(symbol = %self.symbol, price = %sample.price, "Stored sample");
                PollOutcome::Stored
            }
            Err(err) => {
                warn!(symbol = %self.symbol, error = %err, "Failed to store sample");
                PollOutcome::StoreFailed(err)
            }
        }
    }
}
