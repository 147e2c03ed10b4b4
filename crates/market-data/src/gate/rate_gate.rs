//! Weighted fixed-window admission gate.
//!
//! Every outbound request reserves its provider-assigned weight against a
//! single shared window before it is sent. When the window budget is used up
//! callers wait until the window expires; the caller that resets the window
//! wakes every other waiter.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::MarketDataError;

/// Default window budget: request weight allowed per minute.
pub const DEFAULT_REQUEST_LIMIT: u64 = 5900;

/// Default window length.
pub const DEFAULT_REQUEST_WINDOW: Duration = Duration::from_secs(60);

/// Weight added to the window when the endpoint answers 429.
/// Large enough to exhaust any sane limit until the window resets.
pub const THROTTLE_PENALTY_WEIGHT: u64 = 1_000_000;

/// The process-wide window state. Only ever touched under the gate's lock.
#[derive(Debug)]
struct RateWindow {
    limit: u64,
    duration: Duration,
    consumed: u64,
    started_at: Instant,
}

impl RateWindow {
    fn new(limit: u64, duration: Duration) -> Self {
        Self {
            limit,
            duration,
            consumed: 0,
            started_at: Instant::now(),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }

    fn is_exhausted(&self) -> bool {
        self.consumed >= self.limit
    }

    fn reset(&mut self, now: Instant) {
        self.consumed = 0;
        self.started_at = now;
    }

    fn resets_at(&self) -> Instant {
        self.started_at + self.duration
    }
}

/// Rate gate configuration.
#[derive(Clone, Debug)]
pub struct RateGateConfig {
    /// Maximum cumulative weight admitted per window.
    pub limit: u64,
    /// Window length.
    pub window: Duration,
}

impl Default for RateGateConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_REQUEST_LIMIT,
            window: DEFAULT_REQUEST_WINDOW,
        }
    }
}

/// Point-in-time view of the current window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub limit: u64,
    pub consumed: u64,
    pub remaining: u64,
    pub elapsed: Duration,
}

/// Weighted fixed-window admission gate shared by every request issuer.
///
/// Admission order among waiters is unspecified.
pub struct RateGate {
    window: Mutex<RateWindow>,
    /// Signalled on every window reset.
    reset_notify: Notify,
    shutdown: CancellationToken,
}

impl RateGate {
    /// Create a gate. `shutdown` aborts any caller still waiting for admission.
    ///
    /// Fails when `limit` is zero or the window is empty.
    pub fn new(config: RateGateConfig, shutdown: CancellationToken) -> Result<Self, MarketDataError> {
        if config.limit == 0 {
            return Err(MarketDataError::InvalidConfig(
                "request limit must be greater than zero".to_string(),
            ));
        }
        if config.window.is_zero() {
            return Err(MarketDataError::InvalidConfig(
                "request window must be longer than zero".to_string(),
            ));
        }

        Ok(Self {
            window: Mutex::new(RateWindow::new(config.limit, config.window)),
            reset_notify: Notify::new(),
            shutdown,
        })
    }

    /// Lock the window, recovering from poison if necessary.
    ///
    /// The window holds plain counters, so a panic elsewhere cannot leave it
    /// half-updated.
    fn lock_window(&self) -> MutexGuard<'_, RateWindow> {
        self.window.lock().unwrap_or_else(|poisoned| {
            warn!("Rate gate window mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Reset an expired window, then reserve `weight` if the window is not exhausted.
    fn try_reserve(&self, window: &mut RateWindow, weight: u64, now: Instant) -> bool {
        if window.is_expired(now) {
            debug!(
                consumed = window.consumed,
                limit = window.limit,
                "Rate gate: window expired, resetting"
            );
            window.reset(now);
            self.reset_notify.notify_waiters();
        }

        if window.is_exhausted() {
            return false;
        }

        window.consumed = window.consumed.saturating_add(weight);
        true
    }

    /// Wait until the current window can take `weight`, then reserve it.
    ///
    /// A single admission may push the window past its limit (including a
    /// `weight` larger than the limit itself); everything after it waits for
    /// the next reset. Returns [`MarketDataError::Cancelled`] if shutdown is
    /// requested before admission.
    pub async fn admit(&self, weight: u64) -> Result<(), MarketDataError> {
        loop {
            if self.shutdown.is_cancelled() {
                return Err(MarketDataError::Cancelled);
            }

            // Registered before the lock is released so a reset in between still wakes us.
            let notified = self.reset_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let resets_at = {
                let mut window = self.lock_window();
                if self.try_reserve(&mut window, weight, Instant::now()) {
                    return Ok(());
                }
                window.resets_at()
            };

            debug!(weight, "Rate gate: window exhausted, waiting for reset");

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Err(MarketDataError::Cancelled),
                _ = &mut notified => {}
                _ = tokio::time::sleep_until(resets_at) => {}
            }
        }
    }

    /// Reserve `weight` without waiting.
    ///
    /// Returns true if the weight was admitted, false if the window is exhausted.
    pub fn try_admit(&self, weight: u64) -> bool {
        let mut window = self.lock_window();
        self.try_reserve(&mut window, weight, Instant::now())
    }

    /// Poison the current window after the endpoint reported throttling.
    ///
    /// An already expired window is reset first so the penalty always covers
    /// a full window.
    pub fn penalize(&self) {
        let mut window = self.lock_window();
        let now = Instant::now();
        if window.is_expired(now) {
            window.reset(now);
        }
        window.consumed = window.consumed.saturating_add(THROTTLE_PENALTY_WEIGHT);
        warn!(
            penalty = THROTTLE_PENALTY_WEIGHT,
            resets_in = ?window.resets_at().saturating_duration_since(now),
            "Rate gate: throttled by endpoint, blocking admissions until window reset"
        );
    }

    /// Current window counters.
    ///
    /// A window that has run out but not been reset yet reads as fresh.
    pub fn snapshot(&self) -> WindowSnapshot {
        let window = self.lock_window();
        let now = Instant::now();
        if window.is_expired(now) {
            return WindowSnapshot {
                limit: window.limit,
                consumed: 0,
                remaining: window.limit,
                elapsed: Duration::ZERO,
            };
        }
        WindowSnapshot {
            limit: window.limit,
            consumed: window.consumed,
            remaining: window.limit.saturating_sub(window.consumed),
            elapsed: now.saturating_duration_since(window.started_at),
        }
    }
}
