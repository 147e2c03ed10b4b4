//! Escalation policy for store failures.
//!
//! A failed insert is recoverable by default. Deployments that would rather
//! stop than silently drop samples plug in a stricter policy.

use tracing::error;

use crate::errors::Error;

/// What a polling task does after its store rejected a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureAction {
    /// Log and keep polling on the regular schedule.
    Continue,
    /// Stop this task and surface the error from the scheduler.
    Fatal,
}

/// Decides whether a store failure ends a polling task.
pub trait FailurePolicy: Send + Sync {
    /// `consecutive_failures` counts this failure and resets after any stored sample.
    fn on_store_failure(&self, symbol: &str, consecutive_failures: u32, error: &Error) -> FailureAction;
}

/// Store failures never stop a task.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysRecover;

impl FailurePolicy for AlwaysRecover {
    fn on_store_failure(&self, _symbol: &str, _consecutive_failures: u32, _error: &Error) -> FailureAction {
        FailureAction::Continue
    }
}

/// A task fails once its store rejected `max` samples in a row.
#[derive(Clone, Copy, Debug)]
pub struct MaxConsecutiveFailures {
    pub max: u32,
}

impl MaxConsecutiveFailures {
    pub fn new(max: u32) -> Self {
        Self { max: max.max(1) }
    }
}

impl FailurePolicy for MaxConsecutiveFailures {
    fn on_store_failure(&self, symbol: &str, consecutive_failures: u32, error: &Error) -> FailureAction {
        if consecutive_failures >= self.max {
            error!(
                symbol,
                consecutive_failures,
                error = %error,
                "Store keeps rejecting samples, giving up on instrument"
            );
            FailureAction::Fatal
        } else {
            FailureAction::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DatabaseError;

    fn store_error() -> Error {
        DatabaseError::QueryFailed("database is locked".to_string()).into()
    }

    #[test]
    fn test_always_recover_never_escalates() {
        let policy = AlwaysRecover;
        assert_eq!(
            policy.on_store_failure("ETHUSDT", u32::MAX, &store_error()),
            FailureAction::Continue
        );
    }

    #[test]
    fn test_max_consecutive_failures_escalates_at_threshold() {
        let policy = MaxConsecutiveFailures::new(3);
        assert_eq!(policy.on_store_failure("ETHUSDT", 1, &store_error()), FailureAction::Continue);
        assert_eq!(policy.on_store_failure("ETHUSDT", 2, &store_error()), FailureAction::Continue);
        assert_eq!(policy.on_store_failure("ETHUSDT", 3, &store_error()), FailureAction::Fatal);
    }

    #[test]
    fn test_zero_threshold_is_clamped_to_one() {
        let policy = MaxConsecutiveFailures::new(0);
        assert_eq!(policy.max, 1);
        assert_eq!(policy.on_store_failure("ETHUSDT", 1, &store_error()), FailureAction::Fatal);
    }
}
