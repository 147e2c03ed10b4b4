/// Classification for retry policy.
///
/// Used by polling loops to decide what a failed request means for them.
///
/// # Behavior Summary
///
/// | Class | Retry? | When |
/// |-------|--------|------|
/// | `NextTick` | Yes, on the next scheduled poll | transport, timeout, throttled, bad status, parse |
/// | `Never` | No | cancelled, invalid configuration |
///
/// Recoverable failures wait for the caller's regular schedule. There is no backoff.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Transient failure. The same request may succeed on the next tick.
    NextTick,

    /// Retrying won't help - shutdown in progress or the client is misconfigured.
    Never,
}
