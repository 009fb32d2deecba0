//! Retry delay policy for page fetches.

use std::time::Duration;

const DEFAULT_BASE: Duration = Duration::from_secs(1);
const DEFAULT_CAP: Duration = Duration::from_secs(30);
const MIN_DELAY: Duration = Duration::from_millis(1);

/// Exponential backoff capped at a maximum, overridden by a server hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base: Duration,
    cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            cap: DEFAULT_CAP,
        }
    }
}

impl BackoffPolicy {
    /// Both bounds are clamped so a delay is never zero.
    pub fn new(base: Duration, cap: Duration) -> Self {
        let base = base.max(MIN_DELAY);
        Self {
            base,
            cap: cap.max(base),
        }
    }

    /// Wait before retry number `attempt` (0-based).
    ///
    /// A `Retry-After` hint in seconds is honored exactly; otherwise the delay
    /// is `min(base * 2^attempt, cap)`.
    pub fn delay(&self, attempt: u32, retry_after_secs: Option<u64>) -> Duration {
        if let Some(seconds) = retry_after_secs.filter(|seconds| *seconds > 0) {
            return Duration::from_secs(seconds);
        }

        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.cap)
    }
}

/// Delay under the default 1s base / 30s cap policy.
pub fn delay(attempt: u32, retry_after_secs: Option<u64>) -> Duration {
    BackoffPolicy::default().delay(attempt, retry_after_secs)
}
