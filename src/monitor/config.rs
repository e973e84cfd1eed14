//! Timing configuration for the monitor

use std::time::Duration;

use crate::models::constants::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_MAX_MS, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_MUTATION_DEBOUNCE_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_READINESS_POLL_MS,
    DEFAULT_READINESS_TIMEOUT_MS,
};

/// How a failed attempt is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Only explicit `retry()` calls start a new attempt.
    #[default]
    Manual,
    /// Transient failures are also retried after `base * 2^(attempt-1)`, capped at `max`.
    Backoff { base: Duration, max: Duration },
}

impl RetryPolicy {
    /// Backoff policy with the default base and cap.
    pub fn backoff() -> Self {
        RetryPolicy::Backoff {
            base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            max: Duration::from_millis(DEFAULT_BACKOFF_MAX_MS),
        }
    }
}

/// Timing knobs shared by every slot a monitor manages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub readiness_timeout: Duration,
    pub readiness_poll_interval: Duration,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    /// Quiet period after a mutation or poll tick before the slot is classified.
    pub mutation_debounce: Duration,
    pub retry_policy: RetryPolicy,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            readiness_timeout: Duration::from_millis(DEFAULT_READINESS_TIMEOUT_MS),
            readiness_poll_interval: Duration::from_millis(DEFAULT_READINESS_POLL_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            mutation_debounce: Duration::from_millis(DEFAULT_MUTATION_DEBOUNCE_MS),
            retry_policy: RetryPolicy::Manual,
        }
    }
}
