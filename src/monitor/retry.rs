use std::time::Duration;

use crate::models::FailureKind;

/// Determines if a failed attempt should trigger an automatic retry.
///
/// Only transient failures (ReadinessTimeout, ElementMissing, ProviderError)
/// are eligible, and only while the attempt budget lasts. Registration errors
/// and empty inventory are left to the reader.
pub fn should_auto_retry(kind: FailureKind, attempt: u32, max_retries: u32) -> bool {
    if !has_retry_budget(attempt, max_retries) {
        return false;
    }
    kind.is_transient()
}

/// Whether a slot on `attempt` may start another one.
///
/// Attempts are 1-based, so a slot performs at most `max_retries + 1` attempts.
pub fn has_retry_budget(attempt: u32, max_retries: u32) -> bool {
    attempt <= max_retries
}

/// Calculates exponential backoff before retrying after `attempt`.
///
/// Formula: base * 2^(attempt-1), capped at max
///
/// # Examples
///
/// With base=2s, max=60s:
/// - After attempt 1: 2s
/// - After attempt 2: 4s
/// - After attempt 3: 8s
/// - After attempt 6+: 60s (capped)
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let multiplier = 2u32.saturating_pow(attempt - 1);
    base.saturating_mul(multiplier).min(max)
}
