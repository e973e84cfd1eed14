/// How long a slot waits for the delivery script before failing (10 seconds).
pub const DEFAULT_READINESS_TIMEOUT_MS: u64 = 10_000;

/// How often the readiness flag is re-checked while waiting.
pub const DEFAULT_READINESS_POLL_MS: u64 = 100;

/// Fixed interval of the fill detector's periodic poll.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Number of poll ticks before the periodic poll gives up (~10s at 500ms).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 20;

/// Settle delay applied after a mutation before the slot is classified.
pub const DEFAULT_MUTATION_DEBOUNCE_MS: u64 = 150;

/// Hard timeout used when a slot config does not pick its own.
pub const DEFAULT_FILL_TIMEOUT_MS: u64 = 5_000;

/// Default number of retries a slot may perform after its first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay for automatic retry backoff (2s gives `2^attempt` seconds).
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 2_000;

/// Ceiling for automatic retry backoff.
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 60_000;

/// Measured sizes at or below this many pixels count as "no size".
pub const COLLAPSED_SIZE_PX: f32 = 1.0;

/// Provider markers written onto the slot element.
pub mod markers {
    /// Attribute the provider sets once it has decided the slot's fate.
    pub const STATUS_ATTRIBUTE: &str = "data-ad-status";

    /// Status value for a slot the provider could not fill.
    pub const STATUS_UNFILLED: &str = "unfilled";

    /// Status value for a slot the provider failed to render.
    pub const STATUS_ERROR: &str = "error";

    /// Class the provider adds to slots it has no ads for.
    pub const NO_ADS_CLASS: &str = "adsbygoogle-noads";
}
