//! Tracing subscriber setup for the CLI

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `slotwatch=debug`.
pub const LOG_ENV: &str = "SLOTWATCH_LOG";

/// Filter used when `verbose` is set or `SLOTWATCH_LOG` is not.
pub fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays machine readable. A second call is a no-op.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_verbose_overrides_env() {
        env::set_var(LOG_ENV, "warn");
        assert_eq!(default_filter(true).to_string(), "debug");
        assert_eq!(default_filter(false).to_string(), "warn");
        env::remove_var(LOG_ENV);
    }

    #[test]
    #[serial]
    fn test_falls_back_to_info() {
        env::remove_var(LOG_ENV);
        assert_eq!(default_filter(false).to_string(), "info");
    }
}
