//! Validate command - resolves and checks the ads configuration

use std::path::Path;

use anyhow::{bail, Result};
use colored::Colorize;

use crate::config::AdsConfig;
use crate::models::Placement;
use crate::monitor::RetryPolicy;

/// Load the configuration (file plus environment), print it and its issues.
///
/// Fails when any issue is found.
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = AdsConfig::load(config_path)?;

    let source = match config_path {
        Some(path) => path.display().to_string(),
        None => AdsConfig::default_path()
            .filter(|path| path.exists())
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "environment only".to_string()),
    };
    println!("{} {}", "Configuration:".bold(), source.dimmed());
    for line in describe(&config) {
        println!("  {line}");
    }

    let issues = config.validate();
    if issues.is_empty() {
        println!("{} Configuration is valid", "✓".green().bold());
        return Ok(());
    }

    for issue in &issues {
        println!("{} {issue}", "✗".red().bold());
    }
    bail!("configuration has {} issue(s)", issues.len())
}

/// Human-readable summary of a resolved configuration.
pub fn describe(config: &AdsConfig) -> Vec<String> {
    let mut lines = vec![
        format!(
            "publisher: {}",
            config.publisher_id().unwrap_or("(not set)")
        ),
        format!(
            "auto ads: {}",
            if config.page_level_enabled() { "on" } else { "off" }
        ),
    ];

    let rendered = config.slot_configs();
    for placement in Placement::ALL {
        let line = match rendered.iter().find(|(p, _)| *p == placement) {
            Some((_, slot)) => format!(
                "{placement}: slot {} (timeout {}ms, {} retries, collapse {})",
                slot.slot_id,
                slot.fill_timeout_ms,
                slot.max_retries,
                if slot.collapse_when_empty { "on" } else { "off" }
            ),
            None => format!("{placement}: not rendered"),
        };
        lines.push(line);
    }

    let settings = config.settings();
    lines.push(format!(
        "monitor: readiness {}ms, poll {}ms x{}, debounce {}ms",
        settings.readiness_timeout.as_millis(),
        settings.poll_interval.as_millis(),
        settings.max_poll_attempts,
        settings.mutation_debounce.as_millis()
    ));
    lines.push(match settings.retry_policy {
        RetryPolicy::Manual => "retry: manual".to_string(),
        RetryPolicy::Backoff { base, max } => format!(
            "retry: backoff from {}ms up to {}ms",
            base.as_millis(),
            max.as_millis()
        ),
    });
    lines
}
