//! Startup configuration
//!
//! Publisher and slot ids come from `config.toml` and may be overridden by
//! `ADSENSE_*` environment variables. The optional `[monitor]` table tunes
//! the timing knobs in milliseconds.

mod validation;


use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::constants::{DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_MAX_MS};
use crate::models::{AdSlotConfig, Placement};
use crate::monitor::{MonitorSettings, RetryPolicy};

pub use validation::ConfigIssue;

pub const ENV_PUBLISHER_ID: &str = "ADSENSE_PUBLISHER_ID";
pub const ENV_AUTO_ADS: &str = "ADSENSE_AUTO_ADS";
pub const ENV_HEADER_AD: &str = "ADSENSE_HEADER_AD";
pub const ENV_MIDDLE_AD: &str = "ADSENSE_MIDDLE_AD";
pub const ENV_FOOTER_AD: &str = "ADSENSE_FOOTER_AD";

/// Ad configuration for one site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdsConfig {
    pub publisher_id: Option<String>,
    /// Enable page-level auto ads.
    pub auto_ads: bool,
    pub slots: PlacementSlots,
    pub monitor: MonitorSection,
}

/// Slot id per placement; unset placements are not rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlacementSlots {
    pub header: Option<String>,
    pub middle: Option<String>,
    pub footer: Option<String>,
}

/// How failed attempts are retried.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    #[default]
    Manual,
    Backoff,
}

/// `[monitor]` overrides, all in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorSection {
    pub readiness_timeout_ms: Option<u64>,
    pub readiness_poll_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub max_poll_attempts: Option<u32>,
    pub mutation_debounce_ms: Option<u64>,
    pub retry: RetryMode,
    pub backoff_base_ms: Option<u64>,
    pub backoff_max_ms: Option<u64>,
}

impl MonitorSection {
    /// Resolve against the built-in defaults.
    pub fn to_settings(&self) -> MonitorSettings {
        let defaults = MonitorSettings::default();
        let ms = |value: Option<u64>, default: Duration| {
            value.map(Duration::from_millis).unwrap_or(default)
        };

        let retry_policy = match self.retry {
            RetryMode::Manual => RetryPolicy::Manual,
            RetryMode::Backoff => RetryPolicy::Backoff {
                base: ms(self.backoff_base_ms, Duration::from_millis(DEFAULT_BACKOFF_BASE_MS)),
                max: ms(self.backoff_max_ms, Duration::from_millis(DEFAULT_BACKOFF_MAX_MS)),
            },
        };

        MonitorSettings {
            readiness_timeout: ms(self.readiness_timeout_ms, defaults.readiness_timeout),
            readiness_poll_interval: ms(self.readiness_poll_ms, defaults.readiness_poll_interval),
            poll_interval: ms(self.poll_interval_ms, defaults.poll_interval),
            max_poll_attempts: self.max_poll_attempts.unwrap_or(defaults.max_poll_attempts),
            mutation_debounce: ms(self.mutation_debounce_ms, defaults.mutation_debounce),
            retry_policy,
        }
    }
}

impl AdsConfig {
    /// `<config dir>/slotwatch/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("slotwatch").join("config.toml"))
    }

    /// Load from `path`, or from the default location when it exists, then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|path| path.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid ads configuration")
    }

    /// Environment variables win over file values. Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = env_value(ENV_PUBLISHER_ID) {
            self.publisher_id = Some(value);
        }
        if let Some(value) = env_value(ENV_AUTO_ADS) {
            self.auto_ads = value == "true";
        }
        for (placement, name) in [
            (Placement::Header, ENV_HEADER_AD),
            (Placement::Middle, ENV_MIDDLE_AD),
            (Placement::Footer, ENV_FOOTER_AD),
        ] {
            if let Some(value) = env_value(name) {
                *self.slots.slot_mut(placement) = Some(value);
            }
        }
    }

    pub fn slot_id(&self, placement: Placement) -> Option<&str> {
        self.slots.slot(placement)
    }

    /// Slot configurations for every placement that can render.
    ///
    /// A placement renders only when both the publisher id and its slot id
    /// are set.
    pub fn slot_configs(&self) -> Vec<(Placement, AdSlotConfig)> {
        if self.publisher_id().is_none() {
            return Vec::new();
        }
        Placement::ALL
            .into_iter()
            .filter_map(|placement| {
                self.slot_id(placement)
                    .map(|slot_id| (placement, placement.slot_config(slot_id)))
            })
            .collect()
    }

    /// Whether page-level auto ads should be registered.
    pub fn page_level_enabled(&self) -> bool {
        self.auto_ads && self.publisher_id().is_some()
    }

    /// The publisher id, if set to something non-empty.
    pub fn publisher_id(&self) -> Option<&str> {
        self.publisher_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn settings(&self) -> MonitorSettings {
        self.monitor.to_settings()
    }
}

impl PlacementSlots {
    pub fn slot(&self, placement: Placement) -> Option<&str> {
        match placement {
            Placement::Header => self.header.as_deref(),
            Placement::Middle => self.middle.as_deref(),
            Placement::Footer => self.footer.as_deref(),
        }
        .filter(|id| !id.is_empty())
    }

    fn slot_mut(&mut self, placement: Placement) -> &mut Option<String> {
        match placement {
            Placement::Header => &mut self.header,
            Placement::Middle => &mut self.middle,
            Placement::Footer => &mut self.footer,
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
