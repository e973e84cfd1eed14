use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::constants::{DEFAULT_FILL_TIMEOUT_MS, DEFAULT_MAX_RETRIES};

/// Creative format requested from the delivery provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AdFormat {
    #[default]
    Auto,
    Rectangle,
    Horizontal,
    Fluid,
}

impl std::fmt::Display for AdFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdFormat::Auto => write!(f, "auto"),
            AdFormat::Rectangle => write!(f, "rectangle"),
            AdFormat::Horizontal => write!(f, "horizontal"),
            AdFormat::Fluid => write!(f, "fluid"),
        }
    }
}

/// Where on the page a slot is placed.
///
/// Each placement carries the timing preset the site uses for it: header ads
/// get the longest fill window since they render before the rest of the page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    Header,
    Middle,
    Footer,
}

impl Placement {
    pub const ALL: [Placement; 3] = [Placement::Header, Placement::Middle, Placement::Footer];

    /// Hard fill timeout for this placement.
    pub fn fill_timeout_ms(&self) -> u64 {
        match self {
            Placement::Header => 8_000,
            Placement::Middle => 6_000,
            Placement::Footer => 5_000,
        }
    }

    /// Build the slot config this placement uses for `slot_id`.
    pub fn slot_config(&self, slot_id: impl Into<String>) -> AdSlotConfig {
        AdSlotConfig {
            slot_id: slot_id.into(),
            format: AdFormat::Auto,
            full_width_responsive: true,
            collapse_when_empty: true,
            fill_timeout_ms: self.fill_timeout_ms(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Placement::Header => write!(f, "header"),
            Placement::Middle => write!(f, "middle"),
            Placement::Footer => write!(f, "footer"),
        }
    }
}

/// Immutable per-slot configuration handed in by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdSlotConfig {
    pub slot_id: String,
    #[serde(default)]
    pub format: AdFormat,
    #[serde(default = "default_true")]
    pub full_width_responsive: bool,
    #[serde(default)]
    pub collapse_when_empty: bool,
    #[serde(default = "default_fill_timeout_ms")]
    pub fill_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_true() -> bool {
    true
}

fn default_fill_timeout_ms() -> u64 {
    DEFAULT_FILL_TIMEOUT_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// Reasons an [`AdSlotConfig`] cannot be used to mount a slot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SlotConfigError {
    #[error("slot id must not be empty")]
    EmptySlotId,
    #[error("fill timeout for slot '{slot_id}' must be greater than zero")]
    ZeroFillTimeout { slot_id: String },
}

impl AdSlotConfig {
    pub fn new(slot_id: impl Into<String>) -> Self {
        Self {
            slot_id: slot_id.into(),
            format: AdFormat::Auto,
            full_width_responsive: true,
            collapse_when_empty: false,
            fill_timeout_ms: DEFAULT_FILL_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_format(mut self, format: AdFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_collapse_when_empty(mut self, collapse: bool) -> Self {
        self.collapse_when_empty = collapse;
        self
    }

    pub fn with_fill_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.fill_timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Check the invariants a monitor relies on.
    pub fn validate(&self) -> Result<(), SlotConfigError> {
        if self.slot_id.trim().is_empty() {
            return Err(SlotConfigError::EmptySlotId);
        }
        if self.fill_timeout_ms == 0 {
            return Err(SlotConfigError::ZeroFillTimeout {
                slot_id: self.slot_id.clone(),
            });
        }
        Ok(())
    }
}
