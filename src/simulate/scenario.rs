//! Scenario files for the simulator

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::config::MonitorSection;
use crate::dom::{SlotSnapshot, Visibility};
use crate::models::AdSlotConfig;

/// A scripted slot lifecycle, replayed on a virtual clock.
///
/// ```toml
/// ready_at_ms = 300
/// run_for_ms = 20000
///
/// [slot]
/// slot_id = "1234567890"
/// collapse_when_empty = true
///
/// [[mutations]]
/// at_ms = 900
/// child_count = 1
/// width = 300.0
/// height = 250.0
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub slot: AdSlotConfig,
    #[serde(default)]
    pub monitor: MonitorSection,
    /// When the delivery script signals ready; never when unset.
    pub ready_at_ms: Option<u64>,
    /// Reject fill request pushes with this message.
    pub fail_registration: Option<String>,
    /// Stop rejecting pushes at this time.
    pub registration_recovers_at_ms: Option<u64>,
    /// Register page-level auto ads for this publisher before the slot mounts.
    pub auto_ads_publisher: Option<String>,
    /// Whether the slot element exists in the document.
    #[serde(default = "default_true")]
    pub element_present: bool,
    #[serde(default = "default_run_for_ms")]
    pub run_for_ms: u64,
    #[serde(default)]
    pub mutations: Vec<ScriptedMutation>,
    #[serde(default)]
    pub retries: Vec<ScriptedRetry>,
}

/// Replace the slot element at `at_ms`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedMutation {
    pub at_ms: u64,
    #[serde(default)]
    pub child_count: usize,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub inner_html: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub descendant_statuses: Vec<String>,
}

/// Press the retry control at `at_ms`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedRetry {
    pub at_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_run_for_ms() -> u64 {
    30_000
}

impl ScriptedMutation {
    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            child_count: self.child_count,
            width: self.width,
            height: self.height,
            inner_html: self.inner_html.clone(),
            attributes: self.attributes.clone(),
            classes: self.classes.clone(),
            visibility: self.visibility,
            descendant_statuses: self.descendant_statuses.clone(),
        }
    }
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse scenario: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content).context("Invalid scenario")?;
        scenario.check()?;
        Ok(scenario)
    }

    fn check(&self) -> Result<()> {
        self.slot.validate()?;
        if self.run_for_ms == 0 {
            bail!("run_for_ms must be greater than zero");
        }
        let late = self
            .mutations
            .iter()
            .map(|m| m.at_ms)
            .chain(self.retries.iter().map(|r| r.at_ms))
            .find(|at_ms| *at_ms > self.run_for_ms);
        if let Some(at_ms) = late {
            bail!(
                "scripted step at {at_ms}ms is after the end of the run ({}ms)",
                self.run_for_ms
            );
        }
        Ok(())
    }
}
