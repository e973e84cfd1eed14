use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::Placement;

use super::AdsConfig;

static SLOT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("Invalid regex pattern"));

/// A problem found in an [`AdsConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigIssue {
    #[error("publisher id '{value}' must start with 'ca-pub-'")]
    InvalidPublisherId { value: String },
    #[error("publisher id is required by {needed_by}")]
    MissingPublisherId { needed_by: String },
    #[error("slot id '{value}' for the {placement} placement must be all digits")]
    InvalidSlotId { placement: Placement, value: String },
    #[error("monitor.{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
}

impl AdsConfig {
    /// Every problem with this configuration; empty when it is usable.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        match self.publisher_id() {
            Some(id) if !id.starts_with("ca-pub-") => {
                issues.push(ConfigIssue::InvalidPublisherId {
                    value: id.to_string(),
                });
            }
            Some(_) => {}
            None => {
                if self.auto_ads {
                    issues.push(ConfigIssue::MissingPublisherId {
                        needed_by: "auto ads".to_string(),
                    });
                }
                for placement in Placement::ALL {
                    if self.slot_id(placement).is_some() {
                        issues.push(ConfigIssue::MissingPublisherId {
                            needed_by: format!("the {placement} placement"),
                        });
                    }
                }
            }
        }

        for placement in Placement::ALL {
            if let Some(slot_id) = self.slot_id(placement) {
                if !SLOT_ID.is_match(slot_id) {
                    issues.push(ConfigIssue::InvalidSlotId {
                        placement,
                        value: slot_id.to_string(),
                    });
                }
            }
        }

        let monitor = &self.monitor;
        for (field, value) in [
            ("readiness_timeout_ms", monitor.readiness_timeout_ms),
            ("readiness_poll_ms", monitor.readiness_poll_ms),
            ("poll_interval_ms", monitor.poll_interval_ms),
            ("backoff_base_ms", monitor.backoff_base_ms),
        ] {
            if value == Some(0) {
                issues.push(ConfigIssue::ZeroDuration { field });
            }
        }

        issues
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
