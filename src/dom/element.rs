//! Rendered view of a slot element

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::constants::{markers, COLLAPSED_SIZE_PX};

/// Computed visibility of an element.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Visible,
    /// `display: none`
    DisplayNone,
    /// `visibility: hidden`
    Hidden,
}

/// Point-in-time view of a slot's rendered element.
///
/// This is everything the fill detector is allowed to look at: structure,
/// measured size, markup, computed visibility and the attributes/classes the
/// provider writes on the element and its descendants.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlotSnapshot {
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
    /// `data-ad-status` values found on descendants of the element.
    #[serde(default)]
    pub descendant_statuses: Vec<String>,
}

impl SlotSnapshot {
    /// An element that exists but has nothing rendered in it yet.
    pub fn blank() -> Self {
        Self::default()
    }

    /// An element holding one rendered creative of the given size.
    pub fn filled(width: f32, height: f32) -> Self {
        Self {
            child_count: 1,
            width,
            height,
            inner_html: "<iframe></iframe>".to_string(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_descendant_status(mut self, status: impl Into<String>) -> Self {
        self.descendant_statuses.push(status.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Provider status marker (`data-ad-status`), if set.
    pub fn status(&self) -> Option<&str> {
        self.attribute(markers::STATUS_ATTRIBUTE)
    }

    /// Whether some descendant carries the given `data-ad-status`.
    pub fn has_descendant_status(&self, status: &str) -> bool {
        self.descendant_statuses.iter().any(|s| s == status)
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility != Visibility::Visible
    }

    /// Whether the measured box is effectively zero in both dimensions.
    pub fn has_no_size(&self) -> bool {
        self.width <= COLLAPSED_SIZE_PX && self.height <= COLLAPSED_SIZE_PX
    }

    /// Whether the measured box is visible in both dimensions.
    pub fn has_size(&self) -> bool {
        self.width > COLLAPSED_SIZE_PX && self.height > COLLAPSED_SIZE_PX
    }

    pub fn markup_is_empty(&self) -> bool {
        self.inner_html.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_has_no_size() {
        let snapshot = SlotSnapshot::blank();
        assert!(snapshot.has_no_size());
        assert!(!snapshot.has_size());
        assert!(snapshot.markup_is_empty());
    }

    #[test]
    fn test_one_pixel_counts_as_no_size() {
        let snapshot = SlotSnapshot {
            width: 1.0,
            height: 1.0,
            ..SlotSnapshot::default()
        };
        assert!(snapshot.has_no_size());
    }

    #[test]
    fn test_status_marker() {
        let snapshot = SlotSnapshot::blank().with_attribute("data-ad-status", "unfilled");
        assert_eq!(snapshot.status(), Some("unfilled"));
    }

    #[test]
    fn test_hidden_and_descendant_status() {
        let snapshot = SlotSnapshot::filled(300.0, 250.0)
            .with_visibility(Visibility::DisplayNone)
            .with_descendant_status("unfilled");
        assert!(snapshot.is_hidden());
        assert!(snapshot.has_descendant_status("unfilled"));
        assert!(!snapshot.has_descendant_status("filled"));
        assert!(!SlotSnapshot::blank().is_hidden());
    }

    #[test]
    fn test_whitespace_markup_is_empty() {
        let snapshot = SlotSnapshot {
            inner_html: "  \n ".to_string(),
            ..SlotSnapshot::default()
        };
        assert!(snapshot.markup_is_empty());
    }
}
