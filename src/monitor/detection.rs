//! Fill classification for rendered slots
//!
//! Provider-specific heuristics live behind [`FillClassifier`] so they can be
//! swapped without touching the state machine.

use crate::dom::SlotSnapshot;
use crate::models::constants::markers;
use crate::models::SlotError;

/// Why a slot was classified as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The provider explicitly marked the slot as unfilled.
    Unfilled,
    /// The element is hidden with `display: none` or `visibility: hidden`.
    Hidden,
    /// Nothing is rendered yet: no children, no size, no markup.
    Blank,
}

/// Verdict of one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Loaded,
    Empty(EmptyReason),
    Failed(SlotError),
    /// Content may still be arriving.
    Indeterminate,
}

impl Classification {
    /// Whether the verdict may end an attempt before the hard timeout.
    ///
    /// A blank slot is indistinguishable from one whose creative has not
    /// arrived yet, so only explicit markers, errors and rendered content
    /// settle an attempt early.
    pub fn is_conclusive(&self) -> bool {
        matches!(
            self,
            Classification::Loaded
                | Classification::Failed(_)
                | Classification::Empty(EmptyReason::Unfilled | EmptyReason::Hidden)
        )
    }
}

/// Strategy deciding whether a slot was filled.
pub trait FillClassifier {
    /// Classify the slot element; `None` means the element is not in the document.
    fn classify(&self, element: Option<&SlotSnapshot>) -> Classification;
}

/// What fired a classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mutation,
    Poll,
    Timeout,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Mutation => write!(f, "mutation"),
            Trigger::Poll => write!(f, "poll"),
            Trigger::Timeout => write!(f, "timeout"),
        }
    }
}

/// Heuristics for AdSense `<ins class="adsbygoogle">` slots.
///
/// Priority-ordered, first match wins:
/// 1. element missing -> Failed
/// 2. `data-ad-status="error"` -> Failed
/// 3. `data-ad-status="unfilled"` on the element or a descendant, or the
///    no-ads class -> Empty (unfilled); a hidden element -> Empty (hidden)
/// 4. no children, no size and no markup -> Empty (blank)
/// 5. at least one child and a visible size -> Loaded
/// 6. otherwise -> Indeterminate
#[derive(Debug, Clone, Copy, Default)]
pub struct AdsenseClassifier;

impl FillClassifier for AdsenseClassifier {
    fn classify(&self, element: Option<&SlotSnapshot>) -> Classification {
        let Some(element) = element else {
            return Classification::Failed(SlotError::ElementMissing);
        };

        match element.status() {
            Some(markers::STATUS_ERROR) => return Classification::Failed(SlotError::ProviderError),
            Some(markers::STATUS_UNFILLED) => {
                return Classification::Empty(EmptyReason::Unfilled)
            }
            _ => {}
        }
        if element.has_descendant_status(markers::STATUS_UNFILLED)
            || element.has_class(markers::NO_ADS_CLASS)
        {
            return Classification::Empty(EmptyReason::Unfilled);
        }
        if element.is_hidden() {
            return Classification::Empty(EmptyReason::Hidden);
        }

        if element.child_count == 0 && element.has_no_size() && element.markup_is_empty() {
            return Classification::Empty(EmptyReason::Blank);
        }

        if element.child_count > 0 && element.has_size() {
            return Classification::Loaded;
        }

        Classification::Indeterminate
    }
}
