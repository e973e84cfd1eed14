use serde::Serialize;

use super::types::{AdSlotState, CollapseReason};

/// Boolean view of a slot state for the presentation layer.
///
/// Exactly one of `is_loading`, `is_loaded`, `is_empty`, `has_error` holds;
/// `is_collapsed` is layered on top of `is_empty` or `has_error`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct SlotFlags {
    pub is_loading: bool,
    pub is_loaded: bool,
    pub is_empty: bool,
    pub has_error: bool,
    pub is_collapsed: bool,
}

/// What the presentation layer should render for a slot.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SlotView {
    /// Placeholder while the slot is initializing or being filled.
    Skeleton,
    /// Show the filled creative.
    Reveal,
    /// Render nothing; the slot takes no layout space.
    Hidden,
    /// Visible failed or unfilled slot with a retry affordance.
    RetryPrompt,
    /// Visible terminal "unavailable" notice (retries exhausted).
    Unavailable,
}

impl AdSlotState {
    pub fn flags(&self) -> SlotFlags {
        match self {
            AdSlotState::Idle
            | AdSlotState::AwaitingScript { .. }
            | AdSlotState::Pending { .. } => SlotFlags {
                is_loading: true,
                ..SlotFlags::default()
            },
            AdSlotState::Loaded { .. } => SlotFlags {
                is_loaded: true,
                ..SlotFlags::default()
            },
            AdSlotState::Empty { .. } => SlotFlags {
                is_empty: true,
                ..SlotFlags::default()
            },
            AdSlotState::Failed { .. } => SlotFlags {
                has_error: true,
                ..SlotFlags::default()
            },
            AdSlotState::Collapsed { reason, .. } => SlotFlags {
                is_empty: matches!(reason, CollapseReason::Unfilled),
                has_error: matches!(reason, CollapseReason::Error { .. }),
                is_collapsed: true,
                ..SlotFlags::default()
            },
        }
    }

    /// Presentation decision for this state.
    ///
    /// Only `Collapsed` gives up the slot's layout space. A slot left `Empty`
    /// or `Failed` (collapse disabled) keeps its frame and offers a retry
    /// until the budget runs out.
    pub fn view(&self, can_retry: bool) -> SlotView {
        match self {
            AdSlotState::Idle
            | AdSlotState::AwaitingScript { .. }
            | AdSlotState::Pending { .. } => SlotView::Skeleton,
            AdSlotState::Loaded { .. } => SlotView::Reveal,
            AdSlotState::Collapsed { .. } => SlotView::Hidden,
            AdSlotState::Empty { .. } | AdSlotState::Failed { .. } if can_retry => {
                SlotView::RetryPrompt
            }
            AdSlotState::Empty { .. } | AdSlotState::Failed { .. } => SlotView::Unavailable,
        }
    }
}
