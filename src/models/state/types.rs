use serde::{Deserialize, Serialize};

/// Why a collapsed slot was collapsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "cause", rename_all = "kebab-case")]
pub enum CollapseReason {
    /// The slot classified as unfilled.
    Unfilled,
    /// The slot failed; the message is kept for diagnostics.
    Error { message: String },
}

/// Lifecycle state of one mounted ad slot.
///
/// State machine transitions:
/// - `Idle` -> `AwaitingScript` (when initialized)
/// - `AwaitingScript` -> `Pending` (readiness signaled, fill request issued)
/// - `AwaitingScript` -> `Failed` (readiness timeout or registration error)
/// - `Pending` -> `Loaded` | `Empty` | `Failed` (fill detector verdict)
/// - `Empty` | `Failed` -> `Collapsed` (when the slot collapses when empty)
/// - `Empty` | `Failed` | `Collapsed` -> `AwaitingScript` (on retry)
/// - `Loaded` is a terminal state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum AdSlotState {
    /// Not yet initialized.
    #[default]
    Idle,

    /// Waiting for the delivery script's readiness signal.
    AwaitingScript { attempt: u32 },

    /// Fill request issued; the fill detector is running.
    Pending { attempt: u32, started_at_ms: u64 },

    /// Slot was filled with creative content.
    Loaded { attempt: u32 },

    /// Provider had no inventory, or detection timed out.
    Empty { attempt: u32 },

    /// Script, registration or provider failure.
    Failed { attempt: u32, error_message: String },

    /// Slot takes no layout space. Only an explicit retry re-expands it.
    Collapsed { attempt: u32, reason: CollapseReason },
}

/// Payload-free discriminant of [`AdSlotState`], used by the transition table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StateKind {
    Idle,
    AwaitingScript,
    Pending,
    Loaded,
    Empty,
    Failed,
    Collapsed,
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateKind::Idle => write!(f, "Idle"),
            StateKind::AwaitingScript => write!(f, "AwaitingScript"),
            StateKind::Pending => write!(f, "Pending"),
            StateKind::Loaded => write!(f, "Loaded"),
            StateKind::Empty => write!(f, "Empty"),
            StateKind::Failed => write!(f, "Failed"),
            StateKind::Collapsed => write!(f, "Collapsed"),
        }
    }
}

impl std::fmt::Display for AdSlotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdSlotState::Idle => write!(f, "Idle"),
            AdSlotState::AwaitingScript { attempt } => write!(f, "AwaitingScript(#{attempt})"),
            AdSlotState::Pending { attempt, .. } => write!(f, "Pending(#{attempt})"),
            AdSlotState::Loaded { attempt } => write!(f, "Loaded(#{attempt})"),
            AdSlotState::Empty { attempt } => write!(f, "Empty(#{attempt})"),
            AdSlotState::Failed {
                attempt,
                error_message,
            } => write!(f, "Failed(#{attempt}: {error_message})"),
            AdSlotState::Collapsed { attempt, .. } => write!(f, "Collapsed(#{attempt})"),
        }
    }
}
