use anyhow::{bail, Result};

use super::types::{AdSlotState, StateKind};

impl AdSlotState {
    pub fn kind(&self) -> StateKind {
        match self {
            AdSlotState::Idle => StateKind::Idle,
            AdSlotState::AwaitingScript { .. } => StateKind::AwaitingScript,
            AdSlotState::Pending { .. } => StateKind::Pending,
            AdSlotState::Loaded { .. } => StateKind::Loaded,
            AdSlotState::Empty { .. } => StateKind::Empty,
            AdSlotState::Failed { .. } => StateKind::Failed,
            AdSlotState::Collapsed { .. } => StateKind::Collapsed,
        }
    }

    /// Attempt number carried by the state, `0` while idle.
    pub fn attempt(&self) -> u32 {
        match self {
            AdSlotState::Idle => 0,
            AdSlotState::AwaitingScript { attempt }
            | AdSlotState::Pending { attempt, .. }
            | AdSlotState::Loaded { attempt }
            | AdSlotState::Empty { attempt }
            | AdSlotState::Failed { attempt, .. }
            | AdSlotState::Collapsed { attempt, .. } => *attempt,
        }
    }

    /// Whether the current attempt has finished (successfully or not).
    pub fn is_settled(&self) -> bool {
        matches!(
            self.kind(),
            StateKind::Loaded | StateKind::Empty | StateKind::Failed | StateKind::Collapsed
        )
    }

    /// Whether a retry may start from this state (ignoring the attempt budget).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            StateKind::Empty | StateKind::Failed | StateKind::Collapsed
        )
    }
}

impl StateKind {
    /// Check if moving from this kind to `next` is a defined edge.
    ///
    /// Valid transitions:
    /// - `Idle` -> `AwaitingScript`
    /// - `AwaitingScript` -> `Pending` | `Failed`
    /// - `Pending` -> `Loaded` | `Empty` | `Failed`
    /// - `Empty` -> `Collapsed` | `AwaitingScript`
    /// - `Failed` -> `Collapsed` | `AwaitingScript`
    /// - `Collapsed` -> `AwaitingScript` (explicit retry only)
    /// - `Loaded` is a terminal state
    pub fn can_transition_to(&self, next: StateKind) -> bool {
        match self {
            StateKind::Idle => matches!(next, StateKind::AwaitingScript),
            StateKind::AwaitingScript => {
                matches!(next, StateKind::Pending | StateKind::Failed)
            }
            StateKind::Pending => matches!(
                next,
                StateKind::Loaded | StateKind::Empty | StateKind::Failed
            ),
            StateKind::Empty | StateKind::Failed => {
                matches!(next, StateKind::Collapsed | StateKind::AwaitingScript)
            }
            StateKind::Collapsed => matches!(next, StateKind::AwaitingScript),
            StateKind::Loaded => false, // Terminal state
        }
    }

    /// Returns the list of kinds this kind can transition to.
    pub fn valid_transitions(&self) -> Vec<StateKind> {
        match self {
            StateKind::Idle => vec![StateKind::AwaitingScript],
            StateKind::AwaitingScript => vec![StateKind::Pending, StateKind::Failed],
            StateKind::Pending => vec![StateKind::Loaded, StateKind::Empty, StateKind::Failed],
            StateKind::Empty | StateKind::Failed => {
                vec![StateKind::Collapsed, StateKind::AwaitingScript]
            }
            StateKind::Collapsed => vec![StateKind::AwaitingScript],
            StateKind::Loaded => vec![], // Terminal state
        }
    }
}

impl AdSlotState {
    pub fn can_transition_to(&self, next: &AdSlotState) -> bool {
        self.kind().can_transition_to(next.kind())
    }

    /// Attempt to transition to a new state, returning an error if invalid.
    ///
    /// Unlike stage statuses, a self-transition is never valid here: every
    /// edge of the slot lifecycle is a real change that subscribers observe.
    pub fn try_transition(&self, next: AdSlotState) -> Result<AdSlotState> {
        if self.can_transition_to(&next) {
            Ok(next)
        } else {
            bail!(
                "Invalid slot state transition: {} -> {}",
                self.kind(),
                next.kind()
            )
        }
    }
}
