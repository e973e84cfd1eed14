pub mod constants;
pub mod failure;
pub mod slot;
pub mod state;

pub use failure::{FailureKind, SlotError};
pub use slot::{AdFormat, AdSlotConfig, Placement, SlotConfigError};
pub use state::{AdSlotState, CollapseReason, SlotFlags, SlotView, StateKind};
