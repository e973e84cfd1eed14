mod derived;
mod transitions;
mod types;


pub use derived::{SlotFlags, SlotView};
pub use types::{AdSlotState, CollapseReason, StateKind};
