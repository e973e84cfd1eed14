//! Document seam for the slot monitor
//!
//! The monitor never touches a real DOM. It reads [`SlotSnapshot`]s and
//! subscribes to mutations through a [`SlotHost`], which a browser binding,
//! a headless renderer, or the in-memory page used in tests can implement.

mod element;
mod host;

pub use element::{SlotSnapshot, Visibility};
pub use host::{InMemoryPage, Mutation, MutationCallback, ObserverId, SlotHost};
