//! Lifecycle monitor for ad slots
//!
//! Drives one slot from mount to a settled state: waits for the delivery
//! script, pushes the fill request, then races a mutation observer, a
//! periodic poll and a hard timeout to decide whether the slot filled.
//! Manual and automatic retries start a fresh attempt.

mod config;
mod context;
pub mod core;
mod cycle;
pub(crate) mod detection;
mod events;
mod initializer;
mod publisher;
pub(crate) mod retry;
mod triggers;


pub use config::{MonitorSettings, RetryPolicy};
pub use context::MonitorContext;
pub use self::core::AdSlotMonitor;
pub use detection::{AdsenseClassifier, Classification, EmptyReason, FillClassifier, Trigger};
pub use events::SlotEvent;
pub use publisher::SubscriptionId;
