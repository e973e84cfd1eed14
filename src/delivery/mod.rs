//! Collaborators shared with the ad-delivery provider
//!
//! The readiness signal is the one piece of process-wide mutable state; the
//! queue is where fill requests are registered.

mod page_level;
mod queue;
mod readiness;

pub use page_level::{init_page_level_ads, PageLevelGuard};
pub use queue::{DeliveryQueue, FillRequest, QueueEntry, RecordingQueue, RegistrationError};
pub use readiness::{ReadinessSignal, ReadinessSource};
