//! Once-per-session page-level auto-ads registration

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::queue::{DeliveryQueue, QueueEntry, RegistrationError};

/// Session-scoped guard preventing duplicate page-level registration.
///
/// Navigations within one session share the guard, so the page-level push
/// happens at most once no matter how many times the loader runs.
#[derive(Debug, Default)]
pub struct PageLevelGuard {
    initialized: AtomicBool,
}

static SESSION: PageLevelGuard = PageLevelGuard::new();

impl PageLevelGuard {
    pub const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
        }
    }

    /// The guard for the current browsing session.
    pub fn session() -> &'static PageLevelGuard {
        &SESSION
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn try_claim(&self) -> bool {
        self.initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.initialized.store(false, Ordering::Release);
    }
}

/// Register page-level auto ads for `publisher_id`.
///
/// Returns `Ok(true)` when this call performed the registration and
/// `Ok(false)` when it had already happened. A rejected push releases the
/// guard so a later call can try again.
pub fn init_page_level_ads(
    guard: &PageLevelGuard,
    queue: &dyn DeliveryQueue,
    publisher_id: &str,
) -> Result<bool, RegistrationError> {
    if !guard.try_claim() {
        debug!(publisher_id, "page-level ads already initialized, skipping");
        return Ok(false);
    }

    let entry = QueueEntry::PageLevel {
        publisher_id: publisher_id.to_string(),
        enable_page_level_ads: true,
    };
    match queue.push(entry) {
        Ok(()) => {
            info!(publisher_id, "page-level ads initialized");
            Ok(true)
        }
        Err(e) => {
            warn!(publisher_id, error = %e, "page-level ads initialization failed");
            guard.release();
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::queue::RecordingQueue;

    #[test]
    fn test_registers_once() {
        let guard = PageLevelGuard::new();
        let queue = RecordingQueue::new();

        assert_eq!(init_page_level_ads(&guard, &queue, "ca-pub-1"), Ok(true));
        assert_eq!(init_page_level_ads(&guard, &queue, "ca-pub-1"), Ok(false));
        assert_eq!(queue.len(), 1);
        assert!(guard.is_initialized());
    }

    #[test]
    fn test_failed_push_releases_guard() {
        let guard = PageLevelGuard::new();
        let queue = RecordingQueue::new();
        queue.reject("script blocked");

        assert!(init_page_level_ads(&guard, &queue, "ca-pub-1").is_err());
        assert!(!guard.is_initialized());

        queue.accept();
        assert_eq!(init_page_level_ads(&guard, &queue, "ca-pub-1"), Ok(true));
        assert_eq!(queue.len(), 1);
    }
}
