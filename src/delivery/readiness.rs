//! Readiness of the third-party delivery script
//!
//! The loader component marks the signal once the script has finished
//! loading; every slot monitor reads it. The flag goes from not-ready to
//! ready exactly once and is never reset.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};

/// Read side of the readiness signal, injected into monitors.
pub trait ReadinessSource: Send + Sync {
    fn is_ready(&self) -> bool;

    /// When readiness was signaled, if it has been.
    fn ready_at(&self) -> Option<DateTime<Utc>>;
}

/// Set-once readiness flag with the time it was set.
#[derive(Debug, Default)]
pub struct ReadinessSignal {
    ready_at: OnceLock<DateTime<Utc>>,
}

static GLOBAL: OnceLock<Arc<ReadinessSignal>> = OnceLock::new();

impl ReadinessSignal {
    pub const fn new() -> Self {
        Self {
            ready_at: OnceLock::new(),
        }
    }

    /// The process-wide signal shared by every slot on the page.
    pub fn global() -> Arc<ReadinessSignal> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ReadinessSignal::new())))
    }

    /// Mark the delivery script as ready.
    ///
    /// Returns `true` only for the call that actually set the flag; racing
    /// callers all observe the same timestamp afterwards.
    pub fn mark_ready(&self) -> bool {
        let mut won = false;
        self.ready_at.get_or_init(|| {
            won = true;
            Utc::now()
        });
        if won {
            tracing::info!("delivery script signaled ready");
        }
        won
    }
}

impl ReadinessSource for ReadinessSignal {
    fn is_ready(&self) -> bool {
        self.ready_at.get().is_some()
    }

    fn ready_at(&self) -> Option<DateTime<Utc>> {
        self.ready_at.get().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_starts_not_ready() {
        let signal = ReadinessSignal::new();
        assert!(!signal.is_ready());
        assert!(signal.ready_at().is_none());
    }

    #[test]
    fn test_mark_ready_is_idempotent() {
        let signal = ReadinessSignal::new();
        assert!(signal.mark_ready());
        let first = signal.ready_at();
        assert!(!signal.mark_ready());
        assert_eq!(signal.ready_at(), first);
        assert!(signal.is_ready());
    }

    #[test]
    fn test_concurrent_mark_ready_has_single_winner() {
        let signal = Arc::new(ReadinessSignal::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let signal = Arc::clone(&signal);
                thread::spawn(move || (signal.mark_ready(), signal.ready_at()))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|(won, _)| *won).count(), 1);

        let stamp = signal.ready_at();
        assert!(stamp.is_some());
        assert!(results.iter().all(|(_, seen)| *seen == stamp));
    }

    #[test]
    fn test_global_is_shared() {
        let a = ReadinessSignal::global();
        let b = ReadinessSignal::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
