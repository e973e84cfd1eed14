//! Core AdSlotMonitor implementation

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::models::{
    AdSlotConfig, AdSlotState, CollapseReason, FailureKind, SlotConfigError, SlotError,
    SlotFlags, SlotView, StateKind,
};
use crate::scheduler::now_ms;

use super::config::{MonitorSettings, RetryPolicy};
use super::context::MonitorContext;
use super::cycle::DetectionCycle;
use super::events::SlotEvent;
use super::publisher::{StatePublisher, SubscriptionId};
use super::retry::{calculate_backoff, has_retry_budget, should_auto_retry};

/// Lifecycle monitor for one mounted ad slot.
///
/// Created when the slot mounts; dropping it (or calling
/// [`AdSlotMonitor::unmount`]) releases every timer and observer it holds.
pub struct AdSlotMonitor {
    shared: Rc<Shared>,
}

/// State reachable from scheduled callbacks through a weak handle.
pub(super) struct Shared {
    pub(super) config: AdSlotConfig,
    pub(super) settings: MonitorSettings,
    pub(super) ctx: MonitorContext,
    pub(super) inner: RefCell<Inner>,
    pub(super) publisher: StatePublisher,
}

pub(super) struct Inner {
    pub state: AdSlotState,
    pub attempt: u32,
    pub mounted: bool,
    /// Attempt the last fill request was issued for.
    pub requested_attempt: Option<u32>,
    /// Registration pushes issued over the slot's lifetime.
    pub fill_requests: u32,
    pub cycle: DetectionCycle,
}

/// How an attempt ended.
#[derive(Debug)]
pub(super) enum Verdict {
    Loaded,
    Empty(FailureKind),
    Failed(SlotError),
}

impl AdSlotMonitor {
    pub fn new(
        config: AdSlotConfig,
        ctx: MonitorContext,
        settings: MonitorSettings,
    ) -> Result<Self, SlotConfigError> {
        config.validate()?;
        Ok(Self {
            shared: Rc::new(Shared {
                config,
                settings,
                ctx,
                inner: RefCell::new(Inner {
                    state: AdSlotState::Idle,
                    attempt: 0,
                    mounted: true,
                    requested_attempt: None,
                    fill_requests: 0,
                    cycle: DetectionCycle::default(),
                }),
                publisher: StatePublisher::default(),
            }),
        })
    }

    pub fn slot_id(&self) -> &str {
        &self.shared.config.slot_id
    }

    pub fn config(&self) -> &AdSlotConfig {
        &self.shared.config
    }

    /// Start the first attempt. Does not block: waiting for the delivery
    /// script and detecting the fill happen on scheduled callbacks.
    ///
    /// Returns `false` when the slot was already initialized or unmounted.
    pub fn initialize(&self) -> bool {
        let started = {
            let mut inner = self.shared.inner.borrow_mut();
            if !inner.mounted || inner.state != AdSlotState::Idle {
                debug!(slot_id = %self.slot_id(), state = %inner.state, "initialize ignored");
                false
            } else {
                inner.attempt = 1;
                self.shared
                    .transition(&mut inner, AdSlotState::AwaitingScript { attempt: 1 })
            }
        };

        if started {
            self.shared.begin_attempt(1);
        }
        self.shared.publisher.flush();
        started
    }

    /// Start a new attempt from `Empty`, `Failed` or `Collapsed`.
    ///
    /// Returns whether a retry was actually started. Refused (without any
    /// state change) for other states and once the attempt budget is spent.
    pub fn retry(&self) -> bool {
        let started = self.shared.start_retry(true);
        self.shared.publisher.flush();
        started
    }

    /// Release every timer and observer; no transition happens afterwards.
    pub fn unmount(&self) {
        self.shared.release();
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.inner.borrow().mounted
    }

    pub fn state(&self) -> AdSlotState {
        self.shared.inner.borrow().state.clone()
    }

    pub fn flags(&self) -> SlotFlags {
        self.shared.inner.borrow().state.flags()
    }

    /// What the presentation layer should render right now.
    pub fn view(&self) -> SlotView {
        let can_retry = self.can_retry();
        self.shared.inner.borrow().state.view(can_retry)
    }

    pub fn attempt(&self) -> u32 {
        self.shared.inner.borrow().attempt
    }

    /// Whether [`AdSlotMonitor::retry`] would start a new attempt.
    pub fn can_retry(&self) -> bool {
        let inner = self.shared.inner.borrow();
        inner.mounted
            && inner.state.is_retryable()
            && has_retry_budget(inner.attempt, self.shared.config.max_retries)
    }

    /// Registration pushes issued over the slot's lifetime.
    pub fn fill_requests(&self) -> u32 {
        self.shared.inner.borrow().fill_requests
    }

    /// Whether the slot still holds any timer or observer.
    pub fn holds_resources(&self) -> bool {
        self.shared.inner.borrow().cycle.is_active()
    }

    /// Be notified of every event this slot publishes.
    pub fn subscribe(&self, listener: impl FnMut(&SlotEvent) + 'static) -> SubscriptionId {
        self.shared.publisher.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.publisher.unsubscribe(id)
    }
}

impl Drop for AdSlotMonitor {
    fn drop(&mut self) {
        self.shared.release();
    }
}

impl Shared {
    /// Apply a transition from the table, queueing its notification.
    pub(super) fn transition(&self, inner: &mut Inner, next: AdSlotState) -> bool {
        match inner.state.try_transition(next) {
            Ok(next) => {
                debug!(
                    slot_id = %self.config.slot_id,
                    from = %inner.state,
                    to = %next,
                    "slot state changed"
                );
                let from = std::mem::replace(&mut inner.state, next);
                self.publisher.enqueue(SlotEvent::StateChanged {
                    slot_id: self.config.slot_id.clone(),
                    from,
                    to: inner.state.clone(),
                });
                true
            }
            Err(e) => {
                warn!(slot_id = %self.config.slot_id, error = %e, "rejected slot state transition");
                false
            }
        }
    }

    /// Whether callbacks for `attempt` may still act while the slot is in `kind`.
    pub(super) fn is_current(&self, inner: &Inner, attempt: u32, kind: StateKind) -> bool {
        inner.mounted && inner.attempt == attempt && inner.state.kind() == kind
    }

    /// Wrap a callback so it only runs while the monitor is alive, and
    /// delivers the events it raised.
    pub(super) fn task<F>(self: &Rc<Self>, f: F) -> impl FnMut() + 'static
    where
        F: Fn(&Rc<Shared>) + 'static,
    {
        let weak = Rc::downgrade(self);
        move || {
            if let Some(shared) = weak.upgrade() {
                f(&shared);
                shared.publisher.flush();
            }
        }
    }

    /// Commit the end of `attempt`. The first verdict wins; later ones are
    /// dropped because every trigger of the attempt is cancelled here.
    pub(super) fn settle(self: &Rc<Self>, attempt: u32, verdict: Verdict) {
        let slot_id = self.config.slot_id.as_str();
        let scheduler = &*self.ctx.scheduler;
        let mut inner = self.inner.borrow_mut();

        if !inner.mounted || inner.attempt != attempt || inner.state.is_settled() {
            debug!(slot_id, attempt, ?verdict, "late verdict dropped");
            return;
        }

        inner.cycle.cancel_all(scheduler, &*self.ctx.host);

        let load_time_ms = match inner.state {
            AdSlotState::Pending { started_at_ms, .. } => {
                Some(now_ms(scheduler).saturating_sub(started_at_ms))
            }
            _ => None,
        };

        match verdict {
            Verdict::Loaded => {
                self.transition(&mut inner, AdSlotState::Loaded { attempt });
                info!(
                    target: "slotwatch::metrics",
                    slot_id, attempt, outcome = "loaded", load_time_ms = ?load_time_ms,
                    "slot settled"
                );
            }
            Verdict::Empty(kind) => {
                self.transition(&mut inner, AdSlotState::Empty { attempt });
                info!(
                    target: "slotwatch::metrics",
                    slot_id, attempt, outcome = "empty", reason = %kind, load_time_ms = ?load_time_ms,
                    "slot settled"
                );
                if self.config.collapse_when_empty {
                    self.transition(
                        &mut inner,
                        AdSlotState::Collapsed {
                            attempt,
                            reason: CollapseReason::Unfilled,
                        },
                    );
                }
            }
            Verdict::Failed(error) => {
                let message = error.to_string();
                self.transition(
                    &mut inner,
                    AdSlotState::Failed {
                        attempt,
                        error_message: message.clone(),
                    },
                );
                info!(
                    target: "slotwatch::metrics",
                    slot_id, attempt, outcome = "failed", reason = %error.kind(), load_time_ms = ?load_time_ms,
                    "slot settled"
                );
                if self.config.collapse_when_empty {
                    self.transition(
                        &mut inner,
                        AdSlotState::Collapsed {
                            attempt,
                            reason: CollapseReason::Error { message },
                        },
                    );
                } else {
                    self.schedule_auto_retry(&mut inner, attempt, error.kind());
                }
            }
        }
    }

    /// Arm an automatic retry for a visible failure, if the policy allows it.
    fn schedule_auto_retry(self: &Rc<Self>, inner: &mut Inner, attempt: u32, kind: FailureKind) {
        let RetryPolicy::Backoff { base, max } = self.settings.retry_policy else {
            return;
        };
        if !should_auto_retry(kind, attempt, self.config.max_retries) {
            return;
        }

        let delay = calculate_backoff(attempt, base, max);
        let id = self.ctx.scheduler.set_timeout(
            delay,
            Box::new(self.task(move |shared| {
                shared.clear_fired(attempt, |cycle| cycle.auto_retry = None);
                shared.start_retry(false);
            })),
        );
        inner.cycle.auto_retry = Some(id);

        info!(slot_id = %self.config.slot_id, attempt, ?delay, "automatic retry scheduled");
        self.publisher.enqueue(SlotEvent::RetryScheduled {
            slot_id: self.config.slot_id.clone(),
            attempt: attempt + 1,
            delay,
        });
    }

    /// Replace the settled attempt with a new one.
    pub(super) fn start_retry(self: &Rc<Self>, manual: bool) -> bool {
        let slot_id = self.config.slot_id.as_str();
        let attempt = {
            let mut inner = self.inner.borrow_mut();
            if !inner.mounted {
                debug!(slot_id, "retry ignored: slot unmounted");
                return false;
            }
            if !inner.state.is_retryable() {
                debug!(slot_id, state = %inner.state, "retry ignored");
                return false;
            }
            if !has_retry_budget(inner.attempt, self.config.max_retries) {
                warn!(
                    slot_id,
                    attempt = inner.attempt,
                    max_retries = self.config.max_retries,
                    "retry budget exhausted"
                );
                self.publisher.enqueue(SlotEvent::RetryExhausted {
                    slot_id: slot_id.to_string(),
                    attempt: inner.attempt,
                    max_retries: self.config.max_retries,
                });
                return false;
            }

            inner.cycle.cancel_all(&*self.ctx.scheduler, &*self.ctx.host);
            let next = inner.attempt + 1;
            if !self.transition(&mut inner, AdSlotState::AwaitingScript { attempt: next }) {
                return false;
            }
            inner.attempt = next;
            next
        };

        info!(slot_id, attempt, manual, "retrying slot");
        self.begin_attempt(attempt);
        true
    }

    /// Unmount: cancel everything and stop accepting callbacks.
    pub(super) fn release(&self) {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return;
        };
        if !inner.mounted {
            return;
        }
        inner.mounted = false;
        inner.cycle.cancel_all(&*self.ctx.scheduler, &*self.ctx.host);
        debug!(slot_id = %self.config.slot_id, state = %inner.state, "slot unmounted");
    }
}
