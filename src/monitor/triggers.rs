//! Fill detection: mutation observer, periodic poll and hard timeout
//!
//! All three race for the same attempt. Mutations and poll ticks only open a
//! debounce window; the classification that follows it, or the hard timeout,
//! settles the attempt, and settling cancels everything else.

use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::dom::{Mutation, MutationCallback};
use crate::models::{FailureKind, StateKind};

use super::core::{Shared, Verdict};
use super::cycle::DetectionCycle;
use super::detection::{Classification, EmptyReason, Trigger};

impl Shared {
    /// Arm every trigger for `attempt`, which has just entered `Pending`.
    pub(super) fn start_detection(self: &Rc<Self>, attempt: u32) {
        let scheduler = &*self.ctx.scheduler;
        let slot_id = self.config.slot_id.as_str();

        let weak = Rc::downgrade(self);
        let callback: MutationCallback = Rc::new(move |_: &[Mutation]| {
            if let Some(shared) = weak.upgrade() {
                shared.on_mutation(attempt);
                shared.publisher.flush();
            }
        });
        let observer = self.ctx.host.observe(slot_id, callback);
        if observer.is_none() {
            debug!(slot_id, attempt, "slot element not in document, relying on poll");
        }

        let poll = (self.settings.max_poll_attempts > 0).then(|| {
            scheduler.set_interval(
                self.settings.poll_interval,
                Box::new(self.task(move |shared| shared.on_poll_tick(attempt))),
            )
        });

        let hard_timeout = scheduler.set_timeout(
            Duration::from_millis(self.config.fill_timeout_ms),
            Box::new(self.task(move |shared| {
                shared.clear_fired(attempt, |cycle| cycle.hard_timeout = None);
                shared.check_fill(attempt, Trigger::Timeout);
            })),
        );

        let mut inner = self.inner.borrow_mut();
        inner.cycle.observer = observer;
        inner.cycle.poll = poll;
        inner.cycle.poll_ticks = 0;
        inner.cycle.hard_timeout = Some(hard_timeout);
    }

    fn on_mutation(self: &Rc<Self>, attempt: u32) {
        self.arm_debounce(attempt, Trigger::Mutation);
    }

    fn on_poll_tick(self: &Rc<Self>, attempt: u32) {
        {
            let mut inner = self.inner.borrow_mut();
            if !self.is_current(&inner, attempt, StateKind::Pending) {
                return;
            }
            inner.cycle.poll_ticks += 1;
            if inner.cycle.poll_ticks >= self.settings.max_poll_attempts {
                debug!(slot_id = %self.config.slot_id, attempt, "poll attempts exhausted");
                inner.cycle.cancel_poll(&*self.ctx.scheduler);
            }
        }
        self.arm_debounce(attempt, Trigger::Poll);
    }

    /// (Re)start the settle window. Mutations and poll ticks share one
    /// window, so the slot is classified once it has been quiet for the
    /// whole debounce period.
    fn arm_debounce(self: &Rc<Self>, attempt: u32, trigger: Trigger) {
        let scheduler = &*self.ctx.scheduler;
        let mut inner = self.inner.borrow_mut();
        if !self.is_current(&inner, attempt, StateKind::Pending) {
            return;
        }

        inner.cycle.cancel_debounce(scheduler);
        let id = scheduler.set_timeout(
            self.settings.mutation_debounce,
            Box::new(self.task(move |shared| {
                shared.clear_fired(attempt, |cycle| cycle.debounce = None);
                shared.check_fill(attempt, trigger);
            })),
        );
        inner.cycle.debounce = Some(id);
    }

    /// Forget a one-shot timer of `attempt` that has just fired.
    pub(super) fn clear_fired(&self, attempt: u32, clear: impl FnOnce(&mut DetectionCycle)) {
        let mut inner = self.inner.borrow_mut();
        if inner.attempt == attempt {
            clear(&mut inner.cycle);
        }
    }

    /// Classify the slot and settle the attempt if the verdict allows it.
    ///
    /// Blank or indeterminate slots only settle at the hard timeout, where
    /// they count as empty.
    pub(super) fn check_fill(self: &Rc<Self>, attempt: u32, trigger: Trigger) {
        if !self.is_current(&self.inner.borrow(), attempt, StateKind::Pending) {
            return;
        }

        let snapshot = self.ctx.host.snapshot(&self.config.slot_id);
        let classification = self.ctx.classifier.classify(snapshot.as_ref());
        debug!(
            slot_id = %self.config.slot_id,
            attempt,
            %trigger,
            ?classification,
            "slot classified"
        );

        if !classification.is_conclusive() && trigger != Trigger::Timeout {
            return;
        }
        let verdict = match classification {
            Classification::Loaded => Verdict::Loaded,
            Classification::Failed(error) => Verdict::Failed(error),
            Classification::Empty(EmptyReason::Unfilled | EmptyReason::Hidden) => {
                Verdict::Empty(FailureKind::Unfilled)
            }
            Classification::Empty(EmptyReason::Blank) | Classification::Indeterminate => {
                Verdict::Empty(FailureKind::DetectionTimeout)
            }
        };
        self.settle(attempt, verdict);
    }
}
