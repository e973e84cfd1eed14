//! Waiting for the delivery script and issuing the fill request

use std::rc::Rc;

use tracing::{debug, warn};

use crate::delivery::{FillRequest, QueueEntry};
use crate::models::{AdSlotState, SlotError, StateKind};
use crate::scheduler::now_ms;

use super::core::{Shared, Verdict};
use super::events::SlotEvent;

impl Shared {
    /// Begin `attempt`, which has just entered `AwaitingScript`.
    pub(super) fn begin_attempt(self: &Rc<Self>, attempt: u32) {
        if self.ctx.readiness.is_ready() {
            self.issue_fill_request(attempt);
            return;
        }

        debug!(
            slot_id = %self.config.slot_id,
            attempt,
            timeout = ?self.settings.readiness_timeout,
            "waiting for delivery script"
        );
        let scheduler = &*self.ctx.scheduler;
        let poll = scheduler.set_interval(
            self.settings.readiness_poll_interval,
            Box::new(self.task(move |shared| shared.on_readiness_poll(attempt))),
        );
        let timeout = scheduler.set_timeout(
            self.settings.readiness_timeout,
            Box::new(self.task(move |shared| shared.on_readiness_timeout(attempt))),
        );

        let mut inner = self.inner.borrow_mut();
        inner.cycle.readiness_poll = Some(poll);
        inner.cycle.readiness_timeout = Some(timeout);
    }

    fn on_readiness_poll(self: &Rc<Self>, attempt: u32) {
        {
            let mut inner = self.inner.borrow_mut();
            if !self.is_current(&inner, attempt, StateKind::AwaitingScript)
                || !self.ctx.readiness.is_ready()
            {
                return;
            }
            inner.cycle.cancel_readiness_wait(&*self.ctx.scheduler);
        }
        self.issue_fill_request(attempt);
    }

    fn on_readiness_timeout(self: &Rc<Self>, attempt: u32) {
        let ready = {
            let mut inner = self.inner.borrow_mut();
            if !self.is_current(&inner, attempt, StateKind::AwaitingScript) {
                return;
            }
            inner.cycle.cancel_readiness_wait(&*self.ctx.scheduler);
            self.ctx.readiness.is_ready()
        };

        if ready {
            self.issue_fill_request(attempt);
        } else {
            warn!(slot_id = %self.config.slot_id, attempt, "delivery script not ready");
            self.settle(attempt, Verdict::Failed(SlotError::ReadinessTimeout));
        }
    }

    /// Push the fill request for `attempt`, at most once per attempt.
    fn issue_fill_request(self: &Rc<Self>, attempt: u32) {
        {
            let mut inner = self.inner.borrow_mut();
            if !self.is_current(&inner, attempt, StateKind::AwaitingScript) {
                return;
            }
            if inner.requested_attempt == Some(attempt) {
                warn!(slot_id = %self.config.slot_id, attempt, "fill request already issued");
                return;
            }
            inner.requested_attempt = Some(attempt);
            inner.fill_requests += 1;
        }

        let request = FillRequest::new(&self.config, attempt);
        let request_id = request.request_id;
        if let Err(e) = self.ctx.queue.push(QueueEntry::Slot(request)) {
            warn!(slot_id = %self.config.slot_id, attempt, error = %e, "fill request rejected");
            self.settle(attempt, Verdict::Failed(SlotError::Registration(e.0)));
            return;
        }

        {
            let mut inner = self.inner.borrow_mut();
            if !inner.mounted {
                return;
            }
            debug!(slot_id = %self.config.slot_id, attempt, %request_id, "fill request pushed");
            self.publisher.enqueue(SlotEvent::FillRequested {
                slot_id: self.config.slot_id.clone(),
                attempt,
            });
            let started_at_ms = now_ms(&*self.ctx.scheduler);
            if !self.transition(
                &mut inner,
                AdSlotState::Pending {
                    attempt,
                    started_at_ms,
                },
            ) {
                return;
            }
        }

        self.start_detection(attempt);
    }
}
