//! Cancellable resources held by one attempt

use crate::dom::{ObserverId, SlotHost};
use crate::scheduler::{Scheduler, TaskId};

/// Timers and the observer belonging to the current attempt.
///
/// Everything here is released together: when a verdict is committed, when
/// a retry replaces the attempt, and when the slot unmounts.
#[derive(Debug, Default)]
pub(crate) struct DetectionCycle {
    pub readiness_poll: Option<TaskId>,
    pub readiness_timeout: Option<TaskId>,
    pub observer: Option<ObserverId>,
    pub poll: Option<TaskId>,
    pub poll_ticks: u32,
    pub debounce: Option<TaskId>,
    pub hard_timeout: Option<TaskId>,
    pub auto_retry: Option<TaskId>,
}

impl DetectionCycle {
    pub fn cancel_readiness_wait(&mut self, scheduler: &dyn Scheduler) {
        cancel(scheduler, &mut self.readiness_poll);
        cancel(scheduler, &mut self.readiness_timeout);
    }

    pub fn cancel_poll(&mut self, scheduler: &dyn Scheduler) {
        cancel(scheduler, &mut self.poll);
    }

    pub fn cancel_debounce(&mut self, scheduler: &dyn Scheduler) {
        cancel(scheduler, &mut self.debounce);
    }

    /// Release everything and reset the poll counter.
    pub fn cancel_all(&mut self, scheduler: &dyn Scheduler, host: &dyn SlotHost) {
        self.cancel_readiness_wait(scheduler);
        self.cancel_poll(scheduler);
        self.cancel_debounce(scheduler);
        cancel(scheduler, &mut self.hard_timeout);
        cancel(scheduler, &mut self.auto_retry);
        if let Some(observer) = self.observer.take() {
            host.disconnect(observer);
        }
        self.poll_ticks = 0;
    }

    /// Whether any timer or observer is still held.
    pub fn is_active(&self) -> bool {
        self.readiness_poll.is_some()
            || self.readiness_timeout.is_some()
            || self.observer.is_some()
            || self.poll.is_some()
            || self.debounce.is_some()
            || self.hard_timeout.is_some()
            || self.auto_retry.is_some()
    }
}

fn cancel(scheduler: &dyn Scheduler, task: &mut Option<TaskId>) {
    if let Some(id) = task.take() {
        scheduler.cancel(id);
    }
}
