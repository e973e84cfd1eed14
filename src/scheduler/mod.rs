//! Timer scheduling for the slot monitor
//!
//! The monitor runs on a single-threaded, cooperative event loop. Every
//! suspension point (readiness wait, periodic poll, hard timeout, mutation
//! debounce) is a scheduled callback identified by a [`TaskId`] that can be
//! cancelled before it fires.

mod event_loop;

use std::time::Duration;

pub use event_loop::EventLoop;

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

/// A one-shot task.
pub type OnceTask = Box<dyn FnOnce()>;

/// A task that runs on every interval tick until cancelled.
pub type RepeatTask = Box<dyn FnMut()>;

/// Single-threaded timer facility.
///
/// Implementations must tolerate re-entrancy: a running task may schedule
/// new tasks or cancel any task, including itself.
pub trait Scheduler {
    /// Time elapsed since the scheduler started.
    fn now(&self) -> Duration;

    /// Run `task` once after `delay`.
    fn set_timeout(&self, delay: Duration, task: OnceTask) -> TaskId;

    /// Run `task` every `every` until cancelled. The first run is after one interval.
    fn set_interval(&self, every: Duration, task: RepeatTask) -> TaskId;

    /// Cancel a task. Cancelling an unknown or finished task is a no-op.
    fn cancel(&self, id: TaskId);
}

/// Milliseconds since the scheduler started, as stored in slot states.
pub fn now_ms(scheduler: &dyn Scheduler) -> u64 {
    scheduler.now().as_millis() as u64
}
