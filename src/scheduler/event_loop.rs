//! Single-threaded timer queue with a controllable clock

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use super::{OnceTask, RepeatTask, Scheduler, TaskId};

/// Intervals shorter than this are clamped so a repeating task cannot spin.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

enum Job {
    Once(Option<OnceTask>),
    Repeat {
        every: Duration,
        task: Option<RepeatTask>,
    },
}

struct Entry {
    deadline: Duration,
    job: Job,
}

#[derive(Default)]
struct LoopState {
    now: Duration,
    next_id: u64,
    /// Due order: deadline first, then scheduling order.
    queue: BTreeSet<(Duration, TaskId)>,
    /// Live tasks. An entry whose closure is `None` is currently running.
    tasks: HashMap<TaskId, Entry>,
}

/// Event loop driving scheduled tasks in deadline order.
///
/// Time only moves when the loop is driven: [`EventLoop::advance`] jumps the
/// clock straight to each deadline, so tests and the simulator replay long
/// lifecycles instantly.
#[derive(Default)]
pub struct EventLoop {
    state: RefCell<LoopState>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (scheduled or running) tasks.
    pub fn pending(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// Move the clock forward by `by`, running every task that comes due.
    ///
    /// Returns the number of task runs.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut runs = 0;

        while let Some((id, deadline)) = self.next_due(target) {
            // Take the closure out so the task can freely re-enter the loop
            let job = {
                let mut state = self.state.borrow_mut();
                state.now = deadline;
                match state.tasks.get_mut(&id) {
                    Some(entry) => match &mut entry.job {
                        Job::Once(task) => task.take().map(Taken::Once),
                        Job::Repeat { every, task } => {
                            let every = *every;
                            task.take().map(|task| Taken::Repeat(every, task))
                        }
                    },
                    None => None,
                }
            };

            match job {
                Some(Taken::Once(task)) => {
                    task();
                    self.state.borrow_mut().tasks.remove(&id);
                }
                Some(Taken::Repeat(every, mut task)) => {
                    task();
                    let mut state = self.state.borrow_mut();
                    // Re-arm unless the task was cancelled while running
                    if let Some(entry) = state.tasks.get_mut(&id) {
                        let next = deadline + every;
                        entry.deadline = next;
                        entry.job = Job::Repeat {
                            every,
                            task: Some(task),
                        };
                        state.queue.insert((next, id));
                    }
                }
                None => continue,
            }
            runs += 1;
        }

        let mut state = self.state.borrow_mut();
        if state.now < target {
            state.now = target;
        }
        runs
    }

    fn next_due(&self, target: Duration) -> Option<(TaskId, Duration)> {
        let mut state = self.state.borrow_mut();
        let (deadline, id) = *state.queue.first()?;
        if deadline > target {
            return None;
        }
        state.queue.remove(&(deadline, id));
        Some((id, deadline))
    }

    fn schedule(&self, delay: Duration, job: Job) -> TaskId {
        let mut state = self.state.borrow_mut();
        let id = TaskId(state.next_id);
        state.next_id += 1;

        let deadline = state.now + delay;
        state.queue.insert((deadline, id));
        state.tasks.insert(id, Entry { deadline, job });
        id
    }
}

enum Taken {
    Once(OnceTask),
    Repeat(Duration, RepeatTask),
}

impl Scheduler for EventLoop {
    fn now(&self) -> Duration {
        self.state.borrow().now
    }

    fn set_timeout(&self, delay: Duration, task: OnceTask) -> TaskId {
        self.schedule(delay, Job::Once(Some(task)))
    }

    fn set_interval(&self, every: Duration, task: RepeatTask) -> TaskId {
        let every = every.max(MIN_INTERVAL);
        self.schedule(
            every,
            Job::Repeat {
                every,
                task: Some(task),
            },
        )
    }

    fn cancel(&self, id: TaskId) {
        let mut state = self.state.borrow_mut();
        if let Some(entry) = state.tasks.remove(&id) {
            state.queue.remove(&(entry.deadline, id));
        }
    }
}
