//! Replay scripted slot lifecycles on a virtual clock
//!
//! Drives a real [`AdSlotMonitor`] against an [`EventLoop`], an
//! [`InMemoryPage`] and a [`RecordingQueue`], so a scenario file exercises
//! exactly the code a page would run.

mod scenario;


use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, warn};

use crate::delivery::{
    init_page_level_ads, PageLevelGuard, QueueEntry, ReadinessSignal, RecordingQueue,
};
use crate::dom::{InMemoryPage, SlotHost, SlotSnapshot};
use crate::models::{AdSlotState, SlotFlags, SlotView};
use crate::monitor::{AdSlotMonitor, MonitorContext, SlotEvent};
use crate::scheduler::{now_ms, EventLoop, Scheduler};

pub use scenario::{Scenario, ScriptedMutation, ScriptedRetry};

/// An event with the virtual time it was published at.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: SlotEvent,
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub slot_id: String,
    pub final_state: AdSlotState,
    pub flags: SlotFlags,
    pub view: SlotView,
    pub attempts: u32,
    pub fill_requests: u32,
    /// Retry presses refused by the monitor.
    pub refused_retries: u32,
    pub events: Vec<TimedEvent>,
    pub queue: Vec<QueueEntry>,
}

/// Run `scenario` to completion and unmount the slot.
pub fn run(scenario: &Scenario) -> Result<SimulationReport> {
    let event_loop = Rc::new(EventLoop::new());
    let readiness = Arc::new(ReadinessSignal::new());
    let queue = Rc::new(RecordingQueue::new());
    let page = Rc::new(InMemoryPage::new());
    let slot_id = scenario.slot.slot_id.clone();

    if let Some(publisher_id) = &scenario.auto_ads_publisher {
        let guard = PageLevelGuard::new();
        if let Err(e) = init_page_level_ads(&guard, &*queue, publisher_id) {
            warn!(error = %e, "page-level registration failed");
        }
    }
    if let Some(message) = &scenario.fail_registration {
        queue.reject(message.clone());
    }
    if scenario.element_present {
        page.mount(&slot_id, SlotSnapshot::blank());
    }

    let ctx = MonitorContext::new(
        event_loop.clone(),
        readiness.clone(),
        queue.clone(),
        page.clone(),
    );
    let monitor = Rc::new(AdSlotMonitor::new(
        scenario.slot.clone(),
        ctx,
        scenario.monitor.to_settings(),
    )?);

    let events = Rc::new(RefCell::new(Vec::new()));
    {
        let events = Rc::clone(&events);
        let clock = Rc::clone(&event_loop);
        monitor.subscribe(move |event: &SlotEvent| {
            events.borrow_mut().push(TimedEvent {
                at_ms: now_ms(&*clock),
                event: event.clone(),
            });
        });
    }

    schedule_script(scenario, &event_loop, &readiness, &queue, &page, &monitor);
    let refused = Rc::new(RefCell::new(0u32));
    for retry in &scenario.retries {
        let monitor = Rc::downgrade(&monitor);
        let refused = Rc::clone(&refused);
        event_loop.set_timeout(
            Duration::from_millis(retry.at_ms),
            Box::new(move || {
                if let Some(monitor) = monitor.upgrade() {
                    if !monitor.retry() {
                        *refused.borrow_mut() += 1;
                    }
                }
            }),
        );
    }

    monitor.initialize();
    let runs = event_loop.advance(Duration::from_millis(scenario.run_for_ms));
    debug!(runs, "simulation finished");

    let report = SimulationReport {
        slot_id,
        final_state: monitor.state(),
        flags: monitor.flags(),
        view: monitor.view(),
        attempts: monitor.attempt(),
        fill_requests: monitor.fill_requests(),
        refused_retries: *refused.borrow(),
        events: events.borrow().clone(),
        queue: queue.entries(),
    };
    monitor.unmount();
    Ok(report)
}

fn schedule_script(
    scenario: &Scenario,
    event_loop: &EventLoop,
    readiness: &Arc<ReadinessSignal>,
    queue: &Rc<RecordingQueue>,
    page: &Rc<InMemoryPage>,
    monitor: &Rc<AdSlotMonitor>,
) {
    if let Some(at_ms) = scenario.ready_at_ms {
        let readiness = Arc::clone(readiness);
        event_loop.set_timeout(
            Duration::from_millis(at_ms),
            Box::new(move || {
                readiness.mark_ready();
            }),
        );
    }

    if let Some(at_ms) = scenario.registration_recovers_at_ms {
        let queue = Rc::clone(queue);
        event_loop.set_timeout(Duration::from_millis(at_ms), Box::new(move || queue.accept()));
    }

    for mutation in &scenario.mutations {
        let page = Rc::clone(page);
        let slot_id = monitor.slot_id().to_string();
        let snapshot = mutation.snapshot();
        event_loop.set_timeout(
            Duration::from_millis(mutation.at_ms),
            Box::new(move || {
                if page.snapshot(&slot_id).is_some() {
                    page.update(&slot_id, snapshot);
                } else {
                    page.mount(&slot_id, snapshot);
                }
            }),
        );
    }
}
