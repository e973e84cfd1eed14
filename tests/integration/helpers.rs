//! Shared test helpers for page-level integration tests

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use slotwatch::config::AdsConfig;
use slotwatch::delivery::{ReadinessSignal, RecordingQueue};
use slotwatch::dom::{InMemoryPage, SlotSnapshot};
use slotwatch::models::{AdSlotConfig, Placement};
use slotwatch::monitor::{AdSlotMonitor, MonitorContext, MonitorSettings, SlotEvent};
use slotwatch::scheduler::EventLoop;

/// One page: a clock, a delivery script, a queue and a document.
pub struct TestPage {
    pub event_loop: Rc<EventLoop>,
    pub readiness: Arc<ReadinessSignal>,
    pub queue: Rc<RecordingQueue>,
    pub document: Rc<InMemoryPage>,
    pub events: Rc<RefCell<Vec<SlotEvent>>>,
}

impl TestPage {
    pub fn new() -> Self {
        Self {
            event_loop: Rc::new(EventLoop::new()),
            readiness: Arc::new(ReadinessSignal::new()),
            queue: Rc::new(RecordingQueue::new()),
            document: Rc::new(InMemoryPage::new()),
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn context(&self) -> MonitorContext {
        MonitorContext::new(
            self.event_loop.clone(),
            self.readiness.clone(),
            self.queue.clone(),
            self.document.clone(),
        )
    }

    /// Mount a blank slot element and its monitor, recording its events.
    pub fn mount(&self, config: AdSlotConfig, settings: MonitorSettings) -> AdSlotMonitor {
        self.document.mount(&config.slot_id, SlotSnapshot::blank());
        let monitor = AdSlotMonitor::new(config, self.context(), settings)
            .expect("Failed to create monitor");
        let sink = Rc::clone(&self.events);
        monitor.subscribe(move |event: &SlotEvent| sink.borrow_mut().push(event.clone()));
        monitor
    }

    /// Mount and initialize every placement the configuration renders.
    pub fn mount_all(&self, config: &AdsConfig) -> Vec<(Placement, AdSlotMonitor)> {
        config
            .slot_configs()
            .into_iter()
            .map(|(placement, slot)| {
                let monitor = self.mount(slot, config.settings());
                monitor.initialize();
                (placement, monitor)
            })
            .collect()
    }

    pub fn advance_ms(&self, ms: u64) {
        self.event_loop.advance(Duration::from_millis(ms));
    }

    /// Events published for `slot_id`, in order.
    pub fn events_for(&self, slot_id: &str) -> Vec<SlotEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.slot_id() == slot_id)
            .cloned()
            .collect()
    }
}

/// Configuration rendering all three placements.
pub fn three_slot_config() -> AdsConfig {
    AdsConfig::from_toml_str(
        r#"
publisher_id = "ca-pub-1234567890"
auto_ads = true

[slots]
header = "1111111111"
middle = "2222222222"
footer = "3333333333"
"#,
    )
    .expect("Failed to parse config")
}

pub fn unfilled() -> SlotSnapshot {
    SlotSnapshot::blank().with_attribute("data-ad-status", "unfilled")
}
