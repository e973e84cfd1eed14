//! Manual and automatic retries across slots

use std::time::Duration;

use slotwatch::dom::SlotSnapshot;
use slotwatch::models::{AdSlotConfig, AdSlotState, CollapseReason, Placement, StateKind};
use slotwatch::monitor::{MonitorSettings, RetryPolicy, SlotEvent};

use super::helpers::*;

fn backoff() -> MonitorSettings {
    MonitorSettings {
        retry_policy: RetryPolicy::backoff(),
        ..MonitorSettings::default()
    }
}

fn error_marker() -> SlotSnapshot {
    SlotSnapshot::blank().with_attribute("data-ad-status", "error")
}

fn scheduled(events: &[SlotEvent]) -> Vec<Duration> {
    events
        .iter()
        .filter_map(|event| match event {
            SlotEvent::RetryScheduled { delay, .. } => Some(*delay),
            _ => None,
        })
        .collect()
}

#[test]
fn test_retry_budget_is_per_slot() {
    let page = TestPage::new();
    page.readiness.mark_ready();
    let header = page.mount(
        Placement::Header.slot_config("1111111111"),
        MonitorSettings::default(),
    );
    let footer = page.mount(
        Placement::Footer.slot_config("3333333333"),
        MonitorSettings::default(),
    );
    header.initialize();
    footer.initialize();

    page.advance_ms(8000);
    assert!(header.retry());
    page.advance_ms(8000);
    assert!(header.retry());
    page.advance_ms(8000);
    assert!(!header.retry());
    assert_eq!(page.queue.requests_for("1111111111").len(), 3);

    // The footer still has its full budget
    assert_eq!(footer.attempt(), 1);
    assert!(footer.can_retry());
    assert!(footer.retry());
    assert_eq!(footer.attempt(), 2);
}

#[test]
fn test_backoff_only_for_transient_failures() {
    let page = TestPage::new();
    page.readiness.mark_ready();
    let failing = page.mount(AdSlotConfig::new("100"), backoff());
    let unfilled_slot = page.mount(AdSlotConfig::new("200"), backoff());
    failing.initialize();
    unfilled_slot.initialize();

    page.document.update("100", error_marker());
    page.document.update("200", unfilled());
    page.advance_ms(150);

    assert_eq!(failing.state().kind(), StateKind::Failed);
    assert_eq!(unfilled_slot.state(), AdSlotState::Empty { attempt: 1 });
    assert_eq!(scheduled(&page.events_for("100")), vec![Duration::from_secs(2)]);
    assert!(scheduled(&page.events_for("200")).is_empty());

    page.advance_ms(2000);
    assert_eq!(failing.attempt(), 2);
    assert_eq!(unfilled_slot.attempt(), 1);
}

#[test]
fn test_collapsed_failure_waits_for_manual_retry() {
    let page = TestPage::new();
    page.readiness.mark_ready();
    let slot = page.mount(Placement::Middle.slot_config("2222222222"), backoff());
    slot.initialize();

    page.document.update("2222222222", error_marker());
    page.advance_ms(150);
    assert!(matches!(
        slot.state(),
        AdSlotState::Collapsed {
            reason: CollapseReason::Error { .. },
            ..
        }
    ));

    page.advance_ms(60_000);
    assert_eq!(slot.attempt(), 1);
    assert!(scheduled(&page.events_for("2222222222")).is_empty());

    page.document.update("2222222222", SlotSnapshot::blank());
    assert!(slot.retry());
    page.document
        .update("2222222222", SlotSnapshot::filled(300.0, 250.0));
    page.advance_ms(150);
    assert_eq!(slot.state(), AdSlotState::Loaded { attempt: 2 });
}

#[test]
fn test_readiness_timeout_retries_once_script_arrives() {
    let page = TestPage::new();
    let slot = page.mount(AdSlotConfig::new("300"), backoff());
    slot.initialize();

    page.advance_ms(10_000);
    assert_eq!(slot.state().kind(), StateKind::Failed);
    assert!(page.queue.is_empty());

    page.readiness.mark_ready();
    page.advance_ms(2000);
    assert_eq!(slot.attempt(), 2);
    assert_eq!(slot.state().kind(), StateKind::Pending);
    assert_eq!(page.queue.len(), 1);
}
