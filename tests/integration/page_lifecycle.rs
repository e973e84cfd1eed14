//! Several slots on one page sharing the delivery script

use std::sync::Arc;

use slotwatch::delivery::{ReadinessSignal, ReadinessSource};
use slotwatch::dom::SlotSnapshot;
use slotwatch::models::{AdSlotState, CollapseReason, Placement, SlotView, StateKind};
use slotwatch::monitor::SlotEvent;

use super::helpers::*;

#[test]
fn test_slots_share_readiness_and_settle_independently() {
    let page = TestPage::new();
    let slots = page.mount_all(&three_slot_config());
    assert_eq!(slots.len(), 3);
    for (_, monitor) in &slots {
        assert_eq!(monitor.state(), AdSlotState::AwaitingScript { attempt: 1 });
    }

    page.advance_ms(250);
    assert!(page.queue.is_empty());

    page.readiness.mark_ready();
    page.advance_ms(50);
    for (_, monitor) in &slots {
        assert_eq!(monitor.state().kind(), StateKind::Pending);
        assert_eq!(page.queue.requests_for(monitor.slot_id()).len(), 1);
    }

    page.document
        .update("1111111111", SlotSnapshot::filled(728.0, 90.0));
    page.document.update("2222222222", unfilled());
    page.advance_ms(150);

    let (header, middle, footer) = (&slots[0].1, &slots[1].1, &slots[2].1);
    assert_eq!(header.state(), AdSlotState::Loaded { attempt: 1 });
    assert_eq!(header.view(), SlotView::Reveal);
    assert_eq!(
        middle.state(),
        AdSlotState::Collapsed {
            attempt: 1,
            reason: CollapseReason::Unfilled
        }
    );
    assert_eq!(footer.state().kind(), StateKind::Pending);

    // Footer preset: 5000ms fill window from t=300
    page.advance_ms(4849);
    assert_eq!(footer.state().kind(), StateKind::Pending);
    page.advance_ms(1);
    assert_eq!(footer.state().kind(), StateKind::Collapsed);
    assert_eq!(footer.view(), SlotView::Hidden);

    assert_eq!(page.event_loop.pending(), 0);
    assert_eq!(page.document.observer_count(), 0);
    assert_eq!(page.queue.len(), 3);
}

#[test]
fn test_unmounting_one_slot_leaves_others_running() {
    let page = TestPage::new();
    page.readiness.mark_ready();
    let mut slots = page.mount_all(&three_slot_config());

    let (placement, middle) = slots.remove(1);
    assert_eq!(placement, Placement::Middle);
    drop(middle);

    page.document.update("2222222222", unfilled());
    page.advance_ms(8000);

    for (_, monitor) in &slots {
        assert_eq!(monitor.state().kind(), StateKind::Collapsed);
    }
    let middle_states: Vec<StateKind> = page
        .events_for("2222222222")
        .iter()
        .filter_map(|event| match event {
            SlotEvent::StateChanged { to, .. } => Some(to.kind()),
            _ => None,
        })
        .collect();
    assert_eq!(
        middle_states,
        vec![StateKind::AwaitingScript, StateKind::Pending]
    );
}

#[test]
fn test_leaving_the_page_releases_everything() {
    let page = TestPage::new();
    let slots = page.mount_all(&three_slot_config());
    page.advance_ms(100);
    page.readiness.mark_ready();
    page.advance_ms(100);
    assert!(page.event_loop.pending() > 0);
    assert_eq!(page.document.observer_count(), 3);

    drop(slots);

    assert_eq!(page.event_loop.pending(), 0);
    assert_eq!(page.document.observer_count(), 0);
    page.advance_ms(60_000);
    assert_eq!(page.queue.len(), 3);
}

#[test]
fn test_global_readiness_signal_is_shared() {
    let first = ReadinessSignal::global();
    let second = ReadinessSignal::global();
    assert!(Arc::ptr_eq(&first, &second));

    first.mark_ready();
    assert!(second.is_ready());
    assert!(!second.mark_ready());
    assert_eq!(first.ready_at(), second.ready_at());
}
