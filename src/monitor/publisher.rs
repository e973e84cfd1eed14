//! Subscriber notification for slot events

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use super::events::SlotEvent;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SlotEvent)>;

/// Queues events while the monitor mutates its state and delivers them once
/// the state is released.
///
/// Listeners may call back into the monitor (a retry button reacting to
/// `Failed`, say); events raised by that re-entrant call are delivered after
/// the current ones, in order.
#[derive(Default)]
pub(crate) struct StatePublisher {
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    queue: RefCell<VecDeque<SlotEvent>>,
    /// Listeners currently checked out by a flush.
    delivering: RefCell<Vec<SubscriptionId>>,
    /// Unsubscribed while their list was checked out by a flush.
    removed: RefCell<Vec<SubscriptionId>>,
    flushing: Cell<bool>,
    next_id: Cell<u64>,
}

impl StatePublisher {
    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        if listeners.len() != before {
            return true;
        }
        if !self.delivering.borrow().contains(&id) {
            return false;
        }
        let mut removed = self.removed.borrow_mut();
        if removed.contains(&id) {
            return false;
        }
        removed.push(id);
        true
    }

    pub fn enqueue(&self, event: SlotEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Deliver queued events. Must not be called while monitor state is borrowed.
    pub fn flush(&self) {
        if self.flushing.replace(true) {
            // An outer flush further up the stack will pick these up
            return;
        }

        loop {
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                break;
            };

            // Listeners run without the list borrowed so they may subscribe
            let mut listeners = std::mem::take(&mut *self.listeners.borrow_mut());
            *self.delivering.borrow_mut() = listeners.iter().map(|(id, _)| *id).collect();
            for (_, listener) in listeners.iter_mut() {
                listener(&event);
            }
            let mut current = self.listeners.borrow_mut();
            let added = std::mem::take(&mut *current);
            listeners.extend(added);
            let removed = std::mem::take(&mut *self.removed.borrow_mut());
            listeners.retain(|(id, _)| !removed.contains(id));
            *current = listeners;
            self.delivering.borrow_mut().clear();
        }

        self.flushing.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn requested(attempt: u32) -> SlotEvent {
        SlotEvent::FillRequested {
            slot_id: "slot".to_string(),
            attempt,
        }
    }

    #[test]
    fn test_flush_delivers_in_order() {
        let publisher = StatePublisher::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        publisher.subscribe(Box::new(move |event: &SlotEvent| sink.borrow_mut().push(event.clone())));

        publisher.enqueue(requested(1));
        publisher.enqueue(requested(2));
        assert!(seen.borrow().is_empty());

        publisher.flush();
        assert_eq!(*seen.borrow(), vec![requested(1), requested(2)]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let publisher = StatePublisher::default();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let id = publisher.subscribe(Box::new(move |_: &SlotEvent| counter.set(counter.get() + 1)));

        assert!(publisher.unsubscribe(id));
        assert!(!publisher.unsubscribe(id));
        publisher.enqueue(requested(1));
        publisher.flush();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_listener_subscribed_during_flush_is_kept() {
        let publisher = Rc::new(StatePublisher::default());
        let late_calls = Rc::new(Cell::new(0));

        let handle = Rc::clone(&publisher);
        let counter = Rc::clone(&late_calls);
        let subscribed = Cell::new(false);
        publisher.subscribe(Box::new(move |_: &SlotEvent| {
            if !subscribed.replace(true) {
                let counter = Rc::clone(&counter);
                handle.subscribe(Box::new(move |_: &SlotEvent| counter.set(counter.get() + 1)));
            }
        }));

        publisher.enqueue(requested(1));
        publisher.enqueue(requested(2));
        publisher.flush();

        // The late listener misses the event that was being delivered when it
        // subscribed, and sees the next one.
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_unsubscribe_during_flush_only_knows_live_ids() {
        let publisher = Rc::new(StatePublisher::default());
        let results = Rc::new(RefCell::new(Vec::new()));

        let handle = Rc::clone(&publisher);
        let sink = Rc::clone(&results);
        let own_id = Rc::new(Cell::new(None));
        let own = Rc::clone(&own_id);
        let id = publisher.subscribe(Box::new(move |_: &SlotEvent| {
            let mut sink = sink.borrow_mut();
            sink.push(handle.unsubscribe(SubscriptionId(42)));
            if let Some(id) = own.get() {
                sink.push(handle.unsubscribe(id));
                sink.push(handle.unsubscribe(id));
            }
        }));
        own_id.set(Some(id));

        publisher.enqueue(requested(1));
        publisher.enqueue(requested(2));
        publisher.flush();

        // Removed after the first event, so the second is never delivered
        assert_eq!(*results.borrow(), vec![false, true, false]);
        assert!(!publisher.unsubscribe(id));
    }
}
