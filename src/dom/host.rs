//! Access to slot elements and their mutations

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use crate::models::constants::markers;

use super::element::SlotSnapshot;

/// Handle to a registered mutation observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// Kind of change observed on a slot subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    ChildList,
    Attribute { name: String },
    CharacterData,
}

/// Callback invoked with a batch of mutations.
pub type MutationCallback = Rc<dyn Fn(&[Mutation])>;

/// The document the slots live in.
pub trait SlotHost {
    /// Current view of the slot's element, `None` when it is not in the document.
    fn snapshot(&self, slot_id: &str) -> Option<SlotSnapshot>;

    /// Watch the slot subtree for child, attribute and text changes.
    ///
    /// Returns `None` when there is no element to observe.
    fn observe(&self, slot_id: &str, callback: MutationCallback) -> Option<ObserverId>;

    /// Stop delivering mutations to an observer. Unknown ids are ignored.
    fn disconnect(&self, observer: ObserverId);
}

/// In-process document used by tests and the simulator.
///
/// Mutations are delivered synchronously when the page is changed through
/// [`InMemoryPage::update`], after all internal borrows are released, so an
/// observer may disconnect itself from inside its callback.
#[derive(Default)]
pub struct InMemoryPage {
    slots: RefCell<HashMap<String, SlotSnapshot>>,
    observers: RefCell<BTreeMap<ObserverId, (String, MutationCallback)>>,
    next_observer: Cell<u64>,
}

impl InMemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a slot element without notifying observers.
    pub fn mount(&self, slot_id: impl Into<String>, snapshot: SlotSnapshot) {
        self.slots.borrow_mut().insert(slot_id.into(), snapshot);
    }

    /// Remove a slot element from the document.
    pub fn remove(&self, slot_id: &str) -> Option<SlotSnapshot> {
        self.slots.borrow_mut().remove(slot_id)
    }

    /// Replace a slot's element and notify its observers of what changed.
    ///
    /// Returns the mutations delivered; empty when nothing changed or the
    /// slot does not exist.
    pub fn update(&self, slot_id: &str, next: SlotSnapshot) -> Vec<Mutation> {
        let mutations = {
            let mut slots = self.slots.borrow_mut();
            let Some(current) = slots.get_mut(slot_id) else {
                return Vec::new();
            };
            let mutations = diff(current, &next);
            *current = next;
            mutations
        };

        if !mutations.is_empty() {
            self.notify(slot_id, &mutations);
        }
        mutations
    }

    /// Number of connected observers.
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    fn notify(&self, slot_id: &str, mutations: &[Mutation]) {
        let callbacks: Vec<MutationCallback> = self
            .observers
            .borrow()
            .values()
            .filter(|(observed, _)| observed == slot_id)
            .map(|(_, callback)| Rc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(mutations);
        }
    }
}

impl SlotHost for InMemoryPage {
    fn snapshot(&self, slot_id: &str) -> Option<SlotSnapshot> {
        self.slots.borrow().get(slot_id).cloned()
    }

    fn observe(&self, slot_id: &str, callback: MutationCallback) -> Option<ObserverId> {
        if !self.slots.borrow().contains_key(slot_id) {
            return None;
        }
        let id = ObserverId(self.next_observer.get());
        self.next_observer.set(id.0 + 1);
        self.observers
            .borrow_mut()
            .insert(id, (slot_id.to_string(), callback));
        Some(id)
    }

    fn disconnect(&self, observer: ObserverId) {
        self.observers.borrow_mut().remove(&observer);
    }
}

fn diff(current: &SlotSnapshot, next: &SlotSnapshot) -> Vec<Mutation> {
    let mut mutations = Vec::new();

    if current.child_count != next.child_count {
        mutations.push(Mutation::ChildList);
    }

    let names = current.attributes.keys().chain(next.attributes.keys());
    let changed: BTreeSet<&String> = names
        .filter(|name| current.attributes.get(*name) != next.attributes.get(*name))
        .collect();
    for name in changed {
        mutations.push(Mutation::Attribute { name: name.clone() });
    }
    if current.classes != next.classes {
        mutations.push(Mutation::Attribute {
            name: "class".to_string(),
        });
    }

    // Size and visibility changes surface through the style attribute
    if current.width != next.width
        || current.height != next.height
        || current.visibility != next.visibility
    {
        mutations.push(Mutation::Attribute {
            name: "style".to_string(),
        });
    }

    if current.descendant_statuses != next.descendant_statuses {
        mutations.push(Mutation::Attribute {
            name: markers::STATUS_ATTRIBUTE.to_string(),
        });
    }

    if current.inner_html != next.inner_html && current.child_count == next.child_count {
        mutations.push(Mutation::CharacterData);
    }

    mutations
}
