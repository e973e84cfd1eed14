//! Push-based registration queue of the delivery provider

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AdFormat, AdSlotConfig};

/// Failure raised by the provider when a push is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct RegistrationError(pub String);

/// Request to fill one slot for one attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FillRequest {
    pub request_id: Uuid,
    pub slot_id: String,
    pub attempt: u32,
    pub format: AdFormat,
    pub full_width_responsive: bool,
}

impl FillRequest {
    pub fn new(config: &AdSlotConfig, attempt: u32) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            slot_id: config.slot_id.clone(),
            attempt,
            format: config.format,
            full_width_responsive: config.full_width_responsive,
        }
    }
}

/// Entry appended to the delivery queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum QueueEntry {
    /// Fill one slot.
    Slot(FillRequest),
    /// Enable page-level auto ads for a publisher.
    PageLevel {
        publisher_id: String,
        enable_page_level_ads: bool,
    },
}

/// Append-only registration queue.
///
/// Append order carries no meaning; the provider serves slots in whatever
/// order it processes them.
pub trait DeliveryQueue {
    fn push(&self, entry: QueueEntry) -> Result<(), RegistrationError>;
}

/// Queue that records every accepted push, optionally rejecting pushes.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    entries: RefCell<Vec<QueueEntry>>,
    reject_with: RefCell<Option<String>>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every following push with `message` until [`RecordingQueue::accept`].
    pub fn reject(&self, message: impl Into<String>) {
        *self.reject_with.borrow_mut() = Some(message.into());
    }

    pub fn accept(&self) {
        *self.reject_with.borrow_mut() = None;
    }

    pub fn entries(&self) -> Vec<QueueEntry> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Fill requests pushed for `slot_id`, in push order.
    pub fn requests_for(&self, slot_id: &str) -> Vec<FillRequest> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                QueueEntry::Slot(request) if request.slot_id == slot_id => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// The queue as the JSON array a provider script would consume.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.entries.borrow())
    }
}

impl DeliveryQueue for RecordingQueue {
    fn push(&self, entry: QueueEntry) -> Result<(), RegistrationError> {
        if let Some(message) = self.reject_with.borrow().as_ref() {
            return Err(RegistrationError(message.clone()));
        }
        self.entries.borrow_mut().push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_records_entries() {
        let queue = RecordingQueue::new();
        let config = AdSlotConfig::new("555");
        queue
            .push(QueueEntry::Slot(FillRequest::new(&config, 1)))
            .unwrap();
        queue
            .push(QueueEntry::Slot(FillRequest::new(&config, 2)))
            .unwrap();

        let requests = queue.requests_for("555");
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].attempt, 2);
        assert_ne!(requests[0].request_id, requests[1].request_id);
    }

    #[test]
    fn test_rejected_push_is_not_recorded() {
        let queue = RecordingQueue::new();
        queue.reject("adsbygoogle.push() error: no slot size");
        let err = queue
            .push(QueueEntry::Slot(FillRequest::new(&AdSlotConfig::new("1"), 1)))
            .unwrap_err();
        assert_eq!(err.to_string(), "adsbygoogle.push() error: no slot size");
        assert!(queue.is_empty());

        queue.accept();
        assert!(queue
            .push(QueueEntry::Slot(FillRequest::new(&AdSlotConfig::new("1"), 1)))
            .is_ok());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_json_shape() {
        let queue = RecordingQueue::new();
        queue
            .push(QueueEntry::PageLevel {
                publisher_id: "ca-pub-123".to_string(),
                enable_page_level_ads: true,
            })
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&queue.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["kind"], "page-level");
        assert_eq!(json[0]["publisher_id"], "ca-pub-123");
    }
}
