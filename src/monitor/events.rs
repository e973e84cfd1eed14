//! Notifications published by the monitor

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::models::AdSlotState;

/// Events published to subscribers of a slot monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum SlotEvent {
    /// Every state transition, in order.
    StateChanged {
        slot_id: String,
        from: AdSlotState,
        to: AdSlotState,
    },
    /// A fill request was pushed onto the delivery queue.
    FillRequested { slot_id: String, attempt: u32 },
    /// An automatic retry will start after `delay`.
    RetryScheduled {
        slot_id: String,
        attempt: u32,
        #[serde(rename = "delay_ms", serialize_with = "as_millis")]
        delay: Duration,
    },
    /// `retry()` was refused because the attempt budget is spent.
    RetryExhausted {
        slot_id: String,
        attempt: u32,
        max_retries: u32,
    },
}

impl SlotEvent {
    pub fn slot_id(&self) -> &str {
        match self {
            SlotEvent::StateChanged { slot_id, .. }
            | SlotEvent::FillRequested { slot_id, .. }
            | SlotEvent::RetryScheduled { slot_id, .. }
            | SlotEvent::RetryExhausted { slot_id, .. } => slot_id,
        }
    }
}

impl std::fmt::Display for SlotEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotEvent::StateChanged { from, to, .. } => write!(f, "{from} -> {to}"),
            SlotEvent::FillRequested { attempt, .. } => {
                write!(f, "fill request pushed (attempt {attempt})")
            }
            SlotEvent::RetryScheduled { attempt, delay, .. } => {
                write!(f, "attempt {attempt} scheduled in {}ms", delay.as_millis())
            }
            SlotEvent::RetryExhausted {
                attempt,
                max_retries,
                ..
            } => write!(
                f,
                "retry refused after attempt {attempt} (max retries {max_retries})"
            ),
        }
    }
}

fn as_millis<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(delay.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_scheduled_serializes_millis() {
        let event = SlotEvent::RetryScheduled {
            slot_id: "42".to_string(),
            attempt: 2,
            delay: Duration::from_secs(2),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "retry-scheduled");
        assert_eq!(json["delay_ms"], 2000);
        assert_eq!(event.to_string(), "attempt 2 scheduled in 2000ms");
    }
}
