//! Page-level auto ads registration

use slotwatch::delivery::{init_page_level_ads, PageLevelGuard, QueueEntry, RecordingQueue};

use super::helpers::*;

#[test]
fn test_session_registers_page_level_ads_once() {
    let config = three_slot_config();
    assert!(config.page_level_enabled());
    let publisher_id = config.publisher_id().expect("publisher id");
    let queue = RecordingQueue::new();

    // Every navigation runs the loader again
    let guard = PageLevelGuard::session();
    assert!(init_page_level_ads(guard, &queue, publisher_id).unwrap());
    assert!(!init_page_level_ads(guard, &queue, publisher_id).unwrap());
    assert!(PageLevelGuard::session().is_initialized());

    assert_eq!(
        queue.entries(),
        vec![QueueEntry::PageLevel {
            publisher_id: "ca-pub-1234567890".to_string(),
            enable_page_level_ads: true,
        }]
    );
}

#[test]
fn test_rejected_registration_can_be_retried() {
    let guard = PageLevelGuard::new();
    let queue = RecordingQueue::new();
    queue.reject("script blocked");

    let err = init_page_level_ads(&guard, &queue, "ca-pub-1").unwrap_err();
    assert_eq!(err.to_string(), "script blocked");
    assert!(!guard.is_initialized());

    queue.accept();
    assert!(init_page_level_ads(&guard, &queue, "ca-pub-1").unwrap());
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_page_level_entry_json() {
    let guard = PageLevelGuard::new();
    let queue = RecordingQueue::new();
    init_page_level_ads(&guard, &queue, "ca-pub-7").unwrap();

    let json: serde_json::Value = serde_json::from_str(&queue.to_json().unwrap()).unwrap();
    assert_eq!(json[0]["kind"], "page-level");
    assert_eq!(json[0]["publisher_id"], "ca-pub-7");
    assert_eq!(json[0]["enable_page_level_ads"], true);
}
