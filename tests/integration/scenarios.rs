//! Scenario files replayed through the simulator

use std::fs;

use tempfile::TempDir;

use slotwatch::models::{AdSlotState, StateKind};
use slotwatch::monitor::SlotEvent;
use slotwatch::simulate::{run, Scenario};

fn write_scenario(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("scenario.toml");
    fs::write(&path, content).expect("Failed to write scenario");
    (temp_dir, path)
}

#[test]
fn test_late_script_recovers_through_backoff() {
    let (_dir, path) = write_scenario(
        r#"
ready_at_ms = 11000
run_for_ms = 20000

[slot]
slot_id = "1234567890"

[monitor]
retry = "backoff"
"#,
    );
    let report = run(&Scenario::from_file(&path).unwrap()).unwrap();

    assert_eq!(report.final_state, AdSlotState::Empty { attempt: 2 });
    assert_eq!(report.fill_requests, 1);

    let scheduled: Vec<u64> = report
        .events
        .iter()
        .filter(|timed| matches!(timed.event, SlotEvent::RetryScheduled { .. }))
        .map(|timed| timed.at_ms)
        .collect();
    assert_eq!(scheduled, vec![10_000]);
}

#[test]
fn test_three_empty_attempts_then_refused() {
    let (_dir, path) = write_scenario(
        r#"
ready_at_ms = 0
run_for_ms = 20000

[slot]
slot_id = "1234567890"
max_retries = 2

[[retries]]
at_ms = 6000

[[retries]]
at_ms = 12000

[[retries]]
at_ms = 18000
"#,
    );
    let report = run(&Scenario::from_file(&path).unwrap()).unwrap();

    assert_eq!(report.final_state, AdSlotState::Empty { attempt: 3 });
    assert_eq!(report.fill_requests, 3);
    assert_eq!(report.refused_retries, 1);
}

#[test]
fn test_mutation_beats_poll_and_timeout() {
    let (_dir, path) = write_scenario(
        r#"
ready_at_ms = 0
run_for_ms = 10000

[slot]
slot_id = "1234567890"

[[mutations]]
at_ms = 200
child_count = 1
width = 300.0
height = 250.0
"#,
    );
    let report = run(&Scenario::from_file(&path).unwrap()).unwrap();

    assert_eq!(report.final_state.kind(), StateKind::Loaded);
    let settled_at = report.events.last().map(|timed| timed.at_ms);
    assert_eq!(settled_at, Some(350));
}
