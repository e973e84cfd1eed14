//! Simulate command - replays a scenario file and prints the slot's events

use std::path::Path;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};

use crate::models::{AdSlotState, StateKind};
use crate::simulate::{self, Scenario, SimulationReport};

pub fn execute(scenario_path: &Path, json: bool) -> Result<()> {
    let scenario = Scenario::from_file(scenario_path)?;
    let report = simulate::run(&scenario)?;

    if json {
        let output =
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{output}");
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &SimulationReport) {
    println!(
        "{} slot {}",
        "→".cyan().bold(),
        report.slot_id.bold()
    );
    for timed in &report.events {
        println!("  {:>7}ms  {}", timed.at_ms, timed.event);
    }
    println!(
        "{} {} after {} attempt(s), {} fill request(s), view {:?}",
        "Final state:".bold(),
        paint(&report.final_state),
        report.attempts,
        report.fill_requests,
        report.view
    );
    if report.refused_retries > 0 {
        println!(
            "{} {} retry press(es) refused",
            "─".dimmed(),
            report.refused_retries
        );
    }
}

fn paint(state: &AdSlotState) -> ColoredString {
    let text = state.to_string();
    match state.kind() {
        StateKind::Loaded => text.green().bold(),
        StateKind::Failed => text.red().bold(),
        StateKind::Empty | StateKind::Collapsed => text.yellow(),
        _ => text.normal(),
    }
}
