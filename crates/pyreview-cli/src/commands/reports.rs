//! Saved report commands.

use anyhow::{Context, Result};
use pyreview::{summarize, IssueStats, ReportStore, StateDir};
use std::collections::BTreeMap;

use crate::OutputFormat;

/// Runs the reports list command.
pub fn list(state: &StateDir) -> Result<()> {
    let summaries = ReportStore::new(state).list();
    if summaries.is_empty() {
        println!("No saved reports in {}", state.reports_dir().display());
        return Ok(());
    }

    println!("{:<16} {:<26} {:>7}  Target", "ID", "Time", "Issues");
    println!("{}", "-".repeat(80));
    for summary in summaries {
        println!(
            "{:<16} {:<26} {:>7}  {}",
            summary.id,
            summary.timestamp.format("%Y-%m-%d %H:%M:%S"),
            summary.total_issues,
            summary.target.display()
        );
    }
    Ok(())
}

/// Runs the reports show command.
pub fn show(state: &StateDir, id: &str, format: OutputFormat) -> Result<()> {
    let stored = ReportStore::new(state)
        .get(id)
        .with_context(|| format!("Failed to load report {id}"))?;
    super::output::print_stored(&stored, format)
}

/// Runs the reports stats command.
pub fn stats(state: &StateDir, id: &str, json: bool) -> Result<()> {
    let stored = ReportStore::new(state)
        .get(id)
        .with_context(|| format!("Failed to load report {id}"))?;
    let stats = summarize(stored.report.issues());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&stored.report_id, &stats);
    }
    Ok(())
}

fn print_stats(id: &str, stats: &IssueStats) {
    println!("Report {id}: {} issue(s)", stats.total);
    print_table("By type", &stats.by_type);
    print_table("By severity", &stats.by_severity);
    print_table("By rule", &stats.by_rule);
}

fn print_table(title: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    println!("\n{title}:");
    for (key, count) in counts {
        println!("  {key:<20} {count:>5}");
    }
}
