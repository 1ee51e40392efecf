//! List rules command implementation.

use pyreview::rules::catalog;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!(
        "{:<12} {:<18} {:<8} Description",
        "Category", "Rule", "Severity"
    );
    println!("{}", "-".repeat(80));

    for (kind, rule) in catalog() {
        println!(
            "{:<12} {:<18} {:<8} {}",
            kind.as_str(),
            rule.id,
            rule.severity.as_str(),
            rule.description
        );
    }

    println!("\nThresholds and function lists live in the config file:");
    println!("  pyreview config path");
    println!("  pyreview config set style.max_line_length 100");
}
