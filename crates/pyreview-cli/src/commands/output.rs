//! Shared output formatting for review reports.
//!
//! Issues are grouped by the file they came from and sorted by line within
//! each file, errors first within a line. Directory reports list files in
//! walk order.

use anyhow::{Context, Result};
use miette::GraphicalReportHandler;
use pyreview::{Issue, IssueDiagnostic, Report, Severity, StoredReport};
use std::path::Path;

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(&serde_json::to_value(report)?),
        OutputFormat::Compact => print_compact(report),
        OutputFormat::Pretty => print_pretty(report)?,
    }
    Ok(())
}

/// Print a saved report; JSON output includes its `report_id`.
pub fn print_stored(stored: &StoredReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&stored.to_json()?),
        other => {
            println!("Report {}", stored.report_id);
            print(&stored.report, other)
        }
    }
}

/// Issues in display order, each paired with the path it belongs to.
fn ordered(report: &Report) -> Vec<(&Path, &Issue)> {
    fn sorted<'a>(
        path: &'a Path,
        issues: impl IntoIterator<Item = &'a Issue>,
    ) -> Vec<(&'a Path, &'a Issue)> {
        let mut issues: Vec<&Issue> = issues.into_iter().collect();
        issues.sort_by(|a, b| a.line.cmp(&b.line).then(b.severity.cmp(&a.severity)));
        issues.into_iter().map(|issue| (path, issue)).collect()
    }

    match report {
        Report::File(file) => sorted(&file.file, &file.issues),
        Report::Directory(dir) => {
            let mut out: Vec<(&Path, &Issue)> = dir
                .unattributed()
                .into_iter()
                .map(|issue| (dir.directory.as_path(), issue))
                .collect();
            for (file, issues) in dir.by_file() {
                out.extend(sorted(file, issues));
            }
            out
        }
    }
}

fn severity_indicator(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    }
}

fn print_text(report: &Report) {
    for (path, issue) in ordered(report) {
        println!(
            "{} {} at {}:{}",
            issue.kind,
            issue.rule,
            path.display(),
            issue.line
        );
        println!("  {}: {}", severity_indicator(issue.severity), issue.message);
        println!();
    }
    if let Report::Directory(dir) = report {
        print_file_table(dir);
    }
    print_summary(report);
}

/// Files with issues, most issues first.
fn file_table(dir: &pyreview::DirectoryReport) -> Vec<(&Path, usize)> {
    let mut rows: Vec<(&Path, usize)> = dir
        .by_file()
        .map(|(file, issues)| (file, issues.len()))
        .filter(|(_, count)| *count > 0)
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

fn print_file_table(dir: &pyreview::DirectoryReport) {
    let rows = file_table(dir);
    if rows.is_empty() {
        return;
    }
    println!("{:>7}  File", "Issues");
    for (file, count) in rows {
        println!("{count:>7}  {}", file.display());
    }
    println!();
}

fn print_summary(report: &Report) {
    let count = |severity| {
        report
            .issues()
            .iter()
            .filter(|i| i.severity == severity)
            .count()
    };
    let (errors, warnings, infos) = (
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info),
    );
    let files = match report {
        Report::Directory(r) => r.files_reviewed,
        Report::File(_) => 1,
    };

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{summary_color}Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {files} file(s)\x1b[0m"
    );
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &Report) {
    for (path, issue) in ordered(report) {
        println!(
            "{}:{}: {} [{}/{}] {}",
            path.display(),
            issue.line,
            issue.severity,
            issue.kind,
            issue.rule,
            issue.message,
        );
    }
}

fn print_pretty(report: &Report) -> Result<()> {
    let Report::File(file) = report else {
        print_text(report);
        return Ok(());
    };
    let source = match std::fs::read_to_string(&file.file) {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!("Cannot read {} for snippets: {}", file.file.display(), e);
            print_text(report);
            return Ok(());
        }
    };

    let handler = GraphicalReportHandler::new();
    for (path, issue) in ordered(report) {
        print!("{}", render(&handler, issue, path, &source)?);
    }
    print_summary(report);
    Ok(())
}

fn render(
    handler: &GraphicalReportHandler,
    issue: &Issue,
    file: &Path,
    source: &str,
) -> Result<String> {
    let diagnostic = IssueDiagnostic::new(issue, file, source);
    let mut out = String::new();
    handler
        .render_report(&mut out, &diagnostic)
        .context("Failed to render diagnostic")?;
    Ok(out)
}
