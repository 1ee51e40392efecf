//! File and directory review commands.

use anyhow::{Context, Result};
use pyreview::{ConfigStore, Report, ReportStore, Reviewer, StateDir};
use std::path::Path;

use crate::OutputFormat;

/// Runs the file command.
pub fn file(state: &StateDir, path: &Path, format: OutputFormat, save: bool) -> Result<()> {
    let reviewer = pyreview::default_reviewer(load_config(state)?)
        .context("Failed to build reviewer")?;
    let report = Report::from(reviewer.review_file(path));
    finish(state, &report, format, save)
}

/// Runs the dir command.
pub fn dir(
    state: &StateDir,
    path: &Path,
    format: OutputFormat,
    save: bool,
    jobs: Option<usize>,
) -> Result<()> {
    let config = load_config(state)?;
    let reviewer: Reviewer = match jobs {
        Some(jobs) => pyreview::parallel_reviewer(config, jobs),
        None => pyreview::default_reviewer(config),
    }
    .context("Failed to build reviewer")?;

    tracing::info!("Reviewing {} with {} categories", path.display(), reviewer.categories().len());
    let report = Report::from(reviewer.review_directory(path));
    finish(state, &report, format, save)
}

fn load_config(state: &StateDir) -> Result<pyreview::ReviewConfig> {
    state
        .ensure()
        .with_context(|| format!("Failed to create {}", state.root().display()))?;
    Ok(ConfigStore::new(state).load())
}

fn finish(state: &StateDir, report: &Report, format: OutputFormat, save: bool) -> Result<()> {
    super::output::print(report, format)?;

    if save {
        let id = ReportStore::new(state)
            .save(report)
            .context("Failed to save report")?;
        tracing::info!("Saved report {}", id);
    }

    // Exit with error code if there are errors
    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
