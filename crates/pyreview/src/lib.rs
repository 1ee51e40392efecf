//! # pyreview
//!
//! Review Python source for style, performance and security problems.
//!
//! This is the main facade crate that re-exports the core framework, the
//! built-in rules and the tree-sitter parser.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pyreview::{default_reviewer, ReviewConfig};
//! use std::path::Path;
//!
//! let reviewer = default_reviewer(ReviewConfig::default())?;
//! let report = reviewer.review_directory(Path::new("./src"));
//! println!("{} issues in {} files", report.total_issues, report.files_reviewed);
//! ```
//!
//! ## Persisted State
//!
//! ```rust,ignore
//! use pyreview::{ConfigStore, ReportStore, StateDir};
//!
//! let state = StateDir::new("/home/me/.pyreview");
//! let config = ConfigStore::new(&state).load();
//! let reviewer = pyreview::default_reviewer(config)?;
//! let id = ReportStore::new(&state).save(&reviewer.review_file(path).into())?;
//! ```

#![forbid(unsafe_code)]

pub use pyreview_core::*;
pub use pyreview_ts::PythonParser;

/// Built-in checks, categories and engine rule ids.
pub mod rules {
    pub use pyreview_core::rules::*;
    pub use pyreview_rules::*;
}

/// Builds a reviewer with the Python parser and every built-in category.
///
/// # Errors
///
/// Never fails with the default builder settings; the `Result` is the
/// builder's.
pub fn default_reviewer(config: ReviewConfig) -> Result<Reviewer, ReviewerError> {
    builder(config).build()
}

/// Like [`default_reviewer`], reviewing directories on `jobs` worker threads.
///
/// `jobs == 1` reviews sequentially; `0` uses the global rayon pool.
///
/// # Errors
///
/// Returns an error if the worker pool cannot be created.
pub fn parallel_reviewer(config: ReviewConfig, jobs: usize) -> Result<Reviewer, ReviewerError> {
    builder(config).jobs(jobs).build()
}

fn builder(config: ReviewConfig) -> ReviewerBuilder {
    Reviewer::builder()
        .parser(PythonParser::new())
        .categories(pyreview_rules::default_categories())
        .config(config)
}
