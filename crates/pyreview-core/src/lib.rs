//! # pyreview-core
//!
//! Core framework for reviewing Python source against style, performance and
//! security rules.
//!
//! This crate provides:
//!
//! - [`ReviewConfig`] and [`ConfigStore`] for the persisted configuration
//! - [`SafeAccessor`] for validating every path before it is read or written
//! - a closed syntax tree ([`Module`], [`Stmt`], [`Expr`]) and the [`Visit`] trait
//! - [`Check`] and [`Category`] for grouping rules
//! - [`Reviewer`] for the file and directory pipelines
//! - [`ReportStore`] for persisted reports
//!
//! The parser is a collaborator plugged in through [`SourceParser`].
//!
//! ## Example
//!
//! ```ignore
//! use pyreview_core::{Category, IssueType, Reviewer};
//!
//! let reviewer = Reviewer::builder()
//!     .parser(MyParser)
//!     .category(Category::new(IssueType::Style).check(MyCheck))
//!     .build()?;
//!
//! let report = reviewer.review_file(Path::new("app.py"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
mod check;
pub mod config;
mod context;
mod parser;
mod reviewer;
mod state;
mod stats;
mod store;
pub mod tree;
mod types;
pub mod visit;

pub use access::{AccessDenied, AccessMode, DenyReason, ResolvedPath, SafeAccessor, MAX_FILE_SIZE};
pub use check::{Category, Check, CheckBox, CheckError, RuleInfo};
pub use config::{ConfigError, ReviewConfig};
pub use context::FileContext;
pub use parser::{ParserBox, SourceParser, SyntaxError};
pub use reviewer::{Reviewer, ReviewerBuilder, ReviewerError};
pub use state::{ConfigStore, StateDir};
pub use stats::{summarize, IssueStats};
pub use store::{ReportStore, ReportSummary, StoreError, StoredReport, ID_FORMAT};
pub use tree::{Expr, ExprKind, Module, Stmt, StmtKind};
pub use types::{
    rules, DirectoryReport, FileReport, FileSummary, Issue, IssueDiagnostic, IssueType, Report,
    Severity,
};
pub use visit::Visit;
