//! Check traits and categories.

use crate::context::FileContext;
use crate::tree::Module;
use crate::types::{rules, Issue, IssueType, Severity};

use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Static description of one rule a check can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleInfo {
    /// Stable rule identifier (e.g. `line_length`).
    pub id: &'static str,
    /// Severity of issues with this rule.
    pub severity: Severity,
    /// One-line description.
    pub description: &'static str,
}

/// A check failed part-way through the tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// A node reached a check without a usable line number.
    #[error("{construct} node has no source location")]
    MissingLocation {
        /// Kind of node (e.g. `"function"`).
        construct: &'static str,
    },

    /// Any other traversal failure.
    #[error("{message}")]
    Traversal {
        /// Line of the failing construct, if known.
        line: Option<usize>,
        /// What went wrong.
        message: String,
    },
}

impl CheckError {
    /// Returns the line of the failing construct, if known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MissingLocation { .. } => None,
            Self::Traversal { line, .. } => *line,
        }
    }

    /// Converts the failure into the single `error/parsing` issue that replaces
    /// the rest of the category.
    #[must_use]
    pub fn into_issue(self) -> Issue {
        Issue::error(
            rules::PARSING,
            self.line().unwrap_or(1),
            format!("Error while analyzing code: {self}"),
        )
    }
}

/// A per-file check over the syntax tree and raw lines.
///
/// Checks are pure: the same context and tree always produce the same issues.
///
/// # Example
///
/// ```ignore
/// use pyreview_core::{Check, CheckError, FileContext, Issue, IssueType, Module, RuleInfo};
///
/// pub struct NoTabs;
///
/// impl Check for NoTabs {
///     fn name(&self) -> &'static str { "no-tabs" }
///     fn category(&self) -> IssueType { IssueType::Style }
///     fn rules(&self) -> &'static [RuleInfo] { &[/* ... */] }
///
///     fn check(&self, ctx: &FileContext, _module: &Module) -> Result<Vec<Issue>, CheckError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait Check: Send + Sync {
    /// Returns the kebab-case name of this check.
    fn name(&self) -> &'static str;

    /// Returns the category whose issues this check produces.
    fn category(&self) -> IssueType;

    /// Returns the rules this check can emit.
    fn rules(&self) -> &'static [RuleInfo];

    /// Checks a single file.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] if the tree cannot be traversed; the category
    /// records it and skips its remaining checks.
    fn check(&self, ctx: &FileContext, module: &Module) -> Result<Vec<Issue>, CheckError>;
}

/// Type alias for boxed Check trait objects.
pub type CheckBox = Box<dyn Check>;

/// An ordered group of checks of one issue type.
///
/// Categories are isolated from each other: a failure inside one category
/// (an error or a panic) only stops that category's remaining checks.
pub struct Category {
    kind: IssueType,
    checks: Vec<CheckBox>,
}

impl Category {
    /// Creates an empty category.
    #[must_use]
    pub fn new(kind: IssueType) -> Self {
        Self {
            kind,
            checks: Vec::new(),
        }
    }

    /// Adds a check.
    #[must_use]
    pub fn check<C: Check + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Adds a boxed check.
    #[must_use]
    pub fn check_box(mut self, check: CheckBox) -> Self {
        self.checks.push(check);
        self
    }

    /// Returns the issue type of this category.
    #[must_use]
    pub fn kind(&self) -> IssueType {
        self.kind
    }

    /// Returns the checks in run order.
    #[must_use]
    pub fn checks(&self) -> &[CheckBox] {
        &self.checks
    }

    /// Runs every check in order, appending to `issues`.
    ///
    /// Issues found before a failure are kept; the failure itself becomes one
    /// `error/parsing` issue.
    pub fn run(&self, ctx: &FileContext, module: &Module, issues: &mut Vec<Issue>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            for check in &self.checks {
                debug!("Running check {} on {}", check.name(), ctx.path.display());
                let found = check.check(ctx, module)?;
                issues.extend(found);
            }
            Ok::<(), CheckError>(())
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("{} checks stopped on {}: {}", self.kind, ctx.path.display(), e);
                issues.push(e.into_issue());
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "check panicked".to_string());
                warn!("{} checks panicked on {}: {}", self.kind, ctx.path.display(), message);
                issues.push(Issue::error(
                    rules::PARSING,
                    1,
                    format!("Error while analyzing code: {message}"),
                ));
            }
        }
    }
}

impl std::fmt::Debug for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Category")
            .field("kind", &self.kind)
            .field(
                "checks",
                &self.checks.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
