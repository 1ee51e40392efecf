//! Rule flagging modules, classes and functions without a docstring.
//!
//! A docstring is a plain (non-f, non-bytes) string literal as the first
//! statement of the body. A blank docstring counts as missing.

use pyreview_core::tree::{ClassDef, FunctionDef};
use pyreview_core::visit::{self, Visit};
use pyreview_core::{
    Check, CheckError, FileContext, Issue, IssueType, Module, RuleInfo, Severity, Stmt,
};

/// Rule id for docstring.
pub const RULE: &str = "docstring";

/// Check name for docstring.
pub const NAME: &str = "docstring";

const RULES: &[RuleInfo] = &[RuleInfo {
    id: RULE,
    severity: Severity::Info,
    description: "Module, class or function without a docstring",
}];

/// Flags missing docstrings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Docstring;

impl Docstring {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for Docstring {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> IssueType {
        IssueType::Style
    }

    fn rules(&self) -> &'static [RuleInfo] {
        RULES
    }

    fn check(&self, ctx: &FileContext, module: &Module) -> Result<Vec<Issue>, CheckError> {
        let mut visitor = DocVisitor {
            ctx,
            issues: Vec::new(),
            error: None,
        };
        if module.docstring().is_none() {
            visitor.issues.push(missing(1, "Module is missing a docstring".to_string()));
        }
        visitor.visit_module(module);
        match visitor.error {
            Some(e) => Err(e),
            None => Ok(visitor.issues),
        }
    }
}

fn missing(line: usize, message: String) -> Issue {
    Issue::new(IssueType::Style, RULE, Severity::Info, line, message)
}

struct DocVisitor<'a> {
    ctx: &'a FileContext<'a>,
    issues: Vec<Issue>,
    error: Option<CheckError>,
}

impl DocVisitor<'_> {
    fn report(&mut self, stmt: &Stmt, construct: &'static str, name: &str) {
        if self.error.is_some() {
            return;
        }
        match self.ctx.located(stmt.line, construct) {
            Ok(line) => self
                .issues
                .push(missing(line, format!("{construct} `{name}` is missing a docstring"))),
            Err(e) => self.error = Some(e),
        }
    }
}

impl<'ast> Visit<'ast> for DocVisitor<'_> {
    fn visit_function_def(&mut self, stmt: &'ast Stmt, node: &'ast FunctionDef) {
        if node.docstring().is_none() {
            self.report(stmt, "Function", &node.name);
        }
        visit::walk_function_def(self, node);
    }

    fn visit_class_def(&mut self, stmt: &'ast Stmt, node: &'ast ClassDef) {
        if node.docstring().is_none() {
            self.report(stmt, "Class", &node.name);
        }
        visit::walk_class_def(self, node);
    }
}
