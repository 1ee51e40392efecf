//! Rule flagging block statements that start off the indentation grid.
//!
//! Applies to `def`, `class`, `if`, `elif`, `for` and `while`, including their
//! `async` forms.

use pyreview_core::visit::{self, Visit};
use pyreview_core::tree::{ClassDef, FunctionDef};
use pyreview_core::{
    Check, CheckError, FileContext, Issue, IssueType, Module, RuleInfo, Severity, Stmt, StmtKind,
};

/// Rule id for indentation.
pub const RULE: &str = "indentation";

/// Check name for indentation.
pub const NAME: &str = "indentation";

const RULES: &[RuleInfo] = &[RuleInfo {
    id: RULE,
    severity: Severity::Warning,
    description: "Block statement not at a multiple of style.indent_size",
}];

/// Flags block statements whose column is not a multiple of `style.indent_size`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Indentation;

impl Indentation {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for Indentation {
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
        let size = ctx.config.style.indent_size;
        if size == 0 {
            return Ok(Vec::new());
        }
        let mut visitor = IndentVisitor {
            ctx,
            size,
            issues: Vec::new(),
            error: None,
        };
        visitor.visit_module(module);
        match visitor.error {
            Some(e) => Err(e),
            None => Ok(visitor.issues),
        }
    }
}

struct IndentVisitor<'a> {
    ctx: &'a FileContext<'a>,
    size: usize,
    issues: Vec<Issue>,
    error: Option<CheckError>,
}

impl IndentVisitor<'_> {
    fn check_column(&mut self, stmt: &Stmt) {
        if self.error.is_some() || stmt.column % self.size == 0 {
            return;
        }
        match self.ctx.located(stmt.line, "block statement") {
            Ok(line) => self.issues.push(Issue::new(
                IssueType::Style,
                RULE,
                Severity::Warning,
                line,
                format!(
                    "Indentation of {} is not a multiple of {}",
                    stmt.column, self.size
                ),
            )),
            Err(e) => self.error = Some(e),
        }
    }
}

impl<'ast> Visit<'ast> for IndentVisitor<'_> {
    fn visit_stmt(&mut self, node: &'ast Stmt) {
        if matches!(node.kind, StmtKind::If(_) | StmtKind::For(_) | StmtKind::While(_)) {
            self.check_column(node);
        }
        visit::walk_stmt(self, node);
    }

    fn visit_function_def(&mut self, stmt: &'ast Stmt, node: &'ast FunctionDef) {
        self.check_column(stmt);
        visit::walk_function_def(self, node);
    }

    fn visit_class_def(&mut self, stmt: &'ast Stmt, node: &'ast ClassDef) {
        self.check_column(stmt);
        visit::walk_class_def(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lines, run};
    use pyreview_core::ReviewConfig;

    #[test]
    fn aligned_blocks_pass() {
        let src = "\
class A:
    def f(self):
        if x:
            pass
        elif y:
            for i in z:
                while i:
                    pass
";
        assert!(run(&Indentation, src, &ReviewConfig::default()).is_empty());
    }

    #[test]
    fn flags_off_grid_blocks_including_elif_and_async() {
        let src = "\
def f():
  if a:
    pass
  elif b:
    pass

async def g():
   async for x in y:
       pass
";
        let issues = run(&Indentation, src, &ReviewConfig::default());
        assert_eq!(lines(&issues), vec![2, 4, 8]);
    }

    #[test]
    fn respects_configured_size() {
        let mut config = ReviewConfig::default();
        config.style.indent_size = 2;
        let src = "def f():\n  if a:\n    pass\n";
        assert!(run(&Indentation, src, &config).is_empty());
    }
}
