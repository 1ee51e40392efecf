//! Rule limiting the size and complexity of functions.
//!
//! Every function is measured, including methods, nested and `async`
//! functions:
//!
//! - `complexity`: 1 + number of `if`/`elif`, `for`, `while` and `try`
//! - `locals`: number of name bindings (assignment, augmented, annotated,
//!   loop, `with`, comprehension and walrus targets, unpacking included)
//! - `returns`: number of `return` statements
//! - `statements`: number of statements, the `def` itself included
//!
//! With `performance.nested_scopes` (the default) the counts include the
//! bodies of nested functions and classes; otherwise they stop at them.

use pyreview_core::tree::{ClassDef, ExprKind, FunctionDef, NameContext};
use pyreview_core::visit::{self, Visit};
use pyreview_core::{
    Check, CheckError, Expr, FileContext, Issue, IssueType, Module, RuleInfo, Severity, Stmt,
    StmtKind,
};
use tracing::debug;

/// Rule id for cyclomatic complexity.
pub const COMPLEXITY: &str = "complexity";
/// Rule id for name bindings.
pub const LOCALS: &str = "locals";
/// Rule id for return statements.
pub const RETURNS: &str = "returns";
/// Rule id for statement count.
pub const STATEMENTS: &str = "statements";

/// Check name for function-metrics.
pub const NAME: &str = "function-metrics";

const RULES: &[RuleInfo] = &[
    RuleInfo {
        id: COMPLEXITY,
        severity: Severity::Warning,
        description: "Function complexity above performance.max_complexity",
    },
    RuleInfo {
        id: LOCALS,
        severity: Severity::Warning,
        description: "Name bindings in a function above performance.max_locals",
    },
    RuleInfo {
        id: RETURNS,
        severity: Severity::Warning,
        description: "Return statements in a function above performance.max_returns",
    },
    RuleInfo {
        id: STATEMENTS,
        severity: Severity::Warning,
        description: "Statements in a function above performance.max_statements",
    },
];

/// Measured values for one function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Cyclomatic complexity.
    pub complexity: usize,
    /// Name bindings.
    pub locals: usize,
    /// `return` statements.
    pub returns: usize,
    /// Statements, the definition included.
    pub statements: usize,
}

impl Metrics {
    /// Measures `function`. With `nested_scopes`, nested function and class
    /// bodies are included.
    #[must_use]
    pub fn measure(function: &FunctionDef, nested_scopes: bool) -> Self {
        let mut counter = Counter {
            metrics: Self {
                complexity: 1,
                statements: 1,
                ..Self::default()
            },
            nested_scopes,
        };
        visit::walk_function_def(&mut counter, function);
        counter.metrics
    }
}

struct Counter {
    metrics: Metrics,
    nested_scopes: bool,
}

impl<'ast> Visit<'ast> for Counter {
    fn visit_stmt(&mut self, node: &'ast Stmt) {
        self.metrics.statements += 1;
        match node.kind {
            StmtKind::If(_) | StmtKind::For(_) | StmtKind::While(_) | StmtKind::Try(_) => {
                self.metrics.complexity += 1;
            }
            StmtKind::Return(_) => self.metrics.returns += 1,
            _ => {}
        }
        visit::walk_stmt(self, node);
    }

    fn visit_function_def(&mut self, _stmt: &'ast Stmt, node: &'ast FunctionDef) {
        if self.nested_scopes {
            visit::walk_function_def(self, node);
        }
    }

    fn visit_class_def(&mut self, _stmt: &'ast Stmt, node: &'ast ClassDef) {
        if self.nested_scopes {
            visit::walk_class_def(self, node);
        }
    }

    fn visit_expr(&mut self, node: &'ast Expr) {
        if matches!(
            node.kind,
            ExprKind::Name {
                ctx: NameContext::Store,
                ..
            }
        ) {
            self.metrics.locals += 1;
        }
        visit::walk_expr(self, node);
    }
}

/// Flags functions over the `performance` limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionMetrics;

impl FunctionMetrics {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for FunctionMetrics {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> IssueType {
        IssueType::Performance
    }

    fn rules(&self) -> &'static [RuleInfo] {
        RULES
    }

    fn check(&self, ctx: &FileContext, module: &Module) -> Result<Vec<Issue>, CheckError> {
        let mut finder = FunctionFinder {
            ctx,
            issues: Vec::new(),
            error: None,
        };
        finder.visit_module(module);
        match finder.error {
            Some(e) => Err(e),
            None => Ok(finder.issues),
        }
    }
}

/// Visits every function and reports its metrics.
struct FunctionFinder<'a> {
    ctx: &'a FileContext<'a>,
    issues: Vec<Issue>,
    error: Option<CheckError>,
}

impl FunctionFinder<'_> {
    fn report(&mut self, stmt: &Stmt, node: &FunctionDef) -> Result<(), CheckError> {
        let limits = &self.ctx.config.performance;
        let metrics = Metrics::measure(node, limits.nested_scopes);
        debug!("{}:{} `{}` {:?}", self.ctx.path.display(), stmt.line, node.name, metrics);
        let checks = [
            (COMPLEXITY, "complexity", metrics.complexity, limits.max_complexity),
            (LOCALS, "local variables", metrics.locals, limits.max_locals),
            (RETURNS, "return statements", metrics.returns, limits.max_returns),
            (STATEMENTS, "statements", metrics.statements, limits.max_statements),
        ];

        for (rule, what, value, max) in checks {
            if value > max {
                let line = self.ctx.located(stmt.line, "function")?;
                self.issues.push(Issue::new(
                    IssueType::Performance,
                    rule,
                    Severity::Warning,
                    line,
                    format!(
                        "Function `{}` has {what} {value}, exceeds maximum of {max}",
                        node.name
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl<'ast> Visit<'ast> for FunctionFinder<'_> {
    fn visit_function_def(&mut self, stmt: &'ast Stmt, node: &'ast FunctionDef) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.report(stmt, node) {
            self.error = Some(e);
            return;
        }
        visit::walk_function_def(self, node);
    }
}
