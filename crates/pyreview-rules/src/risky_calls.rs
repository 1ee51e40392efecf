//! Rule flagging calls to configured risky functions.
//!
//! Only calls whose callee is a bare identifier are matched: `eval(x)` is
//! flagged, `os.system(x)` is not. A name listed in several tables yields one
//! issue per table, in the order SQL, command, file.

use pyreview_core::visit::{self, Visit};
use pyreview_core::{
    Check, CheckError, Expr, FileContext, Issue, IssueType, Module, RuleInfo, Severity,
};

/// Rule id for SQL calls.
pub const SQL_INJECTION: &str = "sql_injection";
/// Rule id for shell and eval calls.
pub const COMMAND_INJECTION: &str = "command_injection";
/// Rule id for filesystem calls.
pub const FILE_ACCESS: &str = "file_access";

/// Check name for risky-calls.
pub const NAME: &str = "risky-calls";

const RULES: &[RuleInfo] = &[
    RuleInfo {
        id: SQL_INJECTION,
        severity: Severity::Error,
        description: "Call to a function in security.sql_risk_functions",
    },
    RuleInfo {
        id: COMMAND_INJECTION,
        severity: Severity::Error,
        description: "Call to a function in security.shell_risk_functions",
    },
    RuleInfo {
        id: FILE_ACCESS,
        severity: Severity::Warning,
        description: "Call to a function in security.file_risk_functions",
    },
];

/// Flags calls listed in the `security` tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskyCalls;

impl RiskyCalls {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for RiskyCalls {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> IssueType {
        IssueType::Security
    }

    fn rules(&self) -> &'static [RuleInfo] {
        RULES
    }

    fn check(&self, ctx: &FileContext, module: &Module) -> Result<Vec<Issue>, CheckError> {
        let mut visitor = CallVisitor {
            ctx,
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

struct CallVisitor<'a> {
    ctx: &'a FileContext<'a>,
    issues: Vec<Issue>,
    error: Option<CheckError>,
}

impl CallVisitor<'_> {
    fn check_call(&mut self, call: &Expr, name: &str) -> Result<(), CheckError> {
        let security = &self.ctx.config.security;
        let tables = [
            (
                &security.sql_risk_functions,
                SQL_INJECTION,
                Severity::Error,
                "Possible SQL injection",
            ),
            (
                &security.shell_risk_functions,
                COMMAND_INJECTION,
                Severity::Error,
                "Possible command injection",
            ),
            (
                &security.file_risk_functions,
                FILE_ACCESS,
                Severity::Warning,
                "Possibly unsafe file access",
            ),
        ];

        for (names, rule, severity, what) in tables {
            if names.contains(name) {
                let line = self.ctx.located(call.line, "call")?;
                self.issues.push(Issue::new(
                    IssueType::Security,
                    rule,
                    severity,
                    line,
                    format!("{what} in call to `{name}`"),
                ));
            }
        }
        Ok(())
    }
}

impl<'ast> Visit<'ast> for CallVisitor<'_> {
    fn visit_expr(&mut self, node: &'ast Expr) {
        if self.error.is_some() {
            return;
        }
        if let Some(name) = node.called_name() {
            if let Err(e) = self.check_call(node, name) {
                self.error = Some(e);
                return;
            }
        }
        visit::walk_expr(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lines, run};
    use pyreview_core::ReviewConfig;

    fn rules(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.rule.as_str()).collect()
    }

    #[test]
    fn flags_bare_calls_from_each_table() {
        let src = "\
cursor = db.cursor()
execute(query)
eval(user_input)
data = open(path)
";
        let issues = run(&RiskyCalls, src, &ReviewConfig::default());
        assert_eq!(rules(&issues), vec![SQL_INJECTION, COMMAND_INJECTION, FILE_ACCESS]);
        assert_eq!(lines(&issues), vec![2, 3, 4]);
        assert_eq!(issues[2].severity, Severity::Warning);
    }

    #[test]
    fn attribute_calls_are_not_flagged() {
        let src = "import os\nos.system(cmd)\ncursor.execute(sql)\n";
        assert!(run(&RiskyCalls, src, &ReviewConfig::default()).is_empty());
    }

    #[test]
    fn name_in_two_tables_yields_two_issues() {
        let mut config = ReviewConfig::default();
        config
            .security
            .file_risk_functions
            .insert("eval".to_string());
        let issues = run(&RiskyCalls, "eval(x)\n", &config);
        assert_eq!(rules(&issues), vec![COMMAND_INJECTION, FILE_ACCESS]);
    }

    #[test]
    fn nested_and_interpolated_calls_are_found() {
        let src = "def f(p):\n    return print(f\"{eval(p)}\", open(p))\n";
        let issues = run(&RiskyCalls, src, &ReviewConfig::default());
        assert_eq!(rules(&issues), vec![COMMAND_INJECTION, FILE_ACCESS]);
        assert_eq!(lines(&issues), vec![2, 2]);
    }
}
