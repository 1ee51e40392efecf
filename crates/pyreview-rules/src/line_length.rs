//! Rule flagging lines longer than the configured maximum.
//!
//! Trailing whitespace is ignored; length is counted in characters, not bytes.

use pyreview_core::{Check, CheckError, FileContext, Issue, IssueType, Module, RuleInfo, Severity};

/// Rule id for line-length.
pub const RULE: &str = "line_length";

/// Check name for line-length.
pub const NAME: &str = "line-length";

const RULES: &[RuleInfo] = &[RuleInfo {
    id: RULE,
    severity: Severity::Warning,
    description: "Line longer than style.max_line_length",
}];

/// Flags lines longer than `style.max_line_length`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineLength;

impl LineLength {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for LineLength {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> IssueType {
        IssueType::Style
    }

    fn rules(&self) -> &'static [RuleInfo] {
        RULES
    }

    fn check(&self, ctx: &FileContext, _module: &Module) -> Result<Vec<Issue>, CheckError> {
        let max = ctx.config.style.max_line_length;
        let issues = ctx
            .lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                let length = line.trim_end().chars().count();
                (length > max).then(|| {
                    Issue::new(
                        IssueType::Style,
                        RULE,
                        Severity::Warning,
                        i + 1,
                        format!("Line is {length} characters long, exceeds {max}"),
                    )
                })
            })
            .collect();
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lines, run};
    use pyreview_core::ReviewConfig;

    #[test]
    fn flags_only_lines_over_the_limit() {
        let config = ReviewConfig::default();
        let src = format!("x = \"{}\"\ny = 1\n", "a".repeat(84));
        let issues = run(&LineLength, &src, &config);
        assert_eq!(lines(&issues), vec![1]);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].message.contains("90"));
    }

    #[test]
    fn exact_limit_and_trailing_whitespace_pass() {
        let config = ReviewConfig::default();
        let src = format!("# {}   \n", "a".repeat(86));
        assert!(run(&LineLength, &src, &config).is_empty());
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut config = ReviewConfig::default();
        config.style.max_line_length = 11;
        let src = "s = \"ééééé\"\n";
        assert!(run(&LineLength, src, &config).is_empty());
    }
}
