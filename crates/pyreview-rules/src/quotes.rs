//! Rule suggesting the preferred quote character.
//!
//! This is a line-local text heuristic, not a tokenizer: a line containing the
//! non-preferred quote and none of the preferred one is flagged, wherever the
//! quote appears (strings, comments, apostrophes).

use pyreview_core::config::QuotePreference;
use pyreview_core::{Check, CheckError, FileContext, Issue, IssueType, Module, RuleInfo, Severity};

/// Rule id for quotes.
pub const RULE: &str = "quotes";

/// Check name for quotes.
pub const NAME: &str = "quotes";

const RULES: &[RuleInfo] = &[RuleInfo {
    id: RULE,
    severity: Severity::Info,
    description: "Line uses only the non-preferred quote character",
}];

/// Flags lines quoting with the non-preferred character.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quotes;

impl Quotes {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for Quotes {
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
        let (preferred, other, message) = match ctx.config.style.quote_preference {
            QuotePreference::Double => ('"', '\'', "Prefer double quotes"),
            QuotePreference::Single => ('\'', '"', "Prefer single quotes"),
        };
        let issues = ctx
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(other) && !line.contains(preferred))
            .map(|(i, _)| Issue::new(IssueType::Style, RULE, Severity::Info, i + 1, message))
            .collect();
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lines, run};
    use pyreview_core::ReviewConfig;

    const SRC: &str = "a = 'x'\nb = \"y\"\nc = \"it's\"\n";

    #[test]
    fn double_preference_flags_single_only_lines() {
        let issues = run(&Quotes, SRC, &ReviewConfig::default());
        assert_eq!(lines(&issues), vec![1]);
        assert_eq!(issues[0].message, "Prefer double quotes");
    }

    #[test]
    fn single_preference_flags_double_only_lines() {
        let mut config = ReviewConfig::default();
        config.style.quote_preference = QuotePreference::Single;
        let issues = run(&Quotes, SRC, &config);
        assert_eq!(lines(&issues), vec![2]);
    }
}
