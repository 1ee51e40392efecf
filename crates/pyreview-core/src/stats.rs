//! Issue statistics.

use crate::types::Issue;

use serde::Serialize;
use std::collections::BTreeMap;

/// Issue counts by type, severity and rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueStats {
    /// Number of issues.
    pub total: usize,
    /// Count keyed by issue type.
    pub by_type: BTreeMap<String, usize>,
    /// Count keyed by severity.
    pub by_severity: BTreeMap<String, usize>,
    /// Count keyed by rule id.
    pub by_rule: BTreeMap<String, usize>,
}

/// Tallies `issues`. Keys with no issues are absent.
#[must_use]
pub fn summarize(issues: &[Issue]) -> IssueStats {
    let mut stats = IssueStats {
        total: issues.len(),
        ..IssueStats::default()
    };
    for issue in issues {
        *stats.by_type.entry(issue.kind.as_str().to_string()).or_default() += 1;
        *stats
            .by_severity
            .entry(issue.severity.as_str().to_string())
            .or_default() += 1;
        *stats.by_rule.entry(issue.rule.clone()).or_default() += 1;
    }
    stats
}
