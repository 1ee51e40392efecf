//! Core types for review issues and reports.

use chrono::{DateTime, Local};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Category an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    /// Layout and documentation conventions.
    Style,
    /// Per-function size and complexity limits.
    Performance,
    /// Risky call sites.
    Security,
    /// The file could not be reviewed (access, encoding, syntax, traversal).
    Error,
}

impl IssueType {
    /// Returns the serialized name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Returns the serialized name of this severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule identifiers for issues produced by the pipelines themselves.
pub mod rules {
    /// The file could not be resolved or read safely.
    pub const FILE_ACCESS: &str = "file_access";
    /// The file is blank.
    pub const EMPTY_FILE: &str = "empty_file";
    /// The file is not valid UTF-8.
    pub const ENCODING: &str = "encoding";
    /// The file could not be parsed.
    pub const SYNTAX: &str = "syntax";
    /// A category failed while traversing the tree.
    pub const PARSING: &str = "parsing";
    /// The review target is not an accessible directory.
    pub const DIRECTORY_ACCESS: &str = "directory_access";
}

/// One flagged problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Category of the issue.
    #[serde(rename = "type")]
    pub kind: IssueType,
    /// Stable rule identifier (e.g. `line_length`).
    pub rule: String,
    /// Human-readable message.
    pub message: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Severity of this issue.
    pub severity: Severity,
}

impl Issue {
    /// Creates a new issue. Line numbers below 1 are raised to 1.
    #[must_use]
    pub fn new(
        kind: IssueType,
        rule: impl Into<String>,
        severity: Severity,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            rule: rule.into(),
            message: message.into(),
            line: line.max(1),
            severity,
        }
    }

    /// Creates an `error`-type issue with `error` severity.
    #[must_use]
    pub fn error(rule: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::new(IssueType::Error, rule, Severity::Error, line, message)
    }

    /// Formats the issue for terminal output.
    #[must_use]
    pub fn format(&self, file: &Path) -> String {
        format!(
            "{} {} at {}:{}\n  {}: {}\n",
            self.kind,
            self.rule,
            file.display(),
            self.line,
            self.severity,
            self.message
        )
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}/{}] {}",
            self.line, self.severity, self.kind, self.rule, self.message
        )
    }
}

/// Review result for a single file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    /// Path as given by the caller.
    pub file: PathBuf,
    /// When the review started.
    pub time: DateTime<Local>,
    /// Issues in pipeline order.
    pub issues: Vec<Issue>,
}

impl FileReport {
    /// Creates an empty report stamped with the current time.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            time: Local::now(),
            issues: Vec::new(),
        }
    }

    /// Appends a single error issue and returns the finished report.
    #[must_use]
    pub fn fail(mut self, issue: Issue) -> Self {
        self.issues.push(issue);
        self
    }
}

/// Aggregated review result for a directory walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryReport {
    /// Directory as given by the caller.
    pub directory: PathBuf,
    /// When the walk started.
    pub time: DateTime<Local>,
    /// Number of files the file pipeline ran on.
    pub files_reviewed: usize,
    /// Length of `issues`.
    pub total_issues: usize,
    /// Issue count keyed by type name.
    pub issue_types: BTreeMap<String, usize>,
    /// Issue count keyed by severity name.
    pub issue_severities: BTreeMap<String, usize>,
    /// Concatenation of all per-file issues.
    pub issues: Vec<Issue>,
    /// Which slice of `issues` each reviewed file contributed, in walk order.
    #[serde(default)]
    pub files: Vec<FileSummary>,
}

/// One reviewed file's share of a directory report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    /// Path of the reviewed file.
    pub file: PathBuf,
    /// Index of the file's first issue in the report's `issues`.
    pub first_issue: usize,
    /// Number of issues the file contributed.
    pub total_issues: usize,
}

impl DirectoryReport {
    /// Creates an empty report stamped with the current time.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            time: Local::now(),
            files_reviewed: 0,
            total_issues: 0,
            issue_types: BTreeMap::new(),
            issue_severities: BTreeMap::new(),
            issues: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Folds one file's result into the running totals.
    pub fn absorb(&mut self, report: FileReport) {
        self.files_reviewed += 1;
        self.files.push(FileSummary {
            file: report.file,
            first_issue: self.issues.len(),
            total_issues: report.issues.len(),
        });
        for issue in report.issues {
            self.record(issue);
        }
    }

    /// Issues of each reviewed file, in walk order.
    pub fn by_file(&self) -> impl Iterator<Item = (&Path, &[Issue])> + '_ {
        self.files.iter().map(|summary| {
            let end = summary.first_issue + summary.total_issues;
            let issues = self.issues.get(summary.first_issue..end).unwrap_or(&[]);
            (summary.file.as_path(), issues)
        })
    }

    /// Issues recorded without a file, such as a directory access failure.
    #[must_use]
    pub fn unattributed(&self) -> Vec<&Issue> {
        let mut covered = vec![false; self.issues.len()];
        for summary in &self.files {
            let end = (summary.first_issue + summary.total_issues).min(covered.len());
            for flag in covered.iter_mut().take(end).skip(summary.first_issue) {
                *flag = true;
            }
        }
        self.issues
            .iter()
            .zip(covered)
            .filter_map(|(issue, covered)| (!covered).then_some(issue))
            .collect()
    }

    /// Adds an issue that is not attributed to a reviewed file.
    pub fn record(&mut self, issue: Issue) {
        *self
            .issue_types
            .entry(issue.kind.as_str().to_string())
            .or_insert(0) += 1;
        *self
            .issue_severities
            .entry(issue.severity.as_str().to_string())
            .or_insert(0) += 1;
        self.issues.push(issue);
        self.total_issues = self.issues.len();
    }
}

/// Either kind of report, as persisted by the report store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Report {
    /// A directory walk.
    Directory(DirectoryReport),
    /// A single file.
    File(FileReport),
}

impl Report {
    /// Returns the reviewed file or directory.
    #[must_use]
    pub fn target(&self) -> &Path {
        match self {
            Self::Directory(r) => &r.directory,
            Self::File(r) => &r.file,
        }
    }

    /// Returns the report timestamp.
    #[must_use]
    pub fn time(&self) -> DateTime<Local> {
        match self {
            Self::Directory(r) => r.time,
            Self::File(r) => r.time,
        }
    }

    /// Returns all issues of the report.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Directory(r) => &r.issues,
            Self::File(r) => &r.issues,
        }
    }

    /// Returns the number of issues.
    #[must_use]
    pub fn total_issues(&self) -> usize {
        match self {
            Self::Directory(r) => r.total_issues,
            Self::File(r) => r.issues.len(),
        }
    }

    /// Returns true if any issue has `error` severity.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues().iter().any(|i| i.severity == Severity::Error)
    }
}

impl From<FileReport> for Report {
    fn from(report: FileReport) -> Self {
        Self::File(report)
    }
}

impl From<DirectoryReport> for Report {
    fn from(report: DirectoryReport) -> Self {
        Self::Directory(report)
    }
}

/// An issue rendered as a miette diagnostic against its source line.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("[{kind}/{rule}] {message}")]
pub struct IssueDiagnostic {
    kind: IssueType,
    rule: String,
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("{severity}")]
    span: SourceSpan,
    severity: Severity,
}

impl IssueDiagnostic {
    /// Builds a diagnostic that highlights the issue's line in `source`.
    #[must_use]
    pub fn new(issue: &Issue, file: &Path, source: &str) -> Self {
        let (offset, length) = line_span(source, issue.line);
        Self {
            kind: issue.kind,
            rule: issue.rule.clone(),
            message: issue.message.clone(),
            src: NamedSource::new(file.display().to_string(), source.to_string()),
            span: SourceSpan::from((offset, length)),
            severity: issue.severity,
        }
    }
}

/// Byte offset and trimmed length of a 1-indexed line, or `(0, 0)` if out of bounds.
fn line_span(source: &str, line: usize) -> (usize, usize) {
    let mut offset = 0;
    for (i, content) in source.split('\n').enumerate() {
        if i + 1 == line {
            return (offset, content.trim_end().len());
        }
        offset += content.len() + 1;
    }
    (0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(kind: IssueType, severity: Severity) -> Issue {
        Issue::new(kind, "line_length", severity, 3, "too long")
    }

    #[test]
    fn issue_serializes_contract_field_names() {
        let json = serde_json::to_value(issue(IssueType::Style, Severity::Warning)).unwrap();
        assert_eq!(json["type"], "style");
        assert_eq!(json["rule"], "line_length");
        assert_eq!(json["message"], "too long");
        assert_eq!(json["line"], 3);
        assert_eq!(json["severity"], "warning");
    }

    #[test]
    fn issue_line_is_at_least_one() {
        let i = Issue::error(rules::SYNTAX, 0, "bad");
        assert_eq!(i.line, 1);
    }

    #[test]
    fn directory_report_tallies_by_type_and_severity() {
        let mut dir = DirectoryReport::new("src");
        let mut file = FileReport::new("src/a.py");
        file.issues.push(issue(IssueType::Style, Severity::Warning));
        file.issues.push(issue(IssueType::Security, Severity::Error));
        dir.absorb(file);
        dir.absorb(FileReport::new("src/b.py"));

        assert_eq!(dir.files_reviewed, 2);
        assert_eq!(dir.total_issues, 2);
        assert_eq!(dir.issue_types.get("style"), Some(&1));
        assert_eq!(dir.issue_types.get("security"), Some(&1));
        assert_eq!(dir.issue_severities.get("warning"), Some(&1));
        assert_eq!(dir.issue_severities.get("error"), Some(&1));
        assert!(!dir.issue_severities.contains_key("info"));
    }

    #[test]
    fn directory_report_attributes_issues_to_files() {
        let mut dir = DirectoryReport::new("src");
        let mut a = FileReport::new("src/a.py");
        a.issues.push(issue(IssueType::Style, Severity::Warning));
        a.issues.push(issue(IssueType::Style, Severity::Info));
        let mut b = FileReport::new("src/b.py");
        b.issues.push(issue(IssueType::Security, Severity::Error));
        dir.absorb(a);
        dir.absorb(FileReport::new("src/empty.py"));
        dir.absorb(b);

        let counts: Vec<(&Path, usize)> = dir.by_file().map(|(f, i)| (f, i.len())).collect();
        assert_eq!(
            counts,
            vec![
                (Path::new("src/a.py"), 2),
                (Path::new("src/empty.py"), 0),
                (Path::new("src/b.py"), 1),
            ]
        );
        let (_, b_issues) = dir.by_file().nth(2).unwrap();
        assert_eq!(b_issues[0].kind, IssueType::Security);
        assert!(dir.unattributed().is_empty());
        assert_eq!(dir.issues.len(), 3);
    }

    #[test]
    fn recorded_issue_has_no_file() {
        let mut dir = DirectoryReport::new("missing");
        dir.record(Issue::error(rules::DIRECTORY_ACCESS, 1, "Cannot access directory"));
        assert_eq!(dir.by_file().count(), 0);
        assert_eq!(dir.unattributed().len(), 1);
    }

    #[test]
    fn directory_report_without_files_field_still_loads() {
        let json = r#"{"directory":"src","time":"2024-05-01T09:00:00+00:00","files_reviewed":0,
            "total_issues":0,"issue_types":{},"issue_severities":{},"issues":[]}"#;
        let report: Report = serde_json::from_str(json).unwrap();
        let Report::Directory(dir) = report else {
            panic!("expected directory report");
        };
        assert!(dir.files.is_empty());
    }

    #[test]
    fn untagged_report_distinguishes_file_and_directory() {
        let file: Report = FileReport::new("a.py").into();
        let dir: Report = DirectoryReport::new("src").into();

        let file_back: Report =
            serde_json::from_str(&serde_json::to_string(&file).unwrap()).unwrap();
        let dir_back: Report = serde_json::from_str(&serde_json::to_string(&dir).unwrap()).unwrap();

        assert!(matches!(file_back, Report::File(_)));
        assert!(matches!(dir_back, Report::Directory(_)));
        assert_eq!(file_back, file);
        assert_eq!(dir_back, dir);
    }

    #[test]
    fn line_span_points_at_requested_line() {
        let src = "a = 1\nbb = 2  \nc = 3";
        assert_eq!(line_span(src, 1), (0, 5));
        assert_eq!(line_span(src, 2), (6, 6));
        assert_eq!(line_span(src, 9), (0, 0));
    }
}
