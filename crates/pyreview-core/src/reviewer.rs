//! File and directory review pipelines.

use crate::access::{AccessMode, SafeAccessor};
use crate::check::Category;
use crate::config::ReviewConfig;
use crate::context::FileContext;
use crate::parser::{ParserBox, SourceParser};
use crate::types::{rules, DirectoryReport, FileReport, Issue};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const BOM: char = '\u{feff}';

/// Errors that can occur while building a [`Reviewer`].
#[derive(Debug, Error)]
pub enum ReviewerError {
    /// No parser was registered.
    #[error("No source parser configured")]
    MissingParser,

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring a [`Reviewer`].
#[derive(Default)]
pub struct ReviewerBuilder {
    parser: Option<ParserBox>,
    categories: Vec<Category>,
    config: Option<ReviewConfig>,
    accessor: Option<SafeAccessor>,
    jobs: Option<usize>,
}

impl ReviewerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source parser.
    #[must_use]
    pub fn parser<P: SourceParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Sets a boxed source parser.
    #[must_use]
    pub fn parser_box(mut self, parser: ParserBox) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Appends a check category. Categories run in the order they are added.
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    /// Appends several categories.
    #[must_use]
    pub fn categories<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        self.categories.extend(categories);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: ReviewConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the accessor used to open review targets.
    #[must_use]
    pub fn accessor(mut self, accessor: SafeAccessor) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Limits directory reviews to `jobs` worker threads (`1` runs inline,
    /// `0` picks the number of CPUs).
    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Builds the reviewer.
    ///
    /// # Errors
    ///
    /// Returns an error if no parser was set or the worker pool cannot be built.
    pub fn build(self) -> Result<Reviewer, ReviewerError> {
        let parser = self.parser.ok_or(ReviewerError::MissingParser)?;

        let pool = match self.jobs {
            Some(n) if n > 1 => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
            _ => None,
        };

        Ok(Reviewer {
            parser,
            categories: self.categories,
            config: self.config.unwrap_or_default(),
            accessor: self.accessor.unwrap_or_else(|| SafeAccessor::new(".")),
            sequential: self.jobs == Some(1),
            pool,
        })
    }
}

/// Runs the review pipelines.
///
/// Use [`Reviewer::builder()`] to construct an instance. A reviewer holds no
/// per-file state and can be shared across threads.
pub struct Reviewer {
    parser: ParserBox,
    categories: Vec<Category>,
    config: ReviewConfig,
    accessor: SafeAccessor,
    sequential: bool,
    pool: Option<rayon::ThreadPool>,
}

impl Reviewer {
    /// Creates a new builder for configuring a reviewer.
    #[must_use]
    pub fn builder() -> ReviewerBuilder {
        ReviewerBuilder::new()
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Returns the registered categories in run order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Reviews a single file.
    ///
    /// Never fails: access, encoding and syntax problems are reported as
    /// `error`-type issues and stop the pipeline for this file.
    #[must_use]
    pub fn review_file(&self, path: &Path) -> FileReport {
        debug!("Reviewing: {}", path.display());
        let report = FileReport::new(path);

        let resolved = match self.accessor.resolve(path, AccessMode::Read) {
            Ok(resolved) => resolved,
            Err(denied) => {
                warn!("{}", denied);
                return report.fail(Issue::error(
                    rules::FILE_ACCESS,
                    1,
                    format!("Cannot access file: {}", denied.reason),
                ));
            }
        };

        let bytes = match self.accessor.read_bytes(&resolved) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return report.fail(Issue::error(
                    rules::FILE_ACCESS,
                    1,
                    format!("Error reading file: {e}"),
                ));
            }
        };

        if is_blank(&String::from_utf8_lossy(&bytes)) {
            return report.fail(Issue::error(rules::EMPTY_FILE, 1, "File is empty"));
        }

        match std::str::from_utf8(&bytes) {
            Ok(content) => self.analyze(report, content),
            Err(e) => report.fail(Issue::error(
                rules::ENCODING,
                1,
                format!(
                    "File is not valid UTF-8 (invalid byte at offset {})",
                    e.valid_up_to()
                ),
            )),
        }
    }

    /// Reviews in-memory source as if it had been read from `path`.
    ///
    /// Runs every stage after reading: the emptiness check, parsing and all
    /// categories.
    #[must_use]
    pub fn review_source(&self, path: &Path, content: &str) -> FileReport {
        let report = FileReport::new(path);
        if is_blank(content) {
            return report.fail(Issue::error(rules::EMPTY_FILE, 1, "File is empty"));
        }
        self.analyze(report, content)
    }

    fn analyze(&self, mut report: FileReport, content: &str) -> FileReport {
        let content = content.strip_prefix(BOM).unwrap_or(content);

        let module = match self.parser.parse(content) {
            Ok(module) => module,
            Err(e) => {
                debug!("Syntax error in {}: {}", report.file.display(), e);
                return report.fail(Issue::error(
                    rules::SYNTAX,
                    e.line.unwrap_or(1),
                    format!("Syntax error: {e}"),
                ));
            }
        };

        let ctx = FileContext::new(&report.file, content, &self.config);
        let mut issues = Vec::new();
        for category in &self.categories {
            category.run(&ctx, &module, &mut issues);
        }
        report.issues = issues;
        report
    }

    /// Reviews every matching file below `directory`.
    ///
    /// Never fails: a missing or non-directory target yields a report with a
    /// single `directory_access` issue.
    #[must_use]
    pub fn review_directory(&self, directory: &Path) -> DirectoryReport {
        info!("Starting review at {}", directory.display());
        let mut report = DirectoryReport::new(directory);

        if !directory.is_dir() {
            warn!("Cannot access directory {}", directory.display());
            report.record(Issue::error(
                rules::DIRECTORY_ACCESS,
                1,
                "Cannot access directory",
            ));
            return report;
        }

        let files = self.discover_files(directory);
        info!("Found {} files to review", files.len());

        for file_report in self.review_all(&files) {
            report.absorb(file_report);
        }

        info!(
            "Review complete: {} issues in {} files",
            report.total_issues, report.files_reviewed
        );
        report
    }

    fn review_all(&self, files: &[PathBuf]) -> Vec<FileReport> {
        if self.sequential {
            return files.iter().map(|p| self.review_file(p)).collect();
        }
        let run = || -> Vec<FileReport> { files.par_iter().map(|p| self.review_file(p)).collect() };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Lists candidate files in walk order. Symlinks are listed, not followed,
    /// so that the accessor rejects them.
    fn discover_files(&self, directory: &Path) -> Vec<PathBuf> {
        let suffixes: Vec<String> = self
            .parser
            .extensions()
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect();

        let mut files = Vec::new();
        for entry in WalkDir::new(directory)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if suffixes.iter().any(|s| name.ends_with(s.as_str())) {
                files.push(entry.into_path());
            }
        }
        files
    }
}

fn is_blank(content: &str) -> bool {
    content.trim_start_matches(BOM).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{Check, CheckError, RuleInfo};
    use crate::parser::SyntaxError;
    use crate::tree::{Module, Stmt, StmtKind};
    use crate::types::{IssueType, Severity};
    use std::fs;
    use tempfile::TempDir;

    /// One `Pass` statement per non-empty line; a line `!` is a syntax error.
    struct LineParser;

    impl SourceParser for LineParser {
        fn language_id(&self) -> &'static str {
            "lines"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["py"]
        }

        fn parse(&self, source: &str) -> Result<Module, SyntaxError> {
            let mut body = Vec::new();
            for (i, line) in source.lines().enumerate() {
                if line.trim() == "!" {
                    return Err(SyntaxError::new(Some(i + 1), "invalid syntax"));
                }
                if !line.trim().is_empty() {
                    body.push(Stmt::new(i + 1, 0, StmtKind::Pass));
                }
            }
            Ok(Module { body })
        }
    }

    const RULES: &[RuleInfo] = &[RuleInfo {
        id: "stmt",
        severity: Severity::Info,
        description: "Reports every statement",
    }];

    struct EveryStatement;

    impl Check for EveryStatement {
        fn name(&self) -> &'static str {
            "every-statement"
        }

        fn category(&self) -> IssueType {
            IssueType::Style
        }

        fn rules(&self) -> &'static [RuleInfo] {
            RULES
        }

        fn check(&self, ctx: &FileContext, module: &Module) -> Result<Vec<Issue>, CheckError> {
            module
                .body
                .iter()
                .map(|s| {
                    let line = ctx.located(s.line, "statement")?;
                    Ok(Issue::new(IssueType::Style, "stmt", Severity::Info, line, "stmt"))
                })
                .collect()
        }
    }

    fn reviewer() -> Reviewer {
        Reviewer::builder()
            .parser(LineParser)
            .category(Category::new(IssueType::Style).check(EveryStatement))
            .build()
            .unwrap()
    }

    fn rules_of(report: &FileReport) -> Vec<&str> {
        report.issues.iter().map(|i| i.rule.as_str()).collect()
    }

    #[test]
    fn build_requires_parser() {
        assert!(matches!(
            Reviewer::builder().build(),
            Err(ReviewerError::MissingParser)
        ));
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let tmp = TempDir::new().unwrap();
        let report = reviewer().review_file(&tmp.path().join("missing.py"));
        assert_eq!(rules_of(&report), vec![rules::FILE_ACCESS]);
        assert_eq!(report.issues[0].kind, IssueType::Error);
    }

    #[test]
    fn blank_file_is_empty_file_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("blank.py");
        fs::write(&file, "  \n\t\n").unwrap();
        let report = reviewer().review_file(&file);
        assert_eq!(rules_of(&report), vec![rules::EMPTY_FILE]);
    }

    #[test]
    fn invalid_utf8_is_encoding_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("latin1.py");
        fs::write(&file, b"x = '\xe9t\xe9'\n").unwrap();
        let report = reviewer().review_file(&file);
        assert_eq!(rules_of(&report), vec![rules::ENCODING]);
    }

    #[test]
    fn syntax_error_uses_parser_line() {
        let report = reviewer().review_source(Path::new("a.py"), "a\nb\n!\n");
        assert_eq!(rules_of(&report), vec![rules::SYNTAX]);
        assert_eq!(report.issues[0].line, 3);
    }

    #[test]
    fn bom_is_stripped_before_parsing() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("bom.py");
        fs::write(&file, "\u{feff}a\nb\n").unwrap();
        let report = reviewer().review_file(&file);
        assert_eq!(rules_of(&report), vec!["stmt", "stmt"]);
    }

    #[test]
    fn directory_walk_reviews_only_matching_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("pkg")).unwrap();
        fs::write(tmp.path().join("a.py"), "a\n").unwrap();
        fs::write(tmp.path().join("pkg/b.py"), "a\nb\n").unwrap();
        fs::write(tmp.path().join("notes.txt"), "a\n").unwrap();
        fs::write(tmp.path().join("empty.py"), "").unwrap();

        let report = reviewer().review_directory(tmp.path());
        assert_eq!(report.files_reviewed, 3);
        assert_eq!(report.total_issues, 4);
        assert_eq!(report.issue_types.get("style"), Some(&3));
        assert_eq!(report.issue_types.get("error"), Some(&1));
        assert_eq!(report.issue_severities.get("info"), Some(&3));
    }

    #[test]
    fn parallel_and_sequential_walks_agree() {
        let tmp = TempDir::new().unwrap();
        for i in 0..12 {
            fs::write(tmp.path().join(format!("m{i:02}.py")), "a\n".repeat(i + 1)).unwrap();
        }

        let sequential = Reviewer::builder()
            .parser(LineParser)
            .category(Category::new(IssueType::Style).check(EveryStatement))
            .jobs(1)
            .build()
            .unwrap()
            .review_directory(tmp.path());
        let parallel = Reviewer::builder()
            .parser(LineParser)
            .category(Category::new(IssueType::Style).check(EveryStatement))
            .jobs(4)
            .build()
            .unwrap()
            .review_directory(tmp.path());

        assert_eq!(sequential.issues, parallel.issues);
        assert_eq!(sequential.issue_types, parallel.issue_types);
        assert_eq!(sequential.files_reviewed, 12);
    }

    #[test]
    fn missing_directory_is_directory_access_error() {
        let tmp = TempDir::new().unwrap();
        let report = reviewer().review_directory(&tmp.path().join("nope"));
        assert_eq!(report.files_reviewed, 0);
        assert_eq!(report.total_issues, 1);
        assert_eq!(report.issues[0].rule, rules::DIRECTORY_ACCESS);
        assert_eq!(report.issue_types.get("error"), Some(&1));
        assert_eq!(report.issue_severities.get("error"), Some(&1));
    }

    #[test]
    fn file_target_is_directory_access_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.py");
        fs::write(&file, "a\n").unwrap();
        let report = reviewer().review_directory(&file);
        assert_eq!(report.issues[0].rule, rules::DIRECTORY_ACCESS);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_is_attempted_and_denied() {
        let tmp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("secret.py");
        fs::write(&target, "a\n").unwrap();
        std::os::unix::fs::symlink(&target, tmp.path().join("link.py")).unwrap();

        let report = reviewer().review_directory(tmp.path());
        assert_eq!(report.files_reviewed, 1);
        assert_eq!(report.issues[0].rule, rules::FILE_ACCESS);
    }
}
