//! End-to-end tests for the file and directory pipelines.

use pyreview::rules::{DIRECTORY_ACCESS, EMPTY_FILE, ENCODING, FILE_ACCESS, PARSING, SYNTAX};
use pyreview::{
    Category, Check, CheckError, FileContext, Issue, IssueType, Module, ReviewConfig, Reviewer,
    RuleInfo, Severity,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const COMPLEXITY: &str = "complexity";
const COMMAND_INJECTION: &str = "command_injection";

const CLEAN: &str = "\"\"\"Module doc.\"\"\"\n\n\ndef add(a, b):\n    \"\"\"Add.\"\"\"\n    return a + b\n";

fn reviewer() -> Reviewer {
    pyreview::default_reviewer(ReviewConfig::default()).unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn long_string(name: &str) -> String {
    // `name = "…"` padded to 90 characters
    let pad = 90 - name.len() - 5;
    format!("{name} = \"{}\"\n", "a".repeat(pad))
}

fn rules(issues: &[Issue]) -> Vec<&str> {
    issues.iter().map(|i| i.rule.as_str()).collect()
}

#[test]
fn clean_file_has_no_issues() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "clean.py", CLEAN);
    let report = reviewer().review_file(&path);
    assert!(report.issues.is_empty(), "{:?}", report.issues);
    assert_eq!(report.file, path);
}

#[test]
fn ninety_character_line_yields_one_line_length_warning() {
    let dir = TempDir::new().unwrap();
    let line = format!("\"\"\"{}\"\"\"\n", "d".repeat(84));
    assert_eq!(line.trim_end().chars().count(), 90);
    let path = write(dir.path(), "long.py", &line);

    let report = reviewer().review_file(&path);
    assert_eq!(report.issues.len(), 1, "{:?}", report.issues);
    let issue = &report.issues[0];
    assert_eq!(issue.kind, IssueType::Style);
    assert_eq!(issue.rule, "line_length");
    assert_eq!(issue.severity, Severity::Warning);
    assert_eq!(issue.line, 1);
}

#[test]
fn empty_file_stops_the_pipeline() {
    let dir = TempDir::new().unwrap();
    for content in ["", "  \n\n\t\n"] {
        let path = write(dir.path(), "empty.py", content);
        let report = reviewer().review_file(&path);
        assert_eq!(rules(&report.issues), vec![EMPTY_FILE]);
        assert_eq!(report.issues[0].kind, IssueType::Error);
    }
}

#[test]
fn invalid_utf8_is_an_encoding_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.py");
    fs::write(&path, b"name = '\xe9t\xe9'\n").unwrap();
    let report = reviewer().review_file(&path);
    assert_eq!(rules(&report.issues), vec![ENCODING]);
    assert_eq!(report.issues[0].line, 1);
}

#[test]
fn syntax_error_is_the_only_issue() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "broken.py", "x = 1\ndef f(:\n    eval(x)\n");
    let report = reviewer().review_file(&path);
    assert_eq!(rules(&report.issues), vec![SYNTAX]);
    assert!(report.issues[0].message.starts_with("Syntax error"));
}

#[test]
fn missing_file_is_a_file_access_error() {
    let dir = TempDir::new().unwrap();
    let report = reviewer().review_file(&dir.path().join("nope.py"));
    assert_eq!(rules(&report.issues), vec![FILE_ACCESS]);
    assert_eq!(report.issues[0].kind, IssueType::Error);
    assert!(report.issues[0].message.starts_with("Cannot access file"));
}

#[cfg(unix)]
#[test]
fn symlinked_file_is_denied() {
    let dir = TempDir::new().unwrap();
    let target = write(dir.path(), "real.py", CLEAN);
    let link = dir.path().join("link.py");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let report = reviewer().review_file(&link);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueType::Error);
}

#[test]
fn every_issue_is_well_formed_and_review_is_idempotent() {
    let src = "\
import os
def handler(request):
   if request:
        data = open('x')
        eval(request)
        os.system(request)
   return data
";
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "messy.py", src);
    let reviewer = reviewer();

    let first = reviewer.review_file(&path);
    let second = reviewer.review_file(&path);
    assert_eq!(first.issues, second.issues);
    for issue in &first.issues {
        assert!(issue.line >= 1);
    }
}

#[test]
fn each_shell_call_yields_one_command_injection() {
    let src = "\
\"\"\"Doc.\"\"\"
eval(a)
x = [eval(b) for b in c]
import os
os.system(d)
";
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "calls.py", src);
    let report = reviewer().review_file(&path);
    let hits: Vec<usize> = report
        .issues
        .iter()
        .filter(|i| i.rule == COMMAND_INJECTION)
        .map(|i| i.line)
        .collect();
    assert_eq!(hits, vec![2, 3]);
    assert!(report
        .issues
        .iter()
        .filter(|i| i.rule == COMMAND_INJECTION)
        .all(|i| i.severity == Severity::Error));
}

#[test]
fn python3_print_and_exec_calls_are_reviewed() {
    let src = "\
\"\"\"Doc.\"\"\"
import sys

print(\"a\", file=sys.stderr)
print()
exec(code)
";
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "calls.py", src);
    let report = reviewer().review_file(&path);
    assert!(!rules(&report.issues).contains(&SYNTAX), "{:?}", report.issues);
    let hits: Vec<usize> = report
        .issues
        .iter()
        .filter(|i| i.rule == COMMAND_INJECTION)
        .map(|i| i.line)
        .collect();
    assert_eq!(hits, vec![6]);
}

#[test]
fn long_operator_chains_are_valid_source() {
    let terms = vec!["a"; 300];
    let dir = TempDir::new().unwrap();
    for (name, src) in [
        ("sum.py", format!("\"\"\"Doc.\"\"\"\nx = {}\n", terms.join(" + "))),
        ("cond.py", format!("\"\"\"Doc.\"\"\"\nif {}:\n    eval(x)\n", terms.join(" and "))),
    ] {
        let path = write(dir.path(), name, &src);
        let report = reviewer().review_file(&path);
        let found = rules(&report.issues);
        assert!(!found.contains(&SYNTAX), "{name}: {:?}", report.issues);
        assert!(found.contains(&"line_length"), "{name}: {:?}", report.issues);
    }

    let path = dir.path().join("cond.py");
    let report = reviewer().review_file(&path);
    assert!(rules(&report.issues).contains(&COMMAND_INJECTION));
}

fn branching_function(branches: usize) -> String {
    let mut src = String::from("\"\"\"Doc.\"\"\"\n\n\ndef f(x):\n    \"\"\"Doc.\"\"\"\n");
    for i in 0..branches {
        src.push_str(&format!("    if x == {i}:\n        pass\n"));
    }
    src
}

#[test]
fn complexity_threshold_is_strict() {
    let dir = TempDir::new().unwrap();
    let reviewer = reviewer();

    // 9 branches: complexity 10, at the default limit
    let at = write(dir.path(), "at.py", &branching_function(9));
    assert!(!rules(&reviewer.review_file(&at).issues).contains(&COMPLEXITY));

    let over = write(dir.path(), "over.py", &branching_function(10));
    let issues = reviewer.review_file(&over).issues;
    assert_eq!(rules(&issues), vec![COMPLEXITY]);
    assert_eq!(issues[0].line, 4);
    assert!(issues[0].message.contains("11"));
}

#[test]
fn empty_directory_has_empty_tallies() {
    let dir = TempDir::new().unwrap();
    let report = reviewer().review_directory(dir.path());
    assert_eq!(report.files_reviewed, 0);
    assert_eq!(report.total_issues, 0);
    assert!(report.issue_types.is_empty());
    assert!(report.issue_severities.is_empty());
}

#[test]
fn directory_tallies_match_the_union_of_file_issues() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.py", CLEAN);
    fs::create_dir(dir.path().join("pkg")).unwrap();
    write(&dir.path().join("pkg"), "b.py", CLEAN);
    let bad = format!(
        "\"\"\"Doc.\"\"\"\neval(x)\n{}{}",
        long_string("y"),
        long_string("z")
    );
    write(dir.path(), "c.py", &bad);
    write(dir.path(), "notes.txt", "eval(x)\n");

    let report = reviewer().review_directory(dir.path());
    assert_eq!(report.files_reviewed, 3);
    assert_eq!(report.total_issues, 3);
    assert_eq!(report.issue_severities.get("warning"), Some(&2));
    assert_eq!(report.issue_severities.get("error"), Some(&1));
    assert_eq!(report.issue_severities.len(), 2);
    assert_eq!(report.issue_types.get("style"), Some(&2));
    assert_eq!(report.issue_types.get("security"), Some(&1));
}

#[test]
fn directory_report_attributes_issues_to_their_files() {
    let dir = TempDir::new().unwrap();
    let shell = write(dir.path(), "a.py", "\"\"\"Doc.\"\"\"\neval(x)\n");
    let clean = write(dir.path(), "b.py", CLEAN);
    let long = write(dir.path(), "c.py", &format!("\"\"\"Doc.\"\"\"\n{}", long_string("y")));

    let report = reviewer().review_directory(dir.path());
    let by_file: Vec<(&Path, Vec<&str>)> = report
        .by_file()
        .map(|(file, issues)| (file, rules(issues)))
        .collect();
    assert_eq!(
        by_file,
        vec![
            (shell.as_path(), vec![COMMAND_INJECTION]),
            (clean.as_path(), vec![]),
            (long.as_path(), vec!["line_length"]),
        ]
    );
    assert_eq!(rules(&report.issues), vec![COMMAND_INJECTION, "line_length"]);
}

#[test]
fn parallel_and_sequential_walks_agree() {
    let dir = TempDir::new().unwrap();
    for i in 0..8 {
        write(dir.path(), &format!("m{i}.py"), &format!("eval(x{i})\n"));
    }
    let sequential = pyreview::parallel_reviewer(ReviewConfig::default(), 1)
        .unwrap()
        .review_directory(dir.path());
    let parallel = pyreview::parallel_reviewer(ReviewConfig::default(), 4)
        .unwrap()
        .review_directory(dir.path());
    assert_eq!(sequential.issues, parallel.issues);
    assert_eq!(sequential.files_reviewed, 8);
}

#[test]
fn missing_directory_is_a_single_issue() {
    let dir = TempDir::new().unwrap();
    let report = reviewer().review_directory(&dir.path().join("absent"));
    assert_eq!(report.files_reviewed, 0);
    assert_eq!(rules(&report.issues), vec![DIRECTORY_ACCESS]);
    assert_eq!(report.issue_types.get("error"), Some(&1));
}

struct Explodes;

impl Check for Explodes {
    fn name(&self) -> &'static str {
        "explodes"
    }

    fn category(&self) -> IssueType {
        IssueType::Style
    }

    fn rules(&self) -> &'static [RuleInfo] {
        &[]
    }

    fn check(&self, _ctx: &FileContext, _module: &Module) -> Result<Vec<Issue>, CheckError> {
        panic!("boom");
    }
}

#[test]
fn a_failing_category_does_not_affect_the_others() {
    let reviewer = Reviewer::builder()
        .parser(pyreview::PythonParser::new())
        .category(Category::new(IssueType::Style).check(Explodes))
        .category(pyreview::rules::security_category())
        .build()
        .unwrap();
    let report = reviewer.review_source(Path::new("inline.py"), "eval(x)\n");
    assert_eq!(
        rules(&report.issues),
        vec![PARSING, COMMAND_INJECTION]
    );
}
