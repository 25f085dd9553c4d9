//! Integration test: the per-file pipeline end-to-end via Analyzer.
//!
//! Sources are written to a temporary directory so discovery, parallel
//! processing, error isolation and ordering are exercised together.

use std::fs;
use std::path::Path;
use treelint_core::{
    Analyzer, CancellationFlag, Check, CheckBox, CheckConfig, CheckContext, CheckError,
    CheckPlan, CheckRegistry, CheckResult, DiagnosticKind, LintResult, NodeRef, NodeType,
    OptionError,
};

/// Reports every comment containing `TODO:`.
struct TodoCheck;

impl Check for TodoCheck {
    fn name(&self) -> &'static str {
        "todo"
    }

    fn default_tokens(&self) -> &[NodeType] {
        &[]
    }

    fn messages(&self) -> &[(&'static str, &'static str)] {
        &[("todo.match", "Comment matches to-do format '{0}'.")]
    }

    fn finish_tree(&mut self, root: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
        for comment in root.ast().comments() {
            if comment.text.contains("TODO:") {
                ctx.log_at(comment.line, comment.column, "todo.match", &["TODO:"]);
            }
        }
        Ok(())
    }
}

/// Fails on every identifier.
struct Failing;

impl Check for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn default_tokens(&self) -> &[NodeType] {
        &[NodeType::Ident]
    }

    fn visit_node(&mut self, node: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Err(CheckError::unexpected(node))
    }
}

fn todo_factory(_config: &CheckConfig) -> Result<CheckBox, OptionError> {
    Ok(Box::new(TodoCheck))
}

fn failing_factory(_config: &CheckConfig) -> Result<CheckBox, OptionError> {
    Ok(Box::new(Failing))
}

fn registry() -> CheckRegistry {
    CheckRegistry::new()
        .with("failing", failing_factory)
        .with("todo", todo_factory)
}

fn plan(ids: &[&str]) -> CheckPlan {
    let checks = ids.iter().map(|id| ((*id).to_string(), CheckConfig::new()));
    CheckPlan::new(&registry(), checks).expect("plan should resolve")
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("mkdir");
    fs::write(path, content).expect("write fixture");
}

fn analyze(root: &Path, ids: &[&str]) -> LintResult {
    Analyzer::builder()
        .root(root)
        .plan(plan(ids))
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed")
}

const THREE_TODOS: &str = "\
// TODO: first
class A {
    // TODO: second
    int x;
    /* TODO: third */
    void m() {}
}
";

// ── Error isolation ──

#[test]
fn failing_check_does_not_hide_other_findings() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "A.java", THREE_TODOS);

    let result = analyze(dir.path(), &["failing", "todo"]);

    let lines: Vec<usize> = result.findings.iter().map(|f| f.line).collect();
    assert_eq!(lines, vec![1, 3, 5]);
    assert!(result.findings.iter().all(|f| f.check_id == "todo"));
    assert_eq!(result.findings[0].message, "Comment matches to-do format 'TODO:'.");

    // One internal error per identifier: A, x, m
    assert_eq!(result.diagnostics.len(), 3);
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.kind == DiagnosticKind::CheckInternal && d.check_id.as_deref() == Some("failing")));
    assert_eq!(
        (result.diagnostics[0].line, result.diagnostics[0].column),
        (2, 7)
    );
}

#[test]
fn unparsable_file_does_not_stop_siblings() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "src/A.java", "// TODO: a\nclass A {}\n");
    write(dir.path(), "src/B.java", "class B { String s = \"open; }\n");
    write(dir.path(), "src/C.java", "// TODO: c\nclass C {}\n");

    let result = analyze(dir.path(), &["todo"]);

    assert_eq!(result.files_checked, 3);
    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::Lex);
    assert_eq!(diagnostic.file, Path::new("src/B.java"));
    assert_eq!(diagnostic.line, 1);
    assert!(diagnostic.offset.is_some());

    let files: Vec<_> = result.findings.iter().map(|f| f.file.clone()).collect();
    assert_eq!(
        files,
        vec![Path::new("src/A.java").to_path_buf(), Path::new("src/C.java").to_path_buf()]
    );
    assert!(result.has_errors());
}

#[test]
fn syntax_error_reports_one_diagnostic_and_no_findings() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "A.java", "// TODO: never reported\nclass A { void m( }\n");

    let result = analyze(dir.path(), &["todo"]);

    assert!(result.findings.is_empty());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Syntax);
    assert_eq!(result.diagnostics[0].line, 2);
}

// ── Discovery ──

#[test]
fn results_are_ordered_by_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in ["z/Z.java", "a/A.java", "m/M.java", "B.java"] {
        write(dir.path(), name, "// TODO: here\nclass X {}\n");
    }

    let result = Analyzer::builder()
        .root(dir.path())
        .plan(plan(&["todo"]))
        .parallelism(4)
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed");

    let files: Vec<String> = result
        .findings
        .iter()
        .map(|f| f.file.to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(files, vec!["B.java", "a/A.java", "m/M.java", "z/Z.java"]);
}

#[test]
fn only_configured_extensions_are_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "A.java", "// TODO: java\nclass A {}\n");
    write(dir.path(), "notes.txt", "// TODO: text\n");

    let result = analyze(dir.path(), &["todo"]);
    assert_eq!(result.files_checked, 1);
    assert_eq!(result.findings.len(), 1);
}

#[test]
fn gitignore_is_respected_unless_disabled() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), ".gitignore", "generated/\n");
    write(dir.path(), "generated/G.java", "// TODO: generated\nclass G {}\n");
    write(dir.path(), "A.java", "class A {}\n");

    let result = analyze(dir.path(), &["todo"]);
    assert_eq!(result.files_checked, 1);
    assert!(result.findings.is_empty());

    let result = Analyzer::builder()
        .root(dir.path())
        .plan(plan(&["todo"]))
        .respect_gitignore(false)
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed");
    assert_eq!(result.files_checked, 2);
    assert_eq!(result.findings.len(), 1);
}

#[test]
fn exclude_patterns_skip_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "build/gen/G.java", "// TODO: build\nclass G {}\n");
    write(dir.path(), "src/A.java", "// TODO: src\nclass A {}\n");
    write(dir.path(), "src/legacy/L.java", "// TODO: legacy\nclass L {}\n");

    let result = Analyzer::builder()
        .root(dir.path())
        .plan(plan(&["todo"]))
        .exclude("**/legacy/**")
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed");

    // build/ is excluded by the default configuration
    assert_eq!(result.files_checked, 1);
    assert_eq!(result.findings[0].file, Path::new("src/A.java"));
}

#[test]
fn single_file_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "A.java", THREE_TODOS);

    let result = analyze(&dir.path().join("A.java"), &["todo"]);
    assert_eq!(result.files_checked, 1);
    assert_eq!(result.findings.len(), 3);
}

// ── Cancellation ──

#[test]
fn cancelled_run_skips_remaining_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in ["A.java", "B.java", "C.java"] {
        write(dir.path(), name, "class X {}\n");
    }

    let flag = CancellationFlag::new();
    let analyzer = Analyzer::builder()
        .root(dir.path())
        .plan(plan(&["todo"]))
        .cancellation(flag.clone())
        .build()
        .expect("analyzer should build");
    flag.cancel();

    let result = analyzer.analyze().expect("analysis should succeed");
    assert_eq!(result.files_checked, 0);
    assert_eq!(result.files_skipped, 3);
    assert!(result.findings.is_empty());
}

// ── Determinism ──

#[test]
fn repeated_runs_are_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    for i in 0..8 {
        write(dir.path(), &format!("p{i}/A.java"), THREE_TODOS);
    }

    let first = analyze(dir.path(), &["failing", "todo"]);
    let second = analyze(dir.path(), &["failing", "todo"]);
    assert_eq!(first.findings, second.findings);
    assert_eq!(first.diagnostics, second.diagnostics);
}
