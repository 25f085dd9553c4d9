//! Integration test: built-in checks driven through the analyzer.

use std::fs;
use std::path::Path;
use treelint_checks::{builtin_registry, Preset};
use treelint_core::{Analyzer, CheckPlan, Config, ConfigurationError, LintResult};

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn analyze(root: &Path, config: Config, checks: &[&str]) -> LintResult {
    let plan = CheckPlan::from_config(&builtin_registry(), &config, checks).unwrap();
    Analyzer::builder()
        .root(root)
        .plan(plan)
        .config(config)
        .build()
        .unwrap()
        .analyze()
        .unwrap()
}

fn rendered(result: &LintResult) -> String {
    result
        .findings
        .iter()
        .map(|f| format!("{f} [{}]", f.check_id))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn redundant_parentheses_in_condition() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/A.java",
        "class A {\n    void m() {\n        if (a || (b ^ a) || b) {}\n    }\n}\n",
    );

    let result = analyze(dir.path(), Config::default(), &["unnecessary-parentheses"]);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.findings.len(), 1);
    assert_eq!((result.findings[0].line, result.findings[0].column), (3, 18));
}

#[test]
fn recommended_preset_over_a_project() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/main/java/Shapes.java",
        r"class Shapes {
    static final int SIDES = 4;

    int area(int kind, int w) {
        int result;
        switch (kind) {
            case 1: result = (w * w); break;
            case 2: result = w * 3; break;
        }
        if ((result = w) > 10) {}
        return result;
    }
}
",
    );

    let result = analyze(dir.path(), Config::default(), Preset::Recommended.checks());
    insta::assert_snapshot!(rendered(&result), @r"
    src/main/java/Shapes.java:6:9: switch without 'default' clause. [missing-switch-default]
    src/main/java/Shapes.java:7:30: Unnecessary parentheses around assignment right-hand side. [unnecessary-parentheses]
    src/main/java/Shapes.java:10:14: Inner assignments should be avoided. [inner-assignment]
    src/main/java/Shapes.java:10:32: Must have at least one statement. [empty-block]
    ");
}

#[test]
fn config_file_selects_and_tunes_checks() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/B.java",
        "class B {\n    int f(int x) {\n        return x * 42 + 7;\n    }\n}\n",
    );
    let config = Config::parse(
        r#"
[checks.magic-number]
enabled = true
ignore_numbers = [7]

[messages]
"magic.number" = "Avoid magic number {0}."
"#,
    )
    .unwrap();

    let result = analyze(dir.path(), config, &[]);
    let messages: Vec<_> = result.findings.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(messages, vec!["Avoid magic number 42."]);
}

#[test]
fn check_options_are_validated_up_front() {
    let config = Config::parse("[checks.empty-block]\nenabled = true\noption = \"nothing\"\n").unwrap();
    let err = CheckPlan::from_config(&builtin_registry(), &config, &[]).unwrap_err();
    assert!(err.to_string().contains("empty-block"));

    let config = Config::parse("[checks.empty-block]\nenabled = true\ntokens = [\"IDENT\"]\n").unwrap();
    let err = CheckPlan::from_config(&builtin_registry(), &config, &[]).unwrap_err();
    assert!(matches!(err, ConfigurationError::UnacceptableToken { .. }));

    let config = Config::parse("[checks.empty-block]\nenabled = true\ntokens = [\"LITERAL_CATCH\"]\n").unwrap();
    assert!(CheckPlan::from_config(&builtin_registry(), &config, &[]).is_ok());
}

#[test]
fn preset_from_config() {
    let config = Config::parse("preset = \"minimal\"").unwrap();
    let preset = Preset::from_config(config.preset.as_deref()).unwrap();
    assert_eq!(preset, Preset::Minimal);
    assert!(Preset::from_config(Some("unknown")).is_err());
}
