//! Core types for violations, findings and run results.

use crate::messages::MessageCatalog;
use crate::parser::ParseError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail the run.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// A violation emitted by a check while walking one file.
///
/// Message text is not rendered here; `message_key` and `message_args` are
/// resolved through a [`MessageCatalog`] when the violation becomes a
/// [`Finding`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Line (1-indexed).
    pub line: usize,
    /// Tab-expanded column (1-indexed).
    pub column: usize,
    /// Id of the reporting check.
    pub check_id: String,
    /// Message catalog key.
    pub message_key: String,
    /// Positional message arguments.
    pub message_args: Vec<String>,
    /// Effective severity.
    pub severity: Severity,
    /// Registration index of the reporting check.
    pub check_index: usize,
    /// Emission order within the file.
    pub seq: u64,
}

impl Violation {
    /// Creates a violation with warning severity and no ordering data.
    #[must_use]
    pub fn new(
        line: usize,
        column: usize,
        check_id: impl Into<String>,
        message_key: impl Into<String>,
        message_args: Vec<String>,
    ) -> Self {
        Self {
            line,
            column,
            check_id: check_id.into(),
            message_key: message_key.into(),
            message_args,
            severity: Severity::Warning,
            check_index: 0,
            seq: 0,
        }
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sorting key: line, column, reporting check, emission order.
    #[must_use]
    pub fn sort_key(&self) -> (usize, usize, usize, u64) {
        (self.line, self.column, self.check_index, self.seq)
    }
}

/// A finalized, rendered violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// File path relative to the analysis root.
    pub file: PathBuf,
    /// Line (1-indexed).
    pub line: usize,
    /// Tab-expanded column (1-indexed).
    pub column: usize,
    /// Id of the reporting check.
    pub check_id: String,
    /// Effective severity.
    pub severity: Severity,
    /// Rendered message.
    pub message: String,
}

impl Finding {
    /// Renders a violation through the catalog.
    #[must_use]
    pub fn from_violation(file: impl Into<PathBuf>, violation: &Violation, messages: &MessageCatalog) -> Self {
        Self {
            file: file.into(),
            line: violation.line,
            column: violation.column,
            check_id: violation.check_id.clone(),
            severity: violation.severity,
            message: messages.render(&violation.message_key, &violation.message_args),
        }
    }

    /// Formats the finding for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        format!(
            "{}:{}:{}: {}: {} [{}]",
            self.file.display(),
            self.line,
            self.column,
            self.severity,
            self.message,
            self.check_id
        )
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.file.display(),
            self.line,
            self.column,
            self.message
        )
    }
}

/// What kind of tool failure a [`FileDiagnostic`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Tokenization failed; the file produced no violations.
    Lex,
    /// Parsing failed; the file produced no violations.
    Syntax,
    /// A check returned an error or panicked on a node.
    CheckInternal,
    /// The file could not be read.
    Io,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex => write!(f, "lexical error"),
            Self::Syntax => write!(f, "syntax error"),
            Self::CheckInternal => write!(f, "internal check error"),
            Self::Io => write!(f, "io error"),
        }
    }
}

/// A tool diagnostic, kept apart from findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiagnostic {
    /// File path relative to the analysis root.
    pub file: PathBuf,
    /// Failure kind.
    pub kind: DiagnosticKind,
    /// Line (1-indexed), 0 when unknown.
    pub line: usize,
    /// Column (1-indexed), 0 when unknown.
    pub column: usize,
    /// Check that failed, for [`DiagnosticKind::CheckInternal`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_id: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// Raw byte offset of the failure, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl FileDiagnostic {
    /// Creates a diagnostic without a check id or offset.
    #[must_use]
    pub fn new(
        file: impl Into<PathBuf>,
        kind: DiagnosticKind,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            kind,
            line,
            column,
            check_id: None,
            message: message.into(),
            offset: None,
        }
    }

    /// Diagnostic for a file that failed to lex or parse.
    #[must_use]
    pub fn from_parse_error(file: impl Into<PathBuf>, error: &ParseError) -> Self {
        let kind = match error {
            ParseError::Lex(_) => DiagnosticKind::Lex,
            ParseError::Syntax(_) => DiagnosticKind::Syntax,
        };
        Self::new(file, kind, error.line(), error.column(), error.message())
            .with_offset(error.offset())
    }

    /// Attaches the failing check id.
    #[must_use]
    pub fn with_check(mut self, check_id: impl Into<String>) -> Self {
        self.check_id = Some(check_id.into());
        self
    }

    /// Attaches the raw byte offset.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Builds a `miette` report with a labelled source snippet.
    #[must_use]
    pub fn to_report(&self, source: &str) -> miette::Report {
        let offset = self.offset.unwrap_or(0).min(source.len());
        let length = source
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);
        let report = SourceDiagnostic {
            message: self.to_string(),
            src: NamedSource::new(self.file.display().to_string(), source.to_string()),
            span: SourceSpan::from((offset, length)),
            label_message: self.kind.to_string(),
        };
        miette::Report::new(report)
    }
}

impl std::fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.file.display(),
            self.line,
            self.column,
            self.kind,
            self.message
        )?;
        if let Some(check_id) = &self.check_id {
            write!(f, " [{check_id}]")?;
        }
        Ok(())
    }
}

/// A diagnostic rendered with its source for rich terminal display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
struct SourceDiagnostic {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

/// Result of running an analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// Rendered findings, grouped by file path and sorted within each file.
    pub findings: Vec<Finding>,
    /// Tool diagnostics.
    pub diagnostics: Vec<FileDiagnostic>,
    /// Number of files processed.
    pub files_checked: usize,
    /// Number of files skipped because the run was cancelled.
    pub files_skipped: usize,
    /// Config file the run was configured from; `None` for defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PathBuf>,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any finding is an error or any diagnostic exists.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error) || !self.diagnostics.is_empty()
    }

    /// Checks if any finding meets or exceeds the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.findings.iter().any(|f| f.severity >= severity)
    }

    /// Returns findings with exactly the given severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .collect()
    }

    /// Counts findings as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.findings
            .iter()
            .fold((0, 0, 0), |(e, w, i), f| match f.severity {
                Severity::Error => (e + 1, w, i),
                Severity::Warning => (e, w + 1, i),
                Severity::Info => (e, w, i + 1),
            })
    }

    /// Adds findings and diagnostics from another result.
    pub fn extend(&mut self, other: Self) {
        self.findings.extend(other.findings);
        self.diagnostics.extend(other.diagnostics);
        self.files_checked += other.files_checked;
        self.files_skipped += other.files_skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_finding(severity: Severity) -> Finding {
        Finding {
            file: PathBuf::from("src/Main.java"),
            line: 42,
            column: 10,
            check_id: "magic-number".to_string(),
            severity,
            message: "'42' is a magic number.".to_string(),
        }
    }

    #[test]
    fn test_finding_display_is_plain_text_form() {
        let finding = make_finding(Severity::Warning);
        assert_eq!(
            finding.to_string(),
            "src/Main.java:42:10: '42' is a magic number."
        );
    }

    #[test]
    fn test_finding_format_includes_severity_and_check() {
        let finding = make_finding(Severity::Error);
        assert_eq!(
            finding.format(),
            "src/Main.java:42:10: error: '42' is a magic number. [magic-number]"
        );
    }

    #[test]
    fn test_finding_renders_through_catalog() {
        let mut catalog = MessageCatalog::new();
        catalog.register("plain", "{0} then {1}");
        let violation = Violation::new(3, 7, "magic-number", "plain", vec!["a".into(), "b".into()]);

        let finding = Finding::from_violation("A.java", &violation, &catalog);
        assert_eq!(finding.message, "a then b");
        assert_eq!(finding.line, 3);
        assert_eq!(finding.column, 7);
    }

    #[test]
    fn test_severity_order_and_parse() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_has_errors_counts_diagnostics() {
        let mut result = LintResult::new();
        result.findings.push(make_finding(Severity::Warning));
        assert!(!result.has_errors());

        result.diagnostics.push(FileDiagnostic::new(
            "B.java",
            DiagnosticKind::Lex,
            1,
            5,
            "unterminated string literal",
        ));
        assert!(result.has_errors());
    }

    #[test]
    fn test_count_by_severity() {
        let mut result = LintResult::new();
        result.findings.push(make_finding(Severity::Error));
        result.findings.push(make_finding(Severity::Warning));
        result.findings.push(make_finding(Severity::Warning));
        assert_eq!(result.count_by_severity(), (1, 2, 0));
        assert_eq!(result.by_severity(Severity::Warning).len(), 2);
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = FileDiagnostic::new(
            "C.java",
            DiagnosticKind::CheckInternal,
            4,
            9,
            "boom",
        )
        .with_check("failing-check");
        assert_eq!(
            diagnostic.to_string(),
            "C.java:4:9: internal check error: boom [failing-check]"
        );
    }

    #[test]
    fn test_diagnostic_report_points_at_offset() {
        let source = "class A { \"oops }";
        let diagnostic = FileDiagnostic::new("A.java", DiagnosticKind::Lex, 1, 11, "unterminated string literal")
            .with_offset(10);
        let report = diagnostic.to_report(source);
        assert!(report.to_string().contains("unterminated string literal"));
    }
}
