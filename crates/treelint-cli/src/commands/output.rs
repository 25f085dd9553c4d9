//! Shared output formatting for lint results.

use anyhow::Result;
use std::path::Path;
use treelint_core::{DiagnosticKind, LintResult, Severity};

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is where finding paths are relative to; the text format reads
/// sources from there to show parse failures in context.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result, root),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
    }
    Ok(())
}

fn print_text(result: &LintResult, root: &Path) {
    let (errors, warnings, infos) = result.count_by_severity();

    for finding in &result.findings {
        let severity_indicator = match finding.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} at {}:{}:{}",
            finding.check_id,
            finding.file.display(),
            finding.line,
            finding.column,
        );
        println!("  {}: {}", severity_indicator, finding.message);
        println!();
    }

    for diagnostic in &result.diagnostics {
        let source = match diagnostic.kind {
            DiagnosticKind::Lex | DiagnosticKind::Syntax => {
                std::fs::read_to_string(source_path(root, &diagnostic.file)).ok()
            }
            DiagnosticKind::CheckInternal | DiagnosticKind::Io => None,
        };
        match source {
            Some(source) => {
                let report: miette::Report = diagnostic.to_report(&source);
                eprintln!("{report:?}");
            }
            None => eprintln!("{diagnostic}"),
        }
    }

    let summary_color = if errors > 0 || !result.diagnostics.is_empty() {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
    if !result.diagnostics.is_empty() {
        println!("{} file problem(s) reported", result.diagnostics.len());
    }
    if result.files_skipped > 0 {
        println!("{} file(s) skipped", result.files_skipped);
    }
    if let Some(config) = &result.config {
        println!("Config: {}", config.display());
    }
}

/// Path of a reported file; a single-file root reports the file name only.
fn source_path(root: &Path, file: &Path) -> std::path::PathBuf {
    if root.is_file() {
        root.to_path_buf()
    } else {
        root.join(file)
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for finding in &result.findings {
        println!("{}", finding.format());
    }
    for diagnostic in &result.diagnostics {
        println!("{diagnostic}");
    }
}
