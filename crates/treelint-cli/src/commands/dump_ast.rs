//! Dump-ast command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;
use treelint_core::{parse_source, FileDiagnostic};

/// Runs the dump-ast command.
pub fn run(file: &Path, tab_width: usize) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    match parse_source(&source, tab_width.max(1)) {
        Ok(ast) => {
            print!("{}", ast.dump());
            Ok(())
        }
        Err(error) => {
            let diagnostic = FileDiagnostic::from_parse_error(file, &error);
            eprintln!("{:?}", diagnostic.to_report(&source));
            bail!("Failed to parse {}", file.display())
        }
    }
}
