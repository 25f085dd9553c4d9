//! Per-file context shared by the walker and checks.

use crate::lexer::{byte_offset_for_column, DEFAULT_TAB_WIDTH};
use std::path::{Path, PathBuf};

/// Metadata about the file being analyzed.
///
/// Checks use it to make context-aware decisions (e.g. relax a check in
/// test sources) and to map positions back to source text.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path to the file as discovered.
    pub path: &'a Path,
    /// File contents.
    pub content: &'a str,
    /// Whether this file is detected as a test source.
    pub is_test: bool,
    /// Path relative to the analysis root.
    pub relative_path: PathBuf,
    /// Tab width used for column computation.
    pub tab_width: usize,
    line_starts: Vec<usize>,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context with the default tab width.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let is_test = Self::detect_test_file(path);
        let relative_path = match path.strip_prefix(root) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
            // root is the file itself
            Ok(_) => path
                .file_name()
                .map_or_else(|| path.to_path_buf(), PathBuf::from),
            Err(_) => path.to_path_buf(),
        };

        Self {
            path,
            content,
            is_test,
            relative_path,
            tab_width: DEFAULT_TAB_WIDTH,
            line_starts: line_starts(content),
        }
    }

    /// Sets the tab width.
    #[must_use]
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    /// Relative path with `/` separators, as shown in reports and matched
    /// by suppression file patterns.
    #[must_use]
    pub fn display_path(&self) -> String {
        self.relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Detects if a file is a test source based on path conventions.
    fn detect_test_file(path: &Path) -> bool {
        let mut previous: Option<String> = None;
        for component in path.components() {
            if let std::path::Component::Normal(s) = component {
                let s = s.to_string_lossy();
                if s == "test" && previous.as_deref() == Some("src") {
                    return true;
                }
                if s == "tests" {
                    return true;
                }
                previous = Some(s.into_owned());
            }
        }

        path.file_stem()
            .and_then(|n| n.to_str())
            .is_some_and(|stem| {
                stem.ends_with("Test")
                    || stem.ends_with("Tests")
                    || stem.ends_with("IT")
                    || (stem.starts_with("Test") && stem.len() > 4)
            })
    }

    /// Number of lines in the file.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a 1-indexed line without its terminator.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.content.len());
        let text = &self.content[start..end];
        Some(text.trim_end_matches(['\n', '\r']))
    }

    /// Byte offset for a 1-indexed line and tab-expanded column.
    ///
    /// Returns `None` if the line does not exist. Columns past the end of
    /// the line clamp to the line end.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> Option<usize> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let text = self.line(line)?;
        Some(start + byte_offset_for_column(text, column, self.tab_width))
    }
}

/// Byte offsets where each line starts; `\n`, `\r\n` and `\r` all end a line.
fn line_starts(content: &str) -> Vec<usize> {
    let bytes = content.as_bytes();
    let mut starts = vec![0];
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => starts.push(i + 1),
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                starts.push(i + 2);
                i += 1;
            }
            b'\r' => starts.push(i + 1),
            _ => {}
        }
        i += 1;
    }
    starts
}
