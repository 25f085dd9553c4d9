//! Suppression filters applied when a file's violations are finalized.
//!
//! Two sources feed the pipeline: `[[suppress]]` entries from the
//! configuration ([`FilterSet`]) and directives in source comments
//! ([`CommentSuppressions`]). A violation is dropped when any filter
//! suppresses it.

mod comments;

pub use comments::{AllowCheck, AllowDirective, CommentSuppressions};

use crate::config::{ConfigurationError, SuppressConfig};
use crate::types::Violation;
use regex::Regex;
use std::ops::RangeInclusive;

/// Decides whether a violation is hidden from the report.
pub trait ViolationFilter {
    /// Returns true if `violation` in `file` must be dropped.
    fn suppresses(&self, file: &str, violation: &Violation) -> bool;
}

/// One suppression entry. Unset dimensions match anything.
#[derive(Debug, Clone, Default)]
pub struct SuppressionFilter {
    checks: Option<Regex>,
    files: Option<Regex>,
    lines: Option<RangeInclusive<usize>>,
    columns: Option<RangeInclusive<usize>>,
}

impl SuppressionFilter {
    /// Creates an entry with no dimension set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the entry to check ids matching `pattern`.
    #[must_use]
    pub fn with_checks(mut self, pattern: Regex) -> Self {
        self.checks = Some(pattern);
        self
    }

    /// Restricts the entry to file paths matching `pattern`.
    #[must_use]
    pub fn with_files(mut self, pattern: Regex) -> Self {
        self.files = Some(pattern);
        self
    }

    /// Restricts the entry to an inclusive line range.
    #[must_use]
    pub fn with_lines(mut self, lines: RangeInclusive<usize>) -> Self {
        self.lines = Some(lines);
        self
    }

    /// Restricts the entry to an inclusive column range.
    #[must_use]
    pub fn with_columns(mut self, columns: RangeInclusive<usize>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Builds an entry from its configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPattern`] for a bad regex and
    /// [`ConfigurationError::InvalidSuppression`] for an entry without any
    /// check or file pattern or with a reversed range.
    pub fn from_config(index: usize, config: &SuppressConfig) -> Result<Self, ConfigurationError> {
        if config.checks.is_none() && config.files.is_none() {
            return Err(ConfigurationError::InvalidSuppression {
                index,
                message: "needs `checks` or `files`".to_string(),
            });
        }

        let mut filter = Self::new();
        if let Some(pattern) = &config.checks {
            filter = filter.with_checks(compile(index, "checks", pattern)?);
        }
        if let Some(pattern) = &config.files {
            filter = filter.with_files(compile(index, "files", pattern)?);
        }
        if let Some(range) = config.lines {
            filter = filter.with_lines(range_of(index, "lines", range)?);
        }
        if let Some(range) = config.columns {
            filter = filter.with_columns(range_of(index, "columns", range)?);
        }
        Ok(filter)
    }

    /// Returns true if every set dimension matches.
    #[must_use]
    pub fn matches(&self, file: &str, violation: &Violation) -> bool {
        self.checks
            .as_ref()
            .map_or(true, |re| re.is_match(&violation.check_id))
            && self.files.as_ref().map_or(true, |re| re.is_match(file))
            && self
                .lines
                .as_ref()
                .map_or(true, |r| r.contains(&violation.line))
            && self
                .columns
                .as_ref()
                .map_or(true, |r| r.contains(&violation.column))
    }
}

impl ViolationFilter for SuppressionFilter {
    fn suppresses(&self, file: &str, violation: &Violation) -> bool {
        self.matches(file, violation)
    }
}

fn compile(index: usize, field: &str, pattern: &str) -> Result<Regex, ConfigurationError> {
    Regex::new(pattern).map_err(|e| ConfigurationError::InvalidPattern {
        context: format!("suppress[{index}].{field}"),
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn range_of(
    index: usize,
    field: &str,
    [start, end]: [usize; 2],
) -> Result<RangeInclusive<usize>, ConfigurationError> {
    if start > end {
        return Err(ConfigurationError::InvalidSuppression {
            index,
            message: format!("`{field}` range {start}..{end} is reversed"),
        });
    }
    Ok(start..=end)
}

/// The configured suppression entries of a run.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    entries: Vec<SuppressionFilter>,
}

impl FilterSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles all `[[suppress]]` tables.
    ///
    /// # Errors
    ///
    /// Returns the first invalid entry's error.
    pub fn from_config(entries: &[SuppressConfig]) -> Result<Self, ConfigurationError> {
        let entries = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| SuppressionFilter::from_config(index, entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Adds an entry.
    pub fn push(&mut self, entry: SuppressionFilter) {
        self.entries.push(entry);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ViolationFilter for FilterSet {
    fn suppresses(&self, file: &str, violation: &Violation) -> bool {
        self.entries.iter().any(|e| e.matches(file, violation))
    }
}
