//! Suppression directives written in source comments.
//!
//! Supports range toggles and line allowances:
//! ```text
//! // treelint:off(magic-number)
//! int port = 8080;
//! // treelint:on(magic-number)
//!
//! // treelint: allow(todo-comment) reason="tracked in the issue tracker"
//! ```
//!
//! A toggle without parentheses applies to every check. `off` hides
//! violations after the comment until a matching `on`. An allowance covers
//! the comment's own lines and the line right after it.

use super::ViolationFilter;
use crate::ast::{Comment, CommentKind};
use crate::types::Violation;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

const PREFIX: &str = "treelint:";

/// Result of checking for an allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Check is not allowed.
    Denied,
    /// Check is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed `treelint: allow(...)` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowDirective {
    /// Check ids that are allowed; `all` allows every check.
    pub checks: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
    /// First line covered.
    pub first_line: usize,
    /// Last line covered.
    pub last_line: usize,
}

impl AllowDirective {
    fn covers(&self, line: usize, check_id: &str) -> bool {
        (self.first_line..=self.last_line).contains(&line)
            && (self.checks.contains(check_id) || self.checks.contains("all"))
    }
}

#[derive(Debug, Clone)]
struct Toggle {
    line: usize,
    column: usize,
    enable: bool,
    checks: Regex,
}

/// Directives collected from one file's comments.
#[derive(Debug, Clone, Default)]
pub struct CommentSuppressions {
    toggles: Vec<Toggle>,
    allows: Vec<AllowDirective>,
}

impl CommentSuppressions {
    /// Scans comments for directives. Malformed directives are ignored.
    #[must_use]
    pub fn from_comments(comments: &[Comment]) -> Self {
        let mut suppressions = Self::default();
        for comment in comments {
            let Some(directive) = directive_text(comment) else {
                continue;
            };
            if let Some(toggle) = parse_toggle(directive, comment) {
                suppressions.toggles.push(toggle);
            } else if let Some((checks, reason)) = parse_allow(directive) {
                suppressions.allows.push(AllowDirective {
                    checks,
                    reason,
                    first_line: comment.line,
                    last_line: comment.end_line() + 1,
                });
            }
        }
        suppressions
            .toggles
            .sort_by_key(|t| (t.line, t.column));
        suppressions
    }

    /// Returns true if no directive was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty() && self.allows.is_empty()
    }

    /// Allowance directives in source order.
    #[must_use]
    pub fn allowances(&self) -> &[AllowDirective] {
        &self.allows
    }

    /// Checks for an allowance covering `check_id` at `line`.
    #[must_use]
    pub fn check_allow(&self, line: usize, check_id: &str) -> AllowCheck {
        self.allows
            .iter()
            .find(|a| a.covers(line, check_id))
            .map_or(AllowCheck::Denied, |a| AllowCheck::Allowed {
                reason: a.reason.clone(),
            })
    }

    /// Returns true if the last toggle before the position that names
    /// `check_id` turned it off.
    fn toggled_off(&self, line: usize, column: usize, check_id: &str) -> bool {
        self.toggles
            .iter()
            .take_while(|t| (t.line, t.column) <= (line, column))
            .filter(|t| t.checks.is_match(check_id))
            .last()
            .is_some_and(|t| !t.enable)
    }
}

impl ViolationFilter for CommentSuppressions {
    fn suppresses(&self, _file: &str, violation: &Violation) -> bool {
        self.toggled_off(violation.line, violation.column, &violation.check_id)
            || self
                .check_allow(violation.line, &violation.check_id)
                .is_allowed()
    }
}

/// Directive text after the `treelint:` prefix.
fn directive_text(comment: &Comment) -> Option<&str> {
    let body = comment.body().trim();
    let body = match comment.kind {
        CommentKind::Line => body.strip_prefix('/').unwrap_or(body).trim_start(),
        CommentKind::Block => body.trim_start_matches('*').trim(),
    };
    Some(body.strip_prefix(PREFIX)?.trim())
}

fn parse_toggle(directive: &str, comment: &Comment) -> Option<Toggle> {
    let (enable, rest) = if let Some(rest) = directive.strip_prefix("off") {
        (false, rest)
    } else if let Some(rest) = directive.strip_prefix("on") {
        (true, rest)
    } else {
        return None;
    };

    let pattern = if rest.trim().is_empty() {
        ".*"
    } else {
        let inner = rest.trim_start().strip_prefix('(')?;
        let close = inner.rfind(')')?;
        inner[..close].trim()
    };

    match Regex::new(pattern) {
        Ok(checks) => Some(Toggle {
            line: comment.line,
            column: comment.column,
            enable,
            checks,
        }),
        Err(e) => {
            debug!(
                "Ignoring suppression comment at line {}: {}",
                comment.line, e
            );
            None
        }
    }
}

fn parse_allow(directive: &str) -> Option<(HashSet<String>, Option<String>)> {
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let checks: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if checks.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest.strip_prefix("reason=").and_then(|reason_part| {
        let quoted = reason_part.trim().strip_prefix('"')?;
        let end = quoted.find('"')?;
        Some(quoted[..end].to_string())
    });

    Some((checks, reason))
}
