//! Check for to-do markers left in comments.
//!
//! # Rationale
//!
//! `TODO:` comments record work that was deferred. Flagging them keeps them
//! visible until they are resolved or moved to an issue tracker.
//!
//! # Configuration
//!
//! - `format`: Regular expression a comment must contain to be reported
//!   (default: `TODO:?`)

use regex::Regex;
use treelint_core::{Check, CheckBox, CheckConfig, CheckContext, CheckResult, NodeRef, NodeType, OptionError};

/// Check name for todo-comment.
pub const NAME: &str = "todo-comment";

const MSG_MATCH: &str = "todo.match";

/// Default pattern of a to-do marker.
pub const DEFAULT_FORMAT: &str = "TODO:?";

/// Reports comments matching a to-do pattern.
#[derive(Debug, Clone)]
pub struct TodoComment {
    format: Regex,
}

impl TodoComment {
    /// Creates a check reporting comments that match `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn with_format(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            format: Regex::new(pattern)?,
        })
    }

    /// Builds the check from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if `format` is not a valid pattern.
    pub fn from_config(config: &CheckConfig) -> Result<Self, OptionError> {
        let pattern = config.get_str("format", DEFAULT_FORMAT)?;
        Self::with_format(pattern).map_err(|e| OptionError::new("format", e.to_string()))
    }
}

/// Builds the check from its configuration.
///
/// # Errors
///
/// Returns an [`OptionError`] for an invalid `format`.
pub fn factory(config: &CheckConfig) -> Result<CheckBox, OptionError> {
    Ok(Box::new(TodoComment::from_config(config)?))
}

impl Check for TodoComment {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Reports comments containing to-do markers"
    }

    fn default_tokens(&self) -> &[NodeType] {
        &[]
    }

    fn messages(&self) -> &[(&'static str, &'static str)] {
        &[(MSG_MATCH, "Comment matches to-do format '{0}'.")]
    }

    fn finish_tree(&mut self, root: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
        let format = self.format.as_str();
        for comment in root.ast().comments() {
            if self.format.is_match(comment.body()) {
                ctx.log_at(comment.line, comment.column, MSG_MATCH, &[format]);
            }
        }
        Ok(())
    }
}
