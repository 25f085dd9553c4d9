//! # treelint-checks
//!
//! Built-in checks for treelint.
//!
//! Each check is registered by id with a factory that builds a fresh,
//! configured instance per file.
//!
//! ## Available Checks
//!
//! | Name | Description |
//! |------|-------------|
//! | `unnecessary-parentheses` | Parentheses that do not change grouping |
//! | `todo-comment` | Comments matching a to-do pattern |
//! | `magic-number` | Numeric literals outside constant definitions |
//! | `return-count` | Too many `return` statements in one method |
//! | `empty-block` | Empty statement bodies and initializers |
//! | `missing-switch-default` | `switch` without a `default` label |
//! | `inner-assignment` | Assignments used as sub-expressions |
//!
//! ## Usage
//!
//! ```no_run
//! use treelint_checks::{builtin_registry, Preset};
//! use treelint_core::{Analyzer, CheckPlan, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let plan = CheckPlan::from_config(&builtin_registry(), &config, Preset::Recommended.checks())?;
//! let analyzer = Analyzer::builder().root("./src").plan(plan).build()?;
//! let result = analyzer.analyze()?;
//! println!("{} finding(s)", result.findings.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod empty_block;
pub mod inner_assignment;
pub mod magic_number;
pub mod missing_switch_default;
mod presets;
pub mod return_count;
pub mod todo_comment;
pub mod unnecessary_parentheses;

pub use empty_block::{BlockOption, EmptyBlock};
pub use inner_assignment::InnerAssignment;
pub use magic_number::MagicNumber;
pub use missing_switch_default::MissingSwitchDefault;
pub use presets::Preset;
pub use return_count::ReturnCount;
pub use todo_comment::TodoComment;
pub use unnecessary_parentheses::UnnecessaryParentheses;

/// Re-export core types for convenience.
pub use treelint_core::{Check, CheckBox, CheckRegistry, Severity, Violation};

use tracing::warn;
use treelint_core::CheckConfig;

/// Registry of every built-in check.
#[must_use]
pub fn builtin_registry() -> CheckRegistry {
    CheckRegistry::new()
        .with(unnecessary_parentheses::NAME, unnecessary_parentheses::factory)
        .with(todo_comment::NAME, todo_comment::factory)
        .with(magic_number::NAME, magic_number::factory)
        .with(return_count::NAME, return_count::factory)
        .with(empty_block::NAME, empty_block::factory)
        .with(missing_switch_default::NAME, missing_switch_default::factory)
        .with(inner_assignment::NAME, inner_assignment::factory)
}

/// One default-configured instance of every built-in check.
#[must_use]
pub fn all_checks() -> Vec<CheckBox> {
    let registry = builtin_registry();
    let config = CheckConfig::new();
    presets::ALL
        .iter()
        .filter_map(|id| {
            registry
                .create(id, &config)
                .map_err(|e| warn!("Skipping check {}: {}", id, e))
                .ok()
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use treelint_core::{collector, parse_source, CheckBox, FileContext, NodeType, TreeWalker, Violation};

    /// Runs `check` on its default tokens over `code`.
    pub(crate) fn run(check: CheckBox, code: &str) -> Vec<Violation> {
        run_in(check, code, "Test.java")
    }

    /// Like [`run`], with `code` located at `path`.
    pub(crate) fn run_in(check: CheckBox, code: &str, path: &str) -> Vec<Violation> {
        let tokens = check.default_tokens().to_vec();
        run_full(check, tokens, code, path)
    }

    /// Like [`run`], with an explicit token set.
    pub(crate) fn run_with_tokens(check: CheckBox, tokens: Vec<NodeType>, code: &str) -> Vec<Violation> {
        run_full(check, tokens, code, "Test.java")
    }

    fn run_full(check: CheckBox, tokens: Vec<NodeType>, code: &str, path: &str) -> Vec<Violation> {
        let ast = parse_source(code, 8).expect("test source should parse");
        let file = FileContext::new(Path::new(path), code, Path::new(""));
        let severity = check.default_severity();
        let mut walker = TreeWalker::new();
        walker.register(check, tokens, severity).expect("check should register");
        let outcome = walker.walk(&file, &ast);
        assert!(outcome.errors.is_empty(), "check failed: {:?}", outcome.errors);
        collector::finalize(outcome.violations, path, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_ids_match_check_names() {
        let registry = builtin_registry();
        let checks = all_checks();
        assert_eq!(checks.len(), registry.len());
        for (id, check) in registry.ids().zip(&checks) {
            assert_eq!(id, check.name());
            assert!(!check.description().is_empty());
        }
    }

    #[test]
    fn test_every_check_has_messages() {
        for check in all_checks() {
            assert!(!check.messages().is_empty(), "{} has no messages", check.name());
        }
    }
}
