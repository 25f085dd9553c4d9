//! The [`Check`] trait and the context checks report through.

use crate::ast::{NodeRef, NodeType};
use crate::collector::Collector;
use crate::context::FileContext;
use crate::types::{Severity, Violation};
use thiserror::Error;

/// Failure of a check on one callback.
///
/// The walker records it as an internal error for the file and keeps
/// walking; it never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The check was handed a node type it does not handle.
    #[error("unexpected node {kind} at {line}:{column}")]
    UnexpectedNode {
        /// Node type received.
        kind: NodeType,
        /// Line of the node.
        line: usize,
        /// Column of the node.
        column: usize,
    },
    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

impl CheckError {
    /// Error for a node the check was not written for.
    #[must_use]
    pub fn unexpected(node: NodeRef<'_>) -> Self {
        Self::UnexpectedNode {
            kind: node.kind(),
            line: node.line(),
            column: node.column(),
        }
    }

    /// Error with a free-form message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Result of one check callback.
pub type CheckResult = Result<(), CheckError>;

/// A tree-walking check.
///
/// A check declares which node types it can handle and is called back by
/// the walker for each node of an active type: [`Check::visit_node`]
/// before the node's children, [`Check::leave_node`] after them. Each file
/// gets a fresh instance built by the check's factory, so per-file state
/// may live in `self`.
///
/// # Example
///
/// ```
/// use treelint_core::{Check, CheckContext, CheckResult, NodeRef, NodeType};
///
/// struct NoEmptyStatement;
///
/// impl Check for NoEmptyStatement {
///     fn name(&self) -> &'static str { "no-empty-statement" }
///
///     fn default_tokens(&self) -> &[NodeType] { &[NodeType::EmptyStat] }
///
///     fn visit_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
///         ctx.log(node, "empty.statement", &[]);
///         Ok(())
///     }
/// }
/// ```
pub trait Check: Send {
    /// Returns the kebab-case id of this check (e.g. "magic-number").
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this check reports.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this check.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Node types handled when no `tokens` are configured.
    fn default_tokens(&self) -> &[NodeType];

    /// Node types that may be configured. Defaults to [`Check::default_tokens`].
    fn acceptable_tokens(&self) -> &[NodeType] {
        self.default_tokens()
    }

    /// Node types that must stay active for the check to work.
    fn required_tokens(&self) -> &[NodeType] {
        &[]
    }

    /// Built-in message templates as `(key, template)` pairs.
    fn messages(&self) -> &[(&'static str, &'static str)] {
        &[]
    }

    /// Called once per file before any node is visited.
    fn begin_tree(&mut self, _root: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }

    /// Called for an active node before its children.
    fn visit_node(&mut self, _node: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }

    /// Called for an active node after its children.
    fn leave_node(&mut self, _node: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }

    /// Called once per file after the last node was left.
    fn finish_tree(&mut self, _root: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }
}

/// Type alias for boxed [`Check`] trait objects.
pub type CheckBox = Box<dyn Check>;

/// What a check sees of the walk: the file and a way to report.
pub struct CheckContext<'a> {
    file: &'a FileContext<'a>,
    check_id: &'a str,
    check_index: usize,
    severity: Severity,
    collector: &'a mut Collector,
}

impl<'a> CheckContext<'a> {
    /// Creates a context reporting into `collector` on behalf of one check.
    #[must_use]
    pub fn new(
        file: &'a FileContext<'a>,
        check_id: &'a str,
        check_index: usize,
        severity: Severity,
        collector: &'a mut Collector,
    ) -> Self {
        Self {
            file,
            check_id,
            check_index,
            severity,
            collector,
        }
    }

    /// The file being walked.
    #[must_use]
    pub fn file(&self) -> &FileContext<'a> {
        self.file
    }

    /// Id of the check this context reports for.
    #[must_use]
    pub fn check_id(&self) -> &str {
        self.check_id
    }

    /// Effective severity of the check.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Reports a violation at `node`'s position.
    pub fn log(&mut self, node: NodeRef<'_>, key: &str, args: &[&str]) {
        self.log_at(node.line(), node.column(), key, args);
    }

    /// Reports a violation at an explicit position.
    pub fn log_at(&mut self, line: usize, column: usize, key: &str, args: &[&str]) {
        let mut violation = Violation::new(
            line,
            column,
            self.check_id,
            key,
            args.iter().map(ToString::to_string).collect(),
        )
        .with_severity(self.severity);
        violation.check_index = self.check_index;
        self.collector.collect(violation);
    }
}

impl std::fmt::Debug for CheckContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckContext")
            .field("file", &self.file.relative_path)
            .field("check_id", &self.check_id)
            .field("check_index", &self.check_index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use std::path::Path;

    struct TestCheck;

    impl Check for TestCheck {
        fn name(&self) -> &'static str {
            "test-check"
        }

        fn description(&self) -> &'static str {
            "A test check"
        }

        fn default_tokens(&self) -> &[NodeType] {
            &[NodeType::Ident]
        }

        fn visit_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
            ctx.log(node, "ident.seen", &[node.text().unwrap_or_default()]);
            Ok(())
        }
    }

    #[test]
    fn test_check_trait_defaults() {
        let check = TestCheck;
        assert_eq!(check.name(), "test-check");
        assert_eq!(check.default_severity(), Severity::Warning);
        assert_eq!(check.acceptable_tokens(), &[NodeType::Ident]);
        assert!(check.required_tokens().is_empty());
        assert!(check.messages().is_empty());
    }

    #[test]
    fn test_context_log_stamps_check_data() {
        let source = "class Foo {}";
        let ast = parse_source(source, 8).unwrap();
        let file = FileContext::new(Path::new("Foo.java"), source, Path::new("."));
        let mut collector = Collector::new();
        let ident = ast.iter().find(|n| n.is(NodeType::Ident)).unwrap();

        let mut check = TestCheck;
        let mut ctx = CheckContext::new(&file, "test-check", 3, Severity::Error, &mut collector);
        check.visit_node(ident, &mut ctx).unwrap();
        ctx.log_at(9, 2, "extra", &[]);

        let violations = collector.into_violations();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].line, 1);
        assert_eq!(violations[0].column, 7);
        assert_eq!(violations[0].check_id, "test-check");
        assert_eq!(violations[0].message_args, vec!["Foo".to_string()]);
        assert_eq!(violations[0].check_index, 3);
        assert_eq!(violations[0].severity, Severity::Error);
        assert_eq!(violations[1].seq, violations[0].seq + 1);
    }

    #[test]
    fn test_unexpected_node_error_message() {
        let ast = parse_source("class Foo {}", 8).unwrap();
        let error = CheckError::unexpected(ast.root());
        assert_eq!(error.to_string(), "unexpected node COMPILATION_UNIT at 1:1");
    }
}
