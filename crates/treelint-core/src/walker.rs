//! Depth-first dispatch of AST nodes to checks.
//!
//! The walk is iterative, so tree depth never turns into stack depth. For
//! every node, checks interested in its type get `visit_node` in
//! registration order before the children and `leave_node` in reverse
//! order after them. A check that returns an error or panics is recorded
//! as a [`CheckInternalError`] and still receives the remaining callbacks.

use crate::ast::{Ast, NodeId, NodeRef, NodeType};
use crate::check::{CheckBox, CheckContext};
use crate::collector::Collector;
use crate::config::ConfigurationError;
use crate::context::FileContext;
use crate::registry::missing_required;
use crate::types::{Severity, Violation};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Progress of one traversal. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// No node visited yet.
    NotStarted,
    /// The node most recently entered.
    Visiting(NodeId),
    /// All callbacks delivered.
    Finished,
}

/// Callback in which a check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// [`crate::Check::begin_tree`]
    BeginTree,
    /// [`crate::Check::visit_node`]
    Visit,
    /// [`crate::Check::leave_node`]
    Leave,
    /// [`crate::Check::finish_tree`]
    FinishTree,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeginTree => write!(f, "begin_tree"),
            Self::Visit => write!(f, "visit_node"),
            Self::Leave => write!(f, "leave_node"),
            Self::FinishTree => write!(f, "finish_tree"),
        }
    }
}

/// A check failure caught during the walk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("check `{check_id}` failed in {phase} at {line}:{column}: {message}")]
pub struct CheckInternalError {
    /// Id of the failing check.
    pub check_id: String,
    /// Callback that failed.
    pub phase: Phase,
    /// Node type being processed.
    pub node: NodeType,
    /// Line of the node.
    pub line: usize,
    /// Column of the node.
    pub column: usize,
    /// Error or panic message.
    pub message: String,
}

/// Everything one walk produced.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Violations in emission order, not yet filtered or sorted.
    pub violations: Vec<Violation>,
    /// Caught check failures in occurrence order.
    pub errors: Vec<CheckInternalError>,
}

struct Registered {
    id: String,
    check: CheckBox,
    severity: Severity,
    tokens: Vec<NodeType>,
}

/// Walks trees and dispatches nodes to registered checks.
pub struct TreeWalker {
    checks: Vec<Registered>,
    dispatch: HashMap<NodeType, Vec<usize>>,
    state: WalkState,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeWalker {
    /// Creates a walker with no checks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            dispatch: HashMap::new(),
            state: WalkState::NotStarted,
        }
    }

    /// Registers a check under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingRequiredTokens`] if a required
    /// token of the check is not in `tokens`.
    pub fn register(
        &mut self,
        check: CheckBox,
        tokens: Vec<NodeType>,
        severity: Severity,
    ) -> Result<(), ConfigurationError> {
        let id = check.name().to_string();
        self.register_as(id, check, tokens, severity)
    }

    /// Registers a check under an explicit id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingRequiredTokens`] if a required
    /// token of the check is not in `tokens`.
    pub fn register_as(
        &mut self,
        id: String,
        check: CheckBox,
        tokens: Vec<NodeType>,
        severity: Severity,
    ) -> Result<(), ConfigurationError> {
        missing_required(&id, &check, &tokens)?;
        let index = self.checks.len();
        for kind in &tokens {
            let interested = self.dispatch.entry(*kind).or_default();
            if !interested.contains(&index) {
                interested.push(index);
            }
        }
        self.checks.push(Registered {
            id,
            check,
            severity,
            tokens,
        });
        Ok(())
    }

    /// Number of registered checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Active tokens of the check registered at `index`.
    #[must_use]
    pub fn tokens(&self, index: usize) -> Option<&[NodeType]> {
        self.checks.get(index).map(|r| r.tokens.as_slice())
    }

    /// State of the current or last traversal.
    #[must_use]
    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Runs one traversal of `ast`.
    pub fn walk(&mut self, file: &FileContext<'_>, ast: &Ast) -> WalkOutcome {
        let mut run = Run {
            file,
            collector: Collector::new(),
            errors: Vec::new(),
        };
        self.state = WalkState::NotStarted;
        let root = ast.root();

        for (index, registered) in self.checks.iter_mut().enumerate() {
            run.notify(registered, index, Phase::BeginTree, root);
        }

        let mut current = Some(root);
        while let Some(node) = current {
            self.state = WalkState::Visiting(node.id());
            if let Some(interested) = self.dispatch.get(&node.kind()) {
                for &index in interested {
                    run.notify(&mut self.checks[index], index, Phase::Visit, node);
                }
            }

            let mut next = node.first_child();
            let mut cursor = Some(node);
            while next.is_none() {
                let Some(done) = cursor else {
                    break;
                };
                if let Some(interested) = self.dispatch.get(&done.kind()) {
                    for &index in interested.iter().rev() {
                        run.notify(&mut self.checks[index], index, Phase::Leave, done);
                    }
                }
                next = done.next_sibling();
                cursor = done.parent();
            }
            current = next;
        }

        for (index, registered) in self.checks.iter_mut().enumerate() {
            run.notify(registered, index, Phase::FinishTree, root);
        }
        self.state = WalkState::Finished;

        WalkOutcome {
            violations: run.collector.into_violations(),
            errors: run.errors,
        }
    }
}

impl std::fmt::Debug for TreeWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWalker")
            .field(
                "checks",
                &self.checks.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            )
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Per-traversal sinks.
struct Run<'f> {
    file: &'f FileContext<'f>,
    collector: Collector,
    errors: Vec<CheckInternalError>,
}

impl Run<'_> {
    fn notify(&mut self, registered: &mut Registered, index: usize, phase: Phase, node: NodeRef<'_>) {
        let Registered {
            id, check, severity, ..
        } = registered;
        let mut ctx = CheckContext::new(self.file, id, index, *severity, &mut self.collector);

        let result = panic::catch_unwind(AssertUnwindSafe(|| match phase {
            Phase::BeginTree => check.begin_tree(node, &mut ctx),
            Phase::Visit => check.visit_node(node, &mut ctx),
            Phase::Leave => check.leave_node(node, &mut ctx),
            Phase::FinishTree => check.finish_tree(node, &mut ctx),
        }));

        let message = match result {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
        };
        warn!(
            "Check {} failed in {} at {}:{}:{}: {}",
            id,
            phase,
            self.file.display_path(),
            node.line(),
            node.column(),
            message
        );
        self.errors.push(CheckInternalError {
            check_id: id.clone(),
            phase,
            node: node.kind(),
            line: node.line(),
            column: node.column(),
            message,
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{Check, CheckError, CheckResult};
    use crate::parser::parse_source;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    type Events = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        tokens: Vec<NodeType>,
        events: Events,
    }

    impl Recorder {
        fn boxed(name: &'static str, tokens: &[NodeType], events: &Events) -> CheckBox {
            Box::new(Self {
                name,
                tokens: tokens.to_vec(),
                events: Arc::clone(events),
            })
        }

        fn push(&self, event: &str, node: NodeRef<'_>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{}:{}", self.name, event, node.kind()));
        }
    }

    impl Check for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn default_tokens(&self) -> &[NodeType] {
            &self.tokens
        }

        fn begin_tree(&mut self, root: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
            self.push("begin", root);
            Ok(())
        }

        fn visit_node(&mut self, node: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
            self.push("visit", node);
            Ok(())
        }

        fn leave_node(&mut self, node: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
            self.push("leave", node);
            Ok(())
        }

        fn finish_tree(&mut self, root: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
            self.push("finish", root);
            Ok(())
        }
    }

    struct Failing {
        panic: bool,
        leaves: Arc<Mutex<usize>>,
    }

    impl Check for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn default_tokens(&self) -> &[NodeType] {
            &[NodeType::Ident]
        }

        fn visit_node(&mut self, node: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
            if self.panic {
                panic!("cannot handle {}", node.kind());
            }
            Err(CheckError::unexpected(node))
        }

        fn leave_node(&mut self, _node: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
            *self.leaves.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct IdentLogger;

    impl Check for IdentLogger {
        fn name(&self) -> &'static str {
            "ident-logger"
        }

        fn default_tokens(&self) -> &[NodeType] {
            &[NodeType::Ident]
        }

        fn visit_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
            ctx.log(node, "ident", &[node.text().unwrap_or_default()]);
            Ok(())
        }
    }

    struct NeedsReturn;

    impl Check for NeedsReturn {
        fn name(&self) -> &'static str {
            "needs-return"
        }

        fn default_tokens(&self) -> &[NodeType] {
            &[NodeType::MethodDef, NodeType::LiteralReturn]
        }

        fn required_tokens(&self) -> &[NodeType] {
            &[NodeType::LiteralReturn]
        }
    }

    const SOURCE: &str = "class A { int f() { return b; } }";

    fn walk_with(walker: &mut TreeWalker, source: &str) -> WalkOutcome {
        let ast = parse_source(source, 8).unwrap();
        let file = FileContext::new(Path::new("A.java"), source, Path::new("."));
        walker.walk(&file, &ast)
    }

    #[test]
    fn test_visit_in_registration_order_leave_in_reverse() {
        let events = Events::default();
        let mut walker = TreeWalker::new();
        for name in ["first", "second"] {
            walker
                .register(
                    Recorder::boxed(name, &[NodeType::LiteralReturn], &events),
                    vec![NodeType::LiteralReturn],
                    Severity::Warning,
                )
                .unwrap();
        }

        walk_with(&mut walker, SOURCE);
        let events = events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "first:begin:COMPILATION_UNIT",
                "second:begin:COMPILATION_UNIT",
                "first:visit:LITERAL_RETURN",
                "second:visit:LITERAL_RETURN",
                "second:leave:LITERAL_RETURN",
                "first:leave:LITERAL_RETURN",
                "first:finish:COMPILATION_UNIT",
                "second:finish:COMPILATION_UNIT",
            ]
        );
        assert_eq!(walker.state(), WalkState::Finished);
    }

    #[test]
    fn test_enter_leave_nest_like_the_tree() {
        let events = Events::default();
        let tokens = [NodeType::ClassDef, NodeType::MethodDef, NodeType::Ident];
        let mut walker = TreeWalker::new();
        walker
            .register(Recorder::boxed("r", &tokens, &events), tokens.to_vec(), Severity::Info)
            .unwrap();

        walk_with(&mut walker, SOURCE);
        let events: Vec<_> = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.contains(":visit:") || e.contains(":leave:"))
            .map(|e| e.trim_start_matches("r:").to_string())
            .collect();
        assert_eq!(
            events,
            vec![
                "visit:CLASS_DEF",
                "visit:IDENT",
                "leave:IDENT",
                "visit:METHOD_DEF",
                "visit:IDENT",
                "leave:IDENT",
                "visit:IDENT",
                "leave:IDENT",
                "leave:METHOD_DEF",
                "leave:CLASS_DEF",
            ]
        );
    }

    #[test]
    fn test_failing_check_is_isolated() {
        let leaves = Arc::new(Mutex::new(0));
        let mut walker = TreeWalker::new();
        walker
            .register(
                Box::new(Failing {
                    panic: false,
                    leaves: Arc::clone(&leaves),
                }),
                vec![NodeType::Ident],
                Severity::Error,
            )
            .unwrap();
        walker
            .register(Box::new(IdentLogger), vec![NodeType::Ident], Severity::Warning)
            .unwrap();

        let outcome = walk_with(&mut walker, SOURCE);
        assert_eq!(outcome.errors.len(), 3);
        assert_eq!(*leaves.lock().unwrap(), 3);
        assert_eq!(outcome.violations.len(), 3);
        assert_eq!(outcome.errors[0].check_id, "failing");
        assert_eq!(outcome.errors[0].phase, Phase::Visit);
        assert_eq!((outcome.errors[0].line, outcome.errors[0].column), (1, 7));
    }

    #[test]
    fn test_panicking_check_is_isolated() {
        let leaves = Arc::new(Mutex::new(0));
        let mut walker = TreeWalker::new();
        walker
            .register(
                Box::new(Failing {
                    panic: true,
                    leaves: Arc::clone(&leaves),
                }),
                vec![NodeType::Ident],
                Severity::Error,
            )
            .unwrap();

        let outcome = walk_with(&mut walker, SOURCE);
        assert_eq!(outcome.errors.len(), 3);
        assert_eq!(*leaves.lock().unwrap(), 3);
        assert_eq!(outcome.errors[0].message, "panicked: cannot handle IDENT");
        assert_eq!(walker.state(), WalkState::Finished);
    }

    #[test]
    fn test_only_interested_checks_are_called() {
        let events = Events::default();
        let mut walker = TreeWalker::new();
        walker
            .register(
                Recorder::boxed("r", &[NodeType::LiteralIf], &events),
                vec![NodeType::LiteralIf],
                Severity::Warning,
            )
            .unwrap();

        walk_with(&mut walker, SOURCE);
        let events = events.lock().unwrap();
        assert!(events.iter().all(|e| !e.contains(":visit:")));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_walking_twice_is_idempotent() {
        let mut walker = TreeWalker::new();
        walker
            .register(Box::new(IdentLogger), vec![NodeType::Ident], Severity::Warning)
            .unwrap();

        let source = "class A { void m() { a = b + c; } }";
        let ast = parse_source(source, 8).unwrap();
        let file = FileContext::new(Path::new("A.java"), source, Path::new("."));
        let first = walker.walk(&file, &ast);
        let second = walker.walk(&file, &ast);
        assert_eq!(first.violations, second.violations);
        assert_eq!(first.violations.len(), 5);
    }

    #[test]
    fn test_register_rejects_missing_required_tokens() {
        let mut walker = TreeWalker::new();
        let err = walker
            .register(Box::new(NeedsReturn), vec![NodeType::MethodDef], Severity::Warning)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingRequiredTokens { .. }));
        assert_eq!(walker.check_count(), 0);
    }

    #[test]
    fn test_deep_tree_walks_without_recursion() {
        let mut source = String::from("class A { int x = ");
        for _ in 0..200 {
            source.push_str("- ");
        }
        source.push_str("1; }");

        let mut walker = TreeWalker::new();
        walker
            .register(Box::new(IdentLogger), vec![NodeType::Ident], Severity::Warning)
            .unwrap();
        let outcome = walk_with(&mut walker, &source);
        assert_eq!(outcome.violations.len(), 2);
        assert!(outcome.errors.is_empty());
    }
}
