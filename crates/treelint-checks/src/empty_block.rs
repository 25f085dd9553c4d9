//! Check for empty blocks.
//!
//! # Rationale
//!
//! An empty `catch`, `if` or loop body is usually unfinished code or a
//! silently ignored condition.
//!
//! # Configuration
//!
//! - `option`: What counts as content of a block (default: `statement`)
//!   - `statement`: the block must contain at least one statement
//!   - `text`: the block must contain any text, a comment is enough
//!
//! The block is reported at its opening brace. An empty `switch` has no
//! brace node of its own and is reported at the `switch` keyword.

use treelint_core::{
    Check, CheckBox, CheckConfig, CheckContext, CheckResult, NodeRef, NodeType, OptionError,
};

/// Check name for empty-block.
pub const NAME: &str = "empty-block";

const MSG_NO_STATEMENT: &str = "block.noStatement";
const MSG_EMPTY: &str = "block.empty";

/// What a block must contain to be considered non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockOption {
    /// At least one statement.
    #[default]
    Statement,
    /// Any non-whitespace text, comments included.
    Text,
}

impl std::str::FromStr for BlockOption {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "statement" => Ok(Self::Statement),
            "text" => Ok(Self::Text),
            other => Err(OptionError::new(
                "option",
                format!("expected 'statement' or 'text', found '{other}'"),
            )),
        }
    }
}

/// Reports blocks without content.
#[derive(Debug, Clone, Default)]
pub struct EmptyBlock {
    option: BlockOption,
}

impl EmptyBlock {
    /// Creates a check requiring at least one statement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets what a block must contain.
    #[must_use]
    pub fn option(mut self, option: BlockOption) -> Self {
        self.option = option;
        self
    }

    /// Builds the check from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if `option` is not `statement` or `text`.
    pub fn from_config(config: &CheckConfig) -> Result<Self, OptionError> {
        let option = config.get_str("option", "statement")?.parse()?;
        Ok(Self::new().option(option))
    }

    fn check_switch(&self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) {
        if node.has_child(NodeType::CaseGroup) {
            return;
        }
        match self.option {
            BlockOption::Statement => ctx.log(node, MSG_NO_STATEMENT, &[]),
            BlockOption::Text => {
                let span = node.span();
                let commented = node
                    .ast()
                    .comments()
                    .iter()
                    .any(|c| span.start <= c.span.start && c.span.end <= span.end);
                if !commented {
                    ctx.log(node, MSG_EMPTY, &[&keyword(node)]);
                }
            }
        }
    }

    fn check_block(&self, owner: NodeRef<'_>, block: NodeRef<'_>, ctx: &mut CheckContext<'_>) {
        match self.option {
            BlockOption::Statement => {
                if block.child_count() == 0 {
                    ctx.log(block, MSG_NO_STATEMENT, &[]);
                }
            }
            BlockOption::Text => {
                if !has_text(block, ctx.file().content) {
                    ctx.log(block, MSG_EMPTY, &[&keyword(owner)]);
                }
            }
        }
    }
}

/// Builds the check from its configuration.
///
/// # Errors
///
/// Returns an [`OptionError`] for an invalid `option`.
pub fn factory(config: &CheckConfig) -> Result<CheckBox, OptionError> {
    Ok(Box::new(EmptyBlock::from_config(config)?))
}

impl Check for EmptyBlock {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Reports empty blocks"
    }

    fn default_tokens(&self) -> &[NodeType] {
        &[
            NodeType::LiteralWhile,
            NodeType::LiteralTry,
            NodeType::LiteralFinally,
            NodeType::LiteralDo,
            NodeType::LiteralIf,
            NodeType::LiteralElse,
            NodeType::LiteralFor,
            NodeType::InstanceInit,
            NodeType::StaticInit,
            NodeType::LiteralSwitch,
            NodeType::LiteralSynchronized,
        ]
    }

    fn acceptable_tokens(&self) -> &[NodeType] {
        &[
            NodeType::LiteralWhile,
            NodeType::LiteralTry,
            NodeType::LiteralCatch,
            NodeType::LiteralFinally,
            NodeType::LiteralDo,
            NodeType::LiteralIf,
            NodeType::LiteralElse,
            NodeType::LiteralFor,
            NodeType::InstanceInit,
            NodeType::StaticInit,
            NodeType::LiteralSwitch,
            NodeType::LiteralSynchronized,
            NodeType::LiteralCase,
            NodeType::LiteralDefault,
        ]
    }

    fn messages(&self) -> &[(&'static str, &'static str)] {
        &[
            (MSG_NO_STATEMENT, "Must have at least one statement."),
            (MSG_EMPTY, "Empty {0} block."),
        ]
    }

    fn visit_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
        if node.is(NodeType::LiteralSwitch) {
            self.check_switch(node, ctx);
        } else if let Some(block) = block_of(node) {
            self.check_block(node, block, ctx);
        }
        Ok(())
    }
}

/// The braced block owned by `node`, if it has one.
fn block_of(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    if node.is(NodeType::LiteralCase) || node.is(NodeType::LiteralDefault) {
        // only the last label of a group is followed by the statements
        return node
            .next_sibling()
            .filter(|n| n.is(NodeType::Slist))
            .and_then(|body| body.first_child())
            .filter(|n| n.is(NodeType::Slist));
    }
    node.find_child(NodeType::Slist)
}

/// Whether anything but whitespace sits between the braces of `block`.
fn has_text(block: NodeRef<'_>, content: &str) -> bool {
    let span = block.span();
    if span.end < span.start + 2 {
        return false;
    }
    content
        .get(span.start + 1..span.end - 1)
        .is_some_and(|inner| !inner.trim().is_empty())
}

fn keyword(node: NodeRef<'_>) -> String {
    node.text()
        .map_or_else(|| node.kind().to_string(), ToString::to_string)
}
