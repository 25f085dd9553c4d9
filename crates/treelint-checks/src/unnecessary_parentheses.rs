//! Check for parentheses that do not change how an expression groups.
//!
//! # Rationale
//!
//! Redundant parentheses add visual noise and can suggest a grouping that
//! the reader then has to verify. Parentheses that only restate operator
//! precedence are better left out.
//!
//! # Detected Patterns
//!
//! - `(x)` and `(42)`: parentheses around an identifier or literal
//! - `y = (a + b)`: around the right-hand side of an assignment
//! - `return (a + b);`: around a return value
//! - `foo((a + b))`, `((a))`: around a whole expression
//! - `a || (b ^ c)`: around an operand whose operator binds at least as
//!   tightly as the enclosing one
//!
//! Parentheses stay accepted where removing them regroups the expression,
//! e.g. `a - (b - c)` or `(a || b) && c`.

use treelint_core::parser::precedence::{is_associative, precedence};
use treelint_core::{Check, CheckBox, CheckConfig, CheckContext, CheckResult, NodeRef, NodeType, OptionError};

/// Check name for unnecessary-parentheses.
pub const NAME: &str = "unnecessary-parentheses";

const MSG_IDENT: &str = "unnecessary.paren.ident";
const MSG_LITERAL: &str = "unnecessary.paren.literal";
const MSG_RETURN: &str = "unnecessary.paren.return";
const MSG_ASSIGN: &str = "unnecessary.paren.assign";
const MSG_EXPR: &str = "unnecessary.paren.expr";

/// Longest literal quoted verbatim in a message.
const MAX_QUOTED_LENGTH: usize = 25;

/// Flags redundant parentheses.
#[derive(Debug, Clone, Default)]
pub struct UnnecessaryParentheses;

impl UnnecessaryParentheses {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Builds the check from its configuration; it takes no options.
///
/// # Errors
///
/// Never fails.
pub fn factory(_config: &CheckConfig) -> Result<CheckBox, OptionError> {
    Ok(Box::new(UnnecessaryParentheses::new()))
}

impl Check for UnnecessaryParentheses {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Flags parentheses that do not change expression grouping"
    }

    fn default_tokens(&self) -> &[NodeType] {
        &[NodeType::ParenExpr]
    }

    fn messages(&self) -> &[(&'static str, &'static str)] {
        &[
            (MSG_IDENT, "Unnecessary parentheses around identifier '{0}'."),
            (MSG_LITERAL, "Unnecessary parentheses around literal '{0}'."),
            (MSG_RETURN, "Unnecessary parentheses around return value."),
            (MSG_ASSIGN, "Unnecessary parentheses around assignment right-hand side."),
            (MSG_EXPR, "Unnecessary parentheses around expression."),
        ]
    }

    fn visit_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
        let (Some(inner), Some(parent)) = (node.first_child(), node.parent()) else {
            return Ok(());
        };
        let inner_text = inner.text().unwrap_or_default();

        if inner.is(NodeType::Ident) {
            ctx.log(node, MSG_IDENT, &[inner_text]);
        } else if inner.kind().is_literal() {
            ctx.log(node, MSG_LITERAL, &[chop(inner_text).as_str()]);
        } else if parent.is(NodeType::Expr) {
            let key = match parent.parent().map(|p| p.kind()) {
                Some(NodeType::LiteralReturn) => MSG_RETURN,
                Some(NodeType::Assign) => MSG_ASSIGN,
                _ => MSG_EXPR,
            };
            ctx.log(node, key, &[]);
        } else if parent.kind().is_assignment() && node.previous_sibling().is_some() {
            ctx.log(node, MSG_ASSIGN, &[]);
        } else if parent.is(NodeType::ParenExpr) {
            ctx.log(node, MSG_EXPR, &[]);
        } else if parent.kind().is_binary_operator() && binds_within(node, inner, parent) {
            ctx.log(node, MSG_EXPR, &[]);
        }
        Ok(())
    }
}

/// Whether `inner`, parenthesized as an operand of `outer`, would group the
/// same way without the parentheses.
fn binds_within(paren: NodeRef<'_>, inner: NodeRef<'_>, outer: NodeRef<'_>) -> bool {
    let (Some(inner_level), Some(outer_level)) = (precedence(inner.kind()), precedence(outer.kind()))
    else {
        return false;
    };
    if inner_level != outer_level {
        return inner_level > outer_level;
    }
    let is_left_operand = paren.previous_sibling().is_none();
    is_left_operand || (inner.kind() == outer.kind() && is_associative(outer.kind()))
}

fn chop(text: &str) -> String {
    if text.chars().count() > MAX_QUOTED_LENGTH {
        let head: String = text.chars().take(MAX_QUOTED_LENGTH).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
