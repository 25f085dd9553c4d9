//! Check for assignments used as sub-expressions.
//!
//! # Rationale
//!
//! An assignment buried inside a condition, an argument list or another
//! assignment is easy to misread as a comparison and hides a side effect.
//!
//! # Accepted Forms
//!
//! - Expression statements, including unbraced bodies: `if (a) b = c;`
//! - Variable initializers: `int x = 1;`
//! - `for` init and update lists: `for (i = 0, j = 0; ; i++, j = i)`
//! - Expression lambdas: `x -> y = x`
//! - The loop idiom `while ((line = reader.readLine()) != null)`, also in
//!   `for` conditions and `do ... while`
//!
//! Chained assignments such as `a = b = c;` are reported.

use treelint_core::{
    Check, CheckBox, CheckConfig, CheckContext, CheckResult, NodeRef, NodeType, OptionError,
};

/// Check name for inner-assignment.
pub const NAME: &str = "inner-assignment";

const MSG_AVOID: &str = "assignment.inner.avoid";

/// Reports assignments inside larger expressions.
#[derive(Debug, Clone, Default)]
pub struct InnerAssignment;

impl InnerAssignment {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Builds the check; it takes no options.
///
/// # Errors
///
/// Never fails.
pub fn factory(_config: &CheckConfig) -> Result<CheckBox, OptionError> {
    Ok(Box::new(InnerAssignment::new()))
}

impl Check for InnerAssignment {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Reports assignments used as sub-expressions"
    }

    fn default_tokens(&self) -> &[NodeType] {
        &[
            NodeType::Assign,
            NodeType::PlusAssign,
            NodeType::MinusAssign,
            NodeType::StarAssign,
            NodeType::DivAssign,
            NodeType::ModAssign,
            NodeType::SlAssign,
            NodeType::SrAssign,
            NodeType::BsrAssign,
            NodeType::BandAssign,
            NodeType::BorAssign,
            NodeType::BxorAssign,
        ]
    }

    fn required_tokens(&self) -> &[NodeType] {
        self.default_tokens()
    }

    fn messages(&self) -> &[(&'static str, &'static str)] {
        &[(MSG_AVOID, "Inner assignments should be avoided.")]
    }

    fn visit_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
        if !is_allowed(node) && !is_in_loop_idiom(node) {
            ctx.log(node, MSG_AVOID, &[]);
        }
        Ok(())
    }
}

fn is_allowed(node: NodeRef<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        NodeType::VariableDef | NodeType::AnnotationMemberValuePair => true,
        NodeType::Expr => parent.parent().is_some_and(|owner| match owner.kind() {
            NodeType::Slist | NodeType::Lambda => true,
            NodeType::Elist => owner
                .parent()
                .is_some_and(|p| p.is(NodeType::ForInit) || p.is(NodeType::ForIterator)),
            _ => is_statement_body(parent, owner),
        }),
        _ => false,
    }
}

/// Whether `expr` is the unbraced body of control statement `owner`
/// rather than its condition.
fn is_statement_body(expr: NodeRef<'_>, owner: NodeRef<'_>) -> bool {
    match owner.kind() {
        NodeType::LiteralElse | NodeType::LabeledStat | NodeType::LiteralFor => true,
        NodeType::LiteralIf | NodeType::LiteralWhile => expr.previous_sibling().is_some(),
        NodeType::LiteralDo => expr.next_sibling().is_some(),
        _ => false,
    }
}

/// `(x = next()) != null` as the condition of a loop.
fn is_in_loop_idiom(node: NodeRef<'_>) -> bool {
    let Some(paren) = node.parent().filter(|p| p.is(NodeType::ParenExpr)) else {
        return false;
    };
    let Some(comparison) = paren.parent().filter(|p| is_comparison(p.kind())) else {
        return false;
    };
    let Some(expr) = comparison.parent().filter(|p| p.is(NodeType::Expr)) else {
        return false;
    };
    expr.parent().is_some_and(|owner| match owner.kind() {
        NodeType::ForCondition => true,
        NodeType::LiteralWhile => expr.previous_sibling().is_none(),
        NodeType::LiteralDo => expr.next_sibling().is_none(),
        _ => false,
    })
}

fn is_comparison(kind: NodeType) -> bool {
    matches!(
        kind,
        NodeType::Equal
            | NodeType::NotEqual
            | NodeType::Lt
            | NodeType::Le
            | NodeType::Gt
            | NodeType::Ge
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::run;
    use treelint_core::Violation;

    fn check_code(body: &str) -> Vec<Violation> {
        let code = format!("class A {{\n    void f() {{\n        {body}\n    }}\n}}\n");
        run(Box::new(InnerAssignment::new()), &code)
    }

    #[test]
    fn test_statement_assignments_are_accepted() {
        assert!(check_code("a = 1; b += 2; c <<= 3;").is_empty());
        assert!(check_code("int x = 1, y = 2;").is_empty());
        assert!(check_code("if (c) a = 1; else b = 2; while (c) a = b; do a = b; while (c);").is_empty());
        assert!(check_code("for (i = 0, j = 0; i < n; i++, j = i) x = i;").is_empty());
        assert!(check_code("label: a = 1;").is_empty());
        assert!(check_code("Runnable r = () -> a = 1;").is_empty());
    }

    #[test]
    fn test_assignment_in_condition() {
        let violations = check_code("if (a = b) {}");
        assert_eq!(violations.len(), 1);
        assert_eq!((violations[0].line, violations[0].column), (3, 13));
        assert_eq!(violations[0].message_key, MSG_AVOID);
    }

    #[test]
    fn test_assignment_as_argument_and_initializer() {
        assert_eq!(check_code("foo(a = 1);").len(), 1);
        assert_eq!(check_code("String s = Integer.toString(i = 2);").len(), 1);
    }

    #[test]
    fn test_chained_assignment() {
        assert_eq!(check_code("a = b = c;").len(), 1);
        assert_eq!(check_code("int a = b = 5;").len(), 1);
    }

    #[test]
    fn test_loop_idiom() {
        assert!(check_code("while ((line = r.readLine()) != null) { n++; }").is_empty());
        assert!(check_code("for (; (c = next()) >= 0;) { n++; }").is_empty());
        assert!(check_code("do { n++; } while ((c = next()) != -1);").is_empty());
        assert_eq!(check_code("if ((line = r.readLine()) != null) {}").len(), 1);
    }
}
