//! Operator precedence table.
//!
//! The parser climbs this table, and checks that reason about grouping
//! (redundant parentheses, for instance) read the same numbers, so the two
//! can never disagree. Higher binds tighter.

use crate::ast::NodeType;

/// Assignment, right associative.
pub const ASSIGNMENT: u8 = 1;
/// Ternary conditional, right associative.
pub const CONDITIONAL: u8 = 2;
/// Prefix operators and casts.
pub const UNARY: u8 = 13;
/// Postfix increment and decrement.
pub const POSTFIX: u8 = 14;
/// Literals, names, calls, member and array access, parentheses.
pub const PRIMARY: u8 = 15;

/// Binary operators: token, precedence, node type. All left associative.
pub(crate) const BINARY_OPERATORS: &[(&str, u8, NodeType)] = &[
    ("||", 3, NodeType::Lor),
    ("&&", 4, NodeType::Land),
    ("|", 5, NodeType::Bor),
    ("^", 6, NodeType::Bxor),
    ("&", 7, NodeType::Band),
    ("==", 8, NodeType::Equal),
    ("!=", 8, NodeType::NotEqual),
    ("<", 9, NodeType::Lt),
    (">", 9, NodeType::Gt),
    ("<=", 9, NodeType::Le),
    (">=", 9, NodeType::Ge),
    ("instanceof", 9, NodeType::LiteralInstanceof),
    ("<<", 10, NodeType::Sl),
    (">>", 10, NodeType::Sr),
    (">>>", 10, NodeType::Bsr),
    ("+", 11, NodeType::Plus),
    ("-", 11, NodeType::Minus),
    ("*", 12, NodeType::Star),
    ("/", 12, NodeType::Div),
    ("%", 12, NodeType::Mod),
];

/// Assignment operators and their node types.
pub(crate) const ASSIGNMENT_OPERATORS: &[(&str, NodeType)] = &[
    ("=", NodeType::Assign),
    ("+=", NodeType::PlusAssign),
    ("-=", NodeType::MinusAssign),
    ("*=", NodeType::StarAssign),
    ("/=", NodeType::DivAssign),
    ("%=", NodeType::ModAssign),
    ("<<=", NodeType::SlAssign),
    (">>=", NodeType::SrAssign),
    (">>>=", NodeType::BsrAssign),
    ("&=", NodeType::BandAssign),
    ("|=", NodeType::BorAssign),
    ("^=", NodeType::BxorAssign),
];

/// Prefix operators and their node types.
pub(crate) const PREFIX_OPERATORS: &[(&str, NodeType)] = &[
    ("+", NodeType::UnaryPlus),
    ("-", NodeType::UnaryMinus),
    ("++", NodeType::Inc),
    ("--", NodeType::Dec),
    ("!", NodeType::Lnot),
    ("~", NodeType::Bnot),
];

/// Precedence of an expression node, or `None` for nodes that are not
/// expressions.
#[must_use]
pub fn precedence(kind: NodeType) -> Option<u8> {
    if kind.is_assignment() {
        return Some(ASSIGNMENT);
    }
    if let Some(&(_, level, _)) = BINARY_OPERATORS.iter().find(|(_, _, k)| *k == kind) {
        return Some(level);
    }
    match kind {
        NodeType::Question => Some(CONDITIONAL),
        NodeType::UnaryPlus
        | NodeType::UnaryMinus
        | NodeType::Inc
        | NodeType::Dec
        | NodeType::Lnot
        | NodeType::Bnot
        | NodeType::Typecast => Some(UNARY),
        NodeType::PostInc | NodeType::PostDec => Some(POSTFIX),
        NodeType::ParenExpr
        | NodeType::MethodCall
        | NodeType::Dot
        | NodeType::IndexOp
        | NodeType::LiteralNew
        | NodeType::Ident
        | NodeType::LiteralThis
        | NodeType::LiteralSuper
        | NodeType::LiteralClass => Some(PRIMARY),
        // Lambdas bind loosest of all.
        NodeType::Lambda => Some(0),
        k if k.is_literal() => Some(PRIMARY),
        _ => None,
    }
}

/// Whether `kind` is a binary operator whose operands may be regrouped
/// freely, i.e. `(a op b) op c == a op (b op c)` for every input.
#[must_use]
pub fn is_associative(kind: NodeType) -> bool {
    matches!(
        kind,
        NodeType::Lor | NodeType::Land | NodeType::Bor | NodeType::Bxor | NodeType::Band
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_orders_operators() {
        let p = |k| precedence(k).unwrap();
        assert!(p(NodeType::Assign) < p(NodeType::Question));
        assert!(p(NodeType::Question) < p(NodeType::Lor));
        assert!(p(NodeType::Lor) < p(NodeType::Land));
        assert!(p(NodeType::Bxor) < p(NodeType::Band));
        assert!(p(NodeType::Equal) < p(NodeType::Lt));
        assert_eq!(p(NodeType::Lt), p(NodeType::LiteralInstanceof));
        assert!(p(NodeType::Sl) < p(NodeType::Plus));
        assert!(p(NodeType::Plus) < p(NodeType::Star));
        assert!(p(NodeType::Star) < p(NodeType::UnaryMinus));
        assert!(p(NodeType::UnaryMinus) < p(NodeType::PostInc));
        assert!(p(NodeType::PostInc) < p(NodeType::Ident));
    }

    #[test]
    fn test_non_expressions_have_no_precedence() {
        assert_eq!(precedence(NodeType::Slist), None);
        assert_eq!(precedence(NodeType::Expr), None);
    }

    #[test]
    fn test_every_binary_node_type_is_in_the_table() {
        for kind in NodeType::ALL.iter().filter(|k| k.is_binary_operator()) {
            assert!(
                BINARY_OPERATORS.iter().any(|(_, _, k)| k == kind),
                "{kind} missing"
            );
        }
    }
}
