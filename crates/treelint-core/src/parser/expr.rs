//! Expressions.

use super::precedence::{ASSIGNMENT_OPERATORS, BINARY_OPERATORS, PREFIX_OPERATORS};
use super::{is_primitive, primitive_node_type, PResult, Parser};
use crate::ast::{NodeType, PendingNode};
use crate::lexer::{Token, TokenKind};

/// Operator node positioned at its first operand.
pub(super) fn operator_node(kind: NodeType, operator: &Token, operands: Vec<PendingNode>) -> PendingNode {
    let (line, column, start) = operands
        .first()
        .map_or((operator.line, operator.column, operator.start), |first| {
            (first.line, first.column, first.span.start)
        });
    let mut node = PendingNode::new(kind, line, column, start..operator.end).with_text(operator.value.clone());
    node.children = operands;
    node
}

impl Parser {
    /// `EXPR` wrapper around a full expression.
    pub(super) fn expr_node(&mut self) -> PResult<PendingNode> {
        let expression = self.expression()?;
        let mut node = PendingNode::new(
            NodeType::Expr,
            expression.line,
            expression.column,
            expression.span.start..expression.span.start,
        );
        node.push(expression);
        Ok(node)
    }

    /// Assignment level, right associative.
    pub(super) fn expression(&mut self) -> PResult<PendingNode> {
        self.enter()?;
        let result = self.assignment();
        self.leave();
        result
    }

    fn assignment(&mut self) -> PResult<PendingNode> {
        let lhs = self.conditional()?;
        let token = self.current();
        if token.kind == TokenKind::Punct {
            if let Some(&(_, kind)) = ASSIGNMENT_OPERATORS.iter().find(|(op, _)| *op == token.value) {
                let operator = self.bump();
                let rhs = self.expression()?;
                return Ok(operator_node(kind, &operator, vec![lhs, rhs]));
            }
        }
        Ok(lhs)
    }

    /// Ternary level, right associative.
    fn conditional(&mut self) -> PResult<PendingNode> {
        let condition = self.binary(3)?;
        if !self.at_punct("?") {
            return Ok(condition);
        }
        let operator = self.bump();
        let then = self.expression()?;
        self.expect_punct(":")?;
        self.enter()?;
        let otherwise = self.conditional();
        self.leave();
        Ok(operator_node(
            NodeType::Question,
            &operator,
            vec![condition, then, otherwise?],
        ))
    }

    fn binary_operator(&self) -> Option<(u8, NodeType)> {
        let token = self.current();
        if token.kind != TokenKind::Punct && !token.is_keyword("instanceof") {
            return None;
        }
        BINARY_OPERATORS
            .iter()
            .find(|(op, _, _)| *op == token.value)
            .map(|&(_, level, kind)| (level, kind))
    }

    /// Binary levels by precedence climbing; every level is left
    /// associative.
    fn binary(&mut self, min_level: u8) -> PResult<PendingNode> {
        let mut lhs = self.unary()?;
        while let Some((level, kind)) = self.binary_operator() {
            if level < min_level {
                break;
            }
            let operator = self.bump();
            let rhs = if kind == NodeType::LiteralInstanceof {
                self.type_node()?
            } else {
                self.enter()?;
                let rhs = self.binary(level + 1);
                self.leave();
                rhs?
            };
            lhs = operator_node(kind, &operator, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> PResult<PendingNode> {
        let token = self.current();
        if token.kind == TokenKind::Punct {
            if let Some(&(_, kind)) = PREFIX_OPERATORS.iter().find(|(op, _)| *op == token.value) {
                let operator = self.bump();
                self.enter()?;
                let operand = self.unary();
                self.leave();
                let mut node = Self::node_at(kind, &operator).with_text(operator.value);
                node.push(operand?);
                return Ok(node);
            }
            if token.is_punct("(") && !self.lambda_ahead().or_first() && self.cast_ahead().or_first() {
                return self.cast();
            }
        }
        self.postfix()
    }

    /// `( Type ) operand`
    fn cast(&mut self) -> PResult<PendingNode> {
        let open = self.expect_punct("(")?;
        let mut node = Self::node_at(NodeType::Typecast, &open).with_text("(");
        node.push(self.type_node()?);
        self.expect_punct(")")?;
        self.enter()?;
        let operand = self.unary();
        self.leave();
        node.push(operand?);
        Ok(node)
    }

    fn postfix(&mut self) -> PResult<PendingNode> {
        let mut operand = self.primary()?;
        loop {
            let kind = if self.at_punct("++") {
                NodeType::PostInc
            } else if self.at_punct("--") {
                NodeType::PostDec
            } else {
                break;
            };
            let operator = self.bump();
            operand = operator_node(kind, &operator, vec![operand]);
        }
        Ok(operand)
    }

    /// Primary expression followed by member access, calls and indexing.
    fn primary(&mut self) -> PResult<PendingNode> {
        let mut node = self.primary_base()?;
        loop {
            if self.at_punct(".") {
                node = self.member_access(node)?;
            } else if self.at_punct("(") && is_callable(&node) {
                node = self.call(node)?;
            } else if self.at_punct("[") {
                let open = self.bump();
                let index = self.expression()?;
                self.expect_punct("]")?;
                node = self.finish(operator_node(NodeType::IndexOp, &open, vec![node, index]));
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn primary_base(&mut self) -> PResult<PendingNode> {
        let token = self.current().clone();
        let literal = match token.kind {
            TokenKind::IntLiteral => Some(NodeType::NumInt),
            TokenKind::LongLiteral => Some(NodeType::NumLong),
            TokenKind::FloatLiteral => Some(NodeType::NumFloat),
            TokenKind::DoubleLiteral => Some(NodeType::NumDouble),
            TokenKind::CharLiteral => Some(NodeType::CharLiteral),
            TokenKind::StringLiteral => Some(NodeType::StringLiteral),
            TokenKind::Keyword => match token.value.as_str() {
                "true" => Some(NodeType::LiteralTrue),
                "false" => Some(NodeType::LiteralFalse),
                "null" => Some(NodeType::LiteralNull),
                "this" => Some(NodeType::LiteralThis),
                "super" => Some(NodeType::LiteralSuper),
                _ => None,
            },
            _ => None,
        };
        if let Some(kind) = literal {
            return Ok(self.leaf(kind));
        }

        match token.kind {
            TokenKind::Ident if self.peek_at(1).is_punct("->") => self.lambda(),
            TokenKind::Ident => Ok(self.leaf(NodeType::Ident)),
            TokenKind::Punct if token.value == "(" => {
                if self.lambda_ahead().or_first() {
                    self.lambda()
                } else {
                    self.parenthesized()
                }
            }
            TokenKind::Keyword if token.value == "new" => self.creator(),
            TokenKind::Keyword if is_primitive(&token) || token.value == "void" => {
                self.primitive_class_literal()
            }
            _ => Err(self.error("expression")),
        }
    }

    fn parenthesized(&mut self) -> PResult<PendingNode> {
        let open = self.expect_punct("(")?;
        let mut node = Self::node_at(NodeType::ParenExpr, &open).with_text("(");
        node.push(self.expression()?);
        self.expect_punct(")")?;
        Ok(self.finish(node))
    }

    /// `int.class`, `int[].class`, `void.class`
    fn primitive_class_literal(&mut self) -> PResult<PendingNode> {
        let token = self.current().clone();
        let kind = primitive_node_type(&token.value).ok_or_else(|| self.error("expression"))?;
        let mut base = self.leaf(kind);
        while self.at_punct("[") {
            let open = self.bump();
            self.expect_punct("]")?;
            base = self.finish(operator_node(NodeType::ArrayDeclarator, &open, vec![base]));
        }
        let dot = self.expect_punct(".")?;
        if !self.at_keyword("class") {
            return Err(self.error("'class'"));
        }
        let class = self.leaf(NodeType::LiteralClass);
        Ok(operator_node(NodeType::Dot, &dot, vec![base, class]))
    }

    fn member_access(&mut self, base: PendingNode) -> PResult<PendingNode> {
        let dot = self.expect_punct(".")?;
        let token = self.current().clone();
        let member = match token.kind {
            TokenKind::Ident => self.leaf(NodeType::Ident),
            TokenKind::Keyword => match token.value.as_str() {
                "class" => self.leaf(NodeType::LiteralClass),
                "this" => self.leaf(NodeType::LiteralThis),
                "super" => self.leaf(NodeType::LiteralSuper),
                "new" => self.creator()?,
                _ => return Err(self.error("identifier")),
            },
            TokenKind::Punct if token.value == "<" => {
                // Explicit type arguments on a method call: a.<T>m()
                let arguments = self.type_arguments()?;
                let name = self.ident()?;
                let node = operator_node(NodeType::Dot, &dot, vec![base, arguments, name]);
                return if self.at_punct("(") {
                    self.call(node)
                } else {
                    Err(self.error("'('"))
                };
            }
            _ => return Err(self.error("identifier")),
        };
        Ok(operator_node(NodeType::Dot, &dot, vec![base, member]))
    }

    /// `callee ( args )`
    fn call(&mut self, callee: PendingNode) -> PResult<PendingNode> {
        let open = self.current().clone();
        let arguments = self.arguments()?;
        let node = operator_node(NodeType::MethodCall, &open, vec![callee, arguments]);
        Ok(self.finish(node))
    }

    /// `( expr, ... )` as an `ELIST` of `EXPR` nodes.
    pub(super) fn arguments(&mut self) -> PResult<PendingNode> {
        self.expect_punct("(")?;
        let mut list = self.start(NodeType::Elist);
        if !self.at_punct(")") {
            loop {
                list.push(self.expr_node()?);
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        let list = self.finish(list);
        self.expect_punct(")")?;
        Ok(list)
    }

    /// `new` expressions: objects, anonymous classes and arrays.
    fn creator(&mut self) -> PResult<PendingNode> {
        let new = self.expect_keyword("new")?;
        let mut node = Self::node_at(NodeType::LiteralNew, &new).with_text("new");

        let token = self.current().clone();
        if let Some(kind) = primitive_node_type(&token.value).filter(|_| is_primitive(&token)) {
            node.push(self.leaf(kind));
            if !self.at_punct("[") {
                return Err(self.error("'['"));
            }
        } else {
            node.push(self.class_name(true)?);
        }

        if self.at_punct("[") {
            while self.at_punct("[") {
                let open = self.bump();
                let mut declarator = Self::node_at(NodeType::ArrayDeclarator, &open).with_text("[");
                if !self.at_punct("]") {
                    declarator.push(self.expr_node()?);
                }
                self.expect_punct("]")?;
                node.push(self.finish(declarator));
            }
            if self.at_punct("{") {
                node.push(self.array_initializer()?);
            }
        } else {
            node.push(self.arguments()?);
            if self.at_punct("{") {
                node.push(self.class_body()?);
            }
        }
        Ok(self.finish(node))
    }

    /// `{ a, {b, c}, }`
    pub(super) fn array_initializer(&mut self) -> PResult<PendingNode> {
        let open = self.expect_punct("{")?;
        let mut node = Self::node_at(NodeType::ArrayInit, &open).with_text("{");
        while !self.at_punct("}") {
            if self.at_punct("{") {
                self.enter()?;
                let inner = self.array_initializer();
                self.leave();
                node.push(inner?);
            } else {
                node.push(self.expr_node()?);
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("}")?;
        Ok(self.finish(node))
    }

    /// `x -> body` or `(params) -> body`
    fn lambda(&mut self) -> PResult<PendingNode> {
        let start = self.current().clone();
        let mut node = Self::node_at(NodeType::Lambda, &start).with_text("->");
        if start.kind == TokenKind::Ident {
            node.push(self.leaf(NodeType::Ident));
        } else {
            self.expect_punct("(")?;
            let mut parameters = self.start(NodeType::Parameters);
            if !self.at_punct(")") {
                loop {
                    parameters.push(self.lambda_parameter()?);
                    if !self.eat_punct(",") {
                        break;
                    }
                }
            }
            let parameters = self.finish(parameters);
            self.expect_punct(")")?;
            node.push(parameters);
        }
        self.expect_punct("->")?;
        if self.at_punct("{") {
            node.push(self.block()?);
        } else {
            node.push(self.expr_node()?);
        }
        Ok(self.finish(node))
    }

    fn lambda_parameter(&mut self) -> PResult<PendingNode> {
        let inferred = self.at_ident() && (self.peek_at(1).is_punct(",") || self.peek_at(1).is_punct(")"));
        if inferred {
            let mut parameter = self.start(NodeType::ParameterDef);
            parameter.push(self.ident()?);
            return Ok(self.finish(parameter));
        }
        let mut parameter = self.start(NodeType::ParameterDef);
        parameter.push(self.modifiers()?);
        parameter.push(self.type_node()?);
        parameter.push(self.ident()?);
        Ok(self.finish(parameter))
    }
}

/// Whether `(` after `node` is a call: plain names, qualified names, and
/// explicit `this(...)` / `super(...)` constructor calls.
fn is_callable(node: &PendingNode) -> bool {
    match node.kind {
        NodeType::Ident | NodeType::LiteralThis | NodeType::LiteralSuper => true,
        NodeType::Dot => node
            .children
            .last()
            .is_some_and(|member| member.kind == NodeType::Ident),
        _ => false,
    }
}
