//! Blocks and statements.

use super::expr::operator_node;
use super::{Lookahead, PResult, Parser};
use crate::ast::{NodeType, PendingNode};
use crate::lexer::TokenKind;

impl Parser {
    /// `{ statements }` as an `SLIST`.
    pub(super) fn block(&mut self) -> PResult<PendingNode> {
        let open = self.expect_punct("{")?;
        let mut node = Self::node_at(NodeType::Slist, &open).with_text("{");
        while !self.at_punct("}") {
            if self.at_eof() {
                return Err(self.error("'}'"));
            }
            node.children.extend(self.block_statement()?);
        }
        self.expect_punct("}")?;
        Ok(self.finish(node))
    }

    /// Statement, local variable declaration or local type declaration.
    fn block_statement(&mut self) -> PResult<Vec<PendingNode>> {
        self.enter()?;
        let result = self.block_statement_inner();
        self.leave();
        result
    }

    fn block_statement_inner(&mut self) -> PResult<Vec<PendingNode>> {
        let token = self.current();
        let local_type = token.is_keyword("class")
            || token.is_keyword("interface")
            || token.is_keyword("enum")
            || ((token.is_keyword("abstract") || token.is_keyword("final") || token.is_keyword("static"))
                && (self.peek_at(1).is_keyword("class") || self.peek_at(1).is_keyword("interface")));
        if local_type {
            let modifiers = self.modifiers()?;
            return Ok(vec![self.type_declaration(modifiers)?]);
        }

        let labeled = token.kind == TokenKind::Ident && self.peek_at(1).is_punct(":");
        let may_declare = token.kind == TokenKind::Ident
            || super::is_primitive(token)
            || token.is_keyword("final")
            || token.is_punct("@");
        if may_declare && !labeled && self.declaration_ahead().or_first() {
            let declarations = self.local_variable_declaration()?;
            self.expect_punct(";")?;
            return Ok(declarations);
        }
        Ok(vec![self.statement()?])
    }

    fn local_variable_declaration(&mut self) -> PResult<Vec<PendingNode>> {
        let modifiers = self.modifiers()?;
        let declared_type = self.type_node()?;
        self.variable_declarators(modifiers, declared_type)
    }

    /// Single statement.
    pub(super) fn statement(&mut self) -> PResult<PendingNode> {
        let token = self.current().clone();
        if token.kind == TokenKind::Punct {
            return match token.value.as_str() {
                "{" => self.block(),
                ";" => Ok(self.leaf(NodeType::EmptyStat)),
                _ => self.expression_statement(),
            };
        }
        if token.kind == TokenKind::Ident && self.peek_at(1).is_punct(":") {
            let mut node = self.leaf(NodeType::LabeledStat);
            self.expect_punct(":")?;
            node.push(self.nested_statement()?);
            return Ok(self.finish(node));
        }
        if token.kind != TokenKind::Keyword {
            return self.expression_statement();
        }

        match token.value.as_str() {
            "if" => self.if_statement(),
            "while" => {
                let mut node = self.leaf(NodeType::LiteralWhile);
                node.push(self.parenthesized_condition()?);
                node.push(self.nested_statement()?);
                Ok(self.finish(node))
            }
            "do" => {
                let mut node = self.leaf(NodeType::LiteralDo);
                node.push(self.nested_statement()?);
                self.expect_keyword("while")?;
                node.push(self.parenthesized_condition()?);
                self.expect_punct(";")?;
                Ok(self.finish(node))
            }
            "for" => self.for_statement(),
            "switch" => self.switch_statement(),
            "try" => self.try_statement(),
            "return" => {
                let mut node = self.leaf(NodeType::LiteralReturn);
                if !self.at_punct(";") {
                    node.push(self.expr_node()?);
                }
                self.expect_punct(";")?;
                Ok(self.finish(node))
            }
            "break" | "continue" => {
                let kind = if token.value == "break" {
                    NodeType::LiteralBreak
                } else {
                    NodeType::LiteralContinue
                };
                let mut node = self.leaf(kind);
                if self.at_ident() {
                    node.push(self.ident()?);
                }
                self.expect_punct(";")?;
                Ok(self.finish(node))
            }
            "throw" => {
                let mut node = self.leaf(NodeType::LiteralThrow);
                node.push(self.expr_node()?);
                self.expect_punct(";")?;
                Ok(self.finish(node))
            }
            "assert" => {
                let mut node = self.leaf(NodeType::LiteralAssert);
                node.push(self.expr_node()?);
                if self.eat_punct(":") {
                    node.push(self.expr_node()?);
                }
                self.expect_punct(";")?;
                Ok(self.finish(node))
            }
            "synchronized" => {
                let mut node = self.leaf(NodeType::LiteralSynchronized);
                node.push(self.parenthesized_condition()?);
                node.push(self.block()?);
                Ok(self.finish(node))
            }
            _ => self.expression_statement(),
        }
    }

    fn nested_statement(&mut self) -> PResult<PendingNode> {
        self.enter()?;
        let result = self.statement();
        self.leave();
        result
    }

    /// `expr ;`
    fn expression_statement(&mut self) -> PResult<PendingNode> {
        let node = self.expr_node()?;
        self.expect_punct(";")?;
        Ok(node)
    }

    /// `( expr )` of a control statement; the parentheses belong to the
    /// statement, so no `PAREN_EXPR` is produced.
    fn parenthesized_condition(&mut self) -> PResult<PendingNode> {
        self.expect_punct("(")?;
        let condition = self.expr_node()?;
        self.expect_punct(")")?;
        Ok(condition)
    }

    fn if_statement(&mut self) -> PResult<PendingNode> {
        let mut node = self.leaf(NodeType::LiteralIf);
        node.push(self.parenthesized_condition()?);
        node.push(self.nested_statement()?);
        if self.at_keyword("else") {
            let mut otherwise = self.leaf(NodeType::LiteralElse);
            otherwise.push(self.nested_statement()?);
            node.push(self.finish(otherwise));
        }
        Ok(self.finish(node))
    }

    fn for_statement(&mut self) -> PResult<PendingNode> {
        let mut node = self.leaf(NodeType::LiteralFor);
        self.expect_punct("(")?;

        if self.for_each_ahead() == Lookahead::Yes {
            let mut clause = self.start(NodeType::ForEachClause);
            let modifiers = self.modifiers()?;
            let mut variable = PendingNode::new(
                NodeType::VariableDef,
                modifiers.line,
                modifiers.column,
                modifiers.span.clone(),
            );
            variable.push(modifiers);
            variable.push(self.type_node()?);
            variable.push(self.ident()?);
            clause.push(self.finish(variable));
            self.expect_punct(":")?;
            clause.push(self.expr_node()?);
            node.push(self.finish(clause));
        } else {
            let mut init = self.start(NodeType::ForInit);
            if !self.at_punct(";") {
                if self.declaration_ahead().or_first() {
                    init.children.extend(self.local_variable_declaration()?);
                } else {
                    init.push(self.expression_list()?);
                }
            }
            node.push(self.finish(init));
            self.expect_punct(";")?;

            let mut condition = self.start(NodeType::ForCondition);
            if !self.at_punct(";") {
                condition.push(self.expr_node()?);
            }
            node.push(self.finish(condition));
            self.expect_punct(";")?;

            let mut iterator = self.start(NodeType::ForIterator);
            if !self.at_punct(")") {
                iterator.push(self.expression_list()?);
            }
            node.push(self.finish(iterator));
        }

        self.expect_punct(")")?;
        node.push(self.nested_statement()?);
        Ok(self.finish(node))
    }

    /// Comma separated expressions without surrounding parentheses.
    fn expression_list(&mut self) -> PResult<PendingNode> {
        let mut list = self.start(NodeType::Elist);
        loop {
            list.push(self.expr_node()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(self.finish(list))
    }

    fn switch_statement(&mut self) -> PResult<PendingNode> {
        let mut node = self.leaf(NodeType::LiteralSwitch);
        node.push(self.parenthesized_condition()?);
        self.expect_punct("{")?;
        while !self.at_punct("}") {
            node.push(self.case_group()?);
        }
        self.expect_punct("}")?;
        Ok(self.finish(node))
    }

    /// One or more labels followed by the statements up to the next label.
    fn case_group(&mut self) -> PResult<PendingNode> {
        let mut group = self.start(NodeType::CaseGroup);
        let mut labels = 0;
        loop {
            if self.at_keyword("case") {
                let mut label = self.leaf(NodeType::LiteralCase);
                label.push(self.expr_node()?);
                self.expect_punct(":")?;
                group.push(self.finish(label));
            } else if self.at_keyword("default") {
                let label = self.leaf(NodeType::LiteralDefault);
                self.expect_punct(":")?;
                group.push(self.finish(label));
            } else {
                break;
            }
            labels += 1;
        }
        if labels == 0 {
            return Err(self.error("'case' or 'default'"));
        }

        let mut body = self.start(NodeType::Slist);
        while !self.at_keyword("case") && !self.at_keyword("default") && !self.at_punct("}") {
            if self.at_eof() {
                return Err(self.error("'}'"));
            }
            body.children.extend(self.block_statement()?);
        }
        group.push(self.finish(body));
        Ok(self.finish(group))
    }

    /// Caught type; `A | B | C` becomes `TYPE(BOR(BOR(TYPE TYPE) TYPE))`.
    fn catch_type(&mut self) -> PResult<PendingNode> {
        let mut caught = self.type_node()?;
        if !self.at_punct("|") {
            return Ok(caught);
        }
        while self.at_punct("|") {
            let bar = self.bump();
            let alternative = self.type_node()?;
            caught = self.finish(operator_node(NodeType::Bor, &bar, vec![caught, alternative]));
        }
        let mut node = PendingNode::new(NodeType::Type, caught.line, caught.column, caught.span.clone());
        node.push(caught);
        Ok(node)
    }

    fn try_statement(&mut self) -> PResult<PendingNode> {
        let mut node = self.leaf(NodeType::LiteralTry);
        node.push(self.block()?);
        let mut handlers = 0;
        while self.at_keyword("catch") {
            let mut catch = self.leaf(NodeType::LiteralCatch);
            self.expect_punct("(")?;
            let mut parameter = self.start(NodeType::ParameterDef);
            parameter.push(self.modifiers()?);
            parameter.push(self.catch_type()?);
            parameter.push(self.ident()?);
            catch.push(self.finish(parameter));
            self.expect_punct(")")?;
            catch.push(self.block()?);
            node.push(self.finish(catch));
            handlers += 1;
        }
        if self.at_keyword("finally") {
            let mut finally = self.leaf(NodeType::LiteralFinally);
            finally.push(self.block()?);
            node.push(self.finish(finally));
            handlers += 1;
        }
        if handlers == 0 {
            return Err(self.error("'catch' or 'finally'"));
        }
        Ok(self.finish(node))
    }
}
