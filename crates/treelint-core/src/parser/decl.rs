//! Compilation units, declarations and types.

use super::{is_primitive, primitive_node_type, PResult, Parser};
use crate::ast::{NodeType, PendingNode};
use crate::lexer::{Token, TokenKind};

/// Modifier keywords and their node types.
const MODIFIERS: &[(&str, NodeType)] = &[
    ("public", NodeType::LiteralPublic),
    ("private", NodeType::LiteralPrivate),
    ("protected", NodeType::LiteralProtected),
    ("static", NodeType::LiteralStatic),
    ("final", NodeType::Final),
    ("abstract", NodeType::Abstract),
    ("synchronized", NodeType::LiteralSynchronized),
    ("native", NodeType::LiteralNative),
    ("transient", NodeType::LiteralTransient),
    ("volatile", NodeType::LiteralVolatile),
    ("strictfp", NodeType::Strictfp),
    ("default", NodeType::LiteralDefault),
];

impl Parser {
    /// Whole file.
    pub(super) fn compilation_unit(&mut self) -> PResult<PendingNode> {
        let first = self.current().clone();
        let end = self.tokens.last().map_or(0, |t| t.end);
        let mut root = PendingNode::new(NodeType::CompilationUnit, first.line, first.column, 0..end);

        if self.at_keyword("package") {
            root.push(self.package_definition()?);
        }
        while self.at_keyword("import") || self.at_punct(";") {
            if self.eat_punct(";") {
                continue;
            }
            root.push(self.import()?);
        }
        while !self.at_eof() {
            if self.eat_punct(";") {
                continue;
            }
            let modifiers = self.modifiers()?;
            root.push(self.type_declaration(modifiers)?);
        }
        Ok(root)
    }

    fn package_definition(&mut self) -> PResult<PendingNode> {
        let keyword = self.expect_keyword("package")?;
        let mut node = Self::node_at(NodeType::PackageDef, &keyword).with_text("package");
        node.push(self.qualified_name()?);
        self.expect_punct(";")?;
        Ok(self.finish(node))
    }

    fn import(&mut self) -> PResult<PendingNode> {
        let keyword = self.expect_keyword("import")?;
        let kind = if self.eat_keyword("static") {
            NodeType::StaticImport
        } else {
            NodeType::Import
        };
        let mut node = Self::node_at(kind, &keyword).with_text("import");
        let mut name = self.ident()?;
        while self.at_punct(".") {
            let dot = self.bump();
            let member = if self.at_punct("*") {
                self.leaf(NodeType::StarImport)
            } else {
                self.ident()?
            };
            let is_star = member.kind == NodeType::StarImport;
            name = dot_node(&dot, name, member);
            if is_star {
                break;
            }
        }
        node.push(name);
        self.expect_punct(";")?;
        Ok(self.finish(node))
    }

    /// `a.b.c` as nested `DOT` nodes.
    pub(super) fn qualified_name(&mut self) -> PResult<PendingNode> {
        let mut name = self.ident()?;
        while self.at_punct(".") && self.peek_at(1).kind == TokenKind::Ident {
            let dot = self.bump();
            let member = self.ident()?;
            name = dot_node(&dot, name, member);
        }
        Ok(name)
    }

    /// Modifier keywords and annotations, possibly none.
    pub(super) fn modifiers(&mut self) -> PResult<PendingNode> {
        let mut node = self.start(NodeType::Modifiers);
        loop {
            let token = self.current();
            if token.is_punct("@") && !self.peek_at(1).is_keyword("interface") {
                node.push(self.annotation()?);
                continue;
            }
            let modifier = (token.kind == TokenKind::Keyword)
                .then(|| MODIFIERS.iter().find(|(word, _)| *word == token.value))
                .flatten();
            match modifier {
                // `default:` is a switch label, not a modifier.
                Some(&(word, kind)) if !(word == "default" && self.peek_at(1).is_punct(":")) => {
                    node.push(self.leaf(kind));
                }
                _ => break,
            }
        }
        Ok(self.finish(node))
    }

    /// `@Name`, `@Name(value)`, `@Name(key = value, ...)`
    fn annotation(&mut self) -> PResult<PendingNode> {
        let at = self.expect_punct("@")?;
        let mut node = Self::node_at(NodeType::Annotation, &at).with_text("@");
        node.push(self.qualified_name()?);
        if self.eat_punct("(") {
            if self.at_ident() && self.peek_at(1).is_punct("=") {
                loop {
                    let mut pair = self.start(NodeType::AnnotationMemberValuePair);
                    pair.push(self.ident()?);
                    self.expect_punct("=")?;
                    pair.push(self.element_value()?);
                    node.push(self.finish(pair));
                    if !self.eat_punct(",") {
                        break;
                    }
                }
            } else if !self.at_punct(")") {
                node.push(self.element_value()?);
            }
            self.expect_punct(")")?;
        }
        Ok(self.finish(node))
    }

    fn element_value(&mut self) -> PResult<PendingNode> {
        if self.at_punct("@") {
            self.annotation()
        } else if self.at_punct("{") {
            self.array_initializer()
        } else {
            self.expr_node()
        }
    }

    /// Class, interface or enum declaration after its modifiers.
    pub(super) fn type_declaration(&mut self, modifiers: PendingNode) -> PResult<PendingNode> {
        let kind = if self.at_keyword("class") {
            NodeType::ClassDef
        } else if self.at_keyword("interface") {
            NodeType::InterfaceDef
        } else if self.at_keyword("enum") {
            NodeType::EnumDef
        } else {
            return Err(self.error("'class', 'interface' or 'enum'"));
        };
        let keyword = self.bump();
        let mut node = PendingNode::new(kind, modifiers.line, modifiers.column, modifiers.span.start..keyword.end)
            .with_text(keyword.value.clone());
        node.push(modifiers);
        node.push(self.ident()?);

        if kind != NodeType::EnumDef && self.at_punct("<") {
            node.push(self.type_parameters()?);
        }
        if kind != NodeType::EnumDef && self.at_keyword("extends") {
            let extends = self.bump();
            let mut clause = Self::node_at(NodeType::ExtendsClause, &extends).with_text("extends");
            loop {
                clause.push(self.class_name(false)?);
                // Only interfaces may extend several types.
                if kind != NodeType::InterfaceDef || !self.eat_punct(",") {
                    break;
                }
            }
            node.push(self.finish(clause));
        }
        if kind != NodeType::InterfaceDef && self.at_keyword("implements") {
            let implements = self.bump();
            let mut clause = Self::node_at(NodeType::ImplementsClause, &implements).with_text("implements");
            loop {
                clause.push(self.class_name(false)?);
                if !self.eat_punct(",") {
                    break;
                }
            }
            node.push(self.finish(clause));
        }

        let body = if kind == NodeType::EnumDef {
            self.enum_body()?
        } else {
            self.class_body()?
        };
        node.push(body);
        Ok(self.finish(node))
    }

    /// `{ members }`
    pub(super) fn class_body(&mut self) -> PResult<PendingNode> {
        let open = self.expect_punct("{")?;
        let mut node = Self::node_at(NodeType::Objblock, &open).with_text("{");
        self.members_until_close(&mut node)?;
        Ok(self.finish(node))
    }

    fn enum_body(&mut self) -> PResult<PendingNode> {
        let open = self.expect_punct("{")?;
        let mut node = Self::node_at(NodeType::Objblock, &open).with_text("{");
        while self.at_ident() || self.at_punct("@") {
            let mut constant = self.start(NodeType::EnumConstantDef);
            while self.at_punct("@") {
                constant.push(self.annotation()?);
            }
            constant.push(self.ident()?);
            if self.at_punct("(") {
                constant.push(self.arguments()?);
            }
            if self.at_punct("{") {
                constant.push(self.class_body()?);
            }
            node.push(self.finish(constant));
            if !self.eat_punct(",") {
                break;
            }
        }
        if self.eat_punct(";") {
            self.members_until_close(&mut node)?;
        } else {
            self.expect_punct("}")?;
        }
        Ok(self.finish(node))
    }

    fn members_until_close(&mut self, body: &mut PendingNode) -> PResult<()> {
        while !self.at_punct("}") {
            if self.at_eof() {
                return Err(self.error("'}'"));
            }
            if self.eat_punct(";") {
                continue;
            }
            self.enter()?;
            let member = self.member();
            self.leave();
            body.children.extend(member?);
        }
        self.expect_punct("}")?;
        Ok(())
    }

    /// One member; field declarations with several declarators yield one
    /// node per declarator.
    fn member(&mut self) -> PResult<Vec<PendingNode>> {
        if self.at_keyword("static") && self.peek_at(1).is_punct("{") {
            let keyword = self.bump();
            let mut node = Self::node_at(NodeType::StaticInit, &keyword).with_text("static");
            node.push(self.block()?);
            return Ok(vec![self.finish(node)]);
        }
        if self.at_punct("{") {
            let mut node = self.start(NodeType::InstanceInit);
            node.push(self.block()?);
            return Ok(vec![self.finish(node)]);
        }

        let modifiers = self.modifiers()?;
        if self.at_keyword("class") || self.at_keyword("interface") || self.at_keyword("enum") {
            return Ok(vec![self.type_declaration(modifiers)?]);
        }

        let type_parameters = if self.at_punct("<") {
            Some(self.type_parameters()?)
        } else {
            None
        };

        if self.at_ident() && self.peek_at(1).is_punct("(") {
            return Ok(vec![self.method_rest(NodeType::CtorDef, modifiers, type_parameters, None)?]);
        }

        let member_type = self.type_node()?;
        if self.at_ident() && self.peek_at(1).is_punct("(") {
            return Ok(vec![self.method_rest(
                NodeType::MethodDef,
                modifiers,
                type_parameters,
                Some(member_type),
            )?]);
        }
        if type_parameters.is_some() {
            return Err(self.error("method declaration"));
        }
        let fields = self.variable_declarators(modifiers, member_type)?;
        self.expect_punct(";")?;
        Ok(fields)
    }

    /// Method or constructor from its name onwards.
    fn method_rest(
        &mut self,
        kind: NodeType,
        modifiers: PendingNode,
        type_parameters: Option<PendingNode>,
        return_type: Option<PendingNode>,
    ) -> PResult<PendingNode> {
        let mut node = PendingNode::new(kind, modifiers.line, modifiers.column, modifiers.span.clone());
        node.push(modifiers);
        if let Some(type_parameters) = type_parameters {
            node.push(type_parameters);
        }
        if let Some(return_type) = return_type {
            node.push(return_type);
        }
        node.push(self.ident()?);
        node.push(self.parameters()?);
        while self.at_punct("[") {
            node.push(self.array_declarator()?);
        }
        if self.at_keyword("throws") {
            let throws = self.bump();
            let mut clause = Self::node_at(NodeType::LiteralThrows, &throws).with_text("throws");
            loop {
                clause.push(self.qualified_name()?);
                if !self.eat_punct(",") {
                    break;
                }
            }
            node.push(self.finish(clause));
        }
        if !self.eat_punct(";") {
            node.push(self.block()?);
        }
        Ok(self.finish(node))
    }

    /// `( params )`
    fn parameters(&mut self) -> PResult<PendingNode> {
        self.expect_punct("(")?;
        let mut node = self.start(NodeType::Parameters);
        if !self.at_punct(")") {
            loop {
                let mut parameter = self.start(NodeType::ParameterDef);
                parameter.push(self.modifiers()?);
                parameter.push(self.type_node()?);
                let variadic = self.at_punct("...");
                if variadic {
                    parameter.push(self.leaf(NodeType::Ellipsis));
                }
                parameter.push(self.ident()?);
                while self.at_punct("[") {
                    parameter.push(self.array_declarator()?);
                }
                node.push(self.finish(parameter));
                if variadic || !self.eat_punct(",") {
                    break;
                }
            }
        }
        let node = self.finish(node);
        self.expect_punct(")")?;
        Ok(node)
    }

    /// Declarators after a type: `a = 1, b[] = {2}`. Every declarator
    /// holds `MODIFIERS` and `TYPE`. Later ones get copies placed at their
    /// own name, with annotations left out of the copied modifiers.
    pub(super) fn variable_declarators(
        &mut self,
        modifiers: PendingNode,
        declared_type: PendingNode,
    ) -> PResult<Vec<PendingNode>> {
        let mut declarators = Vec::new();
        let mut shared_modifiers = modifiers.clone();
        shared_modifiers
            .children
            .retain(|child| child.kind != NodeType::Annotation);
        let shared_type = declared_type.clone();
        let mut first = PendingNode::new(
            NodeType::VariableDef,
            modifiers.line,
            modifiers.column,
            modifiers.span.clone(),
        );
        first.push(modifiers);
        first.push(declared_type);
        let mut node = first;
        loop {
            node.push(self.ident()?);
            while self.at_punct("[") {
                node.push(self.array_declarator()?);
            }
            if self.at_punct("=") {
                let assign = self.bump();
                let mut initializer = Self::node_at(NodeType::Assign, &assign).with_text("=");
                initializer.push(if self.at_punct("{") {
                    self.array_initializer()?
                } else {
                    self.expr_node()?
                });
                node.push(self.finish(initializer));
            }
            declarators.push(self.finish(node));
            if !self.eat_punct(",") {
                break;
            }
            node = self.start(NodeType::VariableDef);
            let (line, column, offset) = (node.line, node.column, node.span.start);
            node.push(shared_modifiers.relocated(line, column, offset));
            node.push(shared_type.relocated(line, column, offset));
        }
        Ok(declarators)
    }

    /// `[]` after a declared name.
    fn array_declarator(&mut self) -> PResult<PendingNode> {
        let open = self.expect_punct("[")?;
        self.expect_punct("]")?;
        Ok(self.finish(Self::node_at(NodeType::ArrayDeclarator, &open).with_text("[")))
    }

    /// A `TYPE` node: primitive or class type followed by dimensions.
    pub(super) fn type_node(&mut self) -> PResult<PendingNode> {
        let mut node = self.start(NodeType::Type);
        let token = self.current().clone();
        if is_primitive(&token) || token.is_keyword("void") {
            let kind = primitive_node_type(&token.value).ok_or_else(|| self.error("type"))?;
            node.push(self.leaf(kind));
        } else {
            node.push(self.class_name(false)?);
        }
        while self.at_punct("[") && self.peek_at(1).is_punct("]") {
            node.push(self.array_declarator()?);
        }
        Ok(self.finish(node))
    }

    /// Possibly qualified class name; each segment may carry type
    /// arguments as its child.
    pub(super) fn class_name(&mut self, allow_diamond: bool) -> PResult<PendingNode> {
        let mut name = self.type_name_segment(allow_diamond)?;
        while self.at_punct(".") && self.peek_at(1).kind == TokenKind::Ident {
            let dot = self.bump();
            let member = self.type_name_segment(allow_diamond)?;
            name = dot_node(&dot, name, member);
        }
        Ok(name)
    }

    fn type_name_segment(&mut self, allow_diamond: bool) -> PResult<PendingNode> {
        let mut segment = self.ident()?;
        if self.at_punct("<") {
            if !allow_diamond && self.peek_at(1).is_punct(">") {
                return Err(self.error("type argument"));
            }
            segment.push(self.type_arguments()?);
            segment = self.finish(segment);
        }
        Ok(segment)
    }

    /// `<A, ? extends B, ? super C>`; `<>` is accepted where the caller
    /// allows it.
    pub(super) fn type_arguments(&mut self) -> PResult<PendingNode> {
        let open = self.expect_punct("<")?;
        let mut node = Self::node_at(NodeType::TypeArguments, &open).with_text("<");
        if !self.current().value.starts_with('>') {
            loop {
                self.enter()?;
                let argument = self.type_argument();
                self.leave();
                node.push(argument?);
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        self.expect_closing_angle()?;
        Ok(self.finish(node))
    }

    fn type_argument(&mut self) -> PResult<PendingNode> {
        if !self.at_punct("?") {
            return self.type_node();
        }
        let mut wildcard = self.leaf(NodeType::WildcardType);
        let bound_kind = if self.at_keyword("extends") {
            Some(NodeType::TypeUpperBounds)
        } else if self.at_keyword("super") {
            Some(NodeType::TypeLowerBounds)
        } else {
            None
        };
        if let Some(kind) = bound_kind {
            let mut bound = self.leaf(kind);
            bound.push(self.type_node()?);
            wildcard.push(self.finish(bound));
        }
        Ok(self.finish(wildcard))
    }

    /// `<T, U extends A & B>`
    pub(super) fn type_parameters(&mut self) -> PResult<PendingNode> {
        let open = self.expect_punct("<")?;
        let mut node = Self::node_at(NodeType::TypeParameters, &open).with_text("<");
        loop {
            let mut parameter = self.start(NodeType::TypeParameter);
            while self.at_punct("@") {
                parameter.push(self.annotation()?);
            }
            parameter.push(self.ident()?);
            if self.at_keyword("extends") {
                let mut bounds = self.leaf(NodeType::TypeUpperBounds);
                loop {
                    bounds.push(self.type_node()?);
                    if !self.eat_punct("&") {
                        break;
                    }
                }
                parameter.push(self.finish(bounds));
            }
            node.push(self.finish(parameter));
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_closing_angle()?;
        Ok(self.finish(node))
    }
}

/// `DOT` node positioned at its left operand.
pub(super) fn dot_node(dot: &Token, left: PendingNode, right: PendingNode) -> PendingNode {
    let mut node = PendingNode::new(NodeType::Dot, left.line, left.column, left.span.start..dot.end).with_text(".");
    node.push(left);
    node.push(right);
    node
}
