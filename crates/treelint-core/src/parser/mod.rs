//! Recursive-descent parser producing the arena [`Ast`].
//!
//! Trivia never reaches the grammar: whitespace is dropped and comments go
//! to a side channel that is attached to the tree after parsing. Expression
//! parsing climbs the table in [`precedence`].
//!
//! Three places need more than one token of lookahead: a `(` that may open
//! a lambda, a cast or a parenthesized expression; a block statement that
//! may be a local variable declaration or an expression; and the shape of
//! a for-loop header. Probes look at most [`MAX_LOOKAHEAD`] tokens ahead.
//! When a probe runs out of budget the first production wins (lambda before
//! cast before parenthesized expression, declaration before expression
//! statement).

mod decl;
mod error;
mod expr;
pub mod precedence;
mod stmt;

pub use error::{ParseError, SyntaxError};

use crate::ast::{Ast, Comment, CommentKind, NodeType, PendingNode};
use crate::lexer::{next_tab_stop, Lexer, Token, TokenKind, DEFAULT_TAB_WIDTH};

/// Maximum number of tokens a disambiguation probe may inspect.
pub const MAX_LOOKAHEAD: usize = 64;

/// Maximum nesting of statements and expressions.
const MAX_NESTING: usize = 256;

type PResult<T> = Result<T, SyntaxError>;

/// Parses a token stream (trivia included) into a tree.
///
/// # Errors
///
/// Returns a [`SyntaxError`] at the first token that fits no production.
pub fn parse(tokens: Vec<Token>) -> Result<Ast, SyntaxError> {
    parse_tokens(tokens, DEFAULT_TAB_WIDTH)
}

/// Tokenizes and parses `source`.
///
/// # Errors
///
/// Returns [`ParseError::Lex`] or [`ParseError::Syntax`].
pub fn parse_source(source: &str, tab_width: usize) -> Result<Ast, ParseError> {
    let tokens = Lexer::new(source).tab_width(tab_width).tokenize()?;
    Ok(parse_tokens(tokens, tab_width)?)
}

fn parse_tokens(tokens: Vec<Token>, tab_width: usize) -> Result<Ast, SyntaxError> {
    let eof = eof_token(tokens.last(), tab_width);
    let mut comments = Vec::new();
    let mut significant = Vec::with_capacity(tokens.len() / 2 + 1);

    for token in tokens {
        match token.kind {
            TokenKind::Whitespace => {}
            TokenKind::LineComment | TokenKind::BlockComment => comments.push(Comment {
                kind: if token.kind == TokenKind::LineComment {
                    CommentKind::Line
                } else {
                    CommentKind::Block
                },
                text: token.text,
                line: token.line,
                column: token.column,
                span: token.start..token.end,
                attached_to: None,
            }),
            _ => significant.push(token),
        }
    }
    significant.push(eof);

    let mut parser = Parser::new(significant);
    let root = parser.compilation_unit()?;
    let mut ast = Ast::from_pending(root);
    ast.attach_comments(comments);
    Ok(ast)
}

/// Synthesizes the end-of-input token positioned after the last token.
fn eof_token(last: Option<&Token>, tab_width: usize) -> Token {
    let (mut line, mut column, end) = last.map_or((1, 1, 0), |t| (t.line, t.column, t.end));
    if let Some(last) = last {
        let mut chars = last.text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' | '\r' => {
                    line += 1;
                    column = 1;
                }
                '\t' => column = next_tab_stop(column, tab_width),
                _ => column += 1,
            }
        }
    }
    Token {
        kind: TokenKind::Eof,
        text: String::new(),
        value: String::new(),
        line,
        column,
        start: end,
        end,
        synthetic: true,
    }
}

/// Outcome of a bounded lookahead probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookahead {
    /// The production matches.
    Yes,
    /// The production cannot match.
    No,
    /// The budget ran out before the probe could decide.
    Exhausted,
}

impl Lookahead {
    fn from_probe(result: Option<bool>) -> Self {
        match result {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Exhausted,
        }
    }

    /// Treats an undecided probe as a match (first production wins).
    pub(crate) fn or_first(self) -> bool {
        self != Self::No
    }
}

/// Read-only cursor for lookahead. Every accessor returns `None` once the
/// budget is spent, which `?` turns into [`Lookahead::Exhausted`].
struct Probe<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Probe<'a> {
    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        let index = self.index + offset;
        if index >= MAX_LOOKAHEAD {
            return None;
        }
        // The stream always ends with EOF, which no probe matches.
        self.tokens.get(index).or_else(|| self.tokens.last())
    }

    fn peek(&self) -> Option<&'a Token> {
        self.peek_at(0)
    }

    fn bump(&mut self) {
        self.index += 1;
    }

    fn punct(&self, punct: &str) -> Option<bool> {
        Some(self.peek()?.is_punct(punct))
    }

    /// `Type` := primitive | Name TypeArgs? ('.' Name TypeArgs?)* , then `[]`*.
    fn scan_type(&mut self) -> Option<bool> {
        let first = self.peek()?;
        if is_primitive(first) {
            self.bump();
        } else if first.kind == TokenKind::Ident {
            self.bump();
            loop {
                if self.punct("<")? && !self.scan_type_arguments()? {
                    return Some(false);
                }
                if self.punct(".")? && self.peek_at(1)?.kind == TokenKind::Ident {
                    self.bump();
                    self.bump();
                } else {
                    break;
                }
            }
        } else {
            return Some(false);
        }
        while self.punct("[")? && self.peek_at(1)?.is_punct("]") {
            self.bump();
            self.bump();
        }
        Some(true)
    }

    /// Scans a balanced `<...>` group made only of tokens that may appear
    /// in type arguments.
    fn scan_type_arguments(&mut self) -> Option<bool> {
        let mut depth = 0usize;
        loop {
            let token = self.peek()?;
            let closes = match token.value.as_str() {
                ">" => 1,
                ">>" => 2,
                ">>>" => 3,
                _ => 0,
            };
            if token.kind == TokenKind::Punct && closes > 0 {
                self.bump();
                if closes > depth {
                    return Some(false);
                }
                depth -= closes;
                if depth == 0 {
                    return Some(true);
                }
                continue;
            }
            let allowed = match token.kind {
                TokenKind::Ident => true,
                TokenKind::Keyword => {
                    is_primitive(token) || token.value == "extends" || token.value == "super"
                }
                TokenKind::Punct => matches!(token.value.as_str(), "<" | "?" | "," | "." | "&" | "[" | "]"),
                _ => false,
            };
            if !allowed {
                return Some(false);
            }
            if token.is_punct("<") {
                depth += 1;
            }
            self.bump();
        }
    }


    /// `Ident ->` or `( params ) ->`, where params are empty, bare names,
    /// or typed names.
    fn scan_lambda(&mut self) -> Option<bool> {
        if self.peek()?.kind == TokenKind::Ident {
            return Some(self.peek_at(1)?.is_punct("->"));
        }
        if !self.punct("(")? {
            return Some(false);
        }
        self.bump();
        if self.punct(")")? {
            return Some(self.peek_at(1)?.is_punct("->"));
        }
        loop {
            while self.peek()?.is_keyword("final") {
                self.bump();
            }
            if !self.scan_type()? {
                return Some(false);
            }
            if self.peek()?.kind == TokenKind::Ident {
                self.bump();
            }
            if self.punct(",")? {
                self.bump();
                continue;
            }
            if !self.punct(")")? {
                return Some(false);
            }
            return Some(self.peek_at(1)?.is_punct("->"));
        }
    }

    /// `( primitive-type )` always casts; `( reference-type )` casts when
    /// followed by an operand that cannot be read as a binary `+`/`-`.
    fn scan_cast(&mut self) -> Option<bool> {
        if !self.punct("(")? {
            return Some(false);
        }
        self.bump();
        let primitive = is_primitive(self.peek()?);
        if !self.scan_type()? || !self.punct(")")? {
            return Some(false);
        }
        if primitive {
            return Some(true);
        }
        self.bump();
        Some(starts_unary_not_plus_minus(self.peek()?))
    }

    /// `Type Ident`.
    fn scan_declaration(&mut self) -> Option<bool> {
        if !self.scan_type()? {
            return Some(false);
        }
        Some(self.peek()?.kind == TokenKind::Ident)
    }

    /// `final? Type Ident :` opening an enhanced for header.
    fn scan_for_each(&mut self) -> Option<bool> {
        while self.peek()?.is_keyword("final") {
            self.bump();
        }
        if !self.scan_declaration()? {
            return Some(false);
        }
        self.bump();
        self.punct(":")
    }
}

/// Whether `token` is a primitive type keyword.
pub(crate) fn is_primitive(token: &Token) -> bool {
    token.kind == TokenKind::Keyword
        && matches!(
            token.value.as_str(),
            "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double"
        )
}

/// Node type for a primitive type keyword or `void`.
pub(crate) fn primitive_node_type(keyword: &str) -> Option<NodeType> {
    Some(match keyword {
        "void" => NodeType::LiteralVoid,
        "boolean" => NodeType::LiteralBoolean,
        "byte" => NodeType::LiteralByte,
        "char" => NodeType::LiteralChar,
        "short" => NodeType::LiteralShort,
        "int" => NodeType::LiteralInt,
        "long" => NodeType::LiteralLong,
        "float" => NodeType::LiteralFloat,
        "double" => NodeType::LiteralDouble,
        _ => return None,
    })
}

/// Parser state over the significant tokens of one file.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    last_end: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            last_end: 0,
            depth: 0,
        }
    }

    fn current(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn probe(&self) -> Probe<'_> {
        Probe {
            tokens: &self.tokens[self.pos..],
            index: 0,
        }
    }

    fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn at_punct(&self, punct: &str) -> bool {
        self.current().is_punct(punct)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.current().is_keyword(keyword)
    }

    fn at_ident(&self) -> bool {
        self.current().kind == TokenKind::Ident
    }

    fn bump(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
            self.last_end = token.end;
        }
        token
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.at_punct(punct) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: &str) -> PResult<Token> {
        if self.at_punct(punct) {
            Ok(self.bump())
        } else {
            Err(self.error(format!("'{punct}'")))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> PResult<Token> {
        if self.at_keyword(keyword) {
            Ok(self.bump())
        } else {
            Err(self.error(format!("'{keyword}'")))
        }
    }

    fn error(&self, expected: impl Into<String>) -> SyntaxError {
        let token = self.current();
        let found = if token.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("'{}'", token.value)
        };
        SyntaxError {
            line: token.line,
            column: token.column,
            offset: token.start,
            expected: expected.into(),
            found,
        }
    }

    /// Node positioned at `token`.
    fn node_at(kind: NodeType, token: &Token) -> PendingNode {
        PendingNode::new(kind, token.line, token.column, token.start..token.end)
    }

    /// Consumes the current token as a leaf carrying its text.
    fn leaf(&mut self, kind: NodeType) -> PendingNode {
        let token = self.bump();
        Self::node_at(kind, &token).with_text(token.value)
    }

    /// Consumes an identifier as an `IDENT` leaf.
    fn ident(&mut self) -> PResult<PendingNode> {
        if self.at_ident() {
            Ok(self.leaf(NodeType::Ident))
        } else {
            Err(self.error("identifier"))
        }
    }

    /// Node starting at the current token without consuming it. Empty
    /// nodes keep this position.
    fn start(&self, kind: NodeType) -> PendingNode {
        let token = self.current();
        PendingNode::new(kind, token.line, token.column, token.start..token.start)
    }

    /// Extends `node` to cover every token consumed so far.
    fn finish(&self, mut node: PendingNode) -> PendingNode {
        node.span.end = node.span.end.max(self.last_end);
        node
    }

    fn enter(&mut self) -> PResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error("less deeply nested code"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Consumes one `>` closing a type-argument list, splitting `>>`,
    /// `>>>` and their assignment forms into synthetic tokens.
    fn expect_closing_angle(&mut self) -> PResult<()> {
        let token = self.current().clone();
        if token.kind != TokenKind::Punct || !token.value.starts_with('>') {
            return Err(self.error("'>'"));
        }
        if token.value.len() > 1 {
            let rest = Token {
                kind: TokenKind::Punct,
                text: token.value[1..].to_string(),
                value: token.value[1..].to_string(),
                line: token.line,
                column: token.column + 1,
                start: token.start + 1,
                end: token.end,
                synthetic: true,
            };
            self.tokens.insert(self.pos + 1, rest);
            let head = &mut self.tokens[self.pos];
            head.text = ">".to_string();
            head.value = ">".to_string();
            head.end = head.start + 1;
            head.synthetic = true;
        }
        self.bump();
        Ok(())
    }

    /// Whether the current token starts a lambda.
    fn lambda_ahead(&self) -> Lookahead {
        Lookahead::from_probe(self.probe().scan_lambda())
    }

    /// Whether a `(` at the current token starts a cast.
    fn cast_ahead(&self) -> Lookahead {
        Lookahead::from_probe(self.probe().scan_cast())
    }

    /// Whether the current token starts a local variable declaration.
    fn declaration_ahead(&self) -> Lookahead {
        let token = self.current();
        if token.is_keyword("final") || token.is_punct("@") {
            return Lookahead::Yes;
        }
        Lookahead::from_probe(self.probe().scan_declaration())
    }

    /// Whether a for header starting at the current token is enhanced.
    fn for_each_ahead(&self) -> Lookahead {
        Lookahead::from_probe(self.probe().scan_for_each())
    }
}

/// Tokens that may follow the `)` of a cast to a reference type.
fn starts_unary_not_plus_minus(token: &Token) -> bool {
    match token.kind {
        TokenKind::Ident
        | TokenKind::IntLiteral
        | TokenKind::LongLiteral
        | TokenKind::FloatLiteral
        | TokenKind::DoubleLiteral
        | TokenKind::CharLiteral
        | TokenKind::StringLiteral => true,
        TokenKind::Keyword => {
            matches!(
                token.value.as_str(),
                "this" | "super" | "new" | "true" | "false" | "null"
            ) || primitive_node_type(&token.value).is_some()
        }
        TokenKind::Punct => matches!(token.value.as_str(), "(" | "!" | "~"),
        _ => false,
    }
}
