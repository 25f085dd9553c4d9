//! Parse errors.

use crate::lexer::LexError;
use thiserror::Error;

/// Token sequence that matches no production.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: expected {expected}, found {found}")]
pub struct SyntaxError {
    /// Line of the offending token (1-indexed).
    pub line: usize,
    /// Tab-expanded column of the offending token (1-indexed).
    pub column: usize,
    /// Raw byte offset of the offending token.
    pub offset: usize,
    /// What the parser was looking for.
    pub expected: String,
    /// What it saw instead.
    pub found: String,
}

/// Failure to turn source text into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Tokenization failed.
    #[error("lexical error at {0}")]
    Lex(#[from] LexError),
    /// Tokens did not form a valid compilation unit.
    #[error("syntax error at {0}")]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    /// Line of the failure.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Lex(e) => e.line,
            Self::Syntax(e) => e.line,
        }
    }

    /// Column of the failure.
    #[must_use]
    pub fn column(&self) -> usize {
        match self {
            Self::Lex(e) => e.column,
            Self::Syntax(e) => e.column,
        }
    }

    /// Raw byte offset of the failure.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Self::Lex(e) => e.offset,
            Self::Syntax(e) => e.offset,
        }
    }

    /// Message without the position prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Lex(e) => e.message.clone(),
            Self::Syntax(e) => format!("expected {}, found {}", e.expected, e.found),
        }
    }
}
