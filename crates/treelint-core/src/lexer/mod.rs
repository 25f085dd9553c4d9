//! Lexer turning raw source text into positioned tokens.
//!
//! Tokenization runs in two passes: unicode escapes are decoded first
//! ([`unicode`]), then token boundaries are decided over the decoded text.
//! Every token keeps the raw slice it was read from, so the token list is a
//! lossless partition of the input. Whitespace and comments are returned as
//! trivia; the parser moves comments to a side channel.

mod position;
mod token;
mod unicode;

pub use position::{byte_offset_for_column, expanded_column, next_tab_stop};
pub use token::{is_keyword, Token, TokenKind, KEYWORDS};

use position::PositionTracker;
use thiserror::Error;
use token::PUNCTUATION;
use unicode::Decoded;

/// Default distance between tab stops.
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Unrecognized character sequence in the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct LexError {
    /// Line of the offending character (1-indexed).
    pub line: usize,
    /// Tab-expanded column of the offending character (1-indexed).
    pub column: usize,
    /// Raw byte offset of the offending character.
    pub offset: usize,
    /// What went wrong.
    pub message: String,
}

/// Tokenizes `source` with the default tab width.
///
/// # Errors
///
/// Returns a [`LexError`] for malformed escapes, unterminated literals or
/// comments, and characters that start no token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

/// Configurable tokenizer.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    tab_width: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    /// Sets the tab width used for column computation.
    #[must_use]
    pub fn tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Tokenizes the whole source, trivia included.
    ///
    /// # Errors
    ///
    /// See [`tokenize`].
    pub fn tokenize(self) -> Result<Vec<Token>, LexError> {
        let mut tracker = PositionTracker::new(self.source, self.tab_width);
        let decoded = unicode::decode(self.source).map_err(|e| {
            let (line, column) = tracker.clone().advance_to(e.offset);
            LexError {
                line,
                column,
                offset: e.offset,
                message: "illegal unicode escape, expected four hex digits".to_string(),
            }
        })?;

        let scanner = Scanner { decoded: &decoded };
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < decoded.len() {
            let start_offset = decoded.raw_offset(pos);
            let (line, column) = tracker.advance_to(start_offset);
            let (kind, end) = scanner.scan(pos).map_err(|failure| {
                let offset = decoded.raw_offset(failure.at);
                let (line, column) = tracker.clone().advance_to(offset);
                LexError {
                    line,
                    column,
                    offset,
                    message: failure.message,
                }
            })?;

            let end_offset = decoded.raw_offset(end);
            let value: String = decoded.chars[pos..end].iter().collect();
            let kind = if kind == TokenKind::Ident && is_keyword(&value) {
                TokenKind::Keyword
            } else {
                kind
            };

            tokens.push(Token {
                kind,
                text: self.source[start_offset..end_offset].to_string(),
                value,
                line,
                column,
                start: start_offset,
                end: end_offset,
                synthetic: false,
            });
            pos = end;
        }

        Ok(tokens)
    }
}

/// Scan failure at a logical index.
struct ScanFailure {
    at: usize,
    message: String,
}

impl ScanFailure {
    fn new(at: usize, message: impl Into<String>) -> Self {
        Self {
            at,
            message: message.into(),
        }
    }
}

/// Decides token boundaries over decoded characters.
struct Scanner<'d> {
    decoded: &'d Decoded,
}

impl Scanner<'_> {
    fn peek(&self, index: usize) -> Option<char> {
        self.decoded.chars.get(index).copied()
    }

    /// Scans one token starting at `start`; returns its kind and end index.
    fn scan(&self, start: usize) -> Result<(TokenKind, usize), ScanFailure> {
        let Some(ch) = self.peek(start) else {
            return Err(ScanFailure::new(start, "unexpected end of input"));
        };

        if is_whitespace(ch) {
            let mut end = start + 1;
            while self.peek(end).is_some_and(is_whitespace) {
                end += 1;
            }
            return Ok((TokenKind::Whitespace, end));
        }

        match (ch, self.peek(start + 1)) {
            ('/', Some('/')) => return Ok((TokenKind::LineComment, self.line_comment_end(start))),
            ('/', Some('*')) => return self.block_comment(start),
            ('"', _) => return self.quoted(start, '"', TokenKind::StringLiteral),
            ('\'', _) => return self.quoted(start, '\'', TokenKind::CharLiteral),
            ('.', Some(next)) if next.is_ascii_digit() => return self.number(start),
            _ => {}
        }

        if ch.is_ascii_digit() {
            return self.number(start);
        }

        if is_ident_start(ch) {
            let mut end = start + 1;
            while self.peek(end).is_some_and(is_ident_part) {
                end += 1;
            }
            return Ok((TokenKind::Ident, end));
        }

        for punct in PUNCTUATION {
            if self.matches_at(start, punct) {
                return Ok((TokenKind::Punct, start + punct.chars().count()));
            }
        }

        Err(ScanFailure::new(
            start,
            format!("unexpected character '{}'", ch.escape_debug()),
        ))
    }

    fn matches_at(&self, start: usize, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek(start + i) == Some(c))
    }

    fn line_comment_end(&self, start: usize) -> usize {
        let mut end = start + 2;
        while self.peek(end).is_some_and(|c| c != '\n' && c != '\r') {
            end += 1;
        }
        end
    }

    fn block_comment(&self, start: usize) -> Result<(TokenKind, usize), ScanFailure> {
        let mut end = start + 2;
        loop {
            match self.peek(end) {
                None => return Err(ScanFailure::new(start, "unterminated block comment")),
                Some('*') if self.peek(end + 1) == Some('/') => {
                    return Ok((TokenKind::BlockComment, end + 2));
                }
                Some(_) => end += 1,
            }
        }
    }

    fn quoted(
        &self,
        start: usize,
        quote: char,
        kind: TokenKind,
    ) -> Result<(TokenKind, usize), ScanFailure> {
        let what = if quote == '"' {
            "string literal"
        } else {
            "character literal"
        };
        let mut end = start + 1;
        loop {
            match self.peek(end) {
                None | Some('\n' | '\r') => {
                    return Err(ScanFailure::new(start, format!("unterminated {what}")));
                }
                Some('\\') => {
                    if self.peek(end + 1).is_none() {
                        return Err(ScanFailure::new(start, format!("unterminated {what}")));
                    }
                    end += 2;
                }
                Some(c) if c == quote => {
                    if quote == '\'' && end == start + 1 {
                        return Err(ScanFailure::new(start, "empty character literal"));
                    }
                    return Ok((kind, end + 1));
                }
                Some(_) => end += 1,
            }
        }
    }

    fn digits(&self, mut end: usize, accept: impl Fn(char) -> bool) -> usize {
        while self.peek(end).is_some_and(|c| accept(c) || c == '_') {
            end += 1;
        }
        end
    }

    fn number(&self, start: usize) -> Result<(TokenKind, usize), ScanFailure> {
        let radix_prefix = self.peek(start) == Some('0')
            && matches!(self.peek(start + 1), Some('x' | 'X' | 'b' | 'B'));

        let (mut end, is_float) = if radix_prefix {
            let hex = matches!(self.peek(start + 1), Some('x' | 'X'));
            let end = if hex {
                self.digits(start + 2, |c| c.is_ascii_hexdigit())
            } else {
                self.digits(start + 2, |c| c == '0' || c == '1')
            };
            if end == start + 2 {
                return Err(ScanFailure::new(start, "malformed number literal"));
            }
            (end, false)
        } else {
            let mut end = self.digits(start, |c| c.is_ascii_digit());
            let mut is_float = false;
            if self.peek(end) == Some('.') {
                let after = self.peek(end + 1);
                if after.is_some_and(|c| c.is_ascii_digit()) {
                    end = self.digits(end + 1, |c| c.is_ascii_digit());
                    is_float = true;
                } else if after != Some('.') && !after.is_some_and(is_ident_start) {
                    end += 1;
                    is_float = true;
                }
            }
            if matches!(self.peek(end), Some('e' | 'E')) {
                let mut exp = end + 1;
                if matches!(self.peek(exp), Some('+' | '-')) {
                    exp += 1;
                }
                let exp_end = self.digits(exp, |c| c.is_ascii_digit());
                if exp_end == exp {
                    return Err(ScanFailure::new(start, "malformed exponent in number literal"));
                }
                end = exp_end;
                is_float = true;
            }
            (end, is_float)
        };

        let kind = match self.peek(end) {
            Some('f' | 'F') if !radix_prefix => {
                end += 1;
                TokenKind::FloatLiteral
            }
            Some('d' | 'D') if !radix_prefix => {
                end += 1;
                TokenKind::DoubleLiteral
            }
            Some('l' | 'L') if !is_float => {
                end += 1;
                TokenKind::LongLiteral
            }
            _ if is_float => TokenKind::DoubleLiteral,
            _ => TokenKind::IntLiteral,
        };

        if self.peek(end).is_some_and(is_ident_part) {
            return Err(ScanFailure::new(start, "malformed number literal"));
        }
        Ok((kind, end))
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C' | '\u{FEFF}')
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
