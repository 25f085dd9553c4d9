//! Token model produced by the lexer.

use serde::Serialize;

/// Reserved words of the analysed language.
pub const KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
];

/// Operators and separators, longest first so the scanner can take the
/// first match.
pub(crate) const PUNCTUATION: &[&str] = &[
    ">>>=", "<<=", ">>=", ">>>", "...", "->", "::", "++", "--", "&&", "||", "==", "!=", "<=",
    ">=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "(", ")", "{", "}", "[",
    "]", ";", ",", ".", "@", "=", ">", "<", "!", "~", "?", ":", "+", "-", "*", "/", "&", "|",
    "^", "%",
];

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Spaces, tabs, form feeds and line terminators.
    Whitespace,
    /// `// ...` up to (not including) the line terminator.
    LineComment,
    /// `/* ... */`, including Javadoc comments.
    BlockComment,
    /// Identifier that is not a reserved word.
    Ident,
    /// Reserved word, including the `true`/`false`/`null` literals.
    Keyword,
    /// Operator or separator.
    Punct,
    /// Integer literal without a long suffix.
    IntLiteral,
    /// Integer literal with an `l`/`L` suffix.
    LongLiteral,
    /// Floating point literal with an `f`/`F` suffix.
    FloatLiteral,
    /// Floating point literal without a float suffix.
    DoubleLiteral,
    /// Character literal, quotes included.
    CharLiteral,
    /// String literal, quotes included.
    StringLiteral,
    /// End of input marker appended by the parser.
    Eof,
}

impl TokenKind {
    /// Returns true for tokens the grammar ignores (whitespace and comments).
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::BlockComment
        )
    }

    /// Returns true for comment tokens.
    #[must_use]
    pub fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    /// Returns true for literal tokens.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntLiteral
                | Self::LongLiteral
                | Self::FloatLiteral
                | Self::DoubleLiteral
                | Self::CharLiteral
                | Self::StringLiteral
        )
    }
}

/// A lexical token with its position in the original source.
///
/// `text` is the raw source slice, so concatenating the text of every
/// non-synthetic token reproduces the input. `value` is the logical text
/// after unicode escapes were decoded; the parser matches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Token classification.
    pub kind: TokenKind,
    /// Raw source text.
    pub text: String,
    /// Logical text with unicode escapes decoded.
    pub value: String,
    /// Line of the first character (1-indexed).
    pub line: usize,
    /// Tab-expanded column of the first character (1-indexed).
    pub column: usize,
    /// Byte offset of the first character in the raw source.
    pub start: usize,
    /// Byte offset one past the last character in the raw source.
    pub end: usize,
    /// Whether the parser produced this token rather than the lexer.
    pub synthetic: bool,
}

impl Token {
    /// Returns true if this token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.value == keyword
    }

    /// Returns true if this token is the given operator or separator.
    #[must_use]
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.value == punct
    }
}

/// Returns true if `word` is a reserved word.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.binary_search(&word).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_sorted_for_binary_search() {
        let mut sorted = KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, KEYWORDS);
    }

    #[test]
    fn test_keyword_lookup() {
        assert!(is_keyword("instanceof"));
        assert!(is_keyword("null"));
        assert!(!is_keyword("String"));
        assert!(!is_keyword("var"));
    }

    #[test]
    fn test_punctuation_is_longest_first_within_shared_prefixes() {
        for (i, a) in PUNCTUATION.iter().enumerate() {
            for b in &PUNCTUATION[i + 1..] {
                assert!(
                    !b.starts_with(a) || b == a,
                    "{b} must come before {a}"
                );
            }
        }
    }
}
