//! Token definitions.

use ninec_util::{Span, Symbol};

/// The reserved words of the language.
///
/// A keyword only lexes as `Reserved` when the following byte cannot
/// continue an identifier; `returned` is one identifier, not `return`
/// plus `ed`.
pub const KEYWORDS: &[&str] = &[
    "return", "if", "else", "for", "func", "var", "int", "byte",
];

/// The kind of a [`Token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// A punctuator or keyword.
    Reserved,

    /// An identifier.
    Ident,

    /// A decimal integer literal; the value lives in [`Token::value`].
    Num,

    /// A string literal; the lexeme is the content between the quotes,
    /// exclusive.
    Str,

    /// End of input. Every stream ends with exactly one of these.
    Eof,
}

/// One lexical unit of the source.
///
/// Tokens are immutable once produced. The lexeme is the exact source
/// slice (interned), which is what the parser compares punctuators and
/// keywords against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    /// What sort of token this is.
    pub kind: TokenKind,

    /// The exact source text of the token.
    pub lexeme: Symbol,

    /// The numeric value, for `Num` tokens; 0 otherwise.
    pub value: i64,

    /// Where in the source the token came from.
    pub span: Span,
}

impl Token {
    /// Creates a token with no numeric value.
    pub fn new(kind: TokenKind, lexeme: Symbol, span: Span) -> Self {
        Self {
            kind,
            lexeme,
            value: 0,
            span,
        }
    }

    /// Creates a `Num` token carrying its parsed value.
    pub fn number(lexeme: Symbol, value: i64, span: Span) -> Self {
        Self {
            kind: TokenKind::Num,
            lexeme,
            value,
            span,
        }
    }

    /// Length of the lexeme in bytes.
    pub fn len(&self) -> usize {
        self.lexeme.len()
    }

    /// Returns true for zero-length lexemes (only `Eof` in practice).
    pub fn is_empty(&self) -> bool {
        self.lexeme.is_empty()
    }

    /// Returns true if this is a `Reserved` token with the given
    /// lexeme.
    pub fn is_reserved(&self, op: &str) -> bool {
        self.kind == TokenKind::Reserved && self.lexeme == op
    }

    /// Returns true at the end of the stream.
    pub fn at_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
