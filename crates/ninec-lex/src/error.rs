//! Lexical and token-consumption errors.

use ninec_util::{Span, Symbol};
use thiserror::Error;

/// An error produced while scanning the source into tokens.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LexError {
    /// A byte outside every recognised token class.
    #[error("unexpected character '{found}' at {span}")]
    UnexpectedChar {
        /// The offending character.
        found: char,
        /// Where it was seen.
        span: Span,
    },

    /// A string literal with no closing quote before end of input.
    #[error("string literal not terminated at {span}")]
    UnterminatedString {
        /// The opening quote position.
        span: Span,
    },

    /// A digit run that does not fit a signed 64-bit integer.
    #[error("number literal '{lexeme}' out of range at {span}")]
    InvalidNumber {
        /// The digit run.
        lexeme: Symbol,
        /// Where it starts.
        span: Span,
    },
}

/// An error produced by the stream's `expect*` primitives.
///
/// These carry the expected-and-found pair; the parser surfaces them
/// as syntax errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The current token is not the expected punctuator or keyword.
    #[error("expected '{expected}', found '{found}' at {span}")]
    Expected {
        /// The punctuator or keyword the grammar requires here.
        expected: &'static str,
        /// The lexeme actually present.
        found: Symbol,
        /// Position of the found token.
        span: Span,
    },

    /// The current token is not a number literal.
    #[error("'{found}' is not a number at {span}")]
    ExpectedNumber {
        /// The lexeme actually present.
        found: Symbol,
        /// Position of the found token.
        span: Span,
    },

    /// The current token is not an identifier.
    #[error("expected identifier, found '{found}' at {span}")]
    ExpectedIdent {
        /// The lexeme actually present.
        found: Symbol,
        /// Position of the found token.
        span: Span,
    },
}
