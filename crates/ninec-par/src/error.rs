//! Syntax errors.

use ninec_lex::TokenError;
use ninec_util::{Span, Symbol};
use thiserror::Error;

/// An error produced while parsing. The first one aborts compilation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A token-level mismatch (expected punctuator/number/identifier).
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Something other than `func` or `var` at the top level.
    #[error("expected declaration, found '{found}' at {span}")]
    ExpectedDeclaration {
        /// The lexeme actually present.
        found: Symbol,
        /// Position of the found token.
        span: Span,
    },

    /// A type annotation that is not `[N]T`, `*T`, `int` or `byte`.
    #[error("expected type, found '{found}' at {span}")]
    ExpectedType {
        /// The lexeme actually present.
        found: Symbol,
        /// Position of the found token.
        span: Span,
    },

    /// A name that resolves to nothing and is not being introduced
    /// with `:=`.
    #[error("undeclared name: {name} at {span}")]
    UndeclaredName {
        /// The unresolved name.
        name: Symbol,
        /// Where it was used.
        span: Span,
    },

    /// A second declaration of a name in the same scope.
    #[error("{name} redeclared in this block at {span}")]
    Redeclared {
        /// The name declared twice.
        name: Symbol,
        /// The second declaration site.
        span: Span,
    },
}
