//! Code generation errors.

use ninec_util::{Span, Symbol};
use thiserror::Error;

/// An error produced while emitting assembly.
///
/// Apart from I/O failures these indicate either an unsupported shape
/// (too many call arguments, an array parameter) or a tree that should
/// not have survived annotation. Each carries the source position of
/// the offending node.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Writing to the output sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Address generation on a node that is not a variable,
    /// dereference or index. Unreachable for well-formed trees.
    #[error("cannot take the address of this expression at {span}")]
    NotAddressable {
        /// Position of the non-addressable expression.
        span: Span,
    },

    /// More than six arguments or parameters; the calling convention
    /// only covers the six integer registers.
    #[error("function '{name}' uses more than 6 arguments at {span}")]
    TooManyArgs {
        /// The function being defined or called.
        name: Symbol,
        /// The call site, or the first parameter past the limit.
        span: Span,
    },

    /// A parameter whose size fits neither the 1-byte nor the 8-byte
    /// register set (arrays cannot be passed by value).
    #[error("parameter '{name}' has unsupported size {size} at {span}")]
    InvalidParamSize {
        /// The parameter name.
        name: Symbol,
        /// Its type's size in bytes.
        size: u64,
        /// The parameter's declaration site.
        span: Span,
    },

    /// A bug: the generator met a node the annotator should have
    /// typed or rejected.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for code generation.
pub type Result<T> = std::result::Result<T, CodegenError>;
