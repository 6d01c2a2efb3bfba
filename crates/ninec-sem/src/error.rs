//! Type errors.

use ninec_ty::Type;
use ninec_util::{Span, Symbol};
use thiserror::Error;

/// An error produced by the annotation pass. The first one aborts
/// compilation. Every variant points at the offending node's source
/// position.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// `*e` where the operand's type has no referent.
    #[error("invalid pointer dereference at {span}")]
    InvalidDereference {
        /// Position of the dereference.
        span: Span,
    },

    /// `a[i]` where `a` is not an array.
    #[error("type {ty} does not support indexing at {span}")]
    NotIndexable {
        /// The non-array type that was indexed.
        ty: Type,
        /// Position of the index expression.
        span: Span,
    },

    /// A `:=` whose initialiser produces no value.
    #[error("cannot infer type for '{name}' at {span}")]
    CannotInfer {
        /// The local being declared.
        name: Symbol,
        /// The declaration site.
        span: Span,
    },

    /// An operand that should have been annotated but was not
    /// (address-of or index applied to a statement-like expression).
    #[error("expression has no type at {span}")]
    Untyped {
        /// Position of the untypeable expression.
        span: Span,
    },
}
