//! ninec-util - Foundation types shared by every compiler stage.
//!
//! This crate provides the small set of utilities the rest of the
//! pipeline is built on:
//!
//! - [`Symbol`]: interned string handles with O(1) comparison, backed
//!   by a global string table. Identifiers, keywords and literal
//!   lexemes are all symbols.
//! - [`Span`]: source locations (byte range plus 1-based line/column)
//!   carried by tokens and diagnostics.
//! - [`IndexVec`] and [`Idx`]: arena vectors with typed indices, used
//!   for AST nodes and variable records so the tree is plain data with
//!   integer handles instead of self-referential pointers.

mod index_vec;
mod span;
mod symbol;

pub use index_vec::{Idx, IndexVec};
pub use span::Span;
pub use symbol::Symbol;

// Re-export the hash maps used across the compiler so downstream
// crates agree on one hasher.
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
