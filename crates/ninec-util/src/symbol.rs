//! String interning.
//!
//! A [`Symbol`] is a 4-byte handle into a global string table. Interning
//! the same string twice yields the same symbol, so comparing lexemes,
//! identifiers and keywords is an integer comparison instead of a string
//! walk. Strings are leaked into the table on first interning and live
//! for the rest of the process; a compiler invocation interns a bounded
//! set of names, so nothing is ever reclaimed.

use std::fmt;
use std::sync::{LazyLock, RwLock};

use dashmap::DashMap;

/// Global string table instance.
///
/// Initialised on first use. The language keywords and punctuators are
/// pre-interned so they are available without allocation while lexing.
static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    table.preintern_known_symbols();
    table
});

/// An interned string.
///
/// # Example
///
/// ```
/// use ninec_util::Symbol;
///
/// let a = Symbol::intern("offset");
/// let b = Symbol::intern("offset");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "offset");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Interns a string, returning its symbol.
    ///
    /// Thread-safe; repeated calls with equal strings return equal
    /// symbols.
    pub fn intern(string: &str) -> Symbol {
        STRING_TABLE.intern(string)
    }

    /// Returns the string this symbol stands for.
    pub fn as_str(self) -> &'static str {
        STRING_TABLE.get(self)
    }

    /// Returns the length in bytes of the interned string.
    pub fn len(self) -> usize {
        self.as_str().len()
    }

    /// Returns true if the interned string is empty.
    pub fn is_empty(self) -> bool {
        self.as_str().is_empty()
    }

    /// Raw table index, for debugging.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// The global string table.
///
/// Forward lookups (string to index) go through a concurrent map;
/// reverse lookups (index to string) go through an append-only vector.
/// Interned strings are leaked to obtain `'static` lifetime, which is
/// sound because entries are never removed.
struct StringTable {
    /// Maps interned string to its table index.
    map: DashMap<&'static str, u32, ahash::RandomState>,

    /// Table index to string, in interning order.
    strings: RwLock<Vec<&'static str>>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_hasher(ahash::RandomState::new()),
            strings: RwLock::new(Vec::with_capacity(128)),
        }
    }

    /// Pre-interns the fixed vocabulary of the language: keywords,
    /// punctuators and a handful of names every compilation touches.
    fn preintern_known_symbols(&self) {
        const KNOWN: &[&str] = &[
            // Keywords
            "return", "if", "else", "for", "func", "var", "int", "byte",
            // Two-character punctuators
            "==", "!=", "<=", ">=", "++", "--", ":=",
            // Single-character punctuators
            "+", "-", "*", "/", "(", ")", "<", ">", ";", "=", "{", "}", ",", "&", "[", "]",
            // Common names
            "main", "",
        ];
        for s in KNOWN {
            self.intern(s);
        }
    }

    fn intern(&self, string: &str) -> Symbol {
        if let Some(index) = self.map.get(string) {
            return Symbol(*index);
        }

        let mut strings = self.strings.write().unwrap();
        // Another thread may have interned the string while we were
        // waiting for the write lock.
        if let Some(index) = self.map.get(string) {
            return Symbol(*index);
        }

        let interned: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let index = u32::try_from(strings.len()).expect("string table overflow");
        strings.push(interned);
        self.map.insert(interned, index);
        Symbol(index)
    }

    fn get(&self, symbol: Symbol) -> &'static str {
        self.strings.read().unwrap()[symbol.0 as usize]
    }
}
