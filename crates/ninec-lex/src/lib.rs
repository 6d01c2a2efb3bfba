//! ninec-lex - Lexical analysis.
//!
//! This crate turns one source string into a [`TokenStream`]: a flat
//! vector of [`Token`]s ending in exactly one `Eof` token, together
//! with the consumption primitives the parser drives it with
//! (`consume`, `peek`, `consume_ident`, `expect`, `expect_number`,
//! `expect_ident`).
//!
//! Tokenization is a single left-to-right scan with a fixed priority:
//! whitespace, string literals, two-character punctuators,
//! single-character punctuators, number literals, keywords (matched
//! only at an identifier boundary), identifiers. Any other byte is a
//! lexical error; there is no recovery.
//!
//! # Example
//!
//! ```
//! use ninec_lex::tokenize;
//!
//! let mut tokens = tokenize("a := 42").unwrap();
//! let ident = tokens.consume_ident().unwrap();
//! assert_eq!(ident.lexeme, "a");
//! assert!(tokens.consume(":="));
//! assert_eq!(tokens.expect_number().unwrap(), 42);
//! assert!(tokens.at_eof());
//! ```

mod cursor;
mod edge_cases;
mod error;
mod lexer;
mod stream;
mod token;

pub use cursor::Cursor;
pub use error::{LexError, TokenError};
pub use lexer::tokenize;
pub use stream::TokenStream;
pub use token::{Token, TokenKind, KEYWORDS};
