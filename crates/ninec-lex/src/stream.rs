//! The token stream and its consumption primitives.
//!
//! The parser never touches token indices directly; it drives the
//! stream through `consume`/`peek`/`consume_ident` (non-failing) and
//! `expect`/`expect_number`/`expect_ident` (failing with the
//! expected-and-found pair). The cursor stops at the final `Eof` token
//! and stays there.

use crate::error::TokenError;
use crate::token::{Token, TokenKind};

/// A tokenized source, positioned at the next unconsumed token.
///
/// # Example
///
/// ```
/// use ninec_lex::tokenize;
///
/// let mut tokens = tokenize("if x { }").unwrap();
/// assert!(tokens.consume("if"));
/// assert!(!tokens.consume("for"));
/// let x = tokens.consume_ident().unwrap();
/// assert_eq!(x.lexeme, "x");
/// tokens.expect("{").unwrap();
/// tokens.expect("}").unwrap();
/// assert!(tokens.at_eof());
/// ```
#[derive(Clone, Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    /// Wraps a token vector. The vector must end with an `Eof` token;
    /// [`tokenize`](crate::tokenize) guarantees this.
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(
            tokens.last(),
            Some(tok) if tok.kind == TokenKind::Eof
        ));
        Self {
            tokens,
            position: 0,
        }
    }

    /// The token under the cursor.
    pub fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    /// Returns true once only the `Eof` token remains.
    pub fn at_eof(&self) -> bool {
        self.current().at_eof()
    }

    /// Number of tokens not yet consumed, including the `Eof`.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    /// All tokens, regardless of cursor position.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Advances past the current token. Stops at `Eof`.
    pub fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Consumes the current token iff it is `Reserved` with lexeme
    /// `op`. Returns whether it did.
    pub fn consume(&mut self, op: &str) -> bool {
        if self.current().is_reserved(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Like [`consume`](Self::consume) but never advances.
    pub fn peek(&self, op: &str) -> bool {
        self.current().is_reserved(op)
    }

    /// Consumes the current token iff it is an identifier, returning
    /// it.
    pub fn consume_ident(&mut self) -> Option<Token> {
        if self.current().kind == TokenKind::Ident {
            let tok = *self.current();
            self.advance();
            Some(tok)
        } else {
            None
        }
    }

    /// Consumes a `Reserved` token with lexeme `op`, or fails with the
    /// expected-and-found pair.
    pub fn expect(&mut self, op: &'static str) -> Result<(), TokenError> {
        if self.consume(op) {
            Ok(())
        } else {
            Err(TokenError::Expected {
                expected: op,
                found: self.current().lexeme,
                span: self.current().span,
            })
        }
    }

    /// Consumes a number literal, returning its value.
    pub fn expect_number(&mut self) -> Result<i64, TokenError> {
        if self.current().kind == TokenKind::Num {
            let value = self.current().value;
            self.advance();
            Ok(value)
        } else {
            Err(TokenError::ExpectedNumber {
                found: self.current().lexeme,
                span: self.current().span,
            })
        }
    }

    /// Consumes an identifier, returning its token.
    pub fn expect_ident(&mut self) -> Result<Token, TokenError> {
        self.consume_ident().ok_or_else(|| TokenError::ExpectedIdent {
            found: self.current().lexeme,
            span: self.current().span,
        })
    }
}
