//! The tokenizer.
//!
//! A single left-to-right scan over the source bytes. Each iteration
//! skips whitespace and then tries the token classes in a fixed
//! priority order; the first match wins. Keywords are tried before
//! identifiers but only match at an identifier boundary.

use ninec_util::{Span, Symbol};

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind, KEYWORDS};

/// Two-character punctuators, tried in this order before any
/// single-character punctuator.
const PUNCT2: &[&str] = &["==", "!=", "<=", ">=", "++", "--", ":="];

/// The single-character punctuator set.
const PUNCT1: &str = "+-*/()<>;={},&[]";

/// Tokenizes a source string.
///
/// Returns the token stream, which always ends with exactly one `Eof`
/// token, or the first lexical error.
///
/// # Example
///
/// ```
/// use ninec_lex::tokenize;
///
/// let tokens = tokenize("return 42").unwrap();
/// assert_eq!(tokens.remaining(), 3); // `return`, `42`, Eof
/// ```
pub fn tokenize(source: &str) -> Result<TokenStream, LexError> {
    Lexer::new(source).run()
}

/// Lexer state: a cursor plus the tokens produced so far.
struct Lexer<'a> {
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<TokenStream, LexError> {
        while let Some(b) = self.skip_whitespace() {
            if b == b'"' {
                self.lex_string()?;
                continue;
            }

            if let Some(op) = PUNCT2.iter().copied().find(|op| self.cursor.starts_with(op)) {
                self.push_reserved(op);
                continue;
            }

            if PUNCT1.contains(b as char) {
                let op = self.cursor.slice(self.cursor.position(), self.cursor.position() + 1);
                self.push_reserved(op);
                continue;
            }

            if b.is_ascii_digit() {
                self.lex_number()?;
                continue;
            }

            if let Some(kw) = self.match_keyword() {
                self.push_reserved(kw);
                continue;
            }

            if is_ident_start(b) {
                self.lex_identifier();
                continue;
            }

            return Err(LexError::UnexpectedChar {
                found: b as char,
                span: self.point_span(),
            });
        }

        let end = self.point_span();
        self.tokens
            .push(Token::new(TokenKind::Eof, Symbol::intern(""), end));
        Ok(TokenStream::new(self.tokens))
    }

    /// Skips ASCII whitespace and returns the byte now under the
    /// cursor, or `None` at end of input.
    fn skip_whitespace(&mut self) -> Option<u8> {
        while let Some(b) = self.cursor.current_byte() {
            if matches!(b, b'\t' | b'\n' | 0x0b | 0x0c | b'\r' | b' ') {
                self.cursor.advance();
            } else {
                return Some(b);
            }
        }
        None
    }

    /// Scans a string literal. The emitted lexeme is the content
    /// between the quotes, exclusive.
    fn lex_string(&mut self) -> Result<(), LexError> {
        let open = self.point_span();
        self.cursor.advance(); // opening quote

        let start = self.cursor.position();
        loop {
            match self.cursor.current_byte() {
                Some(b'"') => break,
                Some(_) => self.cursor.advance(),
                None => return Err(LexError::UnterminatedString { span: open }),
            }
        }

        let content = self.cursor.slice(start, self.cursor.position());
        self.cursor.advance(); // closing quote

        let span = Span::new(open.start, self.cursor.position(), open.line, open.column);
        self.tokens
            .push(Token::new(TokenKind::Str, Symbol::intern(content), span));
        Ok(())
    }

    /// Scans the maximal run of decimal digits.
    fn lex_number(&mut self) -> Result<(), LexError> {
        let start = self.cursor.position();
        let (line, column) = (self.cursor.line(), self.cursor.column());

        while matches!(self.cursor.current_byte(), Some(b) if b.is_ascii_digit()) {
            self.cursor.advance();
        }

        let lexeme = self.cursor.slice(start, self.cursor.position());
        let span = Span::new(start, self.cursor.position(), line, column);
        let value: i64 = lexeme.parse().map_err(|_| LexError::InvalidNumber {
            lexeme: Symbol::intern(lexeme),
            span,
        })?;

        self.tokens
            .push(Token::number(Symbol::intern(lexeme), value, span));
        Ok(())
    }

    /// Returns the keyword starting at the cursor, if any.
    ///
    /// A keyword only matches when the byte after it cannot continue
    /// an identifier, so `forty` lexes as an identifier.
    fn match_keyword(&self) -> Option<&'static str> {
        KEYWORDS.iter().copied().find(|kw| {
            self.cursor.starts_with(kw)
                && match self.cursor.peek_byte(kw.len()) {
                    Some(b) => !is_ident_continue(b),
                    None => true,
                }
        })
    }

    /// Scans an identifier: `[A-Za-z_][A-Za-z_0-9]*`.
    fn lex_identifier(&mut self) {
        let start = self.cursor.position();
        let (line, column) = (self.cursor.line(), self.cursor.column());

        while matches!(self.cursor.current_byte(), Some(b) if is_ident_continue(b)) {
            self.cursor.advance();
        }

        let lexeme = self.cursor.slice(start, self.cursor.position());
        let span = Span::new(start, self.cursor.position(), line, column);
        self.tokens
            .push(Token::new(TokenKind::Ident, Symbol::intern(lexeme), span));
    }

    /// Emits a `Reserved` token for `op` and advances past it.
    fn push_reserved(&mut self, op: &str) {
        let span = Span::new(
            self.cursor.position(),
            self.cursor.position() + op.len(),
            self.cursor.line(),
            self.cursor.column(),
        );
        self.tokens
            .push(Token::new(TokenKind::Reserved, Symbol::intern(op), span));
        self.cursor.advance_by(op.len());
    }

    /// A zero-width span at the cursor.
    fn point_span(&self) -> Span {
        Span::point(self.cursor.position(), self.cursor.line(), self.cursor.column())
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().tokens().iter().map(|t| t.kind).collect()
    }

    fn lexemes(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .tokens()
            .iter()
            .map(|t| t.lexeme.as_str().to_owned())
            .collect()
    }

    #[test]
    fn empty_input_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds(" \t\n\r"), vec![TokenKind::Eof]);
    }

    #[test]
    fn numbers_carry_their_value() {
        let tokens = tokenize(" 1 ").unwrap();
        let tok = tokens.tokens()[0];
        assert_eq!(tok.kind, TokenKind::Num);
        assert_eq!(tok.value, 1);
        assert_eq!(tok.lexeme, "1");
    }

    #[test]
    fn expression_token_sequence() {
        assert_eq!(
            lexemes("0 + 45 - 5"),
            vec!["0", "+", "45", "-", "5", ""],
        );
    }

    #[test]
    fn two_char_punctuators_win_over_single() {
        assert_eq!(lexemes("a==b"), vec!["a", "==", "b", ""]);
        assert_eq!(lexemes("a=b"), vec!["a", "=", "b", ""]);
        assert_eq!(lexemes("i++"), vec!["i", "++", ""]);
        assert_eq!(lexemes("x:=1"), vec!["x", ":=", "1", ""]);
    }

    #[test]
    fn keywords_require_a_boundary() {
        let tokens = tokenize("returned").unwrap();
        assert_eq!(tokens.tokens()[0].kind, TokenKind::Ident);
        assert_eq!(tokens.tokens()[0].lexeme, "returned");

        let tokens = tokenize("return1").unwrap();
        assert_eq!(tokens.tokens()[0].kind, TokenKind::Ident);

        let tokens = tokenize("return 1").unwrap();
        assert_eq!(tokens.tokens()[0].kind, TokenKind::Reserved);
        assert_eq!(tokens.tokens()[0].lexeme, "return");
    }

    #[test]
    fn keyword_at_end_of_input_matches() {
        let tokens = tokenize("return").unwrap();
        assert_eq!(tokens.tokens()[0].kind, TokenKind::Reserved);
    }

    #[test]
    fn identifiers_may_contain_digits() {
        assert_eq!(lexemes("x1 _tmp a_b2"), vec!["x1", "_tmp", "a_b2", ""]);
    }

    #[test]
    fn string_literal_lexeme_excludes_quotes() {
        let tokens = tokenize("\"hi\"").unwrap();
        let tok = tokens.tokens()[0];
        assert_eq!(tok.kind, TokenKind::Str);
        assert_eq!(tok.lexeme, "hi");
    }

    #[test]
    fn empty_string_literal() {
        let tokens = tokenize("\"\"").unwrap();
        assert_eq!(tokens.tokens()[0].kind, TokenKind::Str);
        assert!(tokens.tokens()[0].is_empty());
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(matches!(
            tokenize("\"oops"),
            Err(LexError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn unknown_byte_is_an_error() {
        match tokenize("a @ b") {
            Err(LexError::UnexpectedChar { found, span }) => {
                assert_eq!(found, '@');
                assert_eq!((span.line, span.column), (1, 3));
            }
            other => panic!("expected UnexpectedChar, got {:?}", other),
        }
    }

    #[test]
    fn overflowing_number_is_an_error() {
        assert!(matches!(
            tokenize("99999999999999999999"),
            Err(LexError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn stream_ends_with_exactly_one_eof() {
        let tokens = tokenize("func main() { return 0 }").unwrap();
        let eofs = tokens
            .tokens()
            .iter()
            .filter(|t| t.kind == TokenKind::Eof)
            .count();
        assert_eq!(eofs, 1);
        assert!(tokens.tokens().last().unwrap().at_eof());
    }

    #[test]
    fn spans_point_into_the_source() {
        let source = "x = 10";
        let tokens = tokenize(source).unwrap();
        for tok in tokens.tokens().iter().filter(|t| !t.at_eof()) {
            assert_eq!(&source[tok.span.start..tok.span.end], tok.lexeme.as_str());
        }
    }
}
