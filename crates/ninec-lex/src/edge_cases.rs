//! Edge case tests for ninec-lex

#[cfg(test)]
mod tests {
    use crate::{tokenize, LexError, TokenKind, KEYWORDS};

    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .tokens()
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_single_char_ident() {
        let tokens = tokenize("x").unwrap();
        assert_eq!(tokens.tokens()[0].kind, TokenKind::Ident);
        assert_eq!(tokens.tokens()[0].lexeme, "x");
    }

    #[test]
    fn test_edge_long_identifier() {
        let name = "a".repeat(10000);
        let tokens = tokenize(&name).unwrap();
        assert_eq!(tokens.tokens()[0].lexeme.as_str(), name);
    }

    #[test]
    fn test_edge_all_keywords() {
        for kw in KEYWORDS {
            let tokens = tokenize(kw).unwrap();
            assert_eq!(tokens.tokens()[0].kind, TokenKind::Reserved, "{}", kw);
            assert_eq!(tokens.tokens()[0].lexeme, *kw);
        }
    }

    #[test]
    fn test_edge_adjacent_punctuators() {
        // `<` then `=` separated by a space must not fuse into `<=`.
        let tokens = tokenize("< =").unwrap();
        assert_eq!(tokens.tokens()[0].lexeme, "<");
        assert_eq!(tokens.tokens()[1].lexeme, "=");
    }

    #[test]
    fn test_edge_dense_program() {
        assert_eq!(
            lex_kinds("func f(a int)int{return a}"),
            vec![
                TokenKind::Reserved, // func
                TokenKind::Ident,    // f
                TokenKind::Reserved, // (
                TokenKind::Ident,    // a
                TokenKind::Reserved, // int
                TokenKind::Reserved, // )
                TokenKind::Reserved, // int
                TokenKind::Reserved, // {
                TokenKind::Reserved, // return
                TokenKind::Ident,    // a
                TokenKind::Reserved, // }
                TokenKind::Eof,
            ],
        );
    }

    #[test]
    fn test_edge_string_with_punctuation_inside() {
        let tokens = tokenize("\"a+b := c\"").unwrap();
        assert_eq!(tokens.tokens()[0].kind, TokenKind::Str);
        assert_eq!(tokens.tokens()[0].lexeme, "a+b := c");
        assert_eq!(tokens.tokens()[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_edge_number_then_ident_split() {
        // A digit run ends where the first non-digit begins.
        let tokens = tokenize("12ab").unwrap();
        assert_eq!(tokens.tokens()[0].kind, TokenKind::Num);
        assert_eq!(tokens.tokens()[0].value, 12);
        assert_eq!(tokens.tokens()[1].kind, TokenKind::Ident);
        assert_eq!(tokens.tokens()[1].lexeme, "ab");
    }

    #[test]
    fn test_edge_non_ascii_rejected() {
        assert!(matches!(
            tokenize("λ"),
            Err(LexError::UnexpectedChar { .. })
        ));
    }

    // ------------------------------------------------------------------------
    // PROPERTY-BASED TESTS - Using proptest for arbitrary inputs
    // ------------------------------------------------------------------------

    #[test]
    fn test_property_arbitrary_identifiers() {
        use proptest::prelude::*;

        proptest!(|(input in "[a-zA-Z_][a-zA-Z0-9_]{0,64}")| {
            let tokens = tokenize(&input).unwrap();
            prop_assert_eq!(tokens.tokens().len(), 2);
            let tok = tokens.tokens()[0];
            if KEYWORDS.contains(&tok.lexeme.as_str()) {
                prop_assert_eq!(tok.kind, TokenKind::Reserved);
            } else {
                prop_assert_eq!(tok.kind, TokenKind::Ident);
            }
            prop_assert_eq!(tok.lexeme.as_str(), input.as_str());
        });
    }

    #[test]
    fn test_property_arbitrary_numbers() {
        use proptest::prelude::*;

        proptest!(|(value in 0i64..=i64::MAX)| {
            let input = value.to_string();
            let tokens = tokenize(&input).unwrap();
            prop_assert_eq!(tokens.tokens().len(), 2);
            prop_assert_eq!(tokens.tokens()[0].value, value);
        });
    }

    #[test]
    fn test_property_single_trailing_eof() {
        use proptest::prelude::*;

        proptest!(|(input in "[a-z0-9+*() \n\t]{0,200}")| {
            if let Ok(tokens) = tokenize(&input) {
                let eofs = tokens
                    .tokens()
                    .iter()
                    .filter(|t| t.kind == TokenKind::Eof)
                    .count();
                prop_assert_eq!(eofs, 1);
                prop_assert!(tokens.tokens().last().unwrap().at_eof());
            }
        });
    }

    #[test]
    fn test_property_lexeme_roundtrip() {
        use proptest::prelude::*;

        // Rejoining lexemes with single spaces must tokenize to the
        // same stream: the lexemes capture everything but whitespace.
        proptest!(|(input in "[a-z0-9+\\-*/=<>;{}(),&\\[\\] ]{0,120}")| {
            if let Ok(tokens) = tokenize(&input) {
                let rejoined: String = tokens
                    .tokens()
                    .iter()
                    .filter(|t| !t.at_eof())
                    .map(|t| t.lexeme.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let relexed = tokenize(&rejoined).unwrap();
                let a: Vec<_> = tokens.tokens().iter().map(|t| (t.kind, t.lexeme)).collect();
                let b: Vec<_> = relexed.tokens().iter().map(|t| (t.kind, t.lexeme)).collect();
                prop_assert_eq!(a, b);
            }
        });
    }
}
