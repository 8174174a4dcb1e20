//! classc-lex - Lexical analysis.
//!
//! ============================================================================
//! WHAT THIS STAGE OWNS
//! ============================================================================
//!
//! The lexer's only job is turning source text into a flat stream of
//! [`Token`]s. It does not know what a class is, what a valid statement
//! looks like, or what `new Foo()` means — all of that belongs to later
//! stages. What it does guarantee:
//!
//! - every token carries the (line, column) of its *first* character, using
//!   the language's own convention (1-based line, 0-based column — see
//!   [`cursor`]);
//! - the stream always ends with exactly one `Eof` token, whose position is
//!   the sentinel `(-1, -1)`;
//! - malformed input (an unterminated string, a lone `&`) never aborts
//!   lexing — it produces an `Invalid` token and scanning continues from
//!   there, with the problem also recorded on the supplied
//!   `classc_util::Handler`.
//!
//! `// comment` lines and whitespace are consumed silently and never reach
//! the token stream at all.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};

use classc_util::Handler;

/// Convenience entry point: lexes `source` start to finish with a fresh
/// handler, returning the token stream together with whatever diagnostics
/// were raised along the way.
pub fn lex(source: &str) -> (Vec<Token>, Handler) {
    let mut handler = Handler::new();
    let tokens = Lexer::new(source, &mut handler).tokenize();
    (tokens, handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, _) = lex(source);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![Eof]);
    }

    #[test]
    fn eof_position_is_sentinel() {
        let (tokens, _) = lex("let x;");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, Eof);
        assert_eq!(eof.line(), -1);
        assert_eq!(eof.column(), -1);
    }

    #[test]
    fn keywords_vs_identifiers() {
        assert_eq!(kinds("class fn let int classify"), vec![
            KwClass, KwFn, KwLet, KwInt, Ident, Eof
        ]);
    }

    #[test]
    fn int_and_float_literals() {
        let (tokens, _) = lex("42 3.14");
        assert_eq!(tokens[0].kind, IntLit);
        assert_eq!(tokens[0].text, "42");
        assert_eq!(tokens[1].kind, FloatLit);
        assert_eq!(tokens[1].text, "3.14");
    }

    #[test]
    fn compound_assignment_operators() {
        assert_eq!(
            kinds("+= -= *= /= %="),
            vec![PlusEq, MinusEq, StarEq, SlashEq, PercentEq, Eof]
        );
    }

    #[test]
    fn distinguishes_andand_from_oror() {
        assert_eq!(kinds("&& ||"), vec![AndAnd, OrOr, Eof]);
    }

    #[test]
    fn lone_ampersand_is_invalid() {
        assert_eq!(kinds("&"), vec![Invalid, Eof]);
        let (_, handler) = lex("&");
        assert!(handler.has_errors());
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(kinds("let x; // trailing comment\nlet y;"), vec![
            KwLet, Ident, Semicolon, KwLet, Ident, Semicolon, Eof
        ]);
    }

    #[test]
    fn string_literal_preserves_quotes_and_escapes() {
        let (tokens, _) = lex(r#""hi\n""#);
        assert_eq!(tokens[0].kind, StringLit);
        assert_eq!(tokens[0].text, r#""hi\n""#);
    }

    #[test]
    fn unterminated_string_is_invalid() {
        let (tokens, handler) = lex("\"no closing quote");
        assert_eq!(tokens[0].kind, Invalid);
        assert!(handler.has_errors());
    }

    #[test]
    fn char_literal_with_escape() {
        let (tokens, _) = lex(r"'\n'");
        assert_eq!(tokens[0].kind, CharLit);
        assert_eq!(tokens[0].text, r"'\n'");
    }

    #[test]
    fn column_is_zero_based_and_resets_on_newline() {
        let (tokens, _) = lex("ab\ncd");
        // 'a' at line 1, column 0; 'c' at line 2, column 0
        assert_eq!(tokens[0].line(), 1);
        assert_eq!(tokens[0].column(), 0);
        assert_eq!(tokens[1].line(), 2);
        assert_eq!(tokens[1].column(), 0);
    }

    #[test]
    fn lexing_always_terminates_with_single_eof() {
        let sources = ["", "class A {}", "&|\"unterminated", "1 + 2 * 3"];
        for src in sources {
            let (tokens, _) = lex(src);
            let eof_count = tokens.iter().filter(|t| t.kind == Eof).count();
            assert_eq!(eof_count, 1, "source {src:?} did not end in exactly one EOF");
            assert_eq!(tokens.last().unwrap().kind, Eof);
        }
    }
}
