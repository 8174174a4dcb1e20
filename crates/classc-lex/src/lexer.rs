//! The lexer: source text in, positioned tokens out.
//!
//! `Lexer` is a character-at-a-time scanner. It never backtracks more than
//! one character of lookahead, and it never stops at the first problem: an
//! unterminated string or a stray `&` becomes an [`TokenKind::Invalid`]
//! token (with whatever partial text was consumed) and scanning resumes
//! from there. The `classc-drv` facade is what decides that any invalid
//! token fails the compilation; this crate's job is only to describe what
//! it saw.

use classc_util::{Handler, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    handler: &'a mut Handler,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, handler: &'a mut Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
        }
    }

    /// Lexes the entire input and returns the token stream, always ending
    /// in exactly one `Eof` token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        if self.cursor.is_at_end() {
            return Token::eof(Span::new(-1, -1));
        }

        let start = Span::new(self.cursor.line(), self.cursor.column());
        let c = self.cursor.current();

        match c {
            c if c.is_ascii_alphabetic() => self.lex_identifier(start),
            c if c.is_ascii_digit() => self.lex_number(start),
            '"' => self.lex_string(start),
            '\'' => self.lex_char(start),
            '+' => self.lex_compound(start, '+', TokenKind::Plus, TokenKind::PlusEq),
            '-' => self.lex_compound(start, '-', TokenKind::Minus, TokenKind::MinusEq),
            '*' => self.lex_compound(start, '*', TokenKind::Star, TokenKind::StarEq),
            '/' => self.lex_slash(start),
            '%' => self.lex_compound(start, '%', TokenKind::Percent, TokenKind::PercentEq),
            '=' => self.lex_compound(start, '=', TokenKind::Assign, TokenKind::EqEq),
            '<' => self.lex_compound(start, '<', TokenKind::Lt, TokenKind::LtEq),
            '>' => self.lex_compound(start, '>', TokenKind::Gt, TokenKind::GtEq),
            '!' => self.lex_compound(start, '!', TokenKind::Bang, TokenKind::NotEq),
            '&' => self.lex_doubled(start, '&', TokenKind::AndAnd),
            '|' => self.lex_doubled(start, '|', TokenKind::OrOr),
            '{' => self.single(start, TokenKind::LBrace),
            '}' => self.single(start, TokenKind::RBrace),
            '[' => self.single(start, TokenKind::LBracket),
            ']' => self.single(start, TokenKind::RBracket),
            '(' => self.single(start, TokenKind::LParen),
            ')' => self.single(start, TokenKind::RParen),
            ';' => self.single(start, TokenKind::Semicolon),
            ':' => self.single(start, TokenKind::Colon),
            ',' => self.single(start, TokenKind::Comma),
            '.' => self.single(start, TokenKind::Dot),
            '#' => self.single(start, TokenKind::Hash),
            other => {
                self.cursor.advance();
                self.invalid(start, other.to_string())
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek(1) == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn single(&mut self, start: Span, kind: TokenKind) -> Token {
        let c = self.cursor.advance();
        Token::new(kind, c.to_string(), start)
    }

    /// Lexes an operator that extends to a compound form when followed by
    /// `=` (`+` / `+=`, `<` / `<=`, `!` / `!=`, and so on).
    fn lex_compound(
        &mut self,
        start: Span,
        base: char,
        plain: TokenKind,
        with_eq: TokenKind,
    ) -> Token {
        self.cursor.advance();
        if self.cursor.eat('=') {
            Token::new(with_eq, format!("{base}="), start)
        } else {
            Token::new(plain, base.to_string(), start)
        }
    }

    /// Lexes `&&` / `||`: the character must be immediately doubled, else
    /// the token is invalid.
    fn lex_doubled(&mut self, start: Span, c: char, kind: TokenKind) -> Token {
        self.cursor.advance();
        if self.cursor.eat(c) {
            Token::new(kind, format!("{c}{c}"), start)
        } else {
            self.invalid(start, c.to_string())
        }
    }

    fn lex_slash(&mut self, start: Span) -> Token {
        // A line comment is consumed by `skip_whitespace_and_comments`
        // before `next_token` ever reaches here with a lone `/` that is
        // followed by another `/`, so this only ever sees `/` or `/=`.
        self.lex_compound(start, '/', TokenKind::Slash, TokenKind::SlashEq)
    }

    fn lex_identifier(&mut self, start: Span) -> Token {
        let mut text = String::new();
        while self.cursor.current().is_ascii_alphanumeric() {
            text.push(self.cursor.advance());
        }
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Ident);
        Token::new(kind, text, start)
    }

    fn lex_number(&mut self, start: Span) -> Token {
        let mut text = String::new();
        while self.cursor.current().is_ascii_digit() {
            text.push(self.cursor.advance());
        }
        let mut is_float = false;
        if self.cursor.current() == '.' && self.cursor.peek(1).is_ascii_digit() {
            is_float = true;
            text.push(self.cursor.advance()); // '.'
            while self.cursor.current().is_ascii_digit() {
                text.push(self.cursor.advance());
            }
        }
        let kind = if is_float {
            TokenKind::FloatLit
        } else {
            TokenKind::IntLit
        };
        Token::new(kind, text, start)
    }

    fn lex_string(&mut self, start: Span) -> Token {
        let mut text = String::new();
        text.push(self.cursor.advance()); // opening quote
        loop {
            if self.cursor.is_at_end() || self.cursor.current() == '\n' {
                return self.invalid(start, text);
            }
            if self.cursor.current() == '"' {
                text.push(self.cursor.advance());
                return Token::new(TokenKind::StringLit, text, start);
            }
            if self.cursor.current() == '\\' {
                text.push(self.cursor.advance());
                if self.cursor.is_at_end() || self.cursor.current() == '\n' {
                    return self.invalid(start, text);
                }
                text.push(self.cursor.advance());
                continue;
            }
            text.push(self.cursor.advance());
        }
    }

    fn lex_char(&mut self, start: Span) -> Token {
        let mut text = String::new();
        text.push(self.cursor.advance()); // opening quote

        if self.cursor.is_at_end() || self.cursor.current() == '\n' {
            return self.invalid(start, text);
        }
        if self.cursor.current() == '\\' {
            text.push(self.cursor.advance());
            if self.cursor.is_at_end() || self.cursor.current() == '\n' {
                return self.invalid(start, text);
            }
            text.push(self.cursor.advance());
        } else if self.cursor.current() == '\'' {
            // empty char literal: no character before the closing quote
            return self.invalid(start, text);
        } else {
            text.push(self.cursor.advance());
        }

        if self.cursor.current() == '\'' {
            text.push(self.cursor.advance());
            Token::new(TokenKind::CharLit, text, start)
        } else {
            self.invalid(start, text)
        }
    }

    fn invalid(&mut self, start: Span, text: String) -> Token {
        self.handler
            .error(format!("invalid token '{text}'"), start);
        Token::new(TokenKind::Invalid, text, start)
    }
}
