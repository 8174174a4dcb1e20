//! Parser core: token management, `program`/`class_decl`/`function_decl`,
//! and panic-mode error recovery. Expression and statement grammar live in
//! [`crate::expr`] and [`crate::stmt`] as additional `impl Parser` blocks.

use classc_util::{Handler, Span};

use classc_lex::{Token, TokenKind};

use crate::ast::{ClassDecl, FieldDecl, FunctionDecl, Item, Param, Program, Type};

/// A parse error, caught at a declaration boundary and turned into a
/// diagnostic on the handler before `synchronize` resumes scanning.
pub(crate) struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Single-token-lookahead recursive descent parser.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) handler: &'a mut Handler,
}

/// Keywords that start a declaration or statement; `synchronize` discards
/// tokens until it sees one of these (or EOF).
const SYNC_KEYWORDS: &[TokenKind] = &[
    TokenKind::KwClass,
    TokenKind::KwFn,
    TokenKind::KwLet,
    TokenKind::KwIf,
    TokenKind::KwWhile,
    TokenKind::KwFor,
    TokenKind::KwReturn,
];

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, handler: &'a mut Handler) -> Self {
        Self {
            tokens,
            pos: 0,
            handler,
        }
    }

    /// Parses the whole program. Always returns a (possibly partial) AST,
    /// even when errors were recorded — downstream stages are the ones
    /// that decide whether to run on it.
    pub fn parse(mut self) -> Program {
        let mut items = Vec::new();
        while !self.at_eof() {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.handler.error(e.message, e.span);
                    self.synchronize();
                }
            }
        }
        Program { items }
    }

    fn parse_item(&mut self) -> PResult<Item> {
        match self.current().kind {
            TokenKind::KwClass => self.parse_class_decl().map(Item::Class),
            TokenKind::KwFn => self.parse_function_decl().map(Item::Function),
            _ => Err(self.error_here("expected a class or function declaration")),
        }
    }

    fn parse_class_decl(&mut self) -> PResult<ClassDecl> {
        let start = self.current().span;
        self.expect(TokenKind::KwClass, "expected 'class'")?;
        let name = self.expect_ident("expected class name")?;
        let base = if self.match_token(TokenKind::Colon) {
            Some(self.expect_ident("expected base class name after ':'")?)
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "expected '{' to start class body")?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            let starts_function = self.check(TokenKind::KwFn)
                || (self.check(TokenKind::Hash) && self.peek_next().kind == TokenKind::KwFn);
            let member = if starts_function {
                self.parse_function_decl().map(Member::Method)
            } else {
                self.parse_field_decl().map(Member::Field)
            };
            match member {
                Ok(Member::Method(m)) => methods.push(m),
                Ok(Member::Field(f)) => fields.push(f),
                Err(e) => {
                    self.handler.error(e.message, e.span);
                    self.synchronize_in_class();
                }
            }
        }
        self.expect(TokenKind::RBrace, "expected '}' to close class body")?;

        Ok(ClassDecl {
            name,
            base,
            fields,
            methods,
            span: start,
        })
    }

    fn parse_field_decl(&mut self) -> PResult<FieldDecl> {
        let start = self.current().span;
        let is_private = self.match_token(TokenKind::Hash);
        let name = self.expect_ident("expected field name")?;
        self.expect(TokenKind::Colon, "expected ':' before field type")?;
        let ty = self.parse_type()?;
        self.match_token(TokenKind::Semicolon);
        Ok(FieldDecl {
            name,
            ty,
            is_private,
            span: start,
        })
    }

    pub(crate) fn parse_function_decl(&mut self) -> PResult<FunctionDecl> {
        let start = self.current().span;
        self.expect(TokenKind::KwFn, "expected 'fn'")?;
        let is_private = self.match_token(TokenKind::Hash);
        let is_override = self.match_token(TokenKind::Bang);
        let name = self.expect_ident("expected function name")?;

        self.expect(TokenKind::LParen, "expected '(' after function name")?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "expected ')' after parameters")?;

        let ret_type = if self.match_token(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if self.check(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            self.match_token(TokenKind::Semicolon);
            None
        };

        Ok(FunctionDecl {
            name,
            params,
            ret_type,
            body,
            is_private,
            is_override,
            span: start,
        })
    }

    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let start = self.current().span;
            let name = self.expect_ident("expected parameter name")?;
            self.expect(TokenKind::Colon, "expected ':' before parameter type")?;
            let ty = self.parse_type()?;
            params.push(Param {
                name,
                ty,
                span: start,
            });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    pub(crate) fn parse_type(&mut self) -> PResult<Type> {
        let start = self.current().span;
        let name = if self.current().kind.is_primitive_type() {
            self.advance().text
        } else {
            self.expect_ident("expected a type name")?
        };
        let is_array = if self.match_token(TokenKind::LBracket) {
            self.expect(TokenKind::RBracket, "expected ']' after '[' in array type")?;
            true
        } else {
            false
        };
        Ok(Type::new(name, is_array, start))
    }

    /// Discards tokens until a declaration-starter keyword or EOF.
    fn synchronize(&mut self) {
        while !self.at_eof() && !SYNC_KEYWORDS.contains(&self.current().kind) {
            self.advance();
        }
    }

    /// Same idea, but also stops at `}` so a bad member doesn't eat the
    /// rest of the file when it's inside a class body.
    fn synchronize_in_class(&mut self) {
        while !self.at_eof()
            && !SYNC_KEYWORDS.contains(&self.current().kind)
            && !self.check(TokenKind::RBrace)
        {
            self.advance();
        }
    }

    // -- token plumbing -----------------------------------------------

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn peek_next(&self) -> &Token {
        self.tokens
            .get(self.pos + 1)
            .unwrap_or_else(|| self.tokens.last().unwrap())
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(message))
        }
    }

    pub(crate) fn expect_ident(&mut self, message: &str) -> PResult<String> {
        if self.check(TokenKind::Ident) {
            Ok(self.advance().text)
        } else {
            Err(self.error_here(message))
        }
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current().span)
    }
}

enum Member {
    Field(FieldDecl),
    Method(FunctionDecl),
}
