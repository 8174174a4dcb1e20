//! Expression grammar, precedence-climbing lowest to highest:
//! `||`, `&&`, `== !=`, `< <= > >=`, `+ -`, `* / %`, unary `- !`, then
//! postfix `.member` / `(args)` / `[index]`, then primary. Every binary
//! level is left-associative; unary recurses into itself, making it
//! right-associative (`--x` parses as `-(-x)`).

use classc_lex::TokenKind;
use classc_util::Span;

use crate::ast::{BinOp, Expr, UnOp};
use crate::parser::{PResult, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::OrOr) {
            let span = self.current().span;
            self.advance();
            let right = self.parse_and()?;
            left = binary(BinOp::Or, left, right, span);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::AndAnd) {
            let span = self.current().span;
            self.advance();
            let right = self.parse_equality()?;
            left = binary(BinOp::And, left, right, span);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.current().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                _ => break,
            };
            let span = self.current().span;
            self.advance();
            let right = self.parse_relational()?;
            left = binary(op, left, right, span);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::Ge,
                _ => break,
            };
            let span = self.current().span;
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right, span);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = self.current().span;
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right, span);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let span = self.current().span;
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right, span);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.current().kind {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Bang => UnOp::Not,
            _ => return self.parse_postfix(),
        };
        let span = self.current().span;
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary(crate::ast::UnaryExpr {
            op,
            operand: Box::new(operand),
            span,
        }))
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.match_token(TokenKind::Dot) {
                let span = expr.span();
                let private = self.match_token(TokenKind::Hash);
                let member = self.expect_ident("expected member name after '.'")?;
                if self.check(TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    self.expect(TokenKind::RParen, "expected ')' after call arguments")?;
                    let callee = Expr::Member(crate::ast::MemberExpr {
                        receiver: Box::new(expr),
                        member,
                        private,
                        span,
                    });
                    expr = Expr::Call(crate::ast::CallExpr {
                        callee: Box::new(callee),
                        args,
                        span,
                    });
                } else {
                    expr = Expr::Member(crate::ast::MemberExpr {
                        receiver: Box::new(expr),
                        member,
                        private,
                        span,
                    });
                }
            } else if self.check(TokenKind::LParen) {
                let span = expr.span();
                self.advance();
                let args = self.parse_args()?;
                self.expect(TokenKind::RParen, "expected ')' after call arguments")?;
                expr = Expr::Call(crate::ast::CallExpr {
                    callee: Box::new(expr),
                    args,
                    span,
                });
            } else if self.match_token(TokenKind::LBracket) {
                let span = expr.span();
                let index = self.parse_expr()?;
                self.expect(TokenKind::RBracket, "expected ']' after index expression")?;
                expr = Expr::Index(crate::ast::IndexExpr {
                    array: Box::new(expr),
                    index: Box::new(index),
                    span,
                });
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::IntLit => {
                self.advance();
                Ok(Expr::Int(lit(tok)))
            }
            TokenKind::FloatLit => {
                self.advance();
                Ok(Expr::Float(lit(tok)))
            }
            TokenKind::StringLit => {
                self.advance();
                Ok(Expr::Str(lit(tok)))
            }
            TokenKind::CharLit => {
                self.advance();
                Ok(Expr::Char(lit(tok)))
            }
            TokenKind::KwTrue | TokenKind::KwFalse => {
                self.advance();
                Ok(Expr::Bool(crate::ast::BoolExpr {
                    value: tok.kind == TokenKind::KwTrue,
                    span: tok.span,
                }))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(Expr::Ident(crate::ast::IdentExpr {
                    name: tok.text,
                    span: tok.span,
                }))
            }
            TokenKind::KwNew => self.parse_new(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "expected ')' after parenthesized expression")?;
                Ok(inner)
            }
            _ => Err(self.error_here("expected an expression")),
        }
    }

    fn parse_new(&mut self) -> PResult<Expr> {
        let span = self.current().span;
        self.expect(TokenKind::KwNew, "expected 'new'")?;
        let class_name = self.expect_ident("expected class name after 'new'")?;
        self.expect(TokenKind::LParen, "expected '(' after class name")?;
        let args = self.parse_args()?;
        self.expect(TokenKind::RParen, "expected ')' after constructor arguments")?;
        Ok(Expr::New(crate::ast::NewExpr {
            class_name,
            args,
            span,
        }))
    }
}

fn lit(tok: classc_lex::Token) -> crate::ast::LitExpr {
    crate::ast::LitExpr {
        value: tok.text,
        span: tok.span,
    }
}

fn binary(op: BinOp, left: Expr, right: Expr, span: Span) -> Expr {
    Expr::Binary(crate::ast::BinaryExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    })
}
