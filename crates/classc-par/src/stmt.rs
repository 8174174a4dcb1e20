//! Statement grammar: `var_decl`, `if`, `while`, `for`, `return`,
//! `break`/`continue`, nested blocks, and the expression-or-assignment
//! fallback. Trailing semicolons are optional everywhere except inside a
//! `for` header, where they separate init/condition/update.

use classc_lex::TokenKind;

use crate::ast::{
    AssignOp, AssignStmt, Block, ForStmt, IfStmt, ReturnStmt, Stmt, VarDeclStmt, WhileStmt,
};
use crate::parser::{PResult, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_block(&mut self) -> PResult<Block> {
        self.expect(TokenKind::LBrace, "expected '{'")?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            match self.parse_stmt() {
                Ok(s) => stmts.push(s),
                Err(e) => {
                    self.handler.error(e.message, e.span);
                    self.synchronize_in_block();
                }
            }
        }
        self.expect(TokenKind::RBrace, "expected '}' to close block")?;
        Ok(Block { stmts })
    }

    fn synchronize_in_block(&mut self) {
        const STOPS: &[TokenKind] = &[
            TokenKind::KwLet,
            TokenKind::KwIf,
            TokenKind::KwWhile,
            TokenKind::KwFor,
            TokenKind::KwReturn,
            TokenKind::KwBreak,
            TokenKind::KwContinue,
        ];
        while !self.at_eof() && !STOPS.contains(&self.current().kind) && !self.check(TokenKind::RBrace) {
            self.advance();
        }
    }

    pub(crate) fn parse_stmt(&mut self) -> PResult<Stmt> {
        match self.current().kind {
            TokenKind::KwLet => self.parse_var_decl_stmt(),
            TokenKind::KwIf => self.parse_if_stmt(),
            TokenKind::KwWhile => self.parse_while_stmt(),
            TokenKind::KwFor => self.parse_for_stmt(),
            TokenKind::KwReturn => self.parse_return_stmt(),
            TokenKind::KwBreak => {
                let span = self.current().span;
                self.advance();
                self.match_token(TokenKind::Semicolon);
                Ok(Stmt::Break(span))
            }
            TokenKind::KwContinue => {
                let span = self.current().span;
                self.advance();
                self.match_token(TokenKind::Semicolon);
                Ok(Stmt::Continue(span))
            }
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            _ => self.parse_expr_or_assign_stmt(),
        }
    }

    /// `var_decl` without consuming a trailing `;` — used for the `for`
    /// header where the separator is mandatory and parsed explicitly.
    fn parse_var_decl_inner(&mut self) -> PResult<VarDeclStmt> {
        let span = self.current().span;
        self.expect(TokenKind::KwLet, "expected 'let'")?;
        let name = self.expect_ident("expected variable name")?;
        let ty = if self.match_token(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.match_token(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(VarDeclStmt {
            name,
            ty,
            init,
            span,
        })
    }

    fn parse_var_decl_stmt(&mut self) -> PResult<Stmt> {
        let decl = self.parse_var_decl_inner()?;
        self.match_token(TokenKind::Semicolon);
        Ok(Stmt::VarDecl(decl))
    }

    fn parse_if_stmt(&mut self) -> PResult<Stmt> {
        let span = self.current().span;
        self.expect(TokenKind::KwIf, "expected 'if'")?;
        let cond = self.parse_expr()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.match_token(TokenKind::KwElse) {
            if self.check(TokenKind::KwIf) {
                Some(Box::new(self.parse_if_stmt()?))
            } else {
                Some(Box::new(Stmt::Block(self.parse_block()?)))
            }
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            cond,
            then_branch,
            else_branch,
            span,
        }))
    }

    fn parse_while_stmt(&mut self) -> PResult<Stmt> {
        let span = self.current().span;
        self.expect(TokenKind::KwWhile, "expected 'while'")?;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::While(WhileStmt { cond, body, span }))
    }

    fn parse_for_stmt(&mut self) -> PResult<Stmt> {
        let span = self.current().span;
        self.expect(TokenKind::KwFor, "expected 'for'")?;
        self.expect(TokenKind::LParen, "expected '(' after 'for'")?;

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::KwLet) {
            Some(Box::new(Stmt::VarDecl(self.parse_var_decl_inner()?)))
        } else {
            Some(Box::new(self.parse_expr_or_assign_inner()?))
        };
        self.expect(TokenKind::Semicolon, "expected ';' after for-loop init")?;

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "expected ';' after for-loop condition")?;

        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_expr_or_assign_inner()?))
        };
        self.expect(TokenKind::RParen, "expected ')' after for-loop update")?;

        let body = self.parse_block()?;
        Ok(Stmt::For(ForStmt {
            init,
            cond,
            update,
            body,
            span,
        }))
    }

    fn parse_return_stmt(&mut self) -> PResult<Stmt> {
        let span = self.current().span;
        self.expect(TokenKind::KwReturn, "expected 'return'")?;
        let value = if self.check(TokenKind::Semicolon) || self.check(TokenKind::RBrace) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.match_token(TokenKind::Semicolon);
        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    /// Parses `expr` or `target <assign-op> value`, without consuming a
    /// trailing `;`.
    fn parse_expr_or_assign_inner(&mut self) -> PResult<Stmt> {
        let expr = self.parse_expr()?;
        if let Some(op) = assign_op(self.current().kind) {
            let span = self.current().span;
            self.advance();
            let value = self.parse_expr()?;
            Ok(Stmt::Assign(AssignStmt {
                target: expr,
                op,
                value,
                span,
            }))
        } else {
            Ok(Stmt::Expr(expr))
        }
    }

    fn parse_expr_or_assign_stmt(&mut self) -> PResult<Stmt> {
        let stmt = self.parse_expr_or_assign_inner()?;
        self.match_token(TokenKind::Semicolon);
        Ok(stmt)
    }
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::AddAssign,
        TokenKind::MinusEq => AssignOp::SubAssign,
        TokenKind::StarEq => AssignOp::MulAssign,
        TokenKind::SlashEq => AssignOp::DivAssign,
        TokenKind::PercentEq => AssignOp::ModAssign,
        _ => return None,
    })
}
