//! classc-par - Recursive-descent parsing.
//!
//! ============================================================================
//! WHAT THIS STAGE OWNS
//! ============================================================================
//!
//! The parser turns the lexer's flat token stream into a [`ast::Program`].
//! It is a single-token-lookahead recursive descent parser: every grammar
//! rule in the spec's `program := ...` grammar has a corresponding
//! `parse_*` method, expressions are handled by a dedicated
//! precedence-climbing ladder (see [`expr`]), and a syntax error never
//! aborts the whole parse. Instead, `Parser::parse` catches the error at
//! the nearest declaration boundary, records it, and calls `synchronize`
//! to skip ahead to the next recognizable declaration keyword before
//! continuing — so a single missing semicolon produces one diagnostic
//! rather than a cascade of confusing follow-on errors.
//!
//! The `classc-drv` facade only proceeds to semantic analysis when the
//! parser's handler reports no errors; the AST it hands over may still be
//! partial in shape if errors occurred, but every node actually present is
//! fully-formed.

pub mod ast;
mod expr;
mod parser;
mod stmt;

pub use ast::*;
pub use parser::Parser;

use classc_lex::Token;
use classc_util::Handler;

/// Convenience entry point: parses an already-lexed token stream with a
/// fresh handler.
pub fn parse(tokens: Vec<Token>) -> (Program, Handler) {
    let mut handler = Handler::new();
    let program = Parser::new(tokens, &mut handler).parse();
    (program, handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_source(src: &str) -> (Program, Handler) {
        let (tokens, lex_handler) = classc_lex::lex(src);
        assert!(!lex_handler.has_errors(), "unexpected lex errors in {src:?}");
        parse(tokens)
    }

    #[test]
    fn parses_empty_program() {
        let (program, handler) = parse_source("");
        assert!(!handler.has_errors());
        assert!(program.items.is_empty());
    }

    #[test]
    fn parses_hello_world_main() {
        let src = r#"fn main(): int { print("Hello, World!"); return 0; }"#;
        let (program, handler) = parse_source(src);
        assert!(!handler.has_errors());
        assert_eq!(program.items.len(), 1);
        match &program.items[0] {
            Item::Function(f) => {
                assert_eq!(f.name, "main");
                assert_eq!(f.params.len(), 0);
                assert_eq!(f.ret_type.as_ref().unwrap().name, "int");
                assert_eq!(f.body.as_ref().unwrap().stmts.len(), 2);
            }
            _ => panic!("expected a function item"),
        }
    }

    #[test]
    fn parses_class_with_inheritance_and_override() {
        let src = r#"
            class A {
                fn greet(): int { print("A"); return 0; }
            }
            class B : A {
                #x: int;
                fn !greet(): int { print("B"); return 0; }
            }
        "#;
        let (program, handler) = parse_source(src);
        assert!(!handler.has_errors());
        assert_eq!(program.items.len(), 2);
        let Item::Class(b) = &program.items[1] else {
            panic!("expected class B")
        };
        assert_eq!(b.base.as_deref(), Some("A"));
        assert_eq!(b.fields.len(), 1);
        assert!(b.fields[0].is_private);
        assert_eq!(b.methods.len(), 1);
        assert!(b.methods[0].is_override);
    }

    #[test]
    fn parses_private_method_marker() {
        let src = "class A { fn #helper(): void {} }";
        let (program, handler) = parse_source(src);
        assert!(!handler.has_errors());
        let Item::Class(a) = &program.items[0] else {
            panic!()
        };
        assert!(a.methods[0].is_private);
    }

    #[test]
    fn expression_precedence_is_left_to_right_and_climbing() {
        // 1 + 2 * 3 == 7 under correct precedence (not (1+2)*3 == 9)
        let src = "fn main(): int { let x: int = 1 + 2 * 3; return x; }";
        let (program, handler) = parse_source(src);
        assert!(!handler.has_errors());
        let Item::Function(f) = &program.items[0] else {
            panic!()
        };
        let Stmt::VarDecl(decl) = &f.body.as_ref().unwrap().stmts[0] else {
            panic!()
        };
        let Expr::Binary(top) = decl.init.as_ref().unwrap() else {
            panic!("expected top-level binary expr")
        };
        assert_eq!(top.op, BinOp::Add);
        assert!(matches!(&*top.right, Expr::Binary(b) if b.op == BinOp::Mul));
    }

    #[test]
    fn member_call_and_index_postfix_chain() {
        let src = "fn main(): int { return obj.#field.method(1, 2)[0]; }";
        let (program, handler) = parse_source(src);
        assert!(!handler.has_errors());
        let Item::Function(f) = &program.items[0] else {
            panic!()
        };
        let Stmt::Return(ret) = &f.body.as_ref().unwrap().stmts[0] else {
            panic!()
        };
        assert!(matches!(ret.value.as_ref().unwrap(), Expr::Index(_)));
    }

    #[test]
    fn malformed_statement_recovers_at_next_statement() {
        let src = r#"
            fn main(): int {
                let x: int = ;
                let y: int = 2;
                return y;
            }
        "#;
        let (program, handler) = parse_source(src);
        // The missing initializer expression is one diagnostic; recovery
        // skips ahead to the next `let` and the rest of the body still
        // parses cleanly.
        assert_eq!(handler.diagnostics().len(), 1);
        assert_eq!(program.items.len(), 1);
        let Item::Function(f) = &program.items[0] else {
            panic!()
        };
        assert_eq!(f.body.as_ref().unwrap().stmts.len(), 2);
    }

    #[test]
    fn parses_for_loop_with_semicolons_and_update() {
        let src = "fn main(): int { for (let i: int = 0; i < 10; i += 1) { print(i); } return 0; }";
        let (program, handler) = parse_source(src);
        assert!(!handler.has_errors());
        let Item::Function(f) = &program.items[0] else {
            panic!()
        };
        assert!(matches!(
            f.body.as_ref().unwrap().stmts[0],
            Stmt::For(_)
        ));
    }

    #[test]
    fn array_type_and_new_expression() {
        let src = "class A { fn main(): void { let xs: int[] = new A(1, 2); } }";
        let (program, handler) = parse_source(src);
        assert!(!handler.has_errors());
        let Item::Class(a) = &program.items[0] else {
            panic!()
        };
        let Stmt::VarDecl(decl) = &a.methods[0].body.as_ref().unwrap().stmts[0] else {
            panic!()
        };
        assert!(decl.ty.as_ref().unwrap().is_array);
        assert!(matches!(decl.init.as_ref().unwrap(), Expr::New(_)));
    }
}
