//! classc-sem - Semantic analysis.
//!
//! ============================================================================
//! WHAT THIS STAGE OWNS
//! ============================================================================
//!
//! Three passes over the parsed [`classc_par::ast::Program`]:
//!
//! 1. **Declaration registration** - every class and free function name is
//!    registered at global scope before any body is inspected, so forward
//!    references (a function calling one declared later in the file) work.
//! 2. **Class body analysis** - base classes are resolved, and every method
//!    body is checked with an implicit `this` bound ahead of its declared
//!    parameters.
//! 3. **Free-function body analysis** - same as above, minus `this`.
//!
//! A final whole-program check rejects a source file that does not declare
//! exactly one free function named `main`. [`analyze`] never stops early on
//! an individual error; like the lexer and parser, it keeps analyzing the
//! rest of the program so one mistake produces one diagnostic rather than a
//! cascade, and returns whatever it has alongside the handler - `classc-drv`
//! is the one that decides whether `has_errors()` should stop the pipeline.

mod analysis;
pub mod scope;
pub mod types;

pub use analysis::{Analyzer, SemaInfo};
pub use scope::{ClassSig, FieldSig, FunctionSig, ScopeTree, Symbol};
pub use types::TypeInfo;

use classc_par::ast::Program;
use classc_util::Handler;

/// Convenience entry point: analyzes a parsed program with a fresh handler.
pub fn analyze(program: &Program) -> (SemaInfo, Handler) {
    let mut handler = Handler::new();
    let info = Analyzer::new(&mut handler).analyze(program);
    (info, handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_source(src: &str) -> (SemaInfo, Handler) {
        let (tokens, lex_handler) = classc_lex::lex(src);
        assert!(!lex_handler.has_errors(), "unexpected lex errors in {src:?}");
        let (program, parse_handler) = classc_par::parse(tokens);
        assert!(!parse_handler.has_errors(), "unexpected parse errors in {src:?}");
        analyze(&program)
    }

    #[test]
    fn accepts_hello_world_main() {
        let src = r#"fn main(): int { print("Hello, World!"); return 0; }"#;
        let (_, handler) = analyze_source(src);
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
    }

    #[test]
    fn rejects_missing_main() {
        let src = "fn helper(): int { return 0; }";
        let (_, handler) = analyze_source(src);
        assert!(handler.has_errors());
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("main")));
    }

    #[test]
    fn rejects_type_mismatch_on_var_decl() {
        let src = r#"fn main(): int { let x: int = "oops"; return 0; }"#;
        let (_, handler) = analyze_source(src);
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("Type mismatch")));
    }

    #[test]
    fn rejects_undefined_variable() {
        let src = "fn main(): int { return missing; }";
        let (_, handler) = analyze_source(src);
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("Undefined variable")));
    }

    #[test]
    fn rejects_break_outside_loop() {
        let src = "fn main(): int { break; return 0; }";
        let (_, handler) = analyze_source(src);
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("'break' outside of loop")));
    }

    #[test]
    fn allows_break_inside_while() {
        let src = "fn main(): int { while (true) { break; } return 0; }";
        let (_, handler) = analyze_source(src);
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
    }

    #[test]
    fn resolves_inherited_method_through_base_chain() {
        let src = r#"
            class Animal {
                #name: string;
                fn Animal(n: string): void { this.#name = n; }
                fn rename(n: string): void { this.#name = n; }
                fn speak(): void { print(this.#name); }
            }
            class Dog : Animal {
                fn Dog(n: string): void { this.rename(n); }
            }
            fn main(): int {
                let d: Dog = new Dog("Rex");
                d.speak();
                return 0;
            }
        "#;
        let (_, handler) = analyze_source(src);
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
    }

    #[test]
    fn rejects_private_field_access_from_subclass() {
        let src = r#"
            class Animal {
                #name: string;
                fn Animal(n: string): void { this.#name = n; }
            }
            class Dog : Animal {
                fn Dog(n: string): void { this.#name = n; }
            }
            fn main(): int {
                let d: Dog = new Dog("Rex");
                return 0;
            }
        "#;
        let (_, handler) = analyze_source(src);
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("private field")));
    }

    #[test]
    fn rejects_private_field_access_from_outside_class() {
        let src = r#"
            class Box {
                #value: int;
                fn Box(v: int): void { this.#value = v; }
            }
            fn main(): int {
                let b: Box = new Box(1);
                return b.#value;
            }
        "#;
        let (_, handler) = analyze_source(src);
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("private field")));
    }

    #[test]
    fn virtual_dispatch_types_check_through_base_reference() {
        let src = r#"
            class Animal {
                fn speak(): void { print("..."); }
            }
            class Dog : Animal {
                fn !speak(): void { print("Woof"); }
            }
            fn main(): int {
                let a: Animal = new Dog();
                a.speak();
                return 0;
            }
        "#;
        let (_, handler) = analyze_source(src);
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
    }

    #[test]
    fn rejects_undefined_base_class() {
        let src = "class A : Missing { fn A(): void {} } fn main(): int { return 0; }";
        let (_, handler) = analyze_source(src);
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("undefined base class")));
    }

    #[test]
    fn rejects_wrong_argument_count() {
        let src = r#"
            fn add(a: int, b: int): int { return a + b; }
            fn main(): int { return add(1); }
        "#;
        let (_, handler) = analyze_source(src);
        assert!(handler.has_errors());
    }
}
