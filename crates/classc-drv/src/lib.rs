//! classc-drv - Compiler driver.
//!
//! ============================================================================
//! WHAT THIS CRATE OWNS
//! ============================================================================
//!
//! This crate is the facade over the four pipeline stages
//! (`classc-lex` -> `classc-par` -> `classc-sem` -> `classc-gen`): it is the
//! only place that decides whether a stage with errors should stop the
//! pipeline, and the only place that flattens each stage's
//! `classc_util::Diagnostic`s into the stage-tagged [`CompilationError`]
//! shape external callers (and the `classc` binary) consume.
//!
//! Each stage runs to completion and reports everything it finds rather
//! than aborting on the first problem — the lexer keeps tokenizing past an
//! invalid token, the parser synchronizes and resumes after a syntax
//! error, the analyzer visits the whole program. [`Compiler::compile`] is
//! what turns "did this stage report anything" into "stop before wasting
//! work on a later stage that can't possibly succeed": lexer errors skip
//! parsing entirely, parser errors skip analysis, and so on. Code
//! generation itself is infallible (see `classc_gen`'s module docs) and
//! only runs once every earlier stage is clean.
//!
//! Running the generated C through an external compiler (`--run` on the
//! CLI) is deliberately kept out of this facade — `compile` only ever
//! produces C source text. See [`runner`] for that boundary.

pub mod runner;

use classc_sem::SemaInfo;
use classc_util::{Diagnostic, Handler};

/// One diagnostic, tagged with the pipeline stage that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    pub stage: Stage,
    pub message: String,
    pub line: i32,
    pub column: i32,
}

/// The four stages a [`CompilationError`] can be attributed to, in pipeline
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexer,
    Parser,
    Semantic,
    Codegen,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Stage::Lexer => "lexer",
            Stage::Parser => "parser",
            Stage::Semantic => "semantic",
            Stage::Codegen => "codegen",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for CompilationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] Line {}, Column {}: {}",
            self.stage, self.line, self.column, self.message
        )
    }
}

fn flatten(stage: Stage, handler: Handler, out: &mut Vec<CompilationError>) {
    for d in handler.into_diagnostics() {
        out.push(from_diagnostic(stage, d));
    }
}

fn from_diagnostic(stage: Stage, d: Diagnostic) -> CompilationError {
    CompilationError {
        stage,
        message: d.message,
        line: d.span.line(),
        column: d.span.column(),
    }
}

/// Outcome of [`Compiler::compile`]: either the generated C source, or the
/// full list of diagnostics from whichever stage stopped the pipeline.
#[derive(Debug, Clone)]
pub struct CompilationResult {
    pub success: bool,
    pub errors: Vec<CompilationError>,
    pub c_code: Option<String>,
}

impl CompilationResult {
    fn failure(errors: Vec<CompilationError>) -> Self {
        Self {
            success: false,
            errors,
            c_code: None,
        }
    }

    fn success(c_code: String) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            c_code: Some(c_code),
        }
    }
}

/// Orchestrates one source file through the full pipeline.
pub struct Compiler<'a> {
    source: &'a str,
}

impl<'a> Compiler<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Runs every stage in order, stopping at the first stage that
    /// reported any error.
    pub fn compile(&self) -> CompilationResult {
        let mut errors = Vec::new();

        log::debug!("lexing {} bytes of source", self.source.len());
        let (tokens, lex_handler) = classc_lex::lex(self.source);
        flatten(Stage::Lexer, lex_handler, &mut errors);
        if !errors.is_empty() {
            return CompilationResult::failure(errors);
        }

        log::debug!("parsing {} tokens", tokens.len());
        let (program, parse_handler) = classc_par::parse(tokens);
        flatten(Stage::Parser, parse_handler, &mut errors);
        if !errors.is_empty() {
            return CompilationResult::failure(errors);
        }

        log::debug!("running semantic analysis");
        let (info, sema_handler): (SemaInfo, Handler) = classc_sem::analyze(&program);
        flatten(Stage::Semantic, sema_handler, &mut errors);
        if !errors.is_empty() {
            return CompilationResult::failure(errors);
        }

        log::debug!("generating C code for {} classes, {} functions", info.classes.len(), info.functions.len());
        let c_code = classc_gen::generate(&program, &info);
        CompilationResult::success(c_code)
    }
}

/// Convenience entry point: compiles `source` with a fresh [`Compiler`].
pub fn compile_source(source: &str) -> CompilationResult {
    Compiler::new(source).compile()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_compiles_successfully() {
        let result = compile_source(r#"fn main(): int { print("Hello, World!"); return 0; }"#);
        assert!(result.success, "{:?}", result.errors);
        let c_code = result.c_code.expect("successful compilation must produce C code");
        assert!(c_code.contains("int main(void)"));
    }

    #[test]
    fn missing_main_is_a_semantic_error() {
        let result = compile_source("fn helper(): int { return 0; }");
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].stage, Stage::Semantic);
        assert!(result.errors[0].message.contains("main"));
    }

    #[test]
    fn type_mismatch_is_a_semantic_error_and_skips_codegen() {
        let result = compile_source(r#"fn main(): int { let x: int = "oops"; return 0; }"#);
        assert!(!result.success);
        assert!(result.c_code.is_none());
        assert!(result
            .errors
            .iter()
            .any(|e| e.stage == Stage::Semantic && e.message.contains("Type mismatch")));
    }

    #[test]
    fn undefined_identifier_is_a_semantic_error() {
        let result = compile_source("fn main(): int { return missing; }");
        assert!(!result.success);
        assert!(result
            .errors
            .iter()
            .any(|e| e.message.contains("Undefined variable")));
    }

    #[test]
    fn lexer_errors_short_circuit_before_parsing_runs() {
        let result = compile_source("fn main(): int { let x: int = &; return 0; }");
        assert!(!result.success);
        assert!(result.errors.iter().all(|e| e.stage == Stage::Lexer));
    }

    #[test]
    fn break_outside_loop_is_reported_with_line_and_column() {
        let result = compile_source("fn main(): int { break; return 0; }");
        assert!(!result.success);
        let err = &result.errors[0];
        assert_eq!(err.stage, Stage::Semantic);
        assert!(err.message.contains("'break' outside of loop"));
    }

    #[test]
    fn inheritance_with_override_produces_virtual_dispatch_in_generated_c() {
        let result = compile_source(
            r#"
            class Animal {
                fn speak(): void { print("A"); }
            }
            class Dog : Animal {
                fn !speak(): void { print("B"); }
            }
            fn main(): int {
                let a: Animal = new Dog();
                a.speak();
                return 0;
            }
            "#,
        );
        assert!(result.success, "{:?}", result.errors);
        let c = result.c_code.unwrap();
        assert!(c.contains("a->__vtable->speak(a)"));
        assert!(c.contains("Dog_vtable_instance.speak = Dog_speak;"));
    }
}
