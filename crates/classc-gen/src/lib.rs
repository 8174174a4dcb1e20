//! classc-gen - C code generation.
//!
//! ============================================================================
//! WHAT THIS STAGE OWNS
//! ============================================================================
//!
//! Translates a [`Program`] that has already passed semantic analysis into a
//! single C translation unit (a `String`). This stage never raises a
//! diagnostic: by construction every input has already been accepted by
//! [`classc_sem::analyze`], so there is exactly one way to lower each
//! construct and no error path to report.
//!
//! The translation unit is assembled in a fixed order so that every class
//! can reference every other class regardless of declaration order in the
//! source:
//!
//! 1. includes
//! 2. forward `typedef`s for every class and its vtable type (breaks the
//!    class <-> vtable cyclic reference)
//! 3. struct definitions (flattened fields, base before derived)
//! 4. vtable struct definitions plus the global vtable instance
//! 5. forward prototypes for every constructor, method, and free function
//! 6. method and constructor bodies, followed by each class's
//!    `*_vtable_init`
//! 7. free function bodies
//! 8. a synthesized `main` that calls every `*_vtable_init` before the
//!    user's own `main`
//!
//! Step 8 is this stage's fix for the vtable-initialization gap noted in
//! the design notes: a per-class init function is useless if nothing ever
//! calls it, so generation renames the user's `main` and supplies one that
//! does.

pub mod infer;
pub mod layout;
pub mod lower;
pub mod mangle;

mod emit;

pub use infer::TypeEnv;
pub use lower::lower_type;

use classc_par::ast::{Item, Program};
use classc_sem::SemaInfo;

use emit::Emitter;

/// Lowers an analyzed program to C source text.
pub fn generate(program: &Program, info: &SemaInfo) -> String {
    let class_decls: Vec<_> = program
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Class(c) => Some(c),
            Item::Function(_) => None,
        })
        .collect();
    let function_decls: Vec<_> = program
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Function(f) => Some(f),
            Item::Class(_) => None,
        })
        .collect();

    let mut emitter = Emitter::new(&info.classes, &info.functions);

    emitter_preamble(&mut emitter);

    for class in &class_decls {
        emitter.class_forward_typedefs(class);
    }
    emitter_blank(&mut emitter);

    for class in &class_decls {
        emitter.class_struct(class);
    }
    for class in &class_decls {
        emitter.class_vtable(class);
    }

    for class in &class_decls {
        emitter.class_method_prototypes(class);
    }
    for f in &function_decls {
        emitter.function_prototype(f);
    }
    emitter_blank(&mut emitter);

    for class in &class_decls {
        emitter.class_methods(class);
    }
    for f in &function_decls {
        emitter.function_def(f);
    }

    let class_order: Vec<String> = class_decls.iter().map(|c| c.name.clone()).collect();
    let main_ret_void = function_decls
        .iter()
        .find(|f| f.name == "main")
        .map(|f| f.ret_type.is_none())
        .unwrap_or(true);
    emitter.bootstrap_main(&class_order, main_ret_void);

    emitter.into_text()
}

fn emitter_preamble(emitter: &mut Emitter) {
    emitter.line("#include <stdio.h>");
    emitter.line("#include <stdlib.h>");
    emitter.line("#include <string.h>");
    emitter.line("#include <stdbool.h>");
    emitter.line("");
}

fn emitter_blank(emitter: &mut Emitter) {
    emitter.line("");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_source(src: &str) -> String {
        let (tokens, lex_handler) = classc_lex::lex(src);
        assert!(!lex_handler.has_errors(), "{:?}", lex_handler.diagnostics());
        let (program, parse_handler) = classc_par::parse(tokens);
        assert!(!parse_handler.has_errors(), "{:?}", parse_handler.diagnostics());
        let (info, sema_handler) = classc_sem::analyze(&program);
        assert!(!sema_handler.has_errors(), "{:?}", sema_handler.diagnostics());
        generate(&program, &info)
    }

    #[test]
    fn hello_world_has_bootstrap_main_and_renamed_user_main() {
        let c = generate_source(r#"fn main(): int { print("Hello, World!"); return 0; }"#);
        assert!(c.contains("int main(void) {"));
        assert!(c.contains("return __classc_main();"));
        assert!(c.contains("int __classc_main(void) {"));
        assert!(c.contains(r#"printf("%s\n", "Hello, World!")"#));
    }

    #[test]
    fn print_picks_format_specifier_from_static_type_not_literal_form() {
        let c = generate_source(
            r#"
            fn main(): int {
                let x: float = 3;
                print(x);
                return 0;
            }
            "#,
        );
        assert!(c.contains(r#"printf("%f\n", x)"#));
    }

    #[test]
    fn struct_flattens_base_fields_before_derived_fields() {
        let c = generate_source(
            r#"
            class Animal {
                #name: string;
                fn Animal(n: string): void { this.#name = n; }
            }
            class Dog : Animal {
                #breed: string;
                fn Dog(n: string, b: string): void { this.#breed = b; }
            }
            fn main(): int { return 0; }
            "#,
        );
        let struct_start = c.find("struct Dog {").expect("Dog struct");
        let name_pos = c[struct_start..].find("name;").expect("name field");
        let breed_pos = c[struct_start..].find("breed;").expect("breed field");
        assert!(name_pos < breed_pos, "base field must precede derived field");
    }

    #[test]
    fn vtable_init_wires_overridden_method_to_most_derived_implementor() {
        let c = generate_source(
            r#"
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
            "#,
        );
        assert!(c.contains("void Dog_vtable_init() {"));
        assert!(c.contains("Dog_vtable_instance.speak = Dog_speak;"));
        assert!(c.contains("void Animal_vtable_init() {"));
        assert!(c.contains("Animal_vtable_instance.speak = Animal_speak;"));
    }

    #[test]
    fn method_call_dispatches_through_vtable_pointer() {
        let c = generate_source(
            r#"
            class Animal {
                fn speak(): void { print("..."); }
            }
            fn main(): int {
                let a: Animal = new Animal();
                a.speak();
                return 0;
            }
            "#,
        );
        assert!(c.contains("a->__vtable->speak(a)"));
    }

    #[test]
    fn for_loop_lowers_to_native_c_for_so_continue_still_runs_update() {
        let c = generate_source(
            r#"
            fn main(): int {
                for (let i: int = 0; i < 10; i += 1) {
                    if (i == 5) { continue; }
                    print(i);
                }
                return 0;
            }
            "#,
        );
        assert!(c.contains("for (int i = 0; (i < 10); i += 1) {"));
        assert!(c.contains("continue;"));
    }

    #[test]
    fn constructor_allocates_and_installs_vtable_pointer() {
        let c = generate_source(
            r#"
            class Box {
                #value: int;
                fn Box(v: int): void { this.#value = v; }
            }
            fn main(): int {
                let b: Box = new Box(1);
                return 0;
            }
            "#,
        );
        assert!(c.contains("Box* Box_new(int v) {"));
        assert!(c.contains("Box* self = (Box*)malloc(sizeof(Box));"));
        assert!(c.contains("self->__vtable = &Box_vtable_instance;"));
    }
}
