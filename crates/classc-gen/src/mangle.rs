//! Name-mangling rules: every generated C identifier the rest of the
//! generator needs is produced by one of these functions, so the mapping
//! from language name to C name lives in exactly one place.

/// A method whose name equals its own enclosing class is the constructor.
pub fn is_constructor(class_name: &str, method_name: &str) -> bool {
    class_name == method_name
}

pub fn ctor_fn_name(class_name: &str) -> String {
    format!("{class_name}_new")
}

pub fn method_fn_name(class_name: &str, method: &str) -> String {
    format!("{class_name}_{method}")
}

pub fn vtable_type_name(class_name: &str) -> String {
    format!("{class_name}Vtable")
}

pub fn vtable_instance_name(class_name: &str) -> String {
    format!("{class_name}_vtable_instance")
}

pub fn vtable_init_fn_name(class_name: &str) -> String {
    format!("{class_name}_vtable_init")
}

pub fn vtable_field_name() -> &'static str {
    "__vtable"
}
