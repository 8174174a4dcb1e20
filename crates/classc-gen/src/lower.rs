//! Type lowering: maps a resolved [`TypeInfo`] to the C type used for a
//! field, parameter, or local variable.

use classc_sem::TypeInfo;

/// `int -> int`, `float -> double`, `bool -> bool`, `char -> char`,
/// `string -> const char*`, class `C -> C*`. Arrays add one more pointer
/// level (`T[] -> T*`, so a class array becomes `C**`).
pub fn lower_type(ty: &TypeInfo) -> String {
    let scalar = if ty.is_class() {
        format!("{}*", ty.name)
    } else {
        scalar_c_name(&ty.name).to_string()
    };
    if ty.is_array {
        format!("{scalar}*")
    } else {
        scalar
    }
}

fn scalar_c_name(name: &str) -> &'static str {
    match name {
        "int" => "int",
        "float" => "double",
        "bool" => "bool",
        "char" => "char",
        "string" => "const char*",
        "void" => "void",
        // Unreachable for a program that passed semantic analysis: every
        // non-primitive name names a registered class and is handled by
        // `lower_type` before this is called.
        _ => "void*",
    }
}
