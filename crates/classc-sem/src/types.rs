//! Resolved type representation and the compatibility rules used by
//! [`crate::analysis::Analyzer`].
//!
//! `TypeInfo` is deliberately smaller than `classc_par::ast::Type`: it
//! drops the span (a resolved type isn't tied to one source location —
//! think of the type of a variable after flowing through several
//! expressions) and keeps just what type-checking needs: a name and the
//! array flag.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    pub name: String,
    pub is_array: bool,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, is_array: bool) -> Self {
        Self {
            name: name.into(),
            is_array,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// The type substituted for an expression that failed to type-check,
    /// so analysis can keep going without cascading "expected X, found
    /// error" diagnostics for every use of the broken value.
    pub fn error() -> Self {
        Self::scalar("<error>")
    }

    pub fn is_error(&self) -> bool {
        self.name == "<error>"
    }

    pub fn int() -> Self {
        Self::scalar("int")
    }
    pub fn float() -> Self {
        Self::scalar("float")
    }
    pub fn bool() -> Self {
        Self::scalar("bool")
    }
    pub fn char() -> Self {
        Self::scalar("char")
    }
    pub fn string() -> Self {
        Self::scalar("string")
    }
    pub fn void() -> Self {
        Self::scalar("void")
    }

    pub fn is_numeric(&self) -> bool {
        !self.is_array && matches!(self.name.as_str(), "int" | "float")
    }

    pub fn is_bool(&self) -> bool {
        !self.is_array && self.name == "bool"
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.name.as_str(),
            "int" | "float" | "bool" | "char" | "string" | "void"
        )
    }

    pub fn is_class(&self) -> bool {
        !self.is_array && !self.is_primitive() && !self.is_error()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

/// Walks `from`'s base-class chain (via `base_of`) looking for `to`,
/// implementing the nominal-subtyping rule: a class type is compatible
/// with any of its ancestors.
pub fn class_reaches(from: &str, to: &str, base_of: &impl Fn(&str) -> Option<String>) -> bool {
    let mut current = from.to_string();
    loop {
        if current == to {
            return true;
        }
        match base_of(&current) {
            Some(base) => current = base,
            None => return false,
        }
    }
}

/// Type compatibility as defined by the spec: identical types are always
/// compatible; `int` widens into `float`; class types are compatible when
/// the actual type's base-class chain reaches the expected type.
pub fn is_compatible(actual: &TypeInfo, expected: &TypeInfo, base_of: &impl Fn(&str) -> Option<String>) -> bool {
    if actual.is_error() || expected.is_error() {
        return true;
    }
    if actual == expected {
        return true;
    }
    if actual.is_array != expected.is_array {
        return false;
    }
    if !actual.is_array && actual.name == "int" && expected.name == "float" {
        return true;
    }
    if actual.is_class() && expected.is_class() {
        return class_reaches(&actual.name, &expected.name, base_of);
    }
    false
}
