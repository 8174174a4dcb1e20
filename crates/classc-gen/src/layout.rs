//! Struct and vtable layout derived from the class hierarchy that semantic
//! analysis already validated. `classc-sem`'s `ClassSig` only records a
//! class's *own* fields and methods; this module walks the `base` chain to
//! produce the flattened view the code generator actually emits.

use classc_sem::{ClassSig, FieldSig, FunctionSig};
use indexmap::IndexMap;

/// `name`'s ancestors, root-first, ending with `name` itself. Terminates
/// because the analyzer's second pass rejects an unresolvable base before
/// codegen ever runs.
pub fn chain_from_root(classes: &IndexMap<String, ClassSig>, name: &str) -> Vec<String> {
    let mut chain = vec![name.to_string()];
    let mut current = name.to_string();
    while let Some(base) = classes.get(&current).and_then(|c| c.base.clone()) {
        chain.push(base.clone());
        current = base;
    }
    chain.reverse();
    chain
}

/// Base fields (in source order, base before derived) followed by `name`'s
/// own fields — the flattened layout §4.4 and §9 describe.
pub fn flattened_fields(
    classes: &IndexMap<String, ClassSig>,
    name: &str,
) -> Vec<(String, FieldSig)> {
    let mut fields = Vec::new();
    for class_name in chain_from_root(classes, name) {
        let Some(sig) = classes.get(&class_name) else {
            continue;
        };
        for (field_name, field) in &sig.fields {
            fields.push((field_name.clone(), field.clone()));
        }
    }
    fields
}

/// One vtable slot: the method name, its merged signature, and the most
/// derived class in `name`'s chain that actually implements it.
pub struct VtableSlot {
    pub method: String,
    pub sig: FunctionSig,
    pub implementor: String,
}

/// Every virtual method reachable through `name`'s inheritance chain,
/// keyed by first appearance (so a base class's slot position is stable
/// across every subclass's vtable type) but resolved to the most derived
/// override. Constructors never occupy a vtable slot.
pub fn vtable_slots(classes: &IndexMap<String, ClassSig>, name: &str) -> Vec<VtableSlot> {
    let mut slots: IndexMap<String, VtableSlot> = IndexMap::new();
    for class_name in chain_from_root(classes, name) {
        let Some(sig) = classes.get(&class_name) else {
            continue;
        };
        for (method_name, method_sig) in &sig.methods {
            if crate::mangle::is_constructor(&class_name, method_name) {
                continue;
            }
            slots.insert(
                method_name.clone(),
                VtableSlot {
                    method: method_name.clone(),
                    sig: method_sig.clone(),
                    implementor: class_name.clone(),
                },
            );
        }
    }
    slots.into_values().collect()
}
