//! Lexical scope tree used during name resolution.
//!
//! A `Scope` is pushed on entry to any lexical region — a function or
//! method body, a block, an `if`/`while`/`for` body — and popped on exit.
//! Lookup climbs the parent chain; a redeclaration is only rejected
//! against the innermost scope, so shadowing a name from an enclosing
//! scope is fine.

use classc_util::FxHashMap;

use crate::types::TypeInfo;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScopeId(u32);

/// The three symbol kinds that can occupy a name in a scope.
#[derive(Clone, Debug)]
pub enum Symbol {
    Variable(TypeInfo),
    Function(FunctionSig),
    Class(ClassSig),
}

#[derive(Clone, Debug)]
pub struct FunctionSig {
    pub params: Vec<(String, TypeInfo)>,
    pub ret_type: Option<TypeInfo>,
    pub is_private: bool,
    pub is_override: bool,
    pub is_method: bool,
}

#[derive(Clone, Debug)]
pub struct FieldSig {
    pub ty: TypeInfo,
    pub is_private: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ClassSig {
    pub base: Option<String>,
    pub fields: indexmap::IndexMap<String, FieldSig>,
    pub methods: indexmap::IndexMap<String, FunctionSig>,
}

impl ClassSig {
    /// The method whose name equals the class's own name: the
    /// constructor.
    pub fn constructor<'a>(&'a self, class_name: &str) -> Option<&'a FunctionSig> {
        self.methods.get(class_name)
    }
}

struct ScopeData {
    parent: Option<ScopeId>,
    bindings: FxHashMap<String, Symbol>,
}

/// A stack of scopes, addressed by index rather than by pointer so the
/// tree can be built without `Rc<RefCell<_>>` bookkeeping.
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
    current: ScopeId,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData {
                parent: None,
                bindings: FxHashMap::default(),
            }],
            current: ScopeId(0),
        }
    }

    pub fn push(&mut self) {
        let parent = self.current;
        self.scopes.push(ScopeData {
            parent: Some(parent),
            bindings: FxHashMap::default(),
        });
        self.current = ScopeId(self.scopes.len() as u32 - 1);
    }

    pub fn pop(&mut self) {
        if let Some(parent) = self.scopes[self.current.0 as usize].parent {
            self.current = parent;
        }
    }

    /// Declares `name` in the current (innermost) scope. Returns `false`
    /// if the name is already bound in this exact scope — the caller is
    /// expected to turn that into a diagnostic.
    pub fn declare(&mut self, name: String, symbol: Symbol) -> bool {
        let scope = &mut self.scopes[self.current.0 as usize];
        if scope.bindings.contains_key(&name) {
            false
        } else {
            scope.bindings.insert(name, symbol);
            true
        }
    }

    /// Looks up `name`, climbing from the current scope to the root.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            let scope = &self.scopes[id.0 as usize];
            if let Some(sym) = scope.bindings.get(name) {
                return Some(sym);
            }
            scope_id = scope.parent;
        }
        None
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
