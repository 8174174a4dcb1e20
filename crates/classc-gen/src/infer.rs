//! A second, non-diagnostic type inference pass used only by the code
//! generator.
//!
//! The AST is an immutable value tree - nothing downstream is allowed to
//! attach resolved types to its nodes - so the generator cannot simply read
//! back what semantic analysis already computed. Re-running a total version
//! of the same inference here is cheap and keeps the AST free of a second
//! stage's bookkeeping; it is "total" in the sense that it never raises a
//! diagnostic, because by the time codegen runs the program has already
//! passed semantic analysis and is known to be well-typed.
//!
//! This is what closes the `print` overload gap from the design notes:
//! every call site can ask for the static type of its argument instead of
//! guessing from its syntactic literal form.

use classc_par::ast::{BinOp, CallExpr, Expr, MemberExpr, UnOp};
use classc_sem::{ClassSig, FieldSig, FunctionSig, TypeInfo};
use classc_util::FxHashMap;
use indexmap::IndexMap;

pub struct TypeEnv<'a> {
    classes: &'a IndexMap<String, ClassSig>,
    functions: &'a IndexMap<String, FunctionSig>,
    scopes: Vec<FxHashMap<String, TypeInfo>>,
}

impl<'a> TypeEnv<'a> {
    pub fn new(
        classes: &'a IndexMap<String, ClassSig>,
        functions: &'a IndexMap<String, FunctionSig>,
    ) -> Self {
        Self {
            classes,
            functions,
            scopes: vec![FxHashMap::default()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn declare(&mut self, name: &str, ty: TypeInfo) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    fn lookup(&self, name: &str) -> Option<TypeInfo> {
        self.scopes.iter().rev().find_map(|s| s.get(name).cloned())
    }

    pub fn infer(&self, expr: &Expr) -> TypeInfo {
        match expr {
            Expr::Int(_) => TypeInfo::int(),
            Expr::Float(_) => TypeInfo::float(),
            Expr::Str(_) => TypeInfo::string(),
            Expr::Char(_) => TypeInfo::char(),
            Expr::Bool(_) => TypeInfo::bool(),
            Expr::Ident(e) => self.lookup(&e.name).unwrap_or_else(TypeInfo::error),
            Expr::Binary(e) => match e.op {
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                    let lt = self.infer(&e.left);
                    let rt = self.infer(&e.right);
                    if lt.name == "float" || rt.name == "float" {
                        TypeInfo::float()
                    } else {
                        TypeInfo::int()
                    }
                }
                _ => TypeInfo::bool(),
            },
            Expr::Unary(e) => match e.op {
                UnOp::Neg => self.infer(&e.operand),
                UnOp::Not => TypeInfo::bool(),
            },
            Expr::Call(e) => self.infer_call(e),
            Expr::Member(e) => self.infer_member(e),
            Expr::New(e) => TypeInfo::scalar(e.class_name.clone()),
            Expr::Index(e) => {
                let arr = self.infer(&e.array);
                TypeInfo::new(arr.name, false)
            }
        }
    }

    fn infer_call(&self, e: &CallExpr) -> TypeInfo {
        if let Expr::Member(member) = e.callee.as_ref() {
            let recv = self.infer(&member.receiver);
            return self
                .resolve_method(&recv.name, &member.member)
                .map(|sig| sig.ret_type.unwrap_or_else(TypeInfo::void))
                .unwrap_or_else(TypeInfo::error);
        }
        if let Expr::Ident(ident) = e.callee.as_ref() {
            if ident.name == "print" || ident.name == "read" {
                return TypeInfo::void();
            }
            if let Some(sig) = self.functions.get(&ident.name) {
                return sig.ret_type.clone().unwrap_or_else(TypeInfo::void);
            }
        }
        TypeInfo::error()
    }

    fn infer_member(&self, e: &MemberExpr) -> TypeInfo {
        let recv = self.infer(&e.receiver);
        self.resolve_field(&recv.name, &e.member)
            .map(|f| f.ty)
            .unwrap_or_else(TypeInfo::error)
    }

    fn resolve_field(&self, class_name: &str, field_name: &str) -> Option<FieldSig> {
        let mut current = class_name.to_string();
        loop {
            let sig = self.classes.get(&current)?;
            if let Some(f) = sig.fields.get(field_name) {
                return Some(f.clone());
            }
            current = sig.base.clone()?;
        }
    }

    fn resolve_method(&self, class_name: &str, method_name: &str) -> Option<FunctionSig> {
        let mut current = class_name.to_string();
        loop {
            let sig = self.classes.get(&current)?;
            if let Some(m) = sig.methods.get(method_name) {
                return Some(m.clone());
            }
            current = sig.base.clone()?;
        }
    }
}
