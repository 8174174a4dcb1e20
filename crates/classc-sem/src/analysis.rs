//! Three-pass semantic analysis: declaration registration, class body
//! analysis, then free-function body analysis, followed by the
//! whole-program `main` check. See the module docs in `lib.rs` for why the
//! passes are ordered this way.

use classc_par::ast::{
    AssignOp, AssignStmt, BinOp, Block, ClassDecl, Expr, ForStmt, FunctionDecl, IfStmt, Item,
    Program, ReturnStmt, Stmt, UnOp, VarDeclStmt, WhileStmt,
};
use classc_util::{Handler, Span};
use indexmap::IndexMap;

use crate::scope::{ClassSig, FieldSig, FunctionSig, ScopeTree, Symbol};
use crate::types::{self, TypeInfo};

pub struct SemaInfo {
    pub classes: IndexMap<String, ClassSig>,
    pub functions: IndexMap<String, FunctionSig>,
}

pub struct Analyzer<'a> {
    handler: &'a mut Handler,
    scopes: ScopeTree,
    classes: IndexMap<String, ClassSig>,
    functions: IndexMap<String, FunctionSig>,
    current_class: Option<String>,
    current_return_type: TypeInfo,
    loop_depth: u32,
}

impl<'a> Analyzer<'a> {
    pub fn new(handler: &'a mut Handler) -> Self {
        Self {
            handler,
            scopes: ScopeTree::new(),
            classes: IndexMap::new(),
            functions: IndexMap::new(),
            current_class: None,
            current_return_type: TypeInfo::void(),
            loop_depth: 0,
        }
    }

    pub fn analyze(mut self, program: &Program) -> SemaInfo {
        self.register_declarations(program);

        for item in &program.items {
            if let Item::Class(class) = item {
                self.analyze_class(class);
            }
        }
        for item in &program.items {
            if let Item::Function(f) = item {
                self.analyze_function(f);
            }
        }

        self.check_main_present();

        SemaInfo {
            classes: self.classes,
            functions: self.functions,
        }
    }

    // -- pass 1: declaration registration -------------------------------

    fn register_declarations(&mut self, program: &Program) {
        for name in ["print", "read"] {
            self.functions.insert(
                name.to_string(),
                FunctionSig {
                    params: Vec::new(),
                    ret_type: None,
                    is_private: false,
                    is_override: false,
                    is_method: false,
                },
            );
        }
        for item in &program.items {
            let (name, span) = match item {
                Item::Class(c) => (c.name.clone(), c.span),
                Item::Function(f) => (f.name.clone(), f.span),
            };
            if self.classes.contains_key(&name) || self.functions.contains_key(&name) {
                self.handler.error(
                    format!("duplicate top-level declaration '{name}'"),
                    span,
                );
                continue;
            }
            match item {
                Item::Class(c) => {
                    let sig = self.build_class_sig(c);
                    self.classes.insert(name, sig);
                }
                Item::Function(f) => {
                    let sig = self.function_sig(f, false);
                    self.functions.insert(name, sig);
                }
            }
        }
    }

    fn build_class_sig(&mut self, class: &ClassDecl) -> ClassSig {
        let mut sig = ClassSig {
            base: class.base.clone(),
            fields: IndexMap::new(),
            methods: IndexMap::new(),
        };
        for field in &class.fields {
            if sig.fields.contains_key(&field.name) || sig.methods.contains_key(&field.name) {
                self.handler.error(
                    format!("duplicate member '{}' in class '{}'", field.name, class.name),
                    field.span,
                );
                continue;
            }
            sig.fields.insert(
                field.name.clone(),
                FieldSig {
                    ty: TypeInfo::new(field.ty.name.clone(), field.ty.is_array),
                    is_private: field.is_private,
                },
            );
        }
        for method in &class.methods {
            if sig.fields.contains_key(&method.name) || sig.methods.contains_key(&method.name) {
                self.handler.error(
                    format!("duplicate member '{}' in class '{}'", method.name, class.name),
                    method.span,
                );
                continue;
            }
            sig.methods.insert(method.name.clone(), self.function_sig(method, true));
        }
        sig
    }

    fn function_sig(&self, f: &FunctionDecl, is_method: bool) -> FunctionSig {
        FunctionSig {
            params: f
                .params
                .iter()
                .map(|p| (p.name.clone(), TypeInfo::new(p.ty.name.clone(), p.ty.is_array)))
                .collect(),
            ret_type: f
                .ret_type
                .as_ref()
                .map(|t| TypeInfo::new(t.name.clone(), t.is_array)),
            is_private: f.is_private,
            is_override: f.is_override,
            is_method,
        }
    }

    // -- pass 2: class bodies --------------------------------------------

    fn analyze_class(&mut self, class: &ClassDecl) {
        if let Some(base) = &class.base {
            if !self.classes.contains_key(base) {
                self.handler.error(
                    format!("undefined base class '{base}' for class '{}'", class.name),
                    class.span,
                );
            }
        }

        self.current_class = Some(class.name.clone());
        for method in &class.methods {
            let Some(body) = &method.body else { continue };
            let this_ty = TypeInfo::scalar(class.name.clone());
            let ret_ty = method
                .ret_type
                .as_ref()
                .map(|t| TypeInfo::new(t.name.clone(), t.is_array))
                .unwrap_or_else(TypeInfo::void);
            self.analyze_function_body(&method.params, Some(this_ty), ret_ty, body);
        }
        self.current_class = None;
    }

    // -- pass 3: free functions -------------------------------------------

    fn analyze_function(&mut self, f: &FunctionDecl) {
        let Some(body) = &f.body else { return };
        let ret_ty = f
            .ret_type
            .as_ref()
            .map(|t| TypeInfo::new(t.name.clone(), t.is_array))
            .unwrap_or_else(TypeInfo::void);
        self.analyze_function_body(&f.params, None, ret_ty, body);
    }

    fn analyze_function_body(
        &mut self,
        params: &[classc_par::ast::Param],
        this_ty: Option<TypeInfo>,
        ret_ty: TypeInfo,
        body: &Block,
    ) {
        self.scopes.push();
        if let Some(t) = this_ty {
            self.scopes.declare("this".to_string(), Symbol::Variable(t));
        }
        for param in params {
            let ty = TypeInfo::new(param.ty.name.clone(), param.ty.is_array);
            if !self.scopes.declare(param.name.clone(), Symbol::Variable(ty)) {
                self.handler.error(
                    format!("duplicate parameter name '{}'", param.name),
                    param.span,
                );
            }
        }
        let prev_return = std::mem::replace(&mut self.current_return_type, ret_ty);

        self.scopes.push();
        for stmt in &body.stmts {
            self.analyze_stmt(stmt);
        }
        self.scopes.pop();

        self.current_return_type = prev_return;
        self.scopes.pop();
    }

    fn check_main_present(&mut self) {
        let has_main = self
            .functions
            .get("main")
            .map(|sig| !sig.is_method)
            .unwrap_or(false);
        if !has_main {
            self.handler.error(
                "program has no 'main' function",
                Span::new(0, 0),
            );
        }
    }

    // -- statements --------------------------------------------------------

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl(s) => self.analyze_var_decl(s),
            Stmt::Assign(s) => self.analyze_assign(s),
            Stmt::If(s) => self.analyze_if(s),
            Stmt::While(s) => self.analyze_while(s),
            Stmt::For(s) => self.analyze_for(s),
            Stmt::Return(s) => self.analyze_return(s),
            Stmt::Break(span) => {
                if self.loop_depth == 0 {
                    self.handler.error("'break' outside of loop", *span);
                }
            }
            Stmt::Continue(span) => {
                if self.loop_depth == 0 {
                    self.handler.error("'continue' outside of loop", *span);
                }
            }
            Stmt::Block(b) => self.analyze_pushed_block(b),
            Stmt::Expr(e) => {
                self.check_expr(e);
            }
        }
    }

    fn analyze_pushed_block(&mut self, block: &Block) {
        self.scopes.push();
        for stmt in &block.stmts {
            self.analyze_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn analyze_var_decl(&mut self, s: &VarDeclStmt) {
        let init_ty = s.init.as_ref().map(|e| self.check_expr(e));
        let ty = match (&s.ty, &init_ty) {
            (Some(annotated), Some(init_ty)) => {
                let declared = TypeInfo::new(annotated.name.clone(), annotated.is_array);
                if !self.compatible(init_ty, &declared) {
                    self.handler.error(
                        format!(
                            "Type mismatch: cannot initialize '{}' of type {declared} with value of type {init_ty}",
                            s.name
                        ),
                        s.span,
                    );
                }
                declared
            }
            (Some(annotated), None) => TypeInfo::new(annotated.name.clone(), annotated.is_array),
            (None, Some(init_ty)) => init_ty.clone(),
            (None, None) => {
                self.handler.error(
                    format!("variable '{}' needs a type annotation or an initializer", s.name),
                    s.span,
                );
                TypeInfo::error()
            }
        };
        if !self.scopes.declare(s.name.clone(), Symbol::Variable(ty)) {
            self.handler
                .error(format!("'{}' is already declared in this scope", s.name), s.span);
        }
    }

    fn analyze_assign(&mut self, s: &AssignStmt) {
        let target_ty = self.check_expr(&s.target);
        let value_ty = self.check_expr(&s.value);
        match s.op {
            AssignOp::Assign => {
                if !self.compatible(&value_ty, &target_ty) {
                    self.handler.error(
                        format!("Type mismatch: cannot assign {value_ty} to {target_ty}"),
                        s.span,
                    );
                }
            }
            _ => {
                if !target_ty.is_error() && !target_ty.is_numeric() {
                    self.handler.error(
                        format!("compound assignment target must be numeric, found {target_ty}"),
                        s.span,
                    );
                }
                if !value_ty.is_error() && !value_ty.is_numeric() {
                    self.handler.error(
                        format!("compound assignment value must be numeric, found {value_ty}"),
                        s.span,
                    );
                }
            }
        }
    }

    fn analyze_if(&mut self, s: &IfStmt) {
        self.check_expr(&s.cond);
        self.analyze_pushed_block(&s.then_branch);
        if let Some(else_branch) = &s.else_branch {
            self.analyze_stmt(else_branch);
        }
    }

    fn analyze_while(&mut self, s: &WhileStmt) {
        self.check_expr(&s.cond);
        self.loop_depth += 1;
        self.analyze_pushed_block(&s.body);
        self.loop_depth -= 1;
    }

    fn analyze_for(&mut self, s: &ForStmt) {
        self.scopes.push();
        if let Some(init) = &s.init {
            self.analyze_stmt(init);
        }
        if let Some(cond) = &s.cond {
            self.check_expr(cond);
        }
        self.loop_depth += 1;
        for stmt in &s.body.stmts {
            self.analyze_stmt(stmt);
        }
        self.loop_depth -= 1;
        if let Some(update) = &s.update {
            self.analyze_stmt(update);
        }
        self.scopes.pop();
    }

    fn analyze_return(&mut self, s: &ReturnStmt) {
        let expected = self.current_return_type.clone();
        match &s.value {
            Some(e) => {
                let actual = self.check_expr(e);
                if !self.compatible(&actual, &expected) {
                    self.handler.error(
                        format!("Type mismatch: cannot return {actual} where {expected} expected"),
                        e.span(),
                    );
                }
            }
            None => {
                if expected.name != "void" {
                    self.handler.error(
                        format!("missing return value; function expects {expected}"),
                        s.span,
                    );
                }
            }
        }
    }

    // -- expressions ---------------------------------------------------

    fn check_expr(&mut self, expr: &Expr) -> TypeInfo {
        match expr {
            Expr::Int(_) => TypeInfo::int(),
            Expr::Float(_) => TypeInfo::float(),
            Expr::Str(_) => TypeInfo::string(),
            Expr::Char(_) => TypeInfo::char(),
            Expr::Bool(_) => TypeInfo::bool(),
            Expr::Ident(e) => match self.scopes.lookup(&e.name) {
                Some(Symbol::Variable(ty)) => ty.clone(),
                Some(_) => {
                    self.handler
                        .error(format!("'{}' is not a variable", e.name), e.span);
                    TypeInfo::error()
                }
                None => {
                    self.handler
                        .error(format!("Undefined variable '{}'", e.name), e.span);
                    TypeInfo::error()
                }
            },
            Expr::Binary(e) => self.check_binary(e),
            Expr::Unary(e) => self.check_unary(e),
            Expr::Call(e) => self.check_call(e),
            Expr::Member(e) => self.check_member(e),
            Expr::New(e) => self.check_new(e),
            Expr::Index(e) => self.check_index(e),
        }
    }

    fn check_binary(&mut self, e: &classc_par::ast::BinaryExpr) -> TypeInfo {
        let lt = self.check_expr(&e.left);
        let rt = self.check_expr(&e.right);
        if lt.is_error() || rt.is_error() {
            return match e.op {
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => TypeInfo::error(),
                _ => TypeInfo::bool(),
            };
        }
        match e.op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                if !lt.is_numeric() || !rt.is_numeric() {
                    self.handler.error(
                        format!("arithmetic operator requires numeric operands, found {lt} and {rt}"),
                        e.span,
                    );
                    return TypeInfo::error();
                }
                if lt.name == "float" || rt.name == "float" {
                    TypeInfo::float()
                } else {
                    TypeInfo::int()
                }
            }
            BinOp::Eq | BinOp::Ne => {
                if !self.compatible(&lt, &rt) && !self.compatible(&rt, &lt) {
                    self.handler.error(
                        format!("Type mismatch: cannot compare {lt} with {rt}"),
                        e.span,
                    );
                }
                TypeInfo::bool()
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                if !lt.is_numeric() || !rt.is_numeric() {
                    self.handler.error(
                        format!("relational operator requires numeric operands, found {lt} and {rt}"),
                        e.span,
                    );
                }
                TypeInfo::bool()
            }
            BinOp::And | BinOp::Or => {
                if !(lt.is_bool() || lt.is_numeric()) || !(rt.is_bool() || rt.is_numeric()) {
                    self.handler.error(
                        format!("logical operator requires bool or numeric operands, found {lt} and {rt}"),
                        e.span,
                    );
                }
                TypeInfo::bool()
            }
        }
    }

    fn check_unary(&mut self, e: &classc_par::ast::UnaryExpr) -> TypeInfo {
        let operand_ty = self.check_expr(&e.operand);
        if operand_ty.is_error() {
            return TypeInfo::error();
        }
        match e.op {
            UnOp::Neg => {
                if !operand_ty.is_numeric() {
                    self.handler.error(
                        format!("unary '-' requires a numeric operand, found {operand_ty}"),
                        e.span,
                    );
                    return TypeInfo::error();
                }
                operand_ty
            }
            UnOp::Not => {
                if !(operand_ty.is_bool() || operand_ty.is_numeric()) {
                    self.handler.error(
                        format!("unary '!' requires bool or numeric operand, found {operand_ty}"),
                        e.span,
                    );
                }
                TypeInfo::bool()
            }
        }
    }

    fn check_call(&mut self, e: &classc_par::ast::CallExpr) -> TypeInfo {
        if let Expr::Member(member) = e.callee.as_ref() {
            return self.check_method_call(member, &e.args, e.span);
        }
        if let Expr::Ident(ident) = e.callee.as_ref() {
            if ident.name == "print" || ident.name == "read" {
                return self.check_builtin_call(&ident.name, &e.args, e.span);
            }
            let sig = self.functions.get(&ident.name).cloned();
            return match sig {
                Some(sig) => {
                    self.check_call_args(&sig.params, &e.args, e.span);
                    sig.ret_type.unwrap_or_else(TypeInfo::void)
                }
                None => {
                    self.handler
                        .error(format!("Undefined function '{}'", ident.name), ident.span);
                    for a in &e.args {
                        self.check_expr(a);
                    }
                    TypeInfo::error()
                }
            };
        }
        self.check_expr(&e.callee);
        for a in &e.args {
            self.check_expr(a);
        }
        self.handler
            .error("expression is not callable", e.span);
        TypeInfo::error()
    }

    /// `print` and `read` are recognized by name rather than registered as
    /// free functions - there is no user-authored declaration for either,
    /// and the code generator lowers them straight to `printf`/`scanf`.
    fn check_builtin_call(&mut self, name: &str, args: &[Expr], span: Span) -> TypeInfo {
        if args.len() != 1 {
            self.handler.error(
                format!("'{name}' expects exactly one argument, found {}", args.len()),
                span,
            );
            for a in args {
                self.check_expr(a);
            }
            return TypeInfo::void();
        }
        let arg_ty = self.check_expr(&args[0]);
        if name == "read" && !arg_ty.is_error() && arg_ty != TypeInfo::int() {
            self.handler.error(
                format!("Type mismatch: 'read' requires an int variable, found {arg_ty}"),
                args[0].span(),
            );
        }
        TypeInfo::void()
    }

    fn check_method_call(
        &mut self,
        member: &classc_par::ast::MemberExpr,
        args: &[Expr],
        span: Span,
    ) -> TypeInfo {
        let recv_ty = self.check_expr(&member.receiver);
        if recv_ty.is_error() {
            for a in args {
                self.check_expr(a);
            }
            return TypeInfo::error();
        }
        if !recv_ty.is_class() {
            self.handler.error(
                format!("cannot call method '{}' on non-class type {recv_ty}", member.member),
                span,
            );
            for a in args {
                self.check_expr(a);
            }
            return TypeInfo::error();
        }
        match self.resolve_method(&recv_ty.name, &member.member) {
            Some((sig, declaring_class)) => {
                if sig.is_private && !self.accessible_from(&declaring_class) {
                    self.handler.error(
                        format!(
                            "private method '{}' is not accessible outside class '{declaring_class}'",
                            member.member
                        ),
                        span,
                    );
                }
                self.check_call_args(&sig.params, args, span);
                sig.ret_type.unwrap_or_else(TypeInfo::void)
            }
            None => {
                self.handler.error(
                    format!("class '{}' has no method '{}'", recv_ty.name, member.member),
                    span,
                );
                for a in args {
                    self.check_expr(a);
                }
                TypeInfo::error()
            }
        }
    }

    fn check_call_args(&mut self, params: &[(String, TypeInfo)], args: &[Expr], span: Span) {
        if params.len() != args.len() {
            self.handler.error(
                format!("expected {} argument(s), found {}", params.len(), args.len()),
                span,
            );
        }
        for (i, arg) in args.iter().enumerate() {
            let actual = self.check_expr(arg);
            if let Some((_, expected)) = params.get(i) {
                if !self.compatible(&actual, expected) {
                    self.handler.error(
                        format!("Type mismatch: argument {} expected {expected}, found {actual}", i + 1),
                        arg.span(),
                    );
                }
            }
        }
    }

    fn check_member(&mut self, e: &classc_par::ast::MemberExpr) -> TypeInfo {
        let recv_ty = self.check_expr(&e.receiver);
        if recv_ty.is_error() {
            return TypeInfo::error();
        }
        if !recv_ty.is_class() {
            self.handler.error(
                format!("cannot access member '{}' on non-class type {recv_ty}", e.member),
                e.span,
            );
            return TypeInfo::error();
        }
        match self.resolve_field(&recv_ty.name, &e.member) {
            Some((field, declaring_class)) => {
                if field.is_private && !self.accessible_from(&declaring_class) {
                    self.handler.error(
                        format!(
                            "private field '{}' is not accessible outside class '{declaring_class}'",
                            e.member
                        ),
                        e.span,
                    );
                }
                field.ty
            }
            None => {
                self.handler.error(
                    format!("class '{}' has no field '{}'", recv_ty.name, e.member),
                    e.span,
                );
                TypeInfo::error()
            }
        }
    }

    fn check_new(&mut self, e: &classc_par::ast::NewExpr) -> TypeInfo {
        match self.classes.get(&e.class_name).cloned() {
            Some(sig) => {
                match sig.constructor(&e.class_name) {
                    Some(ctor) => self.check_call_args(&ctor.params, &e.args, e.span),
                    None => {
                        for a in &e.args {
                            self.check_expr(a);
                        }
                        if !e.args.is_empty() {
                            self.handler.error(
                                format!("class '{}' has no constructor accepting arguments", e.class_name),
                                e.span,
                            );
                        }
                    }
                }
                TypeInfo::scalar(e.class_name.clone())
            }
            None => {
                for a in &e.args {
                    self.check_expr(a);
                }
                self.handler
                    .error(format!("Undefined class '{}'", e.class_name), e.span);
                TypeInfo::error()
            }
        }
    }

    fn check_index(&mut self, e: &classc_par::ast::IndexExpr) -> TypeInfo {
        let arr_ty = self.check_expr(&e.array);
        let idx_ty = self.check_expr(&e.index);
        if !arr_ty.is_error() && !arr_ty.is_array {
            self.handler
                .error(format!("cannot index non-array type {arr_ty}"), e.span);
        }
        if !idx_ty.is_error() && idx_ty != TypeInfo::int() {
            self.handler
                .error(format!("array index must be int, found {idx_ty}"), e.span);
        }
        TypeInfo::new(arr_ty.name.clone(), false)
    }

    // -- shared lookups --------------------------------------------------

    /// A private member is accessible only when the current-class slot
    /// matches the declaring class exactly - a subclass does not inherit
    /// access to its base's private members, it only inherits the members
    /// themselves.
    fn accessible_from(&self, declaring_class: &str) -> bool {
        self.current_class.as_deref() == Some(declaring_class)
    }

    fn compatible(&self, actual: &TypeInfo, expected: &TypeInfo) -> bool {
        types::is_compatible(actual, expected, &|n| {
            self.classes.get(n).and_then(|c| c.base.clone())
        })
    }

    fn resolve_field(&self, class_name: &str, field_name: &str) -> Option<(FieldSig, String)> {
        let mut current = class_name.to_string();
        loop {
            let sig = self.classes.get(&current)?;
            if let Some(field) = sig.fields.get(field_name) {
                return Some((field.clone(), current));
            }
            current = sig.base.clone()?;
        }
    }

    fn resolve_method(&self, class_name: &str, method_name: &str) -> Option<(FunctionSig, String)> {
        let mut current = class_name.to_string();
        loop {
            let sig = self.classes.get(&current)?;
            if let Some(method) = sig.methods.get(method_name) {
                return Some((method.clone(), current));
            }
            current = sig.base.clone()?;
        }
    }
}
