//! Statement and expression lowering: walks the AST bodies the semantic
//! analyzer already accepted and writes the matching C text. Nothing here
//! raises a diagnostic - by the time this runs the program is known to be
//! well-typed, so every case below has exactly one way to lower.

use classc_par::ast::{
    AssignOp, AssignStmt, BinOp, ClassDecl, Expr, ForStmt, FunctionDecl, IfStmt, MemberExpr, Stmt,
    UnOp, VarDeclStmt, WhileStmt,
};
use classc_sem::{ClassSig, FunctionSig, TypeInfo};
use indexmap::IndexMap;

use crate::infer::TypeEnv;
use crate::layout;
use crate::lower::lower_type;
use crate::mangle;

/// The C identifier a free function is emitted under. `main` is special:
/// its body is renamed so a synthesized `main` (see
/// [`Emitter::bootstrap_main`]) can initialize every vtable before
/// calling it.
fn free_fn_c_name(name: &str) -> String {
    if name == "main" {
        "__classc_main".to_string()
    } else {
        name.to_string()
    }
}

pub struct Emitter<'a> {
    classes: &'a IndexMap<String, ClassSig>,
    functions: &'a IndexMap<String, FunctionSig>,
    buf: String,
    indent: usize,
}

impl<'a> Emitter<'a> {
    pub fn new(classes: &'a IndexMap<String, ClassSig>, functions: &'a IndexMap<String, FunctionSig>) -> Self {
        Self {
            classes,
            functions,
            buf: String::new(),
            indent: 0,
        }
    }

    pub fn into_text(self) -> String {
        self.buf
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.buf.push('\n');
        } else {
            for _ in 0..self.indent {
                self.buf.push_str("    ");
            }
            self.buf.push_str(text);
            self.buf.push('\n');
        }
    }

    // -- free functions ---------------------------------------------------

    pub fn function_prototype(&mut self, f: &FunctionDecl) {
        let ret = f
            .ret_type
            .as_ref()
            .map(|t| lower_type(&TypeInfo::new(t.name.clone(), t.is_array)))
            .unwrap_or_else(|| "void".to_string());
        let params = self.params_to_c(&f.params, None);
        self.line(format!("{ret} {}({params});", free_fn_c_name(&f.name)));
    }

    pub fn function_def(&mut self, f: &FunctionDecl) {
        let Some(body) = &f.body else { return };
        let ret_ty = f
            .ret_type
            .as_ref()
            .map(|t| TypeInfo::new(t.name.clone(), t.is_array))
            .unwrap_or_else(TypeInfo::void);
        let params = self.params_to_c(&f.params, None);
        self.line(format!(
            "{} {}({params}) {{",
            lower_type(&ret_ty),
            free_fn_c_name(&f.name)
        ));
        self.indent += 1;
        let mut env = TypeEnv::new(self.classes, self.functions);
        for p in &f.params {
            env.declare(&p.name, TypeInfo::new(p.ty.name.clone(), p.ty.is_array));
        }
        self.block_stmts(&body.stmts, &mut env);
        self.indent -= 1;
        self.line("}");
        self.line("");
    }

    /// Emits `int main(void)` itself: every class's `_vtable_init` called
    /// in declaration order, then the user's own `main` (renamed to
    /// `__classc_main` by [`free_fn_c_name`]), forwarding its return value
    /// when it has one.
    pub fn bootstrap_main(&mut self, class_order: &[String], user_main_ret_void: bool) {
        self.line("int main(void) {");
        self.indent += 1;
        for class in class_order {
            self.line(format!("{}();", mangle::vtable_init_fn_name(class)));
        }
        if user_main_ret_void {
            self.line("__classc_main();");
            self.line("return 0;");
        } else {
            self.line("return __classc_main();");
        }
        self.indent -= 1;
        self.line("}");
        self.line("");
    }

    // -- classes ------------------------------------------------------------

    pub fn class_forward_typedefs(&mut self, class: &ClassDecl) {
        self.line(format!("typedef struct {0} {0};", class.name));
        self.line(format!(
            "typedef struct {0} {0};",
            mangle::vtable_type_name(&class.name)
        ));
    }

    pub fn class_struct(&mut self, class: &ClassDecl) {
        self.line(format!("struct {} {{", class.name));
        self.indent += 1;
        self.line(format!(
            "{}* {};",
            mangle::vtable_type_name(&class.name),
            mangle::vtable_field_name()
        ));
        for (name, field) in layout::flattened_fields(self.classes, &class.name) {
            self.line(format!("{} {};", lower_type(&field.ty), name));
        }
        self.indent -= 1;
        self.line("};");
        self.line("");
    }

    pub fn class_vtable(&mut self, class: &ClassDecl) {
        let vtable_ty = mangle::vtable_type_name(&class.name);
        self.line(format!("struct {vtable_ty} {{"));
        self.indent += 1;
        for slot in layout::vtable_slots(self.classes, &class.name) {
            let ret = slot
                .sig
                .ret_type
                .clone()
                .map(|t| lower_type(&t))
                .unwrap_or_else(|| "void".to_string());
            let params = self.params_to_c_sigs(&slot.sig.params, Some(&class.name));
            self.line(format!("{ret} (*{})({params});", slot.method));
        }
        self.indent -= 1;
        self.line("};");
        self.line(format!("{vtable_ty} {}_vtable_instance;", class.name));
        self.line("");
    }

    pub fn class_method_prototypes(&mut self, class: &ClassDecl) {
        for method in &class.methods {
            self.line(self.method_prototype_line(class, method));
        }
    }

    fn method_prototype_line(&self, class: &ClassDecl, method: &FunctionDecl) -> String {
        if mangle::is_constructor(&class.name, &method.name) {
            let params = self.params_to_c(&method.params, None);
            format!("{}* {}({params});", class.name, mangle::ctor_fn_name(&class.name))
        } else {
            let ret = method
                .ret_type
                .as_ref()
                .map(|t| lower_type(&TypeInfo::new(t.name.clone(), t.is_array)))
                .unwrap_or_else(|| "void".to_string());
            let params = self.params_to_c(&method.params, Some(&class.name));
            format!("{ret} {}({params});", mangle::method_fn_name(&class.name, &method.name))
        }
    }

    pub fn class_methods(&mut self, class: &ClassDecl) {
        for method in &class.methods {
            self.method_def(class, method);
        }
        self.vtable_init(class);
    }

    fn method_def(&mut self, class: &ClassDecl, method: &FunctionDecl) {
        let Some(body) = &method.body else { return };
        let mut env = TypeEnv::new(self.classes, self.functions);

        if mangle::is_constructor(&class.name, &method.name) {
            let params = self.params_to_c(&method.params, None);
            self.line(format!(
                "{}* {}({params}) {{",
                class.name,
                mangle::ctor_fn_name(&class.name)
            ));
            self.indent += 1;
            self.line(format!("{0}* self = ({0}*)malloc(sizeof({0}));", class.name));
            self.line(format!(
                "self->{} = &{}_vtable_instance;",
                mangle::vtable_field_name(),
                class.name
            ));
            env.declare("this", TypeInfo::scalar(class.name.clone()));
            for p in &method.params {
                env.declare(&p.name, TypeInfo::new(p.ty.name.clone(), p.ty.is_array));
            }
            self.block_stmts(&body.stmts, &mut env);
            self.line("return self;");
            self.indent -= 1;
            self.line("}");
        } else {
            let ret_ty = method
                .ret_type
                .as_ref()
                .map(|t| TypeInfo::new(t.name.clone(), t.is_array))
                .unwrap_or_else(TypeInfo::void);
            let params = self.params_to_c(&method.params, Some(&class.name));
            self.line(format!(
                "{} {}({params}) {{",
                lower_type(&ret_ty),
                mangle::method_fn_name(&class.name, &method.name)
            ));
            self.indent += 1;
            env.declare("this", TypeInfo::scalar(class.name.clone()));
            for p in &method.params {
                env.declare(&p.name, TypeInfo::new(p.ty.name.clone(), p.ty.is_array));
            }
            self.block_stmts(&body.stmts, &mut env);
            self.indent -= 1;
            self.line("}");
        }
        self.line("");
    }

    /// Walks the class, then its base, stopping at the first implementation
    /// found for each slot - `layout::vtable_slots` already did that walk
    /// and recorded the winning class on each slot.
    fn vtable_init(&mut self, class: &ClassDecl) {
        self.line(format!("void {}() {{", mangle::vtable_init_fn_name(&class.name)));
        self.indent += 1;
        for slot in layout::vtable_slots(self.classes, &class.name) {
            self.line(format!(
                "{}_vtable_instance.{} = {};",
                class.name,
                slot.method,
                mangle::method_fn_name(&slot.implementor, &slot.method)
            ));
        }
        self.indent -= 1;
        self.line("}");
        self.line("");
    }

    // -- parameter lists ----------------------------------------------------

    fn params_to_c(&self, params: &[classc_par::ast::Param], self_class: Option<&str>) -> String {
        let mut parts = Vec::new();
        if let Some(class) = self_class {
            parts.push(format!("{class}* self"));
        }
        for p in params {
            let ty = lower_type(&TypeInfo::new(p.ty.name.clone(), p.ty.is_array));
            parts.push(format!("{ty} {}", p.name));
        }
        if parts.is_empty() {
            "void".to_string()
        } else {
            parts.join(", ")
        }
    }

    fn params_to_c_sigs(&self, params: &[(String, TypeInfo)], self_class: Option<&str>) -> String {
        let mut parts = Vec::new();
        if let Some(class) = self_class {
            parts.push(format!("{class}* self"));
        }
        for (name, ty) in params {
            parts.push(format!("{} {name}", lower_type(ty)));
        }
        if parts.is_empty() {
            "void".to_string()
        } else {
            parts.join(", ")
        }
    }

    // -- statements -----------------------------------------------------

    fn block_stmts(&mut self, stmts: &[Stmt], env: &mut TypeEnv) {
        for s in stmts {
            self.stmt(s, env);
        }
    }

    fn stmt(&mut self, stmt: &Stmt, env: &mut TypeEnv) {
        match stmt {
            Stmt::VarDecl(s) => self.var_decl(s, env),
            Stmt::Assign(s) => self.assign(s, env),
            Stmt::If(s) => self.if_stmt(s, env),
            Stmt::While(s) => self.while_stmt(s, env),
            Stmt::For(s) => self.for_stmt(s, env),
            Stmt::Return(s) => {
                match &s.value {
                    Some(e) => self.line(format!("return {};", self.expr(e, env))),
                    None => self.line("return;"),
                }
            }
            Stmt::Break(_) => self.line("break;"),
            Stmt::Continue(_) => self.line("continue;"),
            Stmt::Block(b) => {
                self.line("{");
                self.indent += 1;
                env.push();
                self.block_stmts(&b.stmts, env);
                env.pop();
                self.indent -= 1;
                self.line("}");
            }
            Stmt::Expr(e) => self.line(format!("{};", self.expr(e, env))),
        }
    }

    fn var_decl(&mut self, s: &VarDeclStmt, env: &mut TypeEnv) {
        let ty = match &s.ty {
            Some(t) => TypeInfo::new(t.name.clone(), t.is_array),
            None => s
                .init
                .as_ref()
                .map(|e| env.infer(e))
                .unwrap_or_else(TypeInfo::error),
        };
        let c_ty = lower_type(&ty);
        match &s.init {
            Some(e) => {
                let init = self.expr(e, env);
                self.line(format!("{c_ty} {} = {init};", s.name));
            }
            None => self.line(format!("{c_ty} {};", s.name)),
        }
        env.declare(&s.name, ty);
    }

    fn assign(&mut self, s: &AssignStmt, env: &mut TypeEnv) {
        let target = self.expr(&s.target, env);
        let value = self.expr(&s.value, env);
        let op = match s.op {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
        };
        self.line(format!("{target} {op} {value};"));
    }

    fn if_stmt(&mut self, s: &IfStmt, env: &mut TypeEnv) {
        let cond = self.expr(&s.cond, env);
        self.line(format!("if ({cond}) {{"));
        self.indent += 1;
        env.push();
        self.block_stmts(&s.then_branch.stmts, env);
        env.pop();
        self.indent -= 1;
        match &s.else_branch {
            Some(else_stmt) => {
                self.line("} else {");
                self.indent += 1;
                env.push();
                self.stmt(else_stmt, env);
                env.pop();
                self.indent -= 1;
                self.line("}");
            }
            None => self.line("}"),
        }
    }

    fn while_stmt(&mut self, s: &WhileStmt, env: &mut TypeEnv) {
        let cond = self.expr(&s.cond, env);
        self.line(format!("while ({cond}) {{"));
        self.indent += 1;
        env.push();
        self.block_stmts(&s.body.stmts, env);
        env.pop();
        self.indent -= 1;
        self.line("}");
    }

    /// Lowered to a genuine C `for`, not a `while` with a manually replayed
    /// update - `continue` inside a C `for` still runs the update clause,
    /// which is the behavior a source-level `continue` should have.
    fn for_stmt(&mut self, s: &ForStmt, env: &mut TypeEnv) {
        env.push();
        let init = s
            .init
            .as_ref()
            .map(|stmt| self.header_fragment(stmt, env))
            .unwrap_or_default();
        let cond = s
            .cond
            .as_ref()
            .map(|e| self.expr(e, env))
            .unwrap_or_else(|| "1".to_string());
        let update = s
            .update
            .as_ref()
            .map(|stmt| self.header_fragment(stmt, env))
            .unwrap_or_default();
        self.line(format!("for ({init}; {cond}; {update}) {{"));
        self.indent += 1;
        self.block_stmts(&s.body.stmts, env);
        self.indent -= 1;
        self.line("}");
        env.pop();
    }

    /// Renders a `for`-header init/update statement as a bare C fragment
    /// (no trailing semicolon, no newline) - the only statement shapes the
    /// grammar allows there are a `let` binding or an assignment/expression.
    fn header_fragment(&mut self, stmt: &Stmt, env: &mut TypeEnv) -> String {
        match stmt {
            Stmt::VarDecl(s) => {
                let ty = match &s.ty {
                    Some(t) => TypeInfo::new(t.name.clone(), t.is_array),
                    None => s
                        .init
                        .as_ref()
                        .map(|e| env.infer(e))
                        .unwrap_or_else(TypeInfo::error),
                };
                let c_ty = lower_type(&ty);
                let text = match &s.init {
                    Some(e) => format!("{c_ty} {} = {}", s.name, self.expr(e, env)),
                    None => format!("{c_ty} {}", s.name),
                };
                env.declare(&s.name, ty);
                text
            }
            Stmt::Assign(s) => {
                let target = self.expr(&s.target, env);
                let value = self.expr(&s.value, env);
                let op = match s.op {
                    AssignOp::Assign => "=",
                    AssignOp::AddAssign => "+=",
                    AssignOp::SubAssign => "-=",
                    AssignOp::MulAssign => "*=",
                    AssignOp::DivAssign => "/=",
                    AssignOp::ModAssign => "%=",
                };
                format!("{target} {op} {value}")
            }
            Stmt::Expr(e) => self.expr(e, env),
            _ => String::new(),
        }
    }

    // -- expressions ------------------------------------------------------

    fn expr(&self, expr: &Expr, env: &mut TypeEnv) -> String {
        match expr {
            Expr::Int(e) => e.value.clone(),
            Expr::Float(e) => e.value.clone(),
            Expr::Str(e) => e.value.clone(),
            Expr::Char(e) => e.value.clone(),
            Expr::Bool(e) => if e.value { "true" } else { "false" }.to_string(),
            Expr::Ident(e) if e.name == "this" => "self".to_string(),
            Expr::Ident(e) => e.name.clone(),
            Expr::Binary(e) => {
                let l = self.expr(&e.left, env);
                let r = self.expr(&e.right, env);
                format!("({l} {} {r})", binop_c(e.op))
            }
            Expr::Unary(e) => {
                let operand = self.expr(&e.operand, env);
                match e.op {
                    UnOp::Neg => format!("(-{operand})"),
                    UnOp::Not => format!("(!{operand})"),
                }
            }
            Expr::Call(e) => self.call_expr(e, env),
            Expr::Member(e) => self.member_expr(e, env),
            Expr::New(e) => {
                let args: Vec<_> = e.args.iter().map(|a| self.expr(a, env)).collect();
                format!("{}({})", mangle::ctor_fn_name(&e.class_name), args.join(", "))
            }
            Expr::Index(e) => {
                let arr = self.expr(&e.array, env);
                let idx = self.expr(&e.index, env);
                format!("{arr}[{idx}]")
            }
        }
    }

    fn call_expr(&self, e: &classc_par::ast::CallExpr, env: &mut TypeEnv) -> String {
        if let Expr::Member(member) = e.callee.as_ref() {
            let recv = self.expr(&member.receiver, env);
            let mut args = vec![recv.clone()];
            args.extend(e.args.iter().map(|a| self.expr(a, env)));
            return format!(
                "{recv}->{}->{}({})",
                mangle::vtable_field_name(),
                member.member,
                args.join(", ")
            );
        }
        if let Expr::Ident(ident) = e.callee.as_ref() {
            if ident.name == "print" {
                return self.print_call(&e.args, env);
            }
            if ident.name == "read" {
                let arg = self.expr(&e.args[0], env);
                return format!(r#"scanf("%d", &{arg})"#);
            }
            let args: Vec<_> = e.args.iter().map(|a| self.expr(a, env)).collect();
            return format!("{}({})", free_fn_c_name(&ident.name), args.join(", "));
        }
        let callee = self.expr(&e.callee, env);
        let args: Vec<_> = e.args.iter().map(|a| self.expr(a, env)).collect();
        format!("{callee}({})", args.join(", "))
    }

    /// Dispatches on the argument's static type (from [`TypeEnv::infer`])
    /// rather than its syntactic literal form, so `print(someFloatVar)`
    /// gets `%f` instead of silently falling back to `%s`.
    fn print_call(&self, args: &[Expr], env: &mut TypeEnv) -> String {
        if args.is_empty() {
            return r#"printf("\n")"#.to_string();
        }
        let arg_text = self.expr(&args[0], env);
        let ty = env.infer(&args[0]);
        let fmt = if ty.is_array {
            "%p"
        } else {
            match ty.name.as_str() {
                "string" => "%s",
                "int" => "%d",
                "float" => "%f",
                "char" => "%c",
                "bool" => "%d",
                _ if ty.is_class() => "%p",
                _ => "%s",
            }
        };
        format!(r#"printf("{fmt}\n", {arg_text})"#)
    }

    fn member_expr(&self, e: &MemberExpr, env: &mut TypeEnv) -> String {
        let recv = self.expr(&e.receiver, env);
        format!("{recv}->{}", e.member)
    }
}

fn binop_c(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}
