//! Abstract syntax tree produced by the parser.
//!
//! The AST is a plain value tree: the parser builds it and every later
//! stage only reads it. Every node that can be the target of a diagnostic
//! carries a [`Span`] pointing at its first token.

use classc_util::Span;

/// A whole compilation unit: an ordered sequence of class and free
/// function declarations, in the order they appeared in the source.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub enum Item {
    Class(ClassDecl),
    Function(FunctionDecl),
}

/// A type reference: one of the six primitive words, or a class name,
/// with an `is_array` flag for the `T[]` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub name: String,
    pub is_array: bool,
    pub span: Span,
}

impl Type {
    pub fn new(name: impl Into<String>, is_array: bool, span: Span) -> Self {
        Self {
            name: name.into(),
            is_array,
            span,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.name.as_str(),
            "int" | "float" | "bool" | "char" | "string" | "void"
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// One of the six assignment forms: plain `=` plus the five compound
/// arithmetic assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

#[derive(Debug, Clone)]
pub struct LitExpr {
    /// Raw text as captured by the lexer. For string and char literals
    /// this includes the surrounding quotes; the code generator is what
    /// strips and re-escapes them for the C target.
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BoolExpr {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IdentExpr {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// `receiver.member`, or `receiver.#member` when `private` is set.
#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub receiver: Box<Expr>,
    pub member: String,
    pub private: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct NewExpr {
    pub class_name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Int(LitExpr),
    Float(LitExpr),
    Str(LitExpr),
    Char(LitExpr),
    Bool(BoolExpr),
    Ident(IdentExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Call(CallExpr),
    Member(MemberExpr),
    New(NewExpr),
    Index(IndexExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int(e) | Expr::Float(e) | Expr::Str(e) | Expr::Char(e) => e.span,
            Expr::Bool(e) => e.span,
            Expr::Ident(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::New(e) => e.span,
            Expr::Index(e) => e.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub name: String,
    pub ty: Option<Type>,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub target: Expr,
    pub op: AssignOp,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Block,
    /// `else { ... }` or `else if ...` (the latter represented as a
    /// single-statement block wrapping a nested `If`).
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub update: Option<Box<Stmt>>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl(VarDeclStmt),
    Assign(AssignStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Break(Span),
    Continue(Span),
    Block(Block),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub ret_type: Option<Type>,
    /// Absent for declarations that failed to parse a body; always
    /// present for a successfully parsed function or method.
    pub body: Option<Block>,
    pub is_private: bool,
    pub is_override: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
    pub is_private: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub base: Option<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}
