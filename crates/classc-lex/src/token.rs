//! Token kinds and the `Token` value itself.

use classc_util::Span;
use std::fmt;

/// The closed set of token kinds the lexer ever produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    /// A lexical error: the lexeme captured is whatever partial text was
    /// consumed before the scanner gave up (see `classc-lex::lexer`).
    Invalid,

    Ident,
    IntLit,
    FloatLit,
    StringLit,
    CharLit,

    // Keywords
    KwClass,
    KwFn,
    KwLet,
    KwNew,
    KwIf,
    KwElse,
    KwWhile,
    KwFor,
    KwReturn,
    KwBreak,
    KwContinue,
    KwTrue,
    KwFalse,
    KwInt,
    KwFloat,
    KwBool,
    KwChar,
    KwString,
    KwVoid,

    // Arithmetic and compound assignment
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,

    // Assignment and comparison
    Assign,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Semicolon,
    Colon,
    Comma,
    Dot,
    Hash,
}

impl TokenKind {
    /// Looks up the keyword kind for `text`, if any. Anything that doesn't
    /// match the fixed keyword table is an ordinary identifier.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match text {
            "class" => KwClass,
            "fn" => KwFn,
            "let" => KwLet,
            "new" => KwNew,
            "if" => KwIf,
            "else" => KwElse,
            "while" => KwWhile,
            "for" => KwFor,
            "return" => KwReturn,
            "break" => KwBreak,
            "continue" => KwContinue,
            "true" => KwTrue,
            "false" => KwFalse,
            "int" => KwInt,
            "float" => KwFloat,
            "bool" => KwBool,
            "char" => KwChar,
            "string" => KwString,
            "void" => KwVoid,
            _ => return None,
        })
    }

    /// Whether this keyword denotes one of the six primitive type words.
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::KwInt
                | TokenKind::KwFloat
                | TokenKind::KwBool
                | TokenKind::KwChar
                | TokenKind::KwString
                | TokenKind::KwVoid
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An immutable, positioned token. Once the lexer emits one it is never
/// mutated by any later stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The literal text as captured from the source. For string and char
    /// literals this includes the surrounding quotes verbatim; the parser
    /// and code generator are responsible for stripping/unescaping as
    /// needed.
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, "", span)
    }

    pub fn line(&self) -> i32 {
        self.span.line()
    }

    pub fn column(&self) -> i32 {
        self.span.column()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind, self.text)
    }
}
