//! Source positions and spans.
//!
//! The language's own lexer convention is unusual and we preserve it
//! deliberately rather than normalize it away: line numbers are 1-based,
//! but column numbers are 0-based and count every character consumed,
//! including the first character of whatever token is being scanned. The
//! end-of-file token reports `(-1, -1)` instead of a real position. See
//! `classc-lex` for the cursor that produces these values.

use std::fmt;

/// A single point in the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    /// 1-based line number, or -1 for the synthetic end-of-file position.
    pub line: i32,
    /// 0-based column number, or -1 for the synthetic end-of-file position.
    pub column: i32,
}

impl Position {
    pub const DUMMY: Position = Position { line: 0, column: 0 };
    pub const EOF: Position = Position {
        line: -1,
        column: -1,
    };

    pub const fn new(line: i32, column: i32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source range, anchored at the position of its first character.
///
/// Spans are deliberately thin: nothing downstream needs a byte range into
/// the original text, only the line/column pair that diagnostics print.
/// Every token and every AST node carries one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
}

impl Span {
    pub const DUMMY: Span = Span {
        start: Position::DUMMY,
    };

    pub const fn new(line: i32, column: i32) -> Self {
        Self {
            start: Position::new(line, column),
        }
    }

    pub const fn at(start: Position) -> Self {
        Self { start }
    }

    pub fn line(&self) -> i32 {
        self.start.line
    }

    pub fn column(&self) -> i32 {
        self.start.column
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}
