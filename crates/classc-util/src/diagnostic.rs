//! Diagnostic collection shared by every pipeline stage.
//!
//! Each stage owns a [`Handler`], pushes a [`Diagnostic`] for every problem
//! it finds, and keeps going rather than aborting on the first one — the
//! lexer still tokenizes the rest of the file after an invalid token, the
//! parser still synchronizes and resumes after a syntax error, and the
//! semantic analyzer still visits every remaining declaration. The
//! `classc-drv` facade is the only place that looks at `has_errors()` to
//! decide whether to run the next stage.

use crate::Span;
use std::fmt;

/// Severity of a diagnostic. The core pipeline only ever emits `Error`,
/// but the type exists so a future lint pass (outside this spec's scope)
/// has somewhere to put warnings without redesigning this module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// A single diagnostic message bound to a source location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
        }
    }

    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.level, self.message, self.span)
    }
}

/// Accumulates diagnostics for one pipeline stage.
#[derive(Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    pub fn error(&mut self, message: impl Into<String>, span: Span) {
        self.report(Diagnostic::error(message, span));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == Level::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Folds another handler's diagnostics into this one, preserving
    /// source order (each stage's output is already in source order, and
    /// stages run strictly left to right, so a simple append is correct).
    pub fn extend(&mut self, other: Handler) {
        self.diagnostics.extend(other.diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_tracks_errors() {
        let mut h = Handler::new();
        assert!(!h.has_errors());
        h.error("bad token", Span::DUMMY);
        assert!(h.has_errors());
        assert_eq!(h.diagnostics().len(), 1);
    }
}
