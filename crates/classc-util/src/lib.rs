//! classc-util - Shared foundation types for the classc pipeline.
//!
//! ============================================================================
//! WHY A SHARED UTILITY CRATE
//! ============================================================================
//!
//! Every stage of the pipeline — lexer, parser, semantic analyzer, code
//! generator — needs to answer the same two questions about anything it
//! touches: *where in the source did this come from* and *what do I call
//! this thing going forward*. Rather than let each crate invent its own
//! answer, `classc-util` is the single place that defines:
//!
//! - [`Span`] / [`Position`]: source locations, carried on every token and
//!   AST node so diagnostics can always point at the right place.
//! - [`Symbol`] / [`Interner`]: cheap, comparable handles for identifier
//!   text, so a symbol table lookup is a hash of a small integer rather
//!   than a string compare.
//! - [`Diagnostic`] / [`Level`] / [`Handler`]: a uniform way for any stage
//!   to accumulate errors without aborting, which is what lets the
//!   semantic analyzer visit an entire program and report every mistake
//!   it finds instead of stopping at the first one.
//!
//! None of these types know anything about classes, methods, or C code —
//! that knowledge lives in the crates that use them.

pub mod diagnostic;
pub mod error;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use error::UtilError;
pub use span::{Position, Span};
pub use symbol::{Interner, Symbol};

pub use rustc_hash::{FxHashMap, FxHashSet};
