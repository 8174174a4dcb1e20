//! String interning.
//!
//! The compiler is single-threaded and re-entrant per [`Interner`] instance
//! (see the concurrency notes on the `classc-drv` facade), so unlike a
//! multi-threaded toolchain we don't need a lock-free global table: a plain
//! `FxHashMap` keyed on the string, with a side `Vec` for the reverse
//! lookup, is the whole implementation.

use crate::FxHashMap;
use std::fmt;

/// A cheap, comparable handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Owns the canonical copy of every identifier text seen during a
/// compilation and hands out [`Symbol`] handles for it.
#[derive(Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, Symbol>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `text`, returning the existing symbol if it was seen before.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&sym) = self.lookup.get(text) {
            return sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        let boxed: Box<str> = text.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, sym);
        sym
    }

    /// Resolves a symbol back to its text.
    ///
    /// # Panics
    /// Panics if `sym` was not produced by this interner.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_deduplicates() {
        let mut interner = Interner::new();
        let a = interner.intern("Animal");
        let b = interner.intern("Animal");
        let c = interner.intern("Dog");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "Animal");
        assert_eq!(interner.resolve(c), "Dog");
    }
}
