//! Per-walk occurrence counting and flat key naming.

use std::any::TypeId;
use std::collections::HashMap;

/// Mutable per-invocation walk state: one occurrence counter per record
/// type identity.
///
/// A context is created fresh for every top-level export/import call,
/// exclusively owned by that call, and discarded at the end. Sharing one
/// across walks would leak counters between unrelated record graphs.
#[derive(Debug, Default)]
pub struct WalkContext {
    counters: HashMap<TypeId, usize>,
}

impl WalkContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record entry into a new instance of `ty` and return the index its
    /// fields are named under.
    ///
    /// The counter must be bumped before the first field of an instance is
    /// named and held constant while the rest of that instance's immediate
    /// fields are named; callers do this by entering exactly once per
    /// instance, up front.
    pub fn enter(&mut self, ty: TypeId) -> usize {
        let count = self.counters.entry(ty).or_insert(0);
        *count += 1;
        *count - 1
    }

    /// Index of the most recently entered instance of `ty`.
    ///
    /// An untouched counter resolves to index 0, the same as a first
    /// occurrence. Two unrelated record types sharing a tag can therefore
    /// both name `tag_0`; that collision is the caller's to avoid.
    pub fn index_of(&self, ty: TypeId) -> usize {
        self.counters.get(&ty).copied().unwrap_or(0).saturating_sub(1)
    }
}

/// Flat key for a tagged field of the `index`-th instance of its enclosing
/// record type, or `None` when the field is untagged.
pub fn key_for(tag: Option<&str>, index: usize) -> Option<String> {
    tag.map(|tag| format!("{tag}_{index}"))
}
