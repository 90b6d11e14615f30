//! Reference-counted string dictionary backed by an AA tree.
//!
//! Equal content always maps to the same [`Symbol`] while its entry is alive.
//! Every [`Interner::insert`] of existing content bumps the entry's reference
//! count and every [`Interner::release`] drops it; the entry is removed from
//! the tree when the count reaches zero.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use arbor_arena::{ArenaStats, Blobs, DEFAULT_BLOB_SIZE, Span};

mod aa;
#[cfg(test)]
mod tests;

/// Handle to an interned string.
///
/// Symbols carry a generation, so resolving a symbol whose entry was removed
/// panics instead of returning whatever string took its slot. They also
/// remember their interner, and any other interner rejects them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    owner: u32,
    index: u32,
    generation: u32,
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}v{})", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    span: Span,
    refs: u32,
    generation: u32,
}

type NodeIdx = u32;

#[derive(Debug, Clone, Copy)]
struct AaNode {
    left: Option<NodeIdx>,
    right: Option<NodeIdx>,
    level: u32,
    /// Entry slot holding this node's content and count.
    entry: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InternerStats {
    /// Number of live entries.
    pub entries: usize,
    pub arena: ArenaStats,
}

static NEXT_INTERNER: AtomicU32 = AtomicU32::new(0);

/// String dictionary handing out [`Symbol`]s.
///
/// The bytes of a removed entry are not reclaimed: they stay in their blob
/// until [`Interner::clear`] or drop. Interning an endless stream of distinct
/// strings, even while releasing the old ones, grows memory without bound.
#[derive(Debug)]
pub struct Interner {
    id: u32,
    blobs: Blobs,
    nodes: Vec<AaNode>,
    free_nodes: Vec<NodeIdx>,
    entries: Vec<Entry>,
    free_entries: Vec<u32>,
    root: Option<NodeIdx>,
    len: usize,
}

impl Default for Interner {
    fn default() -> Self {
        Self::with_blob_size(DEFAULT_BLOB_SIZE)
    }
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob_size(blob_size: usize) -> Self {
        Self {
            id: NEXT_INTERNER.fetch_add(1, AtomicOrdering::Relaxed),
            blobs: Blobs::new(blob_size),
            nodes: Vec::new(),
            free_nodes: Vec::new(),
            entries: Vec::new(),
            free_entries: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Finds the symbol for `text` without touching any reference count.
    pub fn lookup(&self, text: &str) -> Option<Symbol> {
        let mut cursor = self.root;
        while let Some(node) = cursor {
            let node = &self.nodes[node as usize];
            cursor = match text.cmp(self.entry_text(node.entry)) {
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
                std::cmp::Ordering::Equal => return Some(self.symbol(node.entry)),
            };
        }
        None
    }

    /// Interns `text`, returning its canonical symbol.
    ///
    /// Existing content has its reference count incremented; new content is
    /// copied into the interner with a count of one.
    pub fn insert(&mut self, text: &str) -> Symbol {
        let mut found = None;
        let root = self.insert_at(self.root, text, &mut found);
        self.root = Some(root);
        match found {
            Some(entry) => self.symbol(entry),
            None => unreachable!("insert always yields an entry"),
        }
    }

    /// Drops one reference to `text`. Absent content is ignored.
    pub fn delete(&mut self, text: &str) {
        if let Some(symbol) = self.lookup(text) {
            self.release(symbol);
        }
    }

    /// Adds a reference to a live symbol.
    #[track_caller]
    pub fn retain(&mut self, symbol: Symbol) {
        let entry = self.live_entry_mut(symbol);
        entry.refs += 1;
    }

    /// Drops a reference to a live symbol and returns the remaining count.
    ///
    /// At zero the entry is removed and `symbol` becomes stale. The entry's
    /// bytes stay allocated until the interner is cleared.
    #[track_caller]
    pub fn release(&mut self, symbol: Symbol) -> u32 {
        let entry = self.live_entry_mut(symbol);
        if entry.refs > 1 {
            entry.refs -= 1;
            return entry.refs;
        }
        let key = entry.span;
        self.root = self.delete_at(self.root, key);
        0
    }

    #[track_caller]
    pub fn resolve(&self, symbol: Symbol) -> &str {
        let entry = self.live_entry(symbol);
        self.blobs.get(entry.span)
    }

    #[track_caller]
    pub fn refcount(&self, symbol: Symbol) -> u32 {
        self.live_entry(symbol).refs
    }

    /// Returns `true` if `symbol` still names a live entry.
    pub fn is_live(&self, symbol: Symbol) -> bool {
        self.entries
            .get(symbol.index as usize)
            .filter(|_| symbol.owner == self.id)
            .is_some_and(|entry| entry.refs > 0 && entry.generation == symbol.generation)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every entry regardless of reference counts.
    ///
    /// All symbols handed out so far become stale.
    pub fn clear(&mut self) {
        tracing::debug!(entries = self.len, "clearing interner");
        self.free_entries.clear();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.refs > 0 {
                entry.refs = 0;
                entry.generation = entry.generation.wrapping_add(1);
            }
            self.free_entries.push(index as u32);
        }
        self.nodes.clear();
        self.free_nodes.clear();
        self.root = None;
        self.len = 0;
        self.blobs.clear();
    }

    /// Walks the entries in byte-lexicographic order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { interner: self, stack: Vec::new() };
        iter.push_left(self.root);
        iter
    }

    pub fn stats(&self) -> InternerStats {
        InternerStats { entries: self.len, arena: self.blobs.stats() }
    }

    fn symbol(&self, entry: u32) -> Symbol {
        Symbol { owner: self.id, index: entry, generation: self.entries[entry as usize].generation }
    }

    fn entry_text(&self, entry: u32) -> &str {
        self.blobs.get(self.entries[entry as usize].span)
    }

    #[track_caller]
    fn live_entry(&self, symbol: Symbol) -> &Entry {
        self.check_owner(symbol);
        match self.entries.get(symbol.index as usize) {
            Some(entry) if entry.refs > 0 && entry.generation == symbol.generation => entry,
            _ => panic!("{symbol:?} was released"),
        }
    }

    #[track_caller]
    fn live_entry_mut(&mut self, symbol: Symbol) -> &mut Entry {
        self.check_owner(symbol);
        match self.entries.get_mut(symbol.index as usize) {
            Some(entry) if entry.refs > 0 && entry.generation == symbol.generation => entry,
            _ => panic!("{symbol:?} was released"),
        }
    }

    #[track_caller]
    fn check_owner(&self, symbol: Symbol) {
        assert!(symbol.owner == self.id, "{symbol:?} belongs to another interner");
    }

    fn alloc_entry(&mut self, text: &str) -> u32 {
        let span = self.blobs.alloc_str(text);
        match self.free_entries.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.span = span;
                entry.refs = 1;
                index
            }
            None => {
                self.entries.push(Entry { span, refs: 1, generation: 0 });
                (self.entries.len() - 1) as u32
            }
        }
    }

    fn free_entry(&mut self, index: u32) {
        let entry = &mut self.entries[index as usize];
        tracing::trace!(entry = index, "removing interned string");
        entry.refs = 0;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_entries.push(index);
    }

    fn alloc_node(&mut self, entry: u32) -> NodeIdx {
        let node = AaNode { left: None, right: None, level: 1, entry };
        match self.free_nodes.pop() {
            Some(index) => {
                self.nodes[index as usize] = node;
                index
            }
            None => {
                self.nodes.push(node);
                (self.nodes.len() - 1) as NodeIdx
            }
        }
    }
}

pub struct Iter<'a> {
    interner: &'a Interner,
    stack: Vec<NodeIdx>,
}

impl Iter<'_> {
    fn push_left(&mut self, mut cursor: Option<NodeIdx>) {
        while let Some(node) = cursor {
            self.stack.push(node);
            cursor = self.interner.nodes[node as usize].left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (Symbol, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let node = self.interner.nodes[node as usize];
        self.push_left(node.right);
        Some((self.interner.symbol(node.entry), self.interner.entry_text(node.entry)))
    }
}

impl<'a> IntoIterator for &'a Interner {
    type Item = (Symbol, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
