//! AA tree balancing.
//!
//! Nodes are addressed by index and subtrees are rebuilt by returning the new
//! subtree root, so every recursive call is `child = op(child)`.

use std::cmp::Ordering;

use arbor_arena::Span;

use crate::{Interner, NodeIdx};

impl Interner {
    #[inline]
    fn left(&self, t: NodeIdx) -> Option<NodeIdx> {
        self.nodes[t as usize].left
    }

    #[inline]
    fn right(&self, t: NodeIdx) -> Option<NodeIdx> {
        self.nodes[t as usize].right
    }

    #[inline]
    fn level(&self, t: Option<NodeIdx>) -> u32 {
        t.map_or(0, |t| self.nodes[t as usize].level)
    }

    #[inline]
    fn set_left(&mut self, t: NodeIdx, left: Option<NodeIdx>) {
        self.nodes[t as usize].left = left;
    }

    #[inline]
    fn set_right(&mut self, t: NodeIdx, right: Option<NodeIdx>) {
        self.nodes[t as usize].right = right;
    }

    /// Rotates right when the left child sits on the same level.
    fn skew(&mut self, t: Option<NodeIdx>) -> Option<NodeIdx> {
        let t = t?;
        match self.left(t) {
            Some(l) if self.level(Some(l)) == self.level(Some(t)) => {
                self.set_left(t, self.right(l));
                self.set_right(l, Some(t));
                Some(l)
            }
            _ => Some(t),
        }
    }

    /// Rotates left and promotes when two right links sit on the same level.
    fn split(&mut self, t: Option<NodeIdx>) -> Option<NodeIdx> {
        let t = t?;
        let Some(r) = self.right(t) else { return Some(t) };
        let rr = self.right(r);
        if rr.is_none() || self.level(Some(t)) != self.level(rr) {
            return Some(t);
        }
        self.set_right(t, self.left(r));
        self.set_left(r, Some(t));
        self.nodes[r as usize].level += 1;
        Some(r)
    }

    fn leftmost(&self, mut cursor: NodeIdx) -> NodeIdx {
        while let Some(left) = self.left(cursor) {
            cursor = left;
        }
        cursor
    }

    fn rightmost(&self, mut cursor: NodeIdx) -> NodeIdx {
        while let Some(right) = self.right(cursor) {
            cursor = right;
        }
        cursor
    }

    fn decrease_level(&mut self, t: NodeIdx) {
        let right = self.right(t);
        let right_level = self.level(right);
        let should_be = self.level(self.left(t)).min(right_level) + 1;
        if should_be < self.level(Some(t)) {
            self.nodes[t as usize].level = should_be;
            if let Some(right) = right.filter(|_| should_be < right_level) {
                self.nodes[right as usize].level = should_be;
            }
        }
    }

    fn compare(&self, key: &str, t: NodeIdx) -> Ordering {
        key.cmp(self.entry_text(self.nodes[t as usize].entry))
    }

    pub(crate) fn insert_at(
        &mut self,
        t: Option<NodeIdx>,
        text: &str,
        found: &mut Option<u32>,
    ) -> NodeIdx {
        let Some(t) = t else {
            let entry = self.alloc_entry(text);
            *found = Some(entry);
            self.len += 1;
            return self.alloc_node(entry);
        };

        match self.compare(text, t) {
            Ordering::Less => {
                let left = self.insert_at(self.left(t), text, found);
                self.set_left(t, Some(left));
            }
            Ordering::Greater => {
                let right = self.insert_at(self.right(t), text, found);
                self.set_right(t, Some(right));
            }
            Ordering::Equal => {
                let entry = self.nodes[t as usize].entry;
                self.entries[entry as usize].refs += 1;
                *found = Some(entry);
            }
        }

        let t = self.skew(Some(t));
        match self.split(t) {
            Some(t) => t,
            None => unreachable!("rotations keep a subtree non-empty"),
        }
    }

    /// Removes the entry whose content is the text at `key`. The caller has
    /// already checked that this is its last reference.
    pub(crate) fn delete_at(&mut self, t: Option<NodeIdx>, key: Span) -> Option<NodeIdx> {
        let t = t?;
        let ordering = self.blobs.get(key).cmp(self.entry_text(self.nodes[t as usize].entry));
        match ordering {
            Ordering::Greater => {
                let right = self.delete_at(self.right(t), key);
                self.set_right(t, right);
            }
            Ordering::Less => {
                let left = self.delete_at(self.left(t), key);
                self.set_left(t, left);
            }
            Ordering::Equal => {
                match (self.left(t), self.right(t)) {
                    (None, None) => {
                        self.free_entry(self.nodes[t as usize].entry);
                        self.free_nodes.push(t);
                        self.len -= 1;
                        return None;
                    }
                    (None, Some(right)) => {
                        // Swap with the in-order successor and chase the
                        // content down the right subtree.
                        let next = self.leftmost(right);
                        self.swap_entries(t, next);
                        let right = self.delete_at(self.right(t), key);
                        self.set_right(t, right);
                    }
                    (Some(left), _) => {
                        let prev = self.rightmost(left);
                        self.swap_entries(t, prev);
                        let left = self.delete_at(self.left(t), key);
                        self.set_left(t, left);
                    }
                }
            }
        }

        self.decrease_level(t);
        let t = self.skew(Some(t))?;
        let right = self.skew(self.right(t));
        self.set_right(t, right);
        if let Some(right) = right {
            let right_right = self.skew(self.right(right));
            self.set_right(right, right_right);
        }
        let t = self.split(Some(t))?;
        let right = self.split(self.right(t));
        self.set_right(t, right);
        Some(t)
    }

    /// Moves content and count between two tree nodes. Symbols follow their
    /// content because they name the entry, not the node.
    fn swap_entries(&mut self, a: NodeIdx, b: NodeIdx) {
        let entry_a = self.nodes[a as usize].entry;
        self.nodes[a as usize].entry = self.nodes[b as usize].entry;
        self.nodes[b as usize].entry = entry_a;
    }

    /// Checks ordering, AA levels and counts, panicking on the first
    /// violation.
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let mut count = 0;
        self.check_subtree(self.root, None, None, &mut count);
        assert_eq!(count, self.len, "node count disagrees with len");
    }

    fn check_subtree(
        &self,
        t: Option<NodeIdx>,
        lower: Option<&str>,
        upper: Option<&str>,
        count: &mut usize,
    ) {
        let Some(t) = t else { return };
        *count += 1;
        let node = self.nodes[t as usize];
        let text = self.entry_text(node.entry);
        let entry = self.entries[node.entry as usize];

        assert!(entry.refs > 0, "dead entry {text:?} still in the tree");
        assert!(lower.is_none_or(|lower| lower < text), "{text:?} out of order");
        assert!(upper.is_none_or(|upper| text < upper), "{text:?} out of order");

        let level = node.level;
        if node.left.is_none() && node.right.is_none() {
            assert_eq!(level, 1, "leaf {text:?} is not on level 1");
        }
        assert_eq!(self.level(node.left) + 1, level, "left child of {text:?} on the wrong level");
        let right_level = self.level(node.right);
        assert!(
            right_level == level || right_level + 1 == level,
            "right child of {text:?} on the wrong level"
        );
        if let Some(right) = node.right {
            assert!(
                self.level(self.right(right)) < level,
                "right grandchild of {text:?} on the same level"
            );
        }
        if level > 1 {
            assert!(node.left.is_some() && node.right.is_some(), "{text:?} is missing a child");
        }

        self.check_subtree(node.left, lower, Some(text), count);
        self.check_subtree(node.right, Some(text), upper, count);
    }
}
