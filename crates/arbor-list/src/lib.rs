//! Circular doubly-linked lists stored in an index table.
//!
//! List heads ("sentinels") and list members are both links of the same
//! [`LinkTable`], addressed by [`LinkId`]. A detached member and an empty list
//! look the same: both point at themselves.
//!
//! None of the operations check their preconditions. Linking a link that is
//! still part of another list, or passing a member where a sentinel is
//! expected, silently corrupts the lists involved; callers keep those
//! invariants.

use std::fmt;

#[cfg(test)]
mod tests;

/// Index of a link inside a [`LinkTable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(u32);

impl LinkId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkId({})", self.0)
    }
}

#[derive(Clone, Copy, Debug)]
struct Link<T> {
    prev: LinkId,
    next: LinkId,
    tag: T,
}

/// Adjacency table holding `prev`/`next` pointers and a caller-defined tag
/// for every link.
#[derive(Clone, Debug)]
pub struct LinkTable<T> {
    links: Vec<Link<T>>,
}

impl<T> Default for LinkTable<T> {
    fn default() -> Self {
        Self { links: Vec::new() }
    }
}

impl<T: Copy> LinkTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { links: Vec::with_capacity(capacity) }
    }

    /// Allocates a new self-linked link.
    pub fn alloc(&mut self, tag: T) -> LinkId {
        let id = LinkId::new(self.links.len().try_into().expect("too many links"));
        self.links.push(Link { prev: id, next: id, tag });
        id
    }

    /// Number of links ever allocated, sentinels included.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn tag(&self, link: LinkId) -> T {
        self.links[link.0 as usize].tag
    }

    #[inline]
    pub fn set_tag(&mut self, link: LinkId, tag: T) {
        self.links[link.0 as usize].tag = tag;
    }

    #[inline]
    pub fn next(&self, link: LinkId) -> LinkId {
        self.links[link.0 as usize].next
    }

    #[inline]
    pub fn prev(&self, link: LinkId) -> LinkId {
        self.links[link.0 as usize].prev
    }

    #[inline]
    fn set_next(&mut self, link: LinkId, next: LinkId) {
        self.links[link.0 as usize].next = next;
    }

    #[inline]
    fn set_prev(&mut self, link: LinkId, prev: LinkId) {
        self.links[link.0 as usize].prev = prev;
    }

    /// Makes `link` point at itself.
    ///
    /// For a sentinel this empties the list (without touching the former
    /// members); for a member it marks the link as detached.
    pub fn init(&mut self, link: LinkId) {
        self.set_next(link, link);
        self.set_prev(link, link);
    }

    /// Returns `true` if `link` points at itself.
    #[inline]
    pub fn is_detached(&self, link: LinkId) -> bool {
        self.next(link) == link
    }

    /// Returns `true` if the list headed by `sentinel` has no members.
    #[inline]
    pub fn is_empty(&self, sentinel: LinkId) -> bool {
        self.is_detached(sentinel)
    }

    /// Closes the gap left by `link` in its list.
    ///
    /// `link` itself keeps its stale pointers; call [`LinkTable::init`] to
    /// mark it detached.
    pub fn unlink(&mut self, link: LinkId) {
        let prev = self.prev(link);
        let next = self.next(link);
        self.set_prev(next, prev);
        self.set_next(prev, next);
    }

    /// Links the detached `link` immediately before `anchor`.
    pub fn insert_before(&mut self, anchor: LinkId, link: LinkId) {
        let prev = self.prev(anchor);
        self.set_prev(anchor, link);
        self.set_next(prev, link);
        self.set_next(link, anchor);
        self.set_prev(link, prev);
    }

    /// Links the detached `link` immediately after `anchor`.
    pub fn insert_after(&mut self, anchor: LinkId, link: LinkId) {
        let next = self.next(anchor);
        self.insert_before(next, link);
    }

    pub fn append(&mut self, sentinel: LinkId, link: LinkId) {
        self.insert_before(sentinel, link);
    }

    pub fn prepend(&mut self, sentinel: LinkId, link: LinkId) {
        self.insert_after(sentinel, link);
    }

    /// Moves every member of the list headed by `other` before `anchor`.
    ///
    /// `other` is left pointing at its former first and last members; it must
    /// be reinitialised before it is used as an empty list again.
    pub fn splice(&mut self, anchor: LinkId, other: LinkId) {
        if self.is_empty(other) {
            return;
        }
        let prev = self.prev(anchor);
        let first = self.next(other);
        let last = self.prev(other);
        self.set_next(prev, first);
        self.set_prev(anchor, last);
        self.set_next(last, anchor);
        self.set_prev(first, prev);
    }

    pub fn append_list(&mut self, sentinel: LinkId, other: LinkId) {
        self.splice(sentinel, other);
    }

    pub fn prepend_list(&mut self, sentinel: LinkId, other: LinkId) {
        let first = self.next(sentinel);
        self.splice(first, other);
    }

    /// Puts the detached `link` where `old` is.
    ///
    /// `old` keeps its stale pointers, as with [`LinkTable::unlink`].
    pub fn replace(&mut self, old: LinkId, link: LinkId) {
        let prev = self.prev(old);
        let next = self.next(old);
        self.set_next(prev, link);
        self.set_prev(next, link);
        self.set_next(link, next);
        self.set_prev(link, prev);
    }

    /// Exchanges the positions of `a` and `b`.
    ///
    /// The links may belong to the same list or to different ones. A detached
    /// link takes the other's place and the other one ends up detached.
    pub fn swap(&mut self, a: LinkId, b: LinkId) {
        if a == b {
            return;
        }
        match (self.is_detached(a), self.is_detached(b)) {
            (true, true) => {}
            (true, false) => {
                self.replace(b, a);
                self.init(b);
            }
            (false, true) => {
                self.replace(a, b);
                self.init(a);
            }
            (false, false) => {
                let after_a = self.next(a);
                let after_b = self.next(b);
                if after_a == b {
                    self.unlink(a);
                    self.insert_before(after_b, a);
                } else if after_b == a {
                    self.unlink(b);
                    self.insert_before(after_a, b);
                } else {
                    self.unlink(a);
                    self.unlink(b);
                    self.insert_before(after_b, a);
                    self.insert_before(after_a, b);
                }
            }
        }
    }

    pub fn first(&self, sentinel: LinkId) -> Option<LinkId> {
        let first = self.next(sentinel);
        (first != sentinel).then_some(first)
    }

    pub fn last(&self, sentinel: LinkId) -> Option<LinkId> {
        let last = self.prev(sentinel);
        (last != sentinel).then_some(last)
    }

    /// Iterates the members of the list headed by `sentinel`.
    ///
    /// The iterator is double-ended, so `.rev()` walks the list backwards.
    pub fn iter(&self, sentinel: LinkId) -> Iter<'_, T> {
        let front = self.next(sentinel);
        let back = self.prev(sentinel);
        Iter { table: self, front, back, done: front == sentinel }
    }

    /// Starts a traversal that tolerates unlinking the current member.
    pub fn walk(&self, sentinel: LinkId) -> Walk {
        Walk { sentinel, cursor: self.next(sentinel), forward: true }
    }

    /// Like [`LinkTable::walk`], but from the last member backwards.
    pub fn walk_back(&self, sentinel: LinkId) -> Walk {
        Walk { sentinel, cursor: self.prev(sentinel), forward: false }
    }

    /// Returns the member at position `index`, counting from the front.
    pub fn index(&self, sentinel: LinkId, index: usize) -> Option<LinkId> {
        self.iter(sentinel).nth(index)
    }

    /// Counts the members of a list in O(n).
    pub fn len(&self, sentinel: LinkId) -> usize {
        self.iter(sentinel).count()
    }
}

/// Borrowing iterator over list members.
pub struct Iter<'a, T> {
    table: &'a LinkTable<T>,
    front: LinkId,
    back: LinkId,
    done: bool,
}

impl<T: Copy> Iterator for Iter<'_, T> {
    type Item = LinkId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.front;
        if current == self.back {
            self.done = true;
        } else {
            self.front = self.table.next(current);
        }
        Some(current)
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<T: Copy> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.back;
        if current == self.front {
            self.done = true;
        } else {
            self.back = self.table.prev(current);
        }
        Some(current)
    }
}

/// Detached cursor that captures the following link before yielding the
/// current one.
///
/// It holds no borrow of the table, so the caller may unlink (and relink
/// elsewhere) the link it was just handed.
#[derive(Clone, Copy, Debug)]
pub struct Walk {
    sentinel: LinkId,
    cursor: LinkId,
    forward: bool,
}

impl Walk {
    pub fn next<T: Copy>(&mut self, table: &LinkTable<T>) -> Option<LinkId> {
        if self.cursor == self.sentinel {
            return None;
        }
        let current = self.cursor;
        self.cursor = if self.forward { table.next(current) } else { table.prev(current) };
        Some(current)
    }
}
