//! Child list mutation and navigation.

use arbor_arena::Key;

use crate::tree::{LinkOwner, Slot};
use crate::{NodeId, PayloadKind, Tree};

impl Tree<'_> {
    /// Adds `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    #[track_caller]
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let (parent_key, child_key) = self.prepare_attach(parent, child);
        let sentinel = self.slots[parent_key].children;
        let link = self.slots[child_key].siblings;
        self.links.append(sentinel, link);
        self.finish_attach(parent_key, child_key);
    }

    #[track_caller]
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        let (parent_key, child_key) = self.prepare_attach(parent, child);
        let sentinel = self.slots[parent_key].children;
        let link = self.slots[child_key].siblings;
        self.links.prepend(sentinel, link);
        self.finish_attach(parent_key, child_key);
    }

    /// Inserts `child` right after `anchor`, which must be a child of
    /// `parent`.
    #[track_caller]
    pub fn insert_child_after(&mut self, parent: NodeId, anchor: NodeId, child: NodeId) {
        let anchor_key = self.expect_child_of(parent, anchor);
        if anchor == child {
            return;
        }
        let (parent_key, child_key) = self.prepare_attach(parent, child);
        let anchor_link = self.slots[anchor_key].siblings;
        let link = self.slots[child_key].siblings;
        self.links.insert_after(anchor_link, link);
        self.finish_attach(parent_key, child_key);
    }

    /// Puts `new` where `old` is. `old` ends up detached but alive.
    #[track_caller]
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let old_key = self.expect_child_of(parent, old);
        if old == new {
            return;
        }
        let (parent_key, new_key) = self.prepare_attach(parent, new);
        let old_link = self.slots[old_key].siblings;
        let new_link = self.slots[new_key].siblings;
        self.links.replace(old_link, new_link);
        self.links.init(old_link);
        let old_slot = &mut self.slots[old_key];
        old_slot.parent = None;
        old_slot.refs -= 1;
        self.finish_attach(parent_key, new_key);
    }

    /// Detaches `child` from `parent`. The child stays alive.
    #[track_caller]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let key = self.expect_child_of(parent, child);
        self.detach(key);
    }

    /// Detaches every child of `parent`.
    #[track_caller]
    pub fn clear_children(&mut self, parent: NodeId) {
        let sentinel = self.inner_slot(parent).children;
        let mut walk = self.links.walk(sentinel);
        while let Some(link) = walk.next(&self.links) {
            let key = self.owner(link);
            self.detach(key);
        }
    }

    /// Moves every child of `other` to the end of `parent`'s children.
    #[track_caller]
    pub fn append_children(&mut self, parent: NodeId, other: NodeId) {
        if let Some((parent_key, sentinel)) = self.prepare_adopt(parent, other) {
            let target = self.slots[parent_key].children;
            self.links.append_list(target, sentinel);
            self.links.init(sentinel);
        }
    }

    /// Moves every child of `other` to the front of `parent`'s children.
    #[track_caller]
    pub fn prepend_children(&mut self, parent: NodeId, other: NodeId) {
        if let Some((parent_key, sentinel)) = self.prepare_adopt(parent, other) {
            let target = self.slots[parent_key].children;
            self.links.prepend_list(target, sentinel);
            self.links.init(sentinel);
        }
    }

    #[track_caller]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).parent.map(|key| self.node_at(key))
    }

    #[track_caller]
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let slot = self.slot(node);
        slot.parent?;
        self.sibling_node(self.links.next(slot.siblings))
    }

    #[track_caller]
    pub fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let slot = self.slot(node);
        slot.parent?;
        self.sibling_node(self.links.prev(slot.siblings))
    }

    #[track_caller]
    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        let sentinel = self.slot(node).children;
        self.links.first(sentinel).map(|link| self.node_at(self.owner(link)))
    }

    #[track_caller]
    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        let sentinel = self.slot(node).children;
        self.links.last(sentinel).map(|link| self.node_at(self.owner(link)))
    }

    /// Children of `node` in order. Non-inner nodes have none.
    #[track_caller]
    pub fn children(&self, node: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        let sentinel = self.slot(node).children;
        self.links.iter(sentinel).map(move |link| self.node_at(self.owner(link)))
    }

    #[track_caller]
    pub fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.children(node).nth(index)
    }

    #[track_caller]
    pub fn child_count(&self, node: NodeId) -> usize {
        self.links.len(self.slot(node).children)
    }

    /// Returns `true` if `ancestor` is `node` or lies on its parent chain.
    #[track_caller]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let target = self.key(ancestor);
        let mut cursor = Some(self.key(node));
        while let Some(key) = cursor {
            if key == target {
                return true;
            }
            cursor = self.slots[key].parent;
        }
        false
    }

    fn sibling_node(&self, link: arbor_list::LinkId) -> Option<NodeId> {
        match self.links.tag(link) {
            LinkOwner::Siblings(index) => Some(self.node_at(Key::new(index))),
            _ => None,
        }
    }

    #[track_caller]
    fn inner_slot(&self, node: NodeId) -> &Slot {
        self.expect_kind(node, PayloadKind::Inner);
        self.slot(node)
    }

    #[track_caller]
    fn expect_child_of(&self, parent: NodeId, child: NodeId) -> Key<Slot> {
        let parent_key = self.key(self.inner_node(parent));
        let key = self.key(child);
        assert!(
            self.slots[key].parent == Some(parent_key),
            "{child:?} is not a child of {parent:?}"
        );
        key
    }

    #[track_caller]
    fn inner_node(&self, node: NodeId) -> NodeId {
        self.expect_kind(node, PayloadKind::Inner);
        node
    }

    /// Checks that `child` may go below `parent` and takes it out of its
    /// current list, keeping its reference count.
    #[track_caller]
    fn prepare_attach(&mut self, parent: NodeId, child: NodeId) -> (Key<Slot>, Key<Slot>) {
        self.expect_kind(parent, PayloadKind::Inner);
        assert!(
            !self.is_ancestor_or_self(child, parent),
            "cannot attach {child:?} below itself ({parent:?})"
        );
        let parent_key = self.key(parent);
        let child_key = self.key(child);
        if self.slots[child_key].parent.is_some() {
            self.unlink_from_parent(child_key);
            self.slots[child_key].refs -= 1;
        }
        (parent_key, child_key)
    }

    /// Appends a detached node that cannot be an ancestor of `parent`, such
    /// as a fresh copy, skipping the cycle check.
    pub(crate) fn append_detached(&mut self, parent: Key<Slot>, child: Key<Slot>) {
        debug_assert!(self.slots[child].parent.is_none());
        let sentinel = self.slots[parent].children;
        let link = self.slots[child].siblings;
        self.links.append(sentinel, link);
        self.finish_attach(parent, child);
    }

    fn finish_attach(&mut self, parent: Key<Slot>, child: Key<Slot>) {
        let slot = &mut self.slots[child];
        slot.parent = Some(parent);
        slot.refs += 1;
    }

    fn detach(&mut self, key: Key<Slot>) {
        if self.slots[key].parent.is_some() {
            self.unlink_from_parent(key);
            self.slots[key].refs -= 1;
        }
    }

    /// Re-parents every child of `other` to `parent` and returns the child
    /// list to splice, or `None` when there is nothing to move.
    #[track_caller]
    fn prepare_adopt(
        &mut self,
        parent: NodeId,
        other: NodeId,
    ) -> Option<(Key<Slot>, arbor_list::LinkId)> {
        self.expect_kind(parent, PayloadKind::Inner);
        let sentinel = self.inner_slot(other).children;
        let parent_key = self.key(parent);
        if parent == other || self.links.is_empty(sentinel) {
            return None;
        }

        let moved: Vec<_> = self.links.iter(sentinel).map(|link| self.owner(link)).collect();
        for &key in &moved {
            let child = self.node_at(key);
            assert!(
                !self.is_ancestor_or_self(child, parent),
                "cannot move {child:?} below itself ({parent:?})"
            );
        }
        for key in moved {
            self.slots[key].parent = Some(parent_key);
        }
        Some((parent_key, sentinel))
    }
}
