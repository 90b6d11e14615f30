use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use arbor_arena::{ArenaConfig, ArenaStats, Chunks, Key};
use arbor_errors::Location;
use arbor_interner::Interner;
use arbor_list::{LinkId, LinkTable};

use crate::{BAD_TOKEN, Payload, PayloadKind, Token, TokenType, Value};

/// Handle to a node of a [`Tree`].
///
/// Handles are only meaningful for the tree that created them; any other tree
/// panics when handed one. Once the node is destroyed its handle goes stale
/// and every use of it panics, even after the slot is reused for another
/// node.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    tree: u32,
    index: u32,
    generation: u32,
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}v{})", self.index, self.generation)
    }
}

/// What a link in the tree's link table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkOwner {
    /// Sentinel of the list of every live node.
    Master,
    /// A node's membership in the master list.
    Registry(u32),
    /// A node's membership in its parent's child list.
    Siblings(u32),
    /// Sentinel of a node's own child list.
    Children(u32),
}

#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) live: bool,
    pub(crate) token: Token,
    pub(crate) payload: Payload,
    pub(crate) siblings: LinkId,
    pub(crate) children: LinkId,
    registry: LinkId,
    pub(crate) parent: Option<Key<Slot>>,
    pub(crate) refs: u32,
    pub(crate) location: Option<Location>,
}

static NEXT_TREE: AtomicU32 = AtomicU32::new(0);

type LocationHook<'t> = Box<dyn FnMut() -> Option<Location> + Send + 't>;

/// Counters describing a tree's storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Live nodes.
    pub nodes: usize,
    /// Node slots waiting to be reused.
    pub free_slots: usize,
    /// Live interned strings.
    pub strings: usize,
    pub arena: ArenaStats,
}

/// Owner of a set of nodes, their links and their strings.
///
/// Nodes are reference counted: attaching a node to a parent takes a
/// reference, detaching it gives the reference back. A node that drops to
/// zero references by being detached stays alive until it is destroyed
/// explicitly or the tree goes away; [`Tree::release`] dropping the last
/// reference destroys it immediately.
pub struct Tree<'t> {
    id: u32,
    tokens: &'t [TokenType<'t>],
    pub(crate) slots: Chunks<Slot>,
    free: Vec<Key<Slot>>,
    pub(crate) links: LinkTable<LinkOwner>,
    master: LinkId,
    strings: Interner,
    live: usize,
    location_hook: Option<LocationHook<'t>>,
}

impl fmt::Debug for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("tokens", &self.tokens.len())
            .field("nodes", &self.live)
            .field("strings", &self.strings.len())
            .finish_non_exhaustive()
    }
}

impl Drop for Tree<'_> {
    fn drop(&mut self) {
        tracing::debug!(
            nodes = self.live,
            strings = self.strings.len(),
            chunks = self.slots.chunk_count(),
            "tearing down tree"
        );
    }
}

impl<'t> Tree<'t> {
    pub fn new(tokens: &'t [TokenType<'t>]) -> Self {
        Self::with_config(tokens, ArenaConfig::default())
    }

    pub fn with_config(tokens: &'t [TokenType<'t>], config: ArenaConfig) -> Self {
        let mut links = LinkTable::new();
        let master = links.alloc(LinkOwner::Master);
        tracing::debug!(tokens = tokens.len(), ?config, "creating tree");
        Self {
            id: NEXT_TREE.fetch_add(1, Ordering::Relaxed),
            tokens,
            slots: Chunks::new(config.chunk_len),
            free: Vec::new(),
            links,
            master,
            strings: Interner::with_blob_size(config.blob_size),
            live: 0,
            location_hook: None,
        }
    }

    /// Releases every node and string at once.
    pub fn destroy(self) {}

    /// Installs a callback that supplies the location of every node created
    /// from now on, typically the current position of a lexer.
    pub fn set_location_hook(&mut self, hook: impl FnMut() -> Option<Location> + Send + 't) {
        self.location_hook = Some(Box::new(hook));
    }

    pub fn clear_location_hook(&mut self) {
        self.location_hook = None;
    }

    pub fn tokens(&self) -> &'t [TokenType<'t>] {
        self.tokens
    }

    pub fn token_type(&self, token: Token) -> Option<&'t TokenType<'t>> {
        self.tokens.get(token.0 as usize)
    }

    /// The token's name, or `"<bad token>"` for ids outside the table.
    pub fn token_name(&self, token: Token) -> &'t str {
        self.token_type(token).map_or(BAD_TOKEN, |ty| ty.name)
    }

    pub fn token_kind(&self, token: Token) -> Option<PayloadKind> {
        self.token_type(token).map(|ty| ty.kind)
    }

    /// Creates a detached node.
    ///
    /// Panics if `token` is not in the table or declares a payload kind other
    /// than `value`'s.
    #[track_caller]
    pub fn make_node(&mut self, token: Token, value: Value<'_>) -> NodeId {
        let Some(kind) = self.token_kind(token) else {
            panic!("{token:?} is not in the token table");
        };
        assert!(
            kind == value.kind(),
            "token `{}` holds {kind} payloads, got {}",
            self.token_name(token),
            value.kind()
        );

        let payload = match value {
            Value::Null => Payload::Null,
            Value::Int(value) => Payload::Int(value),
            Value::UInt(value) => Payload::UInt(value),
            Value::Double(value) => Payload::Double(value),
            Value::String(text) => Payload::String(self.strings.insert(text)),
            Value::Pointer(value) => Payload::Pointer(value),
            Value::Inner => Payload::Inner,
        };
        let location = self.location_hook.as_mut().and_then(|hook| hook());
        self.alloc(token, payload, location)
    }

    #[track_caller]
    pub fn make_null(&mut self, token: Token) -> NodeId {
        self.make_node(token, Value::Null)
    }

    #[track_caller]
    pub fn make_int(&mut self, token: Token, value: i32) -> NodeId {
        self.make_node(token, Value::Int(value))
    }

    #[track_caller]
    pub fn make_uint(&mut self, token: Token, value: u32) -> NodeId {
        self.make_node(token, Value::UInt(value))
    }

    #[track_caller]
    pub fn make_double(&mut self, token: Token, value: f64) -> NodeId {
        self.make_node(token, Value::Double(value))
    }

    #[track_caller]
    pub fn make_string(&mut self, token: Token, text: &str) -> NodeId {
        self.make_node(token, Value::String(text))
    }

    #[track_caller]
    pub fn make_pointer(&mut self, token: Token, value: usize) -> NodeId {
        self.make_node(token, Value::Pointer(value))
    }

    #[track_caller]
    pub fn make_inner(&mut self, token: Token) -> NodeId {
        self.make_node(token, Value::Inner)
    }

    /// Creates a detached node with the same token, payload and location.
    ///
    /// Strings share the original's symbol; inner nodes start without
    /// children.
    #[track_caller]
    pub fn copy(&mut self, node: NodeId) -> NodeId {
        let slot = self.slot(node);
        let (token, payload, location) = (slot.token, slot.payload, slot.location.clone());
        if let Payload::String(symbol) = payload {
            self.strings.retain(symbol);
        }
        self.alloc(token, payload, location)
    }

    /// Copies `node` and, in order, every node below it.
    ///
    /// Runs on an explicit stack, so the depth of the subtree is not limited
    /// by the thread's stack.
    #[track_caller]
    pub fn copy_recursive(&mut self, node: NodeId) -> NodeId {
        let root = self.copy(node);
        // Copies still receiving children, paired with the next source child.
        let mut stack = vec![(root, self.first_child(node))];
        while let Some((copy, cursor)) = stack.last_mut() {
            let Some(child) = *cursor else {
                stack.pop();
                continue;
            };
            *cursor = self.next_sibling(child);
            let parent = self.key(*copy);
            let child_copy = self.copy(child);
            self.append_detached(parent, self.key(child_copy));
            stack.push((child_copy, self.first_child(child)));
        }
        root
    }

    /// Frees `node` right away, whatever its reference count.
    ///
    /// The node is detached from its parent first. Its children are released
    /// and only destroyed along with it if nothing else retains them. Deep
    /// subtrees are freed without recursion.
    #[track_caller]
    pub fn destroy_node(&mut self, node: NodeId) {
        let key = self.key(node);
        self.unlink_from_parent(key);
        self.free(key);
    }

    /// Takes an extra reference to `node`.
    #[track_caller]
    pub fn retain(&mut self, node: NodeId) {
        let key = self.key(node);
        self.slots[key].refs += 1;
    }

    /// Drops a reference to `node`, destroying it when none are left.
    #[track_caller]
    pub fn release(&mut self, node: NodeId) {
        let key = self.key(node);
        let slot = &mut self.slots[key];
        assert!(slot.refs > 0, "{node:?} is not retained");
        slot.refs -= 1;
        if slot.refs == 0 {
            self.unlink_from_parent(key);
            self.free(key);
        }
    }

    #[track_caller]
    pub fn refcount(&self, node: NodeId) -> u32 {
        self.slot(node).refs
    }

    /// Returns `true` if `node` belongs to this tree and has not been
    /// destroyed.
    pub fn is_live(&self, node: NodeId) -> bool {
        node.tree == self.id
            && self
                .slots
            .get(Key::new(node.index))
                .is_some_and(|slot| slot.live && slot.generation == node.generation)
    }

    #[track_caller]
    pub fn token(&self, node: NodeId) -> Token {
        self.slot(node).token
    }

    #[track_caller]
    pub fn kind(&self, node: NodeId) -> PayloadKind {
        self.slot(node).payload.kind()
    }

    #[track_caller]
    pub fn name(&self, node: NodeId) -> &'t str {
        self.token_name(self.token(node))
    }

    #[track_caller]
    pub fn payload(&self, node: NodeId) -> Payload {
        self.slot(node).payload
    }

    #[track_caller]
    pub fn set_location(&mut self, node: NodeId, location: Location) {
        self.slot_mut(node).location = Some(location);
    }

    #[track_caller]
    pub fn location(&self, node: NodeId) -> Option<&Location> {
        self.slot(node).location.as_ref()
    }

    /// Every live node, oldest first.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.links.iter(self.master).map(move |link| self.node_at(self.owner(link)))
    }

    pub fn node_count(&self) -> usize {
        self.live
    }

    pub fn strings(&self) -> &Interner {
        &self.strings
    }

    pub fn stats(&self) -> TreeStats {
        let slots = self.slots.stats();
        TreeStats {
            nodes: self.live,
            free_slots: self.free.len(),
            strings: self.strings.len(),
            arena: ArenaStats { chunks: slots.chunks, slots: slots.slots, ..self.strings.stats().arena },
        }
    }

    pub(crate) fn strings_mut(&mut self) -> &mut Interner {
        &mut self.strings
    }

    /// Swaps in a payload of the same kind, releasing the old string.
    #[track_caller]
    pub(crate) fn replace_payload(&mut self, node: NodeId, payload: Payload) {
        self.expect_kind(node, payload.kind());
        let old = std::mem::replace(&mut self.slot_mut(node).payload, payload);
        if let Payload::String(symbol) = old {
            self.strings.release(symbol);
        }
    }

    #[track_caller]
    pub(crate) fn key(&self, node: NodeId) -> Key<Slot> {
        assert!(node.tree == self.id, "{node:?} belongs to another tree");
        let key = Key::new(node.index);
        match self.slots.get(key) {
            Some(slot) if slot.live && slot.generation == node.generation => key,
            _ => panic!("{node:?} was destroyed"),
        }
    }

    #[track_caller]
    pub(crate) fn slot(&self, node: NodeId) -> &Slot {
        &self.slots[self.key(node)]
    }

    #[track_caller]
    pub(crate) fn slot_mut(&mut self, node: NodeId) -> &mut Slot {
        let key = self.key(node);
        &mut self.slots[key]
    }

    pub(crate) fn node_at(&self, key: Key<Slot>) -> NodeId {
        NodeId { tree: self.id, index: key.index(), generation: self.slots[key].generation }
    }

    /// The node a link belongs to.
    pub(crate) fn owner(&self, link: LinkId) -> Key<Slot> {
        match self.links.tag(link) {
            LinkOwner::Registry(index) | LinkOwner::Siblings(index) | LinkOwner::Children(index) => {
                Key::new(index)
            }
            LinkOwner::Master => unreachable!("the master sentinel has no node"),
        }
    }

    /// Takes `key` out of its parent's child list without touching its count.
    pub(crate) fn unlink_from_parent(&mut self, key: Key<Slot>) {
        let slot = &mut self.slots[key];
        if slot.parent.take().is_some() {
            let siblings = slot.siblings;
            self.links.unlink(siblings);
            self.links.init(siblings);
        }
    }

    fn alloc(&mut self, token: Token, payload: Payload, location: Option<Location>) -> NodeId {
        let key = match self.free.pop() {
            Some(key) => {
                let slot = &mut self.slots[key];
                slot.live = true;
                slot.token = token;
                slot.payload = payload;
                slot.location = location;
                key
            }
            None => {
                let index = u32::try_from(self.slots.len()).expect("too many nodes");
                let siblings = self.links.alloc(LinkOwner::Siblings(index));
                let children = self.links.alloc(LinkOwner::Children(index));
                let registry = self.links.alloc(LinkOwner::Registry(index));
                self.slots.alloc(Slot {
                    generation: 0,
                    live: true,
                    token,
                    payload,
                    siblings,
                    children,
                    registry,
                    parent: None,
                    refs: 0,
                    location,
                })
            }
        };
        let registry = self.slots[key].registry;
        self.links.append(self.master, registry);
        self.live += 1;
        self.node_at(key)
    }

    /// Frees `key` and every child whose last reference it held, children
    /// first.
    fn free(&mut self, key: Key<Slot>) {
        let mut stack = vec![(key, self.links.walk(self.slots[key].children))];
        while let Some((current, walk)) = stack.last_mut() {
            let current = *current;
            let Some(link) = walk.next(&self.links) else {
                stack.pop();
                self.free_slot(current);
                continue;
            };
            let child = self.owner(link);
            self.links.unlink(link);
            self.links.init(link);
            let slot = &mut self.slots[child];
            slot.parent = None;
            slot.refs -= 1;
            if slot.refs == 0 {
                let children = slot.children;
                stack.push((child, self.links.walk(children)));
            }
        }
    }

    fn free_slot(&mut self, key: Key<Slot>) {
        let children = self.slots[key].children;
        self.links.init(children);

        let slot = &mut self.slots[key];
        let payload = std::mem::replace(&mut slot.payload, Payload::Null);
        let registry = slot.registry;
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.refs = 0;
        slot.location = None;
        if let Payload::String(symbol) = payload {
            self.strings.release(symbol);
        }
        self.links.unlink(registry);
        self.links.init(registry);
        self.free.push(key);
        self.live -= 1;
        tracing::trace!(slot = key.index(), "destroyed node");
    }
}
