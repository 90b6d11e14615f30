//! Event-style construction of a subtree.

use crate::{NodeId, Token, Tree, Value};

/// Builds a subtree from nested start/finish events, the way a parser walks
/// its input.
///
/// ```ignore
/// let mut builder = Builder::new(&mut tree);
/// builder.start_node(FUNC);
/// builder.leaf(IDENT, Value::String("main"));
/// builder.finish_node();
/// let root = builder.finish();
/// ```
pub struct Builder<'a, 't> {
    tree: &'a mut Tree<'t>,
    opened: Vec<NodeId>,
    root: Option<NodeId>,
}

impl Drop for Builder<'_, '_> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 32;

impl<'a, 't> Builder<'a, 't> {
    pub fn new(tree: &'a mut Tree<'t>) -> Self {
        Self { tree, opened: Vec::with_capacity(DEFAULT_TREE_DEPTH), root: None }
    }

    pub fn tree(&self) -> &Tree<'t> {
        self.tree
    }

    /// Opens an inner node below the currently open one.
    #[track_caller]
    pub fn start_node(&mut self, token: Token) -> NodeId {
        let node = self.tree.make_inner(token);
        self.attach(node);
        self.opened.push(node);
        node
    }

    /// Adds a leaf below the currently open node.
    #[track_caller]
    pub fn leaf<'v>(&mut self, token: Token, value: impl Into<Value<'v>>) -> NodeId {
        let node = self.tree.make_node(token, value.into());
        self.attach(node);
        node
    }

    /// Closes the most recently opened node.
    #[track_caller]
    pub fn finish_node(&mut self) {
        assert!(self.opened.pop().is_some(), "no node to finish");
    }

    /// Returns the root once every opened node has been finished.
    #[track_caller]
    pub fn finish(mut self) -> NodeId {
        assert!(self.opened.is_empty(), "{} nodes are still open", self.opened.len());
        match self.root.take() {
            Some(root) => root,
            None => panic!("nothing was built"),
        }
    }

    #[track_caller]
    fn attach(&mut self, node: NodeId) {
        match self.opened.last() {
            Some(&parent) => self.tree.append_child(parent, node),
            None => {
                assert!(self.root.is_none(), "a builder makes a single root");
                self.root = Some(node);
            }
        }
    }
}
