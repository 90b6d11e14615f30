use std::fmt::{self, Write as _};
use std::io;

use crate::{NodeId, Payload, Tree, WalkEvent};

impl<'t> Tree<'t> {
    /// Bracketed form of the subtree at `node`:
    /// `[name payload child child ...]`, separated by single spaces.
    ///
    /// Printing walks the subtree iteratively, so arbitrarily deep trees are
    /// fine.
    pub fn display(&self, node: NodeId) -> DisplayNode<'_, 't> {
        DisplayNode { tree: self, node }
    }

    pub fn print(&self, node: NodeId, out: &mut impl io::Write) -> io::Result<()> {
        write!(out, "{}", self.display(node))
    }

    /// One node per line, children indented below their parent, with the
    /// reference count and location of each node.
    pub fn debug_tree(&self, node: NodeId) -> String {
        let mut buf = String::new();
        // Writing into a `String` cannot fail.
        let _ = self.debug_node(&mut buf, node);
        buf
    }

    fn debug_node(&self, buf: &mut String, root: NodeId) -> fmt::Result {
        let mut depth = 0;
        for event in self.preorder(root) {
            let node = match event {
                WalkEvent::Enter(node) => node,
                WalkEvent::Leave(_) => {
                    depth -= 1;
                    continue;
                }
            };
            write!(buf, "{:indent$}{}", "", self.name(node), indent = depth * 2)?;
            self.fmt_payload(buf, node)?;
            write!(buf, " refs={}", self.refcount(node))?;
            if let Some(location) = self.location(node) {
                write!(buf, " @ {location}")?;
            }
            buf.push('\n');
            depth += 1;
        }
        Ok(())
    }

    fn fmt_payload(&self, f: &mut impl fmt::Write, node: NodeId) -> fmt::Result {
        match self.payload(node) {
            Payload::Null | Payload::Inner => Ok(()),
            Payload::Int(value) => write!(f, " {value}"),
            Payload::UInt(value) => write!(f, " {value}"),
            Payload::Double(value) => write!(f, " {value:.6}"),
            Payload::String(symbol) => write!(f, " \"{}\"", self.strings().resolve(symbol)),
            Payload::Pointer(value) => write!(f, " 0x{value:x}"),
        }
    }
}

/// See [`Tree::display`].
#[derive(Clone, Copy)]
pub struct DisplayNode<'a, 't> {
    tree: &'a Tree<'t>,
    node: NodeId,
}

impl fmt::Display for DisplayNode<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree;
        for event in tree.preorder(self.node) {
            match event {
                WalkEvent::Enter(node) => {
                    if node != self.node {
                        f.write_str(" ")?;
                    }
                    write!(f, "[{}", tree.name(node))?;
                    tree.fmt_payload(f, node)?;
                }
                WalkEvent::Leave(_) => f.write_str("]")?,
            }
        }
        Ok(())
    }
}
