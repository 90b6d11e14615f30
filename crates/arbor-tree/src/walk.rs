//! Traversal and shape checks for consumers of a finished tree.

use arbor_errors::{Diagnostic, Emitter};

use crate::{NodeId, Token, Tree};

/// Why a node did not have the expected shape.
///
/// The `Display` text doubles as the diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("unexpected end of node list, expected {expected}")]
    UnexpectedEnd { expected: String },
    #[error("expected {expected}, got {found}")]
    Mismatch { expected: String, found: String },
    #[error("unexpected node {found}")]
    UnexpectedNode { found: String },
}

impl<'t> Tree<'t> {
    /// Checks that `node` exists and carries `expected`.
    ///
    /// `parent` locates the diagnostic when the child list ran out. On
    /// failure a diagnostic is emitted and the error is returned as well.
    #[track_caller]
    pub fn match_token(
        &self,
        node: Option<NodeId>,
        parent: Option<NodeId>,
        expected: Token,
        emitter: &mut impl Emitter,
    ) -> Result<NodeId, MatchError> {
        let expected_name = self.token_name(expected);
        let error = match node {
            Some(node) if self.token(node) == expected => return Ok(node),
            Some(node) => MatchError::Mismatch {
                expected: expected_name.to_owned(),
                found: self.name(node).to_owned(),
            },
            None => MatchError::UnexpectedEnd { expected: expected_name.to_owned() },
        };
        self.emit_match_error(node, parent, &error, emitter);
        Err(error)
    }

    /// Checks that a child list has been consumed, i.e. `node` is `None`.
    #[track_caller]
    pub fn match_end(
        &self,
        node: Option<NodeId>,
        parent: Option<NodeId>,
        emitter: &mut impl Emitter,
    ) -> Result<(), MatchError> {
        let Some(node) = node else { return Ok(()) };
        let error = MatchError::UnexpectedNode { found: self.name(node).to_owned() };
        self.emit_match_error(Some(node), parent, &error, emitter);
        Err(error)
    }

    /// Enter and leave events for `root` and everything below it.
    pub fn preorder(&self, root: NodeId) -> Preorder<'_, 't> {
        Preorder { tree: self, stack: Vec::with_capacity(DEFAULT_DEPTH), root: Some(root) }
    }

    /// `root` and its descendants in preorder.
    pub fn descendants(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder(root).filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }

    /// Locates the diagnostic at `node`, falling back to `parent` for nodes
    /// without a location and for the end of a child list.
    fn emit_match_error(
        &self,
        node: Option<NodeId>,
        parent: Option<NodeId>,
        error: &MatchError,
        emitter: &mut impl Emitter,
    ) {
        let location = node
            .and_then(|node| self.location(node))
            .or_else(|| parent.and_then(|parent| self.location(parent)))
            .cloned();
        emitter.emit(Diagnostic::error(error.to_string(), location));
    }
}

const DEFAULT_DEPTH: usize = 32;

/// Preorder walk event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    Enter(NodeId),
    Leave(NodeId),
}

/// Preorder traversal over a subtree.
#[derive(Clone)]
pub struct Preorder<'a, 't> {
    tree: &'a Tree<'t>,
    /// Open nodes paired with the next child to enter.
    stack: Vec<(NodeId, Option<NodeId>)>,
    root: Option<NodeId>,
}

impl Preorder<'_, '_> {
    /// Skips the rest of the most recently entered subtree, including its
    /// leave event.
    pub fn skip_subtree(&mut self) {
        assert!(self.stack.pop().is_some(), "must have a subtree to skip");
    }
}

impl Iterator for Preorder<'_, '_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let Some((node, cursor)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root, self.tree.first_child(root)));
            return Some(WalkEvent::Enter(root));
        };
        match *cursor {
            Some(child) => {
                *cursor = self.tree.next_sibling(child);
                self.stack.push((child, self.tree.first_child(child)));
                Some(WalkEvent::Enter(child))
            }
            None => {
                let node = *node;
                self.stack.pop();
                Some(WalkEvent::Leave(node))
            }
        }
    }
}
