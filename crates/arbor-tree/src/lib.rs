//! Mutable, reference-counted syntax trees for hand-written and generated
//! parsers.
//!
//! A [`Tree`] owns its nodes, their child lists and an interner for string
//! payloads. Nodes are addressed by [`NodeId`] handles; every node carries a
//! [`Token`] from a caller-supplied table that also fixes the node's
//! [`PayloadKind`]. Dropping the tree releases everything it allocated.

mod builder;
mod children;
mod payload;
mod print;
mod token;
mod tree;
mod walk;

pub use arbor_arena::{ArenaConfig, ArenaStats};
pub use arbor_errors::{Diagnostic, Emitter, Location};
pub use arbor_interner::{Interner, Symbol};
pub use builder::Builder;
pub use payload::{Payload, Value};
pub use print::DisplayNode;
pub use token::{BAD_TOKEN, PayloadKind, Token, TokenType};
pub use tree::{NodeId, Tree, TreeStats};
pub use walk::{MatchError, Preorder, WalkEvent};
