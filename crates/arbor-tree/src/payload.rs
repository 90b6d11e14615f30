use arbor_interner::Symbol;

use crate::{NodeId, PayloadKind, Tree};

/// Data stored in a node.
///
/// Strings are interned in the owning tree; `Pointer` is an opaque
/// caller-defined word that the tree never dereferences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    Null,
    Int(i32),
    UInt(u32),
    Double(f64),
    String(Symbol),
    Pointer(usize),
    Inner,
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Null => PayloadKind::Null,
            Self::Int(_) => PayloadKind::Int,
            Self::UInt(_) => PayloadKind::UInt,
            Self::Double(_) => PayloadKind::Double,
            Self::String(_) => PayloadKind::String,
            Self::Pointer(_) => PayloadKind::Pointer,
            Self::Inner => PayloadKind::Inner,
        }
    }
}

/// Borrowed form of a [`Payload`], used to construct nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Null,
    Int(i32),
    UInt(u32),
    Double(f64),
    String(&'a str),
    Pointer(usize),
    Inner,
}

impl Value<'_> {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Null => PayloadKind::Null,
            Self::Int(_) => PayloadKind::Int,
            Self::UInt(_) => PayloadKind::UInt,
            Self::Double(_) => PayloadKind::Double,
            Self::String(_) => PayloadKind::String,
            Self::Pointer(_) => PayloadKind::Pointer,
            Self::Inner => PayloadKind::Inner,
        }
    }
}

impl From<i32> for Value<'_> {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value<'_> {
    fn from(value: u32) -> Self {
        Self::UInt(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Self::String(value)
    }
}

macro_rules! getter {
    ($(#[$attr:meta])* $name:ident, $variant:ident, $ty:ty) => {
        $(#[$attr])*
        #[track_caller]
        pub fn $name(&self, node: NodeId) -> $ty {
            match self.payload(node) {
                Payload::$variant(value) => value,
                other => self.kind_mismatch(node, PayloadKind::$variant, other.kind()),
            }
        }
    };
}

macro_rules! setter {
    ($(#[$attr:meta])* $name:ident, $variant:ident, $ty:ty) => {
        $(#[$attr])*
        #[track_caller]
        pub fn $name(&mut self, node: NodeId, value: $ty) {
            self.replace_payload(node, Payload::$variant(value));
        }
    };
}

impl Tree<'_> {
    getter!(int, Int, i32);
    getter!(uint, UInt, u32);
    getter!(double, Double, f64);
    getter!(
        /// The interned symbol of a string node.
        symbol,
        String,
        Symbol
    );
    getter!(pointer, Pointer, usize);

    /// The text of a string node.
    #[track_caller]
    pub fn string(&self, node: NodeId) -> &str {
        let symbol = self.symbol(node);
        self.strings().resolve(symbol)
    }

    #[track_caller]
    pub fn set_null(&mut self, node: NodeId) {
        self.replace_payload(node, Payload::Null);
    }

    setter!(set_int, Int, i32);
    setter!(set_uint, UInt, u32);
    setter!(set_double, Double, f64);
    setter!(
        /// Opaque words are stored as-is.
        set_pointer,
        Pointer,
        usize
    );

    /// Interns `text` and stores it in a string node, releasing the previous
    /// string.
    #[track_caller]
    pub fn set_string(&mut self, node: NodeId, text: &str) {
        self.expect_kind(node, PayloadKind::String);
        let symbol = self.strings_mut().insert(text);
        self.replace_payload(node, Payload::String(symbol));
    }

    #[track_caller]
    pub(crate) fn expect_kind(&self, node: NodeId, expected: PayloadKind) {
        let found = self.kind(node);
        if found != expected {
            self.kind_mismatch(node, expected, found);
        }
    }

    #[track_caller]
    fn kind_mismatch(&self, node: NodeId, expected: PayloadKind, found: PayloadKind) -> ! {
        panic!(
            "{node:?} (`{}`) holds {found} payload, expected {expected}",
            self.token_name(self.token(node))
        )
    }
}
