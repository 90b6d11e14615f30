use std::fmt;

/// Name printed for token ids outside the token table.
pub const BAD_TOKEN: &str = "<bad token>";

/// Index into a tree's token table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(pub u32);

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.0)
    }
}

impl From<u32> for Token {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// The payload kind a token's nodes carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Null,
    Int,
    UInt,
    Double,
    String,
    Pointer,
    /// A list of child nodes.
    Inner,
}

impl PayloadKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Double => "double",
            Self::String => "string",
            Self::Pointer => "pointer",
            Self::Inner => "inner",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of a token table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenType<'a> {
    pub name: &'a str,
    pub kind: PayloadKind,
}

impl<'a> TokenType<'a> {
    pub const fn new(name: &'a str, kind: PayloadKind) -> Self {
        Self { name, kind }
    }
}
