//! Chunked storage with bulk deallocation.
//!
//! [`Blobs`] bump-allocates string bytes into fixed-capacity blobs, and
//! [`Chunks`] stores typed slots in fixed-length chunks. Neither frees
//! individual allocations; everything goes away on [`Blobs::clear`],
//! [`Chunks::clear`] or drop.

mod blobs;
mod chunks;

pub use blobs::{Blobs, Span};
pub use chunks::{Chunks, Key};

/// Default capacity of a single string blob, in bytes.
pub const DEFAULT_BLOB_SIZE: usize = 4096;

/// Default number of slots in a single chunk.
pub const DEFAULT_CHUNK_LEN: usize = 256;

/// Sizing knobs for a tree's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Capacity of a string blob. Strings at least this long get a blob of
    /// their own.
    pub blob_size: usize,
    /// Number of node slots per chunk.
    pub chunk_len: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self { blob_size: DEFAULT_BLOB_SIZE, chunk_len: DEFAULT_CHUNK_LEN }
    }
}

impl ArenaConfig {
    pub fn with_blob_size(self, blob_size: usize) -> Self {
        Self { blob_size, ..self }
    }

    pub fn with_chunk_len(self, chunk_len: usize) -> Self {
        Self { chunk_len, ..self }
    }
}

/// Allocation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Number of string blobs allocated.
    pub blobs: usize,
    /// Total capacity of all string blobs.
    pub blob_bytes: usize,
    /// Bytes handed out from string blobs.
    pub used_bytes: usize,
    /// Number of slot chunks allocated.
    pub chunks: usize,
    /// Number of slots handed out from chunks.
    pub slots: usize,
}
