use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::{ArenaStats, DEFAULT_CHUNK_LEN};

#[derive(Debug)]
pub struct Key<T>(u32, PhantomData<T>);

impl<T> std::hash::Hash for Key<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Key<T> {}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> Key<T> {
    pub fn new(index: u32) -> Self {
        Self(index, PhantomData)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl<T> From<u32> for Key<T> {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

/// Append-only typed storage that grows one chunk at a time.
///
/// Every chunk is allocated with its full length reserved, so a slot never
/// moves once allocated.
#[derive(Debug)]
pub struct Chunks<T> {
    chunk_len: usize,
    chunks: Vec<Vec<T>>,
    len: usize,
}

impl<T> Default for Chunks<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_LEN)
    }
}

impl<T> Chunks<T> {
    #[track_caller]
    pub fn new(chunk_len: usize) -> Self {
        assert!(chunk_len > 0, "chunk length must be positive");
        Self { chunk_len, chunks: Vec::new(), len: 0 }
    }

    pub fn alloc(&mut self, value: T) -> Key<T> {
        let idx = self.len as u32;
        match self.chunks.last_mut() {
            Some(chunk) if chunk.len() < self.chunk_len => chunk.push(value),
            _ => {
                tracing::trace!(chunk = self.chunks.len(), len = self.chunk_len, "allocating chunk");
                let mut chunk = Vec::with_capacity(self.chunk_len);
                chunk.push(value);
                self.chunks.push(chunk);
            }
        }
        self.len += 1;
        Key::new(idx)
    }

    pub fn get(&self, key: Key<T>) -> Option<&T> {
        let (chunk, offset) = self.locate(key);
        self.chunks.get(chunk)?.get(offset)
    }

    pub fn get_mut(&mut self, key: Key<T>) -> Option<&mut T> {
        let (chunk, offset) = self.locate(key);
        self.chunks.get_mut(chunk)?.get_mut(offset)
    }

    pub fn iter_enumerated(&self) -> impl Iterator<Item = (Key<T>, &T)> {
        self.chunks.iter().flatten().enumerate().map(|(i, item)| (Key::new(i as u32), item))
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats { chunks: self.chunks.len(), slots: self.len, ..ArenaStats::default() }
    }

    #[inline]
    fn locate(&self, key: Key<T>) -> (usize, usize) {
        let index = key.index() as usize;
        (index / self.chunk_len, index % self.chunk_len)
    }
}

impl<T> Index<Key<T>> for Chunks<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: Key<T>) -> &Self::Output {
        let (chunk, offset) = self.locate(index);
        &self.chunks[chunk][offset]
    }
}

impl<T> IndexMut<Key<T>> for Chunks<T> {
    #[track_caller]
    fn index_mut(&mut self, index: Key<T>) -> &mut Self::Output {
        let (chunk, offset) = self.locate(index);
        &mut self.chunks[chunk][offset]
    }
}
