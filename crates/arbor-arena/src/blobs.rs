use crate::{ArenaStats, DEFAULT_BLOB_SIZE};

/// Location of a string inside a [`Blobs`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    blob: u32,
    start: u32,
    len: u32,
}

impl Span {
    pub fn len(self) -> usize {
        self.len as usize
    }

    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Bump allocator for string bytes.
///
/// Each blob is a `String` whose capacity is reserved up front and never
/// exceeded, so bytes already handed out never move.
#[derive(Debug)]
pub struct Blobs {
    blob_size: usize,
    blobs: Vec<String>,
    /// Blob currently receiving small allocations.
    current: Option<usize>,
    used: usize,
}

impl Default for Blobs {
    fn default() -> Self {
        Self::new(DEFAULT_BLOB_SIZE)
    }
}

impl Blobs {
    #[track_caller]
    pub fn new(blob_size: usize) -> Self {
        assert!(blob_size > 0, "blob size must be positive");
        Self { blob_size, blobs: Vec::new(), current: None, used: 0 }
    }

    pub fn blob_size(&self) -> usize {
        self.blob_size
    }

    /// Copies `text` into the arena.
    ///
    /// Requests of at least `blob_size` bytes get a dedicated blob; smaller
    /// ones are appended to the current blob, opening a fresh one when it is
    /// full.
    pub fn alloc_str(&mut self, text: &str) -> Span {
        let blob = if text.len() >= self.blob_size {
            self.push_blob(text.len())
        } else {
            match self.current {
                Some(current) if self.remaining(current) >= text.len() => current,
                _ => {
                    let blob = self.push_blob(self.blob_size);
                    self.current = Some(blob);
                    blob
                }
            }
        };

        let buf = &mut self.blobs[blob];
        let start = buf.len();
        buf.push_str(text);
        self.used += text.len();

        Span { blob: offset(blob), start: offset(start), len: offset(text.len()) }
    }

    #[inline]
    pub fn get(&self, span: Span) -> &str {
        let start = span.start as usize;
        &self.blobs[span.blob as usize][start..start + span.len as usize]
    }

    /// Frees every blob at once.
    pub fn clear(&mut self) {
        if !self.blobs.is_empty() {
            tracing::debug!(blobs = self.blobs.len(), bytes = self.used, "releasing string blobs");
        }
        self.blobs.clear();
        self.current = None;
        self.used = 0;
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            blobs: self.blobs.len(),
            blob_bytes: self.blobs.iter().map(String::capacity).sum(),
            used_bytes: self.used,
            ..ArenaStats::default()
        }
    }

    fn remaining(&self, blob: usize) -> usize {
        let buf = &self.blobs[blob];
        buf.capacity() - buf.len()
    }

    fn push_blob(&mut self, capacity: usize) -> usize {
        tracing::debug!(capacity, index = self.blobs.len(), "allocating string blob");
        self.blobs.push(String::with_capacity(capacity));
        self.blobs.len() - 1
    }
}

/// Narrows a blob index or byte offset to the width stored in a [`Span`].
#[track_caller]
fn offset(value: usize) -> u32 {
    u32::try_from(value).expect("string blobs are limited to 4 GiB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_strings_share_a_blob() {
        let mut blobs = Blobs::new(64);
        let a = blobs.alloc_str("hello");
        let b = blobs.alloc_str("world");

        assert_eq!(blobs.get(a), "hello");
        assert_eq!(blobs.get(b), "world");
        assert_eq!(blobs.blob_count(), 1);
        assert_eq!(blobs.stats().used_bytes, 10);
    }

    #[test]
    fn full_blob_opens_a_new_one() {
        let mut blobs = Blobs::new(8);
        let spans: Vec<_> = ["abcde", "fghij", "kl"].into_iter().map(|s| blobs.alloc_str(s)).collect();

        assert_eq!(blobs.blob_count(), 2);
        assert_eq!(blobs.get(spans[0]), "abcde");
        assert_eq!(blobs.get(spans[1]), "fghij");
        assert_eq!(blobs.get(spans[2]), "kl");
    }

    #[test]
    fn oversized_string_gets_dedicated_blob() {
        let mut blobs = Blobs::new(8);
        let small = blobs.alloc_str("ab");
        let big = blobs.alloc_str("a string longer than one blob");
        let after = blobs.alloc_str("cd");

        assert_eq!(blobs.get(big), "a string longer than one blob");
        assert_eq!(blobs.get(small), "ab");
        assert_eq!(blobs.get(after), "cd");
        // The small allocations keep filling the first blob.
        assert_eq!(blobs.blob_count(), 2);
    }

    #[test]
    fn empty_string() {
        let mut blobs = Blobs::new(8);
        let span = blobs.alloc_str("");
        assert!(span.is_empty());
        assert_eq!(blobs.get(span), "");
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "limited to 4 GiB")]
    fn offsets_past_u32_are_rejected() {
        offset(u32::MAX as usize + 1);
    }

    #[test]
    fn clear_drops_everything() {
        let mut blobs = Blobs::new(8);
        blobs.alloc_str("abc");
        blobs.alloc_str("a string longer than one blob");
        blobs.clear();

        assert_eq!(blobs.stats(), ArenaStats::default());
        let span = blobs.alloc_str("xyz");
        assert_eq!(blobs.get(span), "xyz");
    }
}
