use std::fmt;
use std::sync::Arc;

use camino::Utf8Path;
use line_index::LineIndex;
use text_size::{TextRange, TextSize};

/// A span of source text, in 1-based lines and 1-based character columns.
///
/// Both ends are inclusive: `(9, 9, 9, 14)` covers six characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: Option<Arc<Utf8Path>>,
    pub first_line: usize,
    pub first_column: usize,
    pub last_line: usize,
    pub last_column: usize,
}

impl Location {
    pub fn new(first_line: usize, first_column: usize, last_line: usize, last_column: usize) -> Self {
        Self { file: None, first_line, first_column, last_line, last_column }
    }

    /// A single-character location.
    pub fn point(line: usize, column: usize) -> Self {
        Self::new(line, column, line, column)
    }

    pub fn with_file(self, file: impl AsRef<Utf8Path>) -> Self {
        Self { file: Some(Arc::from(file.as_ref())), ..self }
    }

    pub fn file(&self) -> Option<&Utf8Path> {
        self.file.as_deref()
    }

    /// Converts the location to a byte range of `text`.
    ///
    /// Returns `None` when the first line does not exist. Columns past the
    /// end of a line are clamped to it.
    pub fn text_range(&self, text: &str) -> Option<TextRange> {
        let index = LineIndex::new(text);
        let start = char_offset(&index, text, self.first_line, self.first_column.max(1) - 1)?;
        let end = char_offset(&index, text, self.last_line.max(self.first_line), self.last_column)
            .unwrap_or(TextSize::of(text));
        Some(TextRange::new(start, end.max(start)))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{file}:{}", self.first_line),
            None => write!(f, "<file>:{}", self.first_line),
        }
    }
}

/// Byte offset of the `chars`-th character of 1-based `line`.
fn char_offset(index: &LineIndex, text: &str, line: usize, chars: usize) -> Option<TextSize> {
    let line = u32::try_from(line.checked_sub(1)?).ok()?;
    let range = index.line(line)?;
    let line_text = line_content(&text[range]);
    let column = line_text
        .char_indices()
        .nth(chars)
        .map_or(line_text.len(), |(offset, _)| offset);
    Some(range.start() + TextSize::from(column as u32))
}

/// Strips the line terminator.
pub(crate) fn line_content(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
