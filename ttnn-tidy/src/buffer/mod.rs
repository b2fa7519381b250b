//! Lexical buffer service.
//!
//! Per-file byte buffers with offset/location conversion, token-boundary
//! lookups and the bounded-window text searches edit derivation relies on.
//! Nothing here knows about the AST.

pub mod lexer;

use crate::ast::{FileId, TranslationUnit};
use ruff_text_size::{TextRange, TextSize};
use rustc_hash::FxHashMap;

pub use lexer::TokenKind;

/// A utility struct to convert byte offsets to line/column positions.
///
/// Front-ends report byte offsets; diagnostics are easier to read with lines.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Stores the byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source code for newlines.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        // '\n' is always a single byte in UTF-8.
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a byte offset to a 1-indexed line number.
    #[must_use]
    pub fn line_index(&self, offset: TextSize) -> usize {
        let offset = offset.to_usize();
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// Converts a byte offset to a 1-indexed column (in bytes).
    #[must_use]
    pub fn column_index(&self, offset: TextSize) -> usize {
        let line = self.line_index(offset);
        offset.to_usize() - self.line_starts[line - 1] + 1
    }

    /// Start offset of the line containing `offset`.
    #[must_use]
    pub fn line_start(&self, offset: TextSize) -> TextSize {
        let line = self.line_index(offset);
        TextSize::try_from(self.line_starts[line - 1]).unwrap_or(offset)
    }
}

/// One file's bytes plus its line index.
#[derive(Debug, Clone)]
pub struct SourceBuffer<'a> {
    text: &'a str,
    lines: LineIndex,
}

impl<'a> SourceBuffer<'a> {
    /// Wraps a file's contents.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: LineIndex::new(text),
        }
    }

    /// Raw contents.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Line index of the buffer.
    #[must_use]
    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    /// Buffer length as a [`TextSize`].
    #[must_use]
    pub fn len(&self) -> TextSize {
        TextSize::of(self.text)
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn contains(&self, offset: TextSize) -> bool {
        offset <= self.len() && self.text.is_char_boundary(offset.to_usize())
    }

    /// Text of `range`, if it lies inside the buffer on character boundaries.
    #[must_use]
    pub fn slice(&self, range: TextRange) -> Option<&'a str> {
        if !self.contains(range.start()) || !self.contains(range.end()) {
            return None;
        }
        Some(&self.text[range])
    }

    /// End of the token starting at `offset`.
    #[must_use]
    pub fn token_end(&self, offset: TextSize) -> Option<TextSize> {
        if !self.contains(offset) {
            return None;
        }
        TextSize::try_from(lexer::token_end(self.text, offset.to_usize())).ok()
    }

    /// Offset just past the next token of `kind` following the token at `after`.
    #[must_use]
    pub fn find_next_token(&self, after: TextSize, kind: TokenKind) -> Option<TextSize> {
        if !self.contains(after) {
            return None;
        }
        let found = lexer::find_next_token(self.text, after.to_usize(), kind)?;
        TextSize::try_from(found).ok()
    }

    /// Offset just past the first token at or after `from` (trivia skipped),
    /// provided that token is of `kind`.
    #[must_use]
    pub fn expect_token(&self, from: TextSize, kind: TokenKind) -> Option<TextSize> {
        if !self.contains(from) {
            return None;
        }
        let found = lexer::expect_token(self.text, from.to_usize(), kind)?;
        TextSize::try_from(found).ok()
    }

    /// Whether every byte in `[from, to)` is whitespace.
    #[must_use]
    pub fn only_whitespace_between(&self, from: TextSize, to: TextSize) -> bool {
        if from > to {
            return false;
        }
        self.slice(TextRange::new(from, to))
            .is_some_and(|s| s.chars().all(char::is_whitespace))
    }

    /// Searches `needle` in the `window` bytes starting at `from`.
    ///
    /// Occurrences that straddle the end of the window are not found.
    #[must_use]
    pub fn find_in_window(&self, from: TextSize, needle: &str, window: usize) -> Option<TextSize> {
        if !self.contains(from) {
            return None;
        }
        let start = from.to_usize();
        let end = floor_char_boundary(self.text, start.saturating_add(window));
        let pos = self.text[start..end].find(needle)?;
        TextSize::try_from(start + pos).ok()
    }

    /// Searches the last occurrence of `needle` in the `window` bytes ending at `before`.
    #[must_use]
    pub fn rfind_in_window(
        &self,
        before: TextSize,
        needle: &str,
        window: usize,
    ) -> Option<TextSize> {
        if !self.contains(before) {
            return None;
        }
        let end = before.to_usize();
        let start = ceil_char_boundary(self.text, end.saturating_sub(window));
        let pos = self.text[start..end].rfind(needle)?;
        TextSize::try_from(start + pos).ok()
    }

    /// Offset of the first `\n` at or after `from`, if any.
    #[must_use]
    pub fn next_newline(&self, from: TextSize) -> Option<TextSize> {
        if !self.contains(from) {
            return None;
        }
        let start = from.to_usize();
        let pos = self.text[start..].find('\n')?;
        TextSize::try_from(start + pos).ok()
    }

    /// Byte at `offset`, if inside the buffer.
    #[must_use]
    pub fn byte_at(&self, offset: TextSize) -> Option<u8> {
        self.text.as_bytes().get(offset.to_usize()).copied()
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Buffers of every file in one translation unit.
#[derive(Debug)]
pub struct SourceManager<'a> {
    buffers: FxHashMap<FileId, SourceBuffer<'a>>,
}

impl<'a> SourceManager<'a> {
    /// Indexes every buffer of the unit.
    #[must_use]
    pub fn new(unit: &'a TranslationUnit) -> Self {
        let buffers = unit
            .files
            .iter()
            .map(|f| (f.id, SourceBuffer::new(&f.text)))
            .collect();
        Self { buffers }
    }

    /// Buffer of `file`.
    #[must_use]
    pub fn buffer(&self, file: FileId) -> Option<&SourceBuffer<'a>> {
        self.buffers.get(&file)
    }
}
