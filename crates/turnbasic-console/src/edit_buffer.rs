#![forbid(unsafe_code)]

//! Single-line edit buffer.
//!
//! Holds the text the user is typing at the prompt and a cursor measured in
//! grapheme clusters, so combined characters and emoji move as one unit.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// The live input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    /// Text value.
    value: String,
    /// Cursor position (grapheme index).
    cursor: usize,
}

impl EditBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial value with the cursor at the end (builder).
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value_cursor_at_end(value);
        self
    }

    // --- Value access ---

    /// Current text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the buffer holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Cursor position as a grapheme index.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display column of the cursor, in terminal cells.
    #[must_use]
    pub fn cursor_column(&self) -> usize {
        let end = self.grapheme_byte_offset(self.cursor);
        self.value[..end].width()
    }

    /// Replace the text and move the cursor to the end.
    pub fn set_value_cursor_at_end(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.grapheme_count();
    }

    /// Remove and return the text, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    /// Clear all text.
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    // --- Editing operations ---

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut buf));
    }

    /// Insert text at the cursor. Line terminators are dropped.
    pub fn insert_str(&mut self, text: &str) {
        let clean: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        if clean.is_empty() {
            return;
        }
        let byte_offset = self.grapheme_byte_offset(self.cursor);
        self.value.insert_str(byte_offset, &clean);
        let new_end = byte_offset + clean.len();
        self.cursor = self.value[..new_end].graphemes(true).count();
    }

    /// Delete the grapheme before the cursor. Returns whether anything changed.
    pub fn delete_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let byte_start = self.grapheme_byte_offset(self.cursor - 1);
        let byte_end = self.grapheme_byte_offset(self.cursor);
        self.value.drain(byte_start..byte_end);
        self.cursor -= 1;
        true
    }

    /// Delete the grapheme under the cursor. Returns whether anything changed.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.grapheme_count() {
            return false;
        }
        let byte_start = self.grapheme_byte_offset(self.cursor);
        let byte_end = self.grapheme_byte_offset(self.cursor + 1);
        self.value.drain(byte_start..byte_end);
        true
    }

    // --- Cursor movement ---

    /// Move one grapheme left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move one grapheme right.
    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.grapheme_count());
    }

    /// Move to the start of the line.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move to the end of the line.
    pub fn move_end(&mut self) {
        self.cursor = self.grapheme_count();
    }

    // --- Helpers ---

    fn grapheme_count(&self) -> usize {
        self.value.graphemes(true).count()
    }

    fn grapheme_byte_offset(&self, grapheme_idx: usize) -> usize {
        self.value
            .grapheme_indices(true)
            .nth(grapheme_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}
