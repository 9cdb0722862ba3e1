#![forbid(unsafe_code)]

//! Command history with up/down recall.
//!
//! The history keeps two views of past input. `committed` holds the
//! submissions themselves. `scratch` is a working copy with one extra empty
//! slot at the end, and navigation edits it freely: whatever the user has
//! typed is saved into the slot being left, so walking back down restores it.
//! Submitting rebuilds `scratch` from `committed`, discarding those edits.
//!
//! ```
//! use turnbasic_console::{EditBuffer, HistoryDirection, InputHistory};
//!
//! let mut history = InputHistory::new();
//! history.record_submission("PRINT 1");
//! history.record_submission("PRINT 2");
//!
//! let mut buf = EditBuffer::new().with_value("LIS");
//! history.record_keystroke(HistoryDirection::Up, &mut buf);
//! assert_eq!(buf.value(), "PRINT 2");
//! history.record_keystroke(HistoryDirection::Down, &mut buf);
//! assert_eq!(buf.value(), "LIS");
//! ```

use crate::edit_buffer::EditBuffer;

/// Navigation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    /// Towards older entries.
    Up,
    /// Towards newer entries and the live line.
    Down,
}

/// Submission history for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputHistory {
    committed: Vec<String>,
    scratch: Vec<String>,
    cursor: usize,
    max_entries: Option<usize>,
}

impl Default for InputHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHistory {
    /// Create an empty, unbounded history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            committed: Vec::new(),
            scratch: vec![String::new()],
            cursor: 0,
            max_entries: None,
        }
    }

    /// Keep at most `max` committed entries, dropping the oldest (builder).
    #[must_use]
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self.trim();
        self.reset_scratch();
        self
    }

    /// Snapshot the edit buffer into the current slot, then move one slot in
    /// `direction` and load it into the buffer with the cursor at the end.
    ///
    /// Moving past either end does nothing. Returns whether the cursor moved.
    pub fn record_keystroke(
        &mut self,
        direction: HistoryDirection,
        buffer: &mut EditBuffer,
    ) -> bool {
        self.scratch[self.cursor] = buffer.value().to_string();
        let target = match direction {
            HistoryDirection::Up => self.cursor.checked_sub(1),
            HistoryDirection::Down => Some(self.cursor + 1).filter(|&i| i < self.scratch.len()),
        };
        let Some(target) = target else {
            return false;
        };
        self.cursor = target;
        buffer.set_value_cursor_at_end(self.scratch[self.cursor].clone());
        true
    }

    /// Record a submitted line. Empty submissions are ignored.
    pub fn record_submission(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.committed.push(value.to_string());
        self.trim();
        self.reset_scratch();
    }

    /// Past submissions, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.committed
    }

    /// Number of committed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    /// Whether nothing has been submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Current index into the working copy.
    #[must_use]
    pub fn cursor_index(&self) -> usize {
        self.cursor
    }

    /// Working copy: committed entries plus the trailing live slot.
    #[must_use]
    pub fn scratch(&self) -> &[String] {
        &self.scratch
    }

    fn trim(&mut self) {
        if let Some(max) = self.max_entries
            && self.committed.len() > max
        {
            let excess = self.committed.len() - max;
            self.committed.drain(..excess);
        }
    }

    fn reset_scratch(&mut self) {
        self.scratch.clone_from(&self.committed);
        self.scratch.push(String::new());
        self.cursor = self.scratch.len() - 1;
    }
}
