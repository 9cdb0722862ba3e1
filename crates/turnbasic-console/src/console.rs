#![forbid(unsafe_code)]

//! Console display state.
//!
//! The console separates output into three regions:
//!
//! - **Committed lines**: output that has been terminated by a line break.
//!   These never change again (short of [`ConsoleModel::clear_screen`]).
//! - **Partial line**: output since the last line break. It is visible but
//!   still open, and a prompt may take it over.
//! - **Prompt**: prompt text plus any partial output absorbed when the prompt
//!   was shown, so `INPUT "NAME";N$` renders as `NAME? ` on one line.
//!
//! Text is never lost between regions. Clearing a prompt hands its absorbed
//! prefix back to the partial line; committing a prompt freezes prefix,
//! prompt and the echoed response as one [`LineKind::Echo`] line.
//!
//! # Example
//!
//! ```
//! use turnbasic_console::ConsoleModel;
//!
//! let mut console = ConsoleModel::new();
//! console.print("AB");
//! console.print("CD\n");
//! console.print("NAME");
//! console.set_prompt("? ");
//!
//! assert_eq!(console.line_texts(), vec!["ABCD"]);
//! assert_eq!(console.prompt_line(), "NAME? ");
//!
//! console.commit_prompt_to_output("BOB");
//! assert_eq!(console.line_texts(), vec!["ABCD", "NAME? BOB"]);
//! assert_eq!(console.prompt_line(), "");
//! ```

use core::fmt;

use unicode_width::UnicodeWidthStr;

use crate::edit_buffer::EditBuffer;

// ============================================================================
// Fragments and lines
// ============================================================================

/// Styling class for diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DiagnosticClass {
    /// Program or engine error.
    Error,
    /// Supporting lines printed under an error.
    ErrorContext,
    /// Warnings and interruption notices.
    Warning,
    /// Informational diagnostics such as line traces.
    Info,
}

impl DiagnosticClass {
    /// Class name as used by style sheets.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::ErrorContext => "error-context",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for DiagnosticClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run of text sharing one class.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fragment {
    /// Text without line terminators.
    pub text: String,
    /// Diagnostic class, `None` for plain program output.
    pub class: Option<DiagnosticClass>,
}

impl Fragment {
    /// Plain program output.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: None,
        }
    }

    /// Classified diagnostic output.
    #[must_use]
    pub fn classified(text: impl Into<String>, class: DiagnosticClass) -> Self {
        Self {
            text: text.into(),
            class: Some(class),
        }
    }
}

/// How a committed line came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LineKind {
    /// Output terminated by a line break.
    #[default]
    Output,
    /// A prompt frozen together with the user's response.
    Echo,
}

/// A committed console line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsoleLine {
    /// Origin of the line.
    pub kind: LineKind,
    /// Fragments, in display order.
    pub fragments: Vec<Fragment>,
}

impl ConsoleLine {
    /// Plain text of the line.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    /// Display width in terminal cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.fragments.iter().map(|f| f.text.width()).sum()
    }

    /// Whether any fragment carries `class`.
    #[must_use]
    pub fn has_class(&self, class: DiagnosticClass) -> bool {
        self.fragments.iter().any(|f| f.class == Some(class))
    }
}

// ============================================================================
// Console model
// ============================================================================

/// Display state for one interactive session.
#[derive(Debug, Clone)]
pub struct ConsoleModel {
    lines: Vec<ConsoleLine>,
    partial: Vec<Fragment>,
    prompt_prefix: Vec<Fragment>,
    prompt: String,
    edit: EditBuffer,
    input_enabled: bool,
    scrollback_limit: Option<usize>,
    dropped_lines: u64,
}

impl Default for ConsoleModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleModel {
    /// Create an empty console with unbounded scrollback.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            partial: Vec::new(),
            prompt_prefix: Vec::new(),
            prompt: String::new(),
            edit: EditBuffer::new(),
            input_enabled: true,
            scrollback_limit: None,
            dropped_lines: 0,
        }
    }

    /// Keep at most `limit` committed lines, dropping the oldest (builder).
    #[must_use]
    pub fn with_scrollback_limit(mut self, limit: usize) -> Self {
        self.scrollback_limit = Some(limit);
        self.trim_scrollback();
        self
    }

    // --- Output ---

    /// Append program output. Each `\n` commits the open line.
    pub fn print(&mut self, text: &str) {
        self.append(text, None);
    }

    /// Append output tagged with a diagnostic class.
    pub fn print_classified(&mut self, text: &str, class: DiagnosticClass) {
        self.append(text, Some(class));
    }

    /// Print a diagnostic on a line of its own.
    ///
    /// An open partial line is committed first so the diagnostic never runs
    /// into program output.
    pub fn println_classified(&mut self, text: &str, class: DiagnosticClass) {
        if !self.partial.is_empty() {
            self.commit_partial(LineKind::Output);
        }
        let text = text.strip_suffix('\n').unwrap_or(text);
        self.append(text, Some(class));
        self.commit_partial(LineKind::Output);
    }

    /// Discard committed output and the open partial line.
    ///
    /// The prompt, edit buffer and any input history are untouched.
    pub fn clear_screen(&mut self) {
        self.lines.clear();
        self.partial.clear();
    }

    // --- Prompt ---

    /// Show `text` as the prompt and enable input.
    ///
    /// Open partial output is absorbed into the prompt's prefix so the prompt
    /// continues the current line instead of starting a new one.
    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.absorb_partial();
        self.prompt = text.into();
        self.input_enabled = true;
    }

    /// Remove the prompt text. An absorbed prefix returns to the partial line.
    pub fn clear_prompt(&mut self) {
        self.prompt.clear();
        if !self.prompt_prefix.is_empty() {
            let mut restored = std::mem::take(&mut self.prompt_prefix);
            restored.append(&mut self.partial);
            self.partial = restored;
        }
    }

    /// Freeze prefix, prompt and `suffix` into a committed echo line.
    ///
    /// Used when the host echoes what the user typed. Leaves the prompt empty.
    pub fn commit_prompt_to_output(&mut self, suffix: &str) {
        self.absorb_partial();
        let mut fragments = std::mem::take(&mut self.prompt_prefix);
        let response = format!("{}{}", self.prompt, suffix);
        if !response.is_empty() {
            fragments.push(Fragment::plain(response));
        }
        self.prompt.clear();
        self.push_line(ConsoleLine {
            kind: LineKind::Echo,
            fragments,
        });
    }

    /// Clear prompt and edit buffer and stop accepting input.
    pub fn disable_input(&mut self) {
        self.clear_prompt();
        self.edit.clear();
        self.input_enabled = false;
    }

    // --- Accessors ---

    /// Committed lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[ConsoleLine] {
        &self.lines
    }

    /// Plain text of every committed line.
    #[must_use]
    pub fn line_texts(&self) -> Vec<String> {
        self.lines.iter().map(ConsoleLine::plain_text).collect()
    }

    /// Fragments of the open partial line.
    #[must_use]
    pub fn partial_fragments(&self) -> &[Fragment] {
        &self.partial
    }

    /// Plain text of the open partial line.
    #[must_use]
    pub fn partial_text(&self) -> String {
        concat(&self.partial)
    }

    /// Prompt text, without the absorbed prefix.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Fragments absorbed into the prompt.
    #[must_use]
    pub fn prompt_prefix(&self) -> &[Fragment] {
        &self.prompt_prefix
    }

    /// Prefix followed by prompt text, as displayed before the edit buffer.
    #[must_use]
    pub fn prompt_line(&self) -> String {
        let mut line = concat(&self.prompt_prefix);
        line.push_str(&self.prompt);
        line
    }

    /// Everything visible except the edit buffer: committed lines, the open
    /// partial line, then the prompt line.
    #[must_use]
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.plain_text());
            out.push('\n');
        }
        out.push_str(&self.partial_text());
        out.push_str(&self.prompt_line());
        out
    }

    /// Whether the host should accept typing.
    #[must_use]
    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// The live input line.
    #[must_use]
    pub fn edit_buffer(&self) -> &EditBuffer {
        &self.edit
    }

    /// Mutable access to the live input line.
    pub fn edit_buffer_mut(&mut self) -> &mut EditBuffer {
        &mut self.edit
    }

    /// Number of committed lines dropped by the scrollback limit.
    #[must_use]
    pub fn dropped_line_count(&self) -> u64 {
        self.dropped_lines
    }

    // --- Helpers ---

    fn append(&mut self, text: &str, class: Option<DiagnosticClass>) {
        let mut rest = text;
        while let Some(pos) = rest.find('\n') {
            let line = &rest[..pos];
            self.push_partial(line.strip_suffix('\r').unwrap_or(line), class);
            self.commit_partial(LineKind::Output);
            rest = &rest[pos + 1..];
        }
        self.push_partial(rest, class);
    }

    fn push_partial(&mut self, text: &str, class: Option<DiagnosticClass>) {
        if text.is_empty() {
            return;
        }
        match self.partial.last_mut() {
            Some(last) if last.class == class => last.text.push_str(text),
            _ => self.partial.push(Fragment {
                text: text.to_string(),
                class,
            }),
        }
    }

    fn commit_partial(&mut self, kind: LineKind) {
        let fragments = std::mem::take(&mut self.partial);
        self.push_line(ConsoleLine { kind, fragments });
    }

    fn absorb_partial(&mut self) {
        self.prompt_prefix.append(&mut self.partial);
    }

    fn push_line(&mut self, line: ConsoleLine) {
        self.lines.push(line);
        self.trim_scrollback();
    }

    fn trim_scrollback(&mut self) {
        if let Some(limit) = self.scrollback_limit
            && self.lines.len() > limit
        {
            let excess = self.lines.len() - limit;
            self.lines.drain(..excess);
            self.dropped_lines += excess as u64;
            turnbasic_core::trace!(excess, limit, "console scrollback trimmed");
        }
    }
}

fn concat(fragments: &[Fragment]) -> String {
    fragments.iter().map(|f| f.text.as_str()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn partial_line_is_committed_by_later_newline() {
        let mut console = ConsoleModel::new();
        console.print("AB");
        assert_eq!(console.partial_text(), "AB");
        assert!(console.lines().is_empty());

        console.print("CD\n");
        console.set_prompt("] ");
        assert_eq!(console.line_texts(), vec!["ABCD"]);
        assert_eq!(console.prompt(), "] ");
        assert_eq!(console.prompt_line(), "] ");
        assert!(console.partial_fragments().is_empty());
    }

    #[test]
    fn embedded_newlines_split_lines() {
        let mut console = ConsoleModel::new();
        console.print("ONE\nTWO\r\nTHR");
        assert_eq!(console.line_texts(), vec!["ONE", "TWO"]);
        assert_eq!(console.partial_text(), "THR");
    }

    #[test]
    fn bare_newline_commits_empty_line() {
        let mut console = ConsoleModel::new();
        console.print("\n");
        assert_eq!(console.line_texts(), vec![""]);
    }

    #[test]
    fn set_prompt_absorbs_partial_output() {
        let mut console = ConsoleModel::new();
        console.print("NAME");
        console.set_prompt("? ");
        assert_eq!(console.partial_text(), "");
        assert_eq!(console.prompt_line(), "NAME? ");
        assert_eq!(console.transcript(), "NAME? ");
    }

    #[test]
    fn clear_prompt_restores_absorbed_prefix() {
        let mut console = ConsoleModel::new();
        console.print("HALF");
        console.set_prompt("? ");
        console.clear_prompt();
        assert_eq!(console.prompt_line(), "");
        assert_eq!(console.partial_text(), "HALF");

        console.print(" DONE\n");
        assert_eq!(console.line_texts(), vec!["HALF DONE"]);
    }

    #[test]
    fn commit_prompt_freezes_echo_line() {
        let mut console = ConsoleModel::new();
        console.set_prompt("] ");
        console.commit_prompt_to_output("PRINT \"HI\"");
        let line = &console.lines()[0];
        assert_eq!(line.kind, LineKind::Echo);
        assert_eq!(line.plain_text(), "] PRINT \"HI\"");
        assert_eq!(console.prompt(), "");
    }

    #[test]
    fn commit_prompt_includes_unabsorbed_partial() {
        let mut console = ConsoleModel::new();
        console.print("COUNTING 1 2");
        console.commit_prompt_to_output("^C");
        assert_eq!(console.line_texts(), vec!["COUNTING 1 2^C"]);
        assert_eq!(console.partial_text(), "");
    }

    #[test]
    fn println_classified_starts_fresh_line() {
        let mut console = ConsoleModel::new();
        console.print("PARTIAL");
        console.println_classified("BREAK IN 20", DiagnosticClass::Warning);
        assert_eq!(console.line_texts(), vec!["PARTIAL", "BREAK IN 20"]);
        assert!(console.lines()[1].has_class(DiagnosticClass::Warning));
        assert!(!console.lines()[0].has_class(DiagnosticClass::Warning));
    }

    #[test]
    fn println_classified_does_not_double_terminate() {
        let mut console = ConsoleModel::new();
        console.println_classified("?SYNTAX ERROR\n", DiagnosticClass::Error);
        assert_eq!(console.line_texts(), vec!["?SYNTAX ERROR"]);
    }

    #[test]
    fn mixed_classes_keep_separate_fragments() {
        let mut console = ConsoleModel::new();
        console.print_classified("#10 ", DiagnosticClass::Info);
        console.print_classified("#20 ", DiagnosticClass::Info);
        console.print("HELLO\n");
        let line = &console.lines()[0];
        assert_eq!(
            line.fragments,
            vec![
                Fragment::classified("#10 #20 ", DiagnosticClass::Info),
                Fragment::plain("HELLO"),
            ]
        );
    }

    #[test]
    fn clear_screen_keeps_prompt_and_edit_buffer() {
        let mut console = ConsoleModel::new();
        console.print("OLD\nOPEN");
        console.set_prompt("] ");
        console.edit_buffer_mut().insert_str("LIST");
        console.print("MORE");
        console.clear_screen();
        assert!(console.lines().is_empty());
        assert_eq!(console.partial_text(), "");
        assert_eq!(console.prompt_line(), "OPEN] ");
        assert_eq!(console.edit_buffer().value(), "LIST");
    }

    #[test]
    fn disable_input_clears_prompt_and_edit() {
        let mut console = ConsoleModel::new();
        console.set_prompt("] ");
        console.edit_buffer_mut().insert_str("RUN");
        console.disable_input();
        assert!(!console.is_input_enabled());
        assert_eq!(console.prompt(), "");
        assert!(console.edit_buffer().is_empty());

        console.set_prompt("] ");
        assert!(console.is_input_enabled());
    }

    #[test]
    fn scrollback_limit_drops_oldest() {
        let mut console = ConsoleModel::new().with_scrollback_limit(2);
        console.print("1\n2\n3\n");
        assert_eq!(console.line_texts(), vec!["2", "3"]);
        assert_eq!(console.dropped_line_count(), 1);
    }

    #[test]
    fn class_names() {
        assert_eq!(DiagnosticClass::ErrorContext.to_string(), "error-context");
        assert_eq!(DiagnosticClass::Info.as_str(), "info");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn lines_serialize_with_class_names() {
        let line = ConsoleLine {
            kind: LineKind::Output,
            fragments: vec![Fragment::classified("REENTER", DiagnosticClass::Warning)],
        };
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"warning\""), "{json}");
        let back: ConsoleLine = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }

    proptest! {
        #[test]
        fn no_output_is_lost(chunks in proptest::collection::vec("[A-C\n]{0,5}", 0..12)) {
            let mut console = ConsoleModel::new();
            for chunk in &chunks {
                console.print(chunk);
            }
            console.set_prompt("] ");
            let expected = format!("{}] ", chunks.concat());
            prop_assert_eq!(console.transcript(), expected);
            prop_assert!(console.partial_fragments().is_empty());
        }
    }
}
