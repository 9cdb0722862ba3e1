#![forbid(unsafe_code)]

//! Program text classification.
//!
//! Program text is a sequence of newline-separated lines. A line is a
//! statement line only when its first non-blank character is a decimal digit
//! (its line number). Everything else is either blank or discarded; discarded
//! lines must never reach the engine.
//!
//! ```
//! use turnbasic_core::source::ProgramSource;
//!
//! let src = ProgramSource::parse("10 PRINT 1\nhello\n\n20 END\n");
//! let lines: Vec<_> = src.statements().map(|l| l.text()).collect();
//! assert_eq!(lines, vec!["10 PRINT 1", "20 END"]);
//! assert_eq!(src.discarded().count(), 1);
//! ```

/// One physical line of program text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLine<'a> {
    /// A numbered line to feed to the engine.
    Statement {
        /// 1-based physical line position.
        physical: usize,
        /// Line text without its terminator.
        text: &'a str,
    },
    /// Empty or whitespace-only line.
    Blank {
        /// 1-based physical line position.
        physical: usize,
    },
    /// Non-blank line without a leading line number.
    Discarded {
        /// 1-based physical line position.
        physical: usize,
        /// Line text without its terminator.
        text: &'a str,
    },
}

impl<'a> SourceLine<'a> {
    /// Classify a single line. `physical` is its 1-based position.
    #[must_use]
    pub fn classify(physical: usize, text: &'a str) -> Self {
        match leading_blank_trimmed(text).chars().next() {
            None => Self::Blank { physical },
            Some(c) if c.is_ascii_digit() => Self::Statement { physical, text },
            Some(_) => Self::Discarded { physical, text },
        }
    }

    /// 1-based physical line position.
    #[must_use]
    pub const fn physical(&self) -> usize {
        match *self {
            Self::Statement { physical, .. }
            | Self::Blank { physical }
            | Self::Discarded { physical, .. } => physical,
        }
    }

    /// Line text (empty for blank lines).
    #[must_use]
    pub const fn text(&self) -> &'a str {
        match *self {
            Self::Statement { text, .. } | Self::Discarded { text, .. } => text,
            Self::Blank { .. } => "",
        }
    }

    /// Whether this is a statement line.
    #[must_use]
    pub const fn is_statement(&self) -> bool {
        matches!(self, Self::Statement { .. })
    }

    /// Leading line number of a statement line.
    ///
    /// `None` for other lines, or when the number does not fit in a `u64`.
    #[must_use]
    pub fn line_number(&self) -> Option<u64> {
        let Self::Statement { text, .. } = self else {
            return None;
        };
        let trimmed = leading_blank_trimmed(text);
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        trimmed[..end].parse().ok()
    }
}

/// Program text split into classified lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSource<'a> {
    lines: Vec<SourceLine<'a>>,
}

impl<'a> ProgramSource<'a> {
    /// Split `text` on line terminators (`\n` or `\r\n`) and classify each line.
    #[must_use]
    pub fn parse(text: &'a str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| SourceLine::classify(idx + 1, line))
            .collect();
        Self { lines }
    }

    /// Every physical line, in order.
    #[must_use]
    pub fn lines(&self) -> &[SourceLine<'a>] {
        &self.lines
    }

    /// Statement lines, in order.
    pub fn statements(&self) -> impl Iterator<Item = &SourceLine<'a>> + '_ {
        self.lines.iter().filter(|l| l.is_statement())
    }

    /// Discarded lines, in order.
    pub fn discarded(&self) -> impl Iterator<Item = &SourceLine<'a>> + '_ {
        self.lines
            .iter()
            .filter(|l| matches!(l, SourceLine::Discarded { .. }))
    }
}

fn leading_blank_trimmed(text: &str) -> &str {
    text.trim_start_matches([' ', '\t'])
}
