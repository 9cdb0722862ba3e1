#![forbid(unsafe_code)]

//! Typed output channel between an engine and its driver.
//!
//! Engines append [`OutputEvent`]s to an [`OutputQueue`] while they work; the
//! driver drains the queue once per turn. Draining hands ownership of every
//! queued event to the caller, so an event can never be delivered twice.
//!
//! # Example
//!
//! ```
//! use turnbasic_core::output::{OutputEvent, OutputKind, OutputQueue};
//!
//! let mut queue = OutputQueue::new();
//! queue.push(OutputEvent::print("HELLO\n"));
//! queue.push(OutputEvent::break_at(Some(20)));
//!
//! let events = queue.drain();
//! assert_eq!(events.len(), 2);
//! assert_eq!(events[1].kind, OutputKind::Break);
//! assert_eq!(events[1].text, "BREAK IN 20");
//! assert!(queue.drain().is_empty());
//! ```

use core::fmt;

/// How a rendered event relates to the line structure of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    /// Appended verbatim; the text itself decides where lines end.
    Verbatim,
    /// Followed by a single space and left on the open line.
    SpaceJoined,
    /// Printed on a line of its own.
    Terminated,
}

/// Closed set of output event kinds.
///
/// Consumers are expected to `match` on this without a wildcard arm so that a
/// new kind fails to compile until every consumer handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// Program output. No trailing line break is implied.
    Print,
    /// Line-number trace marker.
    Trace,
    /// Execution was interrupted.
    Break,
    /// Non-fatal diagnostic.
    Warning,
    /// An `INPUT` value was rejected and must be entered again.
    Reenter,
    /// An `INPUT` value had more data than was requested.
    ExtraIgnored,
}

impl OutputKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Print,
        Self::Trace,
        Self::Break,
        Self::Warning,
        Self::Reenter,
        Self::ExtraIgnored,
    ];

    /// Line structure this kind is rendered with.
    #[must_use]
    pub const fn line_break(self) -> LineBreak {
        match self {
            Self::Print => LineBreak::Verbatim,
            Self::Trace => LineBreak::SpaceJoined,
            Self::Break | Self::Warning | Self::Reenter | Self::ExtraIgnored => {
                LineBreak::Terminated
            }
        }
    }

    /// Whether the kind carries diagnostic rather than program output.
    #[must_use]
    pub const fn is_diagnostic(self) -> bool {
        !matches!(self, Self::Print)
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Trace => "trace",
            Self::Break => "break",
            Self::Warning => "warning",
            Self::Reenter => "reenter",
            Self::ExtraIgnored => "extra-ignored",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of engine output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    /// What kind of output this is.
    pub kind: OutputKind,
    /// Rendered text payload.
    pub text: String,
}

impl OutputEvent {
    /// Create an event from its parts.
    #[must_use]
    pub fn new(kind: OutputKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Program output.
    #[must_use]
    pub fn print(text: impl Into<String>) -> Self {
        Self::new(OutputKind::Print, text)
    }

    /// Trace marker for the line about to execute, rendered `#<line>`.
    #[must_use]
    pub fn trace(line: u64) -> Self {
        Self::new(OutputKind::Trace, format!("#{line}"))
    }

    /// Break notice, rendered `BREAK` or `BREAK IN <line>`.
    #[must_use]
    pub fn break_at(line: Option<u64>) -> Self {
        Self::new(OutputKind::Break, format!("BREAK{}", in_line(line)))
    }

    /// Warning, rendered `WARNING: <msg>` or `WARNING IN <line>: <msg>`.
    #[must_use]
    pub fn warning(message: impl AsRef<str>, line: Option<u64>) -> Self {
        Self::new(
            OutputKind::Warning,
            format!("WARNING{}: {}", in_line(line), message.as_ref()),
        )
    }

    /// Rejected input notice.
    #[must_use]
    pub fn reenter() -> Self {
        Self::new(OutputKind::Reenter, "REENTER")
    }

    /// Excess input notice.
    #[must_use]
    pub fn extra_ignored() -> Self {
        Self::new(OutputKind::ExtraIgnored, "EXTRA IGNORED")
    }
}

impl fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn in_line(line: Option<u64>) -> String {
    line.map(|line| format!(" IN {line}")).unwrap_or_default()
}

/// Ordered, append-only queue of events produced since the last drain.
#[derive(Debug, Clone, Default)]
pub struct OutputQueue {
    events: Vec<OutputEvent>,
}

impl OutputQueue {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event.
    pub fn push(&mut self, event: OutputEvent) {
        self.events.push(event);
    }

    /// Remove and return every queued event in production order.
    pub fn drain(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Peek at queued events without draining them.
    #[must_use]
    pub fn pending(&self) -> &[OutputEvent] {
        &self.events
    }
}

impl Extend<OutputEvent> for OutputQueue {
    fn extend<T: IntoIterator<Item = OutputEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}
