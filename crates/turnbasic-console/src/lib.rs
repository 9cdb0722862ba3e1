#![forbid(unsafe_code)]

//! Interactive console model for turnbasic sessions.
//!
//! - [`ConsoleModel`] - committed output, the open partial line, and the prompt
//! - [`EditBuffer`] - the line the user is typing
//! - [`InputHistory`] - up/down recall over past submissions
//!
//! Nothing here renders. Hosts read the model after each turn and draw it
//! however they like (DOM, terminal, test assertions).

pub mod console;
pub mod edit_buffer;
pub mod history;

pub use console::{ConsoleLine, ConsoleModel, DiagnosticClass, Fragment, LineKind};
pub use edit_buffer::EditBuffer;
pub use history::{HistoryDirection, InputHistory};
