//! Raw-mode interactive line editor.
//!
//! A multi-line, Unicode-aware, history-capable terminal input editor built
//! directly on the raw byte stream: control characters, CSI escape sequences
//! and bracket-paste blocks are decoded by an incremental state machine, and
//! the buffer is redrawn with deferred-wrap arithmetic at exact
//! terminal-width boundaries.

pub mod buffer;
pub mod decoder;
pub mod history;
pub mod render;
pub mod session;
pub mod terminal;
pub mod width;

pub use session::{run_editor, EditorConfig, ReadOutcome, TermEvent, TerminalDevice};
pub use terminal::Terminal;
