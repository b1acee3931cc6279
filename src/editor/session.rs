use std::io::Write;

use tokio::sync::mpsc;

use super::buffer::EditorState;
use super::decoder::{Decoder, EditCommand};
use super::history::HistoryNavigator;
use super::render::Renderer;

const DEFAULT_COLS: usize = 80;
const PASTE_REPORT_ON: &[u8] = b"\x1b[?2004h";
const PASTE_REPORT_OFF: &[u8] = b"\x1b[?2004l";

/// Terminal input events, as delivered by the device wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermEvent {
    Chunk(Vec<u8>),
    Resize,
}

/// Capability handle for the global terminal flags the session borrows.
///
/// The session is the sole owner of raw mode for its duration and releases it
/// on every exit path; nested sessions against the same device must not occur.
pub trait TerminalDevice {
    fn enable_raw(&mut self) -> std::io::Result<()>;
    fn disable_raw(&mut self);
    /// Terminal width in columns, `None` when it cannot be queried.
    fn cols(&self) -> Option<u16>;
}

#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub prompt: String,
    pub continuation_prompt: String,
    /// Past entries, most recent first. Never mutated.
    pub history: Vec<String>,
}

/// How an editing session resolved. Produced exactly once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Input(String),
    Cancel,
    EndOfInput,
}

fn term_cols<D: TerminalDevice>(device: &D) -> usize {
    match device.cols() {
        Some(c) if c > 0 => c as usize,
        _ => DEFAULT_COLS,
    }
}

fn end_of_transmission(state: &EditorState) -> ReadOutcome {
    if state.is_empty() {
        ReadOutcome::EndOfInput
    } else {
        ReadOutcome::Input(state.text())
    }
}

fn apply(
    cmd: EditCommand,
    state: &mut EditorState,
    nav: &mut HistoryNavigator,
) -> Option<ReadOutcome> {
    match cmd {
        EditCommand::Insert(ch) => state.insert_text(ch.encode_utf8(&mut [0; 4])),
        EditCommand::InsertNewline => state.insert_newline(),
        EditCommand::Paste(text) => state.insert_text(&text),
        EditCommand::Backspace => state.backspace(),
        EditCommand::DeleteForward => state.delete_forward(),
        EditCommand::MoveLeft => state.move_left(),
        EditCommand::MoveRight => state.move_right(),
        EditCommand::MoveUp => {
            if !state.move_up() {
                nav.older(state);
            }
        }
        EditCommand::MoveDown => {
            if !state.move_down() {
                nav.newer(state);
            }
        }
        EditCommand::MoveToStart => state.move_to_start(),
        EditCommand::MoveToEnd => state.move_to_end(),
        EditCommand::ClearToStart => state.clear_to_start(),
        EditCommand::ClearToEnd => state.clear_to_end(),
        EditCommand::Submit => return Some(ReadOutcome::Input(state.text())),
        EditCommand::Cancel => return Some(ReadOutcome::Cancel),
        EditCommand::EndOfTransmission => return Some(end_of_transmission(state)),
    }
    None
}

/// Run one editing session to completion.
///
/// Raw mode and paste reporting are enabled best-effort on entry and released
/// unconditionally on every exit path, including a failed initial render
/// (which resolves as [`ReadOutcome::Cancel`]). Render failures after the
/// first are suppressed so a flaky output device cannot corrupt the session.
pub async fn run_editor<W: Write, D: TerminalDevice>(
    config: &EditorConfig,
    events: &mut mpsc::UnboundedReceiver<TermEvent>,
    out: &mut W,
    device: &mut D,
) -> ReadOutcome {
    let _ = device.enable_raw();
    let _ = out.write_all(PASTE_REPORT_ON).and_then(|_| out.flush());

    let mut state = EditorState::new();
    let mut nav = HistoryNavigator::new(config.history.clone());
    let mut decoder = Decoder::new();
    let mut renderer = Renderer::new(&config.prompt, &config.continuation_prompt);

    let outcome = if renderer.render(out, &state, term_cols(device)).is_err() {
        ReadOutcome::Cancel
    } else {
        'session: loop {
            let Some(event) = events.recv().await else {
                // Input source is gone; resolve like end-of-transmission.
                break 'session end_of_transmission(&state);
            };
            match event {
                TermEvent::Resize => {
                    let _ = renderer.render(out, &state, term_cols(device));
                }
                TermEvent::Chunk(bytes) => {
                    for cmd in decoder.feed(&bytes) {
                        if let Some(outcome) = apply(cmd, &mut state, &mut nav) {
                            break 'session outcome;
                        }
                        let _ = renderer.render(out, &state, term_cols(device));
                    }
                }
            }
        }
    };

    let _ = out.write_all(b"\r\n");
    let _ = out.write_all(PASTE_REPORT_OFF).and_then(|_| out.flush());
    device.disable_raw();
    outcome
}
