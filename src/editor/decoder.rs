use bytes::BytesMut;

const PASTE_END: &str = "\x1b[201~";

/// One editing command, decoded from the raw input stream.
///
/// The decoder never looks at the buffer: `EndOfTransmission` (0x04) is
/// resolved by the session into end-of-input or submit depending on whether
/// the buffer is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Insert(char),
    InsertNewline,
    Paste(String),
    Backspace,
    DeleteForward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    MoveToStart,
    MoveToEnd,
    ClearToStart,
    ClearToEnd,
    Submit,
    Cancel,
    EndOfTransmission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Normal,
    EscapeSeen,
    CsiParsing,
    Paste,
}

/// Incremental decoder from raw bytes to [`EditCommand`]s.
///
/// Input arrives in arbitrary chunks: a multi-byte character, an escape
/// sequence, or a paste marker may be split at any boundary. Incomplete
/// UTF-8 tails are retained between feeds; truly invalid bytes are a
/// fail-safe [`EditCommand::Cancel`].
pub struct Decoder {
    pending: BytesMut,
    state: ParseState,
    seq: String,
    paste: String,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            pending: BytesMut::new(),
            state: ParseState::Normal,
            seq: String::new(),
            paste: String::new(),
        }
    }

    /// Feed one chunk, returning every command it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<EditCommand> {
        self.pending.extend_from_slice(chunk);
        let mut out = Vec::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    let text = text.to_string();
                    self.pending.clear();
                    for ch in text.chars() {
                        self.step(ch, &mut out);
                    }
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    let text =
                        std::str::from_utf8(&self.pending[..valid]).unwrap_or("").to_string();
                    match err.error_len() {
                        None => {
                            // Incomplete multi-byte tail; keep it for the
                            // next chunk.
                            for ch in text.chars() {
                                self.step(ch, &mut out);
                            }
                            let tail = self.pending.split_off(valid);
                            self.pending = tail;
                            break;
                        }
                        Some(_) => {
                            for ch in text.chars() {
                                self.step(ch, &mut out);
                            }
                            self.pending.clear();
                            self.state = ParseState::Normal;
                            out.push(EditCommand::Cancel);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    fn step(&mut self, ch: char, out: &mut Vec<EditCommand>) {
        match self.state {
            ParseState::Normal => self.step_normal(ch, out),
            ParseState::EscapeSeen => self.step_escape(ch, out),
            ParseState::CsiParsing => self.step_csi(ch, out),
            ParseState::Paste => self.step_paste(ch, out),
        }
    }

    fn step_normal(&mut self, ch: char, out: &mut Vec<EditCommand>) {
        match ch {
            '\x03' => out.push(EditCommand::Cancel),
            '\x04' => out.push(EditCommand::EndOfTransmission),
            '\n' => out.push(EditCommand::InsertNewline),
            '\r' => out.push(EditCommand::Submit),
            '\x7f' => out.push(EditCommand::Backspace),
            '\x01' => out.push(EditCommand::MoveToStart),
            '\x05' => out.push(EditCommand::MoveToEnd),
            '\x15' => out.push(EditCommand::ClearToStart),
            '\x0b' => out.push(EditCommand::ClearToEnd),
            '\x1b' => self.state = ParseState::EscapeSeen,
            ch if ch >= ' ' => out.push(EditCommand::Insert(ch)),
            _ => {}
        }
    }

    fn step_escape(&mut self, ch: char, out: &mut Vec<EditCommand>) {
        match ch {
            '[' => {
                self.seq.clear();
                self.state = ParseState::CsiParsing;
            }
            '\r' | '\n' => {
                // Alt+Enter convention.
                out.push(EditCommand::InsertNewline);
                self.state = ParseState::Normal;
            }
            other => {
                // Unknown escape: drop the ESC, reprocess the character so a
                // printable following a stray escape is not lost.
                self.state = ParseState::Normal;
                self.step_normal(other, out);
            }
        }
    }

    fn step_csi(&mut self, ch: char, out: &mut Vec<EditCommand>) {
        match ch {
            '\x30'..='\x3f' | '\x20'..='\x2f' => self.seq.push(ch),
            '\x40'..='\x7e' => {
                self.state = ParseState::Normal;
                match (self.seq.as_str(), ch) {
                    ("", 'A') => out.push(EditCommand::MoveUp),
                    ("", 'B') => out.push(EditCommand::MoveDown),
                    ("", 'C') => out.push(EditCommand::MoveRight),
                    ("", 'D') => out.push(EditCommand::MoveLeft),
                    ("", 'H') => out.push(EditCommand::MoveToStart),
                    ("", 'F') => out.push(EditCommand::MoveToEnd),
                    ("3", '~') => out.push(EditCommand::DeleteForward),
                    ("200", '~') => {
                        self.paste.clear();
                        self.state = ParseState::Paste;
                    }
                    _ => {}
                }
            }
            _ => self.state = ParseState::Normal,
        }
    }

    fn step_paste(&mut self, ch: char, out: &mut Vec<EditCommand>) {
        self.paste.push(ch);
        if self.paste.ends_with(PASTE_END) {
            let text = self.paste[..self.paste.len() - PASTE_END.len()].to_string();
            self.paste.clear();
            self.state = ParseState::Normal;
            out.push(EditCommand::Paste(text));
        }
    }
}
