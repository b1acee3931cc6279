use anyhow::Result;
use serde::Deserialize;

use crate::logging;

/// One event from an agent CLI's JSONL stdout stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Incremental assistant text.
    Text { text: String },
    /// Session identifier for resuming the agent later.
    Session { id: String },
    /// Final result text; supersedes accumulated `Text` events.
    Result { text: String },
}

/// Incremental parser for agent stdout.
///
/// Chunks arrive with arbitrary boundaries; only complete lines are parsed,
/// the trailing partial line is buffered. Lines that are not JSON objects
/// degrade to raw `Text` events so plain-text agent CLIs keep working, and
/// JSON objects with unknown `type`s are skipped.
#[derive(Default)]
pub struct EventParser {
    buffer: String,
}

impl EventParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, chunk: &[u8]) -> Result<Vec<AgentEvent>> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        let mut events = Vec::new();

        while let Some(end) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=end).collect();
            if let Some(event) = parse_line(line.trim_end_matches(['\r', '\n'])) {
                events.push(event);
            }
        }

        Ok(events)
    }

    /// Consume any trailing line left after the stream closed.
    pub fn flush(&mut self) -> Option<AgentEvent> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(rest.trim_end())
    }
}

fn parse_line(line: &str) -> Option<AgentEvent> {
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('{') {
        return Some(AgentEvent::Text {
            text: line.to_string(),
        });
    }
    match serde_json::from_str::<AgentEvent>(line) {
        Ok(event) => Some(event),
        Err(err) => {
            logging::debug_event_parse_error(line, &err);
            None
        }
    }
}
