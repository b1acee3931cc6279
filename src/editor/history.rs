use super::buffer::{split_rows, EditorState};

/// Read-only traversal over past entries, overlaid on the live buffer.
///
/// Entries are most-recent-first. `index` of `None` means the live draft is
/// showing; moving older from there snapshots the draft exactly once, and
/// moving newer past entry 0 restores it.
#[derive(Debug)]
pub struct HistoryNavigator {
    entries: Vec<String>,
    index: Option<usize>,
    saved_draft: Option<Vec<String>>,
}

impl HistoryNavigator {
    /// Takes a working copy so the caller's list is never mutated.
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            entries,
            index: None,
            saved_draft: None,
        }
    }

    /// Move toward older entries. No-op when already at the oldest or when
    /// there is no history.
    pub fn older(&mut self, state: &mut EditorState) {
        let next = match self.index {
            None if self.entries.is_empty() => return,
            None => 0,
            Some(idx) if idx + 1 < self.entries.len() => idx + 1,
            Some(_) => return,
        };
        if self.index.is_none() {
            self.saved_draft = Some(state.snapshot_lines());
        }
        self.index = Some(next);
        state.load_lines(split_rows(&self.entries[next]));
    }

    /// Move toward newer entries, restoring the saved draft past the most
    /// recent one. No-op when not browsing.
    pub fn newer(&mut self, state: &mut EditorState) {
        let Some(idx) = self.index else {
            return;
        };
        if idx == 0 {
            self.index = None;
            if let Some(draft) = self.saved_draft.take() {
                state.load_lines(draft);
            }
        } else {
            self.index = Some(idx - 1);
            state.load_lines(split_rows(&self.entries[idx - 1]));
        }
    }
}
