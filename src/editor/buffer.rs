/// Multi-row edit buffer with a character-addressed cursor.
///
/// `col` is a character offset into `lines[row]`, never a byte offset and
/// never a display column. Conversion to bytes happens at the edges of each
/// operation; conversion to display columns happens only in the renderer.
///
/// Invariants, preserved by every operation:
/// - `lines` is never empty (minimum one, possibly empty, string)
/// - `row < lines.len()`
/// - `col <= lines[row].chars().count()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

/// Byte offset of character offset `col` in `line`.
pub fn byte_offset(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

/// Split text into rows on any line-break variant (CRLF, CR, LF).
pub fn split_rows(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized.split('\n').map(str::to_string).collect()
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Buffer contents with rows joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Characters of the current row before the cursor.
    pub fn cursor_prefix(&self) -> &str {
        let line = &self.lines[self.row];
        &line[..byte_offset(line, self.col)]
    }

    pub fn snapshot_lines(&self) -> Vec<String> {
        self.lines.clone()
    }

    /// Replace the whole buffer, cursor at the end of the last row.
    pub fn load_lines(&mut self, lines: Vec<String>) {
        self.lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        self.row = self.lines.len() - 1;
        self.col = char_len(&self.lines[self.row]);
    }

    /// Insert text at the cursor; line breaks in `text` become row breaks.
    pub fn insert_text(&mut self, text: &str) {
        let segments = split_rows(text);
        if segments.len() == 1 {
            let line = &mut self.lines[self.row];
            let at = byte_offset(line, self.col);
            line.insert_str(at, &segments[0]);
            self.col += char_len(&segments[0]);
            return;
        }

        let line = &self.lines[self.row];
        let at = byte_offset(line, self.col);
        let tail = line[at..].to_string();
        let head = line[..at].to_string();

        let mut iter = segments.into_iter();
        let first = iter.next().unwrap_or_default();
        self.lines[self.row] = head + &first;

        let mut rest: Vec<String> = iter.collect();
        let last = rest.pop().unwrap_or_default();
        let inserted_rows = rest.len() + 1;
        for (offset, segment) in rest.into_iter().enumerate() {
            self.lines.insert(self.row + 1 + offset, segment);
        }
        self.col = char_len(&last);
        self.row += inserted_rows;
        self.lines.insert(self.row, last + &tail);
    }

    /// Split the current row at the cursor; cursor lands at column 0 of the
    /// new row.
    pub fn insert_newline(&mut self) {
        let line = &self.lines[self.row];
        let at = byte_offset(line, self.col);
        let tail = line[at..].to_string();
        self.lines[self.row].truncate(at);
        self.row += 1;
        self.col = 0;
        self.lines.insert(self.row, tail);
    }

    /// Remove the character before the cursor, merging with the previous row
    /// at column 0.
    pub fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let end = byte_offset(line, self.col);
            let start = byte_offset(line, self.col - 1);
            line.replace_range(start..end, "");
            self.col -= 1;
        } else if self.row > 0 {
            let removed = self.lines.remove(self.row);
            self.row -= 1;
            self.col = char_len(&self.lines[self.row]);
            self.lines[self.row].push_str(&removed);
        }
    }

    /// Remove the character at the cursor, merging the next row in at
    /// end-of-row.
    pub fn delete_forward(&mut self) {
        let len = char_len(&self.lines[self.row]);
        if self.col < len {
            let line = &mut self.lines[self.row];
            let start = byte_offset(line, self.col);
            let end = byte_offset(line, self.col + 1);
            line.replace_range(start..end, "");
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = char_len(&self.lines[self.row]);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < char_len(&self.lines[self.row]) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    /// Move to the row above, clamping the column. Returns false at the first
    /// row so the caller can fall through to history navigation.
    pub fn move_up(&mut self) -> bool {
        if self.row == 0 {
            return false;
        }
        self.row -= 1;
        self.col = self.col.min(char_len(&self.lines[self.row]));
        true
    }

    /// Move to the row below, clamping the column. Returns false at the last
    /// row so the caller can fall through to history navigation.
    pub fn move_down(&mut self) -> bool {
        if self.row + 1 >= self.lines.len() {
            return false;
        }
        self.row += 1;
        self.col = self.col.min(char_len(&self.lines[self.row]));
        true
    }

    pub fn move_to_start(&mut self) {
        self.col = 0;
    }

    pub fn move_to_end(&mut self) {
        self.col = char_len(&self.lines[self.row]);
    }

    pub fn clear_to_start(&mut self) {
        let line = &mut self.lines[self.row];
        let at = byte_offset(line, self.col);
        line.replace_range(..at, "");
        self.col = 0;
    }

    pub fn clear_to_end(&mut self) {
        let line = &mut self.lines[self.row];
        let at = byte_offset(line, self.col);
        line.truncate(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> EditorState {
        let mut state = EditorState::new();
        state.insert_text(text);
        state
    }

    #[test]
    fn insert_and_read_back_round_trips() {
        let state = typed("hello world");
        assert_eq!(state.text(), "hello world");
        assert_eq!(state.col(), 11);
    }

    #[test]
    fn insert_multiline_splits_rows_and_places_cursor() {
        let mut state = typed("headtail");
        for _ in 0..4 {
            state.move_left();
        }
        state.insert_text("one\ntwo\nthree");
        assert_eq!(state.lines(), &["headone", "two", "threetail"]);
        assert_eq!(state.row(), 2);
        assert_eq!(state.col(), 5);
    }

    #[test]
    fn insert_normalizes_crlf_and_cr() {
        let state = typed("a\r\nb\rc");
        assert_eq!(state.lines(), &["a", "b", "c"]);
    }

    #[test]
    fn newline_splits_at_cursor() {
        let mut state = typed("abcd");
        state.move_left();
        state.move_left();
        state.insert_newline();
        assert_eq!(state.lines(), &["ab", "cd"]);
        assert_eq!((state.row(), state.col()), (1, 0));
    }

    #[test]
    fn backspace_at_column_zero_merges_rows() {
        let mut state = typed("ab\ncd");
        assert_eq!(state.lines().len(), 2);
        state.move_to_start();
        state.backspace();
        assert_eq!(state.lines(), &["abcd"]);
        assert_eq!((state.row(), state.col()), (0, 2));
    }

    #[test]
    fn repeated_backspace_inverts_newline_insertion() {
        let mut state = typed("abc");
        state.insert_newline();
        state.insert_newline();
        state.backspace();
        state.backspace();
        assert_eq!(state.text(), "abc");
        assert_eq!((state.row(), state.col()), (0, 3));
    }

    #[test]
    fn delete_forward_merges_next_row_at_end() {
        let mut state = typed("ab\ncd");
        state.move_up();
        state.move_to_end();
        state.delete_forward();
        assert_eq!(state.lines(), &["abcd"]);
        state.move_to_start();
        state.delete_forward();
        assert_eq!(state.lines(), &["bcd"]);
    }

    #[test]
    fn horizontal_moves_cross_row_boundaries() {
        let mut state = typed("ab\ncd");
        state.move_to_start();
        state.move_left();
        assert_eq!((state.row(), state.col()), (0, 2));
        state.move_right();
        assert_eq!((state.row(), state.col()), (1, 0));
    }

    #[test]
    fn vertical_moves_clamp_column_and_report_boundaries() {
        let mut state = typed("long line\nab");
        assert!(state.move_up());
        assert_eq!((state.row(), state.col()), (0, 2));
        state.move_to_end();
        assert!(state.move_down());
        assert_eq!((state.row(), state.col()), (1, 2));
        assert!(!state.move_down());
        state.move_up();
        assert!(!state.move_up());
    }

    #[test]
    fn clear_operations_truncate_around_cursor() {
        let mut state = typed("abcdef");
        state.move_left();
        state.move_left();
        state.clear_to_end();
        assert_eq!(state.text(), "abcd");
        state.move_left();
        state.clear_to_start();
        assert_eq!(state.text(), "d");
        assert_eq!(state.col(), 0);
    }

    #[test]
    fn operations_are_character_indexed_not_byte_indexed() {
        let mut state = typed("日本語");
        assert_eq!(state.col(), 3);
        state.move_left();
        state.backspace();
        assert_eq!(state.text(), "日語");
        state.insert_text("本");
        assert_eq!(state.text(), "日本語");
    }
}
