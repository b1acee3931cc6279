use std::io::Write;

use super::buffer::EditorState;
use super::width::line_width;

/// Renders the edit buffer with classic deferred-wrap semantics.
///
/// Three coordinate systems meet here and must not be conflated: character
/// offsets (the buffer), display columns (prompt + character widths), and
/// visual rows (display columns folded at the terminal width). Logical row 0
/// carries the primary prompt, later rows the continuation prompt.
///
/// A logical row whose display span is an exact multiple of `cols` occupies
/// exactly span/cols visual rows: the terminal holds the cursor on the last
/// column of the final row until the next character is written, and the
/// cursor arithmetic below reproduces that.
pub struct Renderer {
    prompt: String,
    continuation: String,
    prompt_width: usize,
    continuation_width: usize,
    prev_total_rows: usize,
    prev_cursor_row: usize,
}

/// Visual rows occupied by a logical row of display span `span`.
fn visual_rows(span: usize, cols: usize) -> usize {
    if span == 0 {
        1
    } else {
        (span - 1) / cols + 1
    }
}

impl Renderer {
    pub fn new(prompt: &str, continuation: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            continuation: continuation.to_string(),
            prompt_width: line_width(prompt),
            continuation_width: line_width(continuation),
            prev_total_rows: 0,
            prev_cursor_row: 0,
        }
    }

    fn prompt_for(&self, row: usize) -> &str {
        if row == 0 {
            &self.prompt
        } else {
            &self.continuation
        }
    }

    fn prompt_width_for(&self, row: usize) -> usize {
        if row == 0 {
            self.prompt_width
        } else {
            self.continuation_width
        }
    }

    /// Full redraw of the buffer, leaving the terminal cursor at the edit
    /// cursor's visual position.
    pub fn render<W: Write>(
        &mut self,
        out: &mut W,
        state: &EditorState,
        cols: usize,
    ) -> std::io::Result<()> {
        let cols = cols.max(1);

        // Back up to the first visual row of the previous drawing, then
        // erase every visual row it painted. Content on wrapped continuation
        // rows is only ever overwritten by autowrap, so a logical row that
        // narrowed would otherwise leave a stale tail on screen.
        if self.prev_cursor_row > 0 {
            write!(out, "\x1b[{}A", self.prev_cursor_row)?;
        }
        for row in 0..self.prev_total_rows {
            if row > 0 {
                out.write_all(b"\n")?;
            }
            out.write_all(b"\r\x1b[2K")?;
        }
        if self.prev_total_rows > 1 {
            write!(out, "\x1b[{}A", self.prev_total_rows - 1)?;
        }

        let mut total_rows = 0;
        for (idx, line) in state.lines().iter().enumerate() {
            if idx > 0 {
                out.write_all(b"\r\n")?;
            }
            write!(out, "\r\x1b[2K{}{}", self.prompt_for(idx), line)?;
            total_rows += visual_rows(self.prompt_width_for(idx) + line_width(line), cols);
        }

        // Cursor target in visual coordinates.
        let mut target_row = 0;
        for idx in 0..state.row() {
            target_row += visual_rows(
                self.prompt_width_for(idx) + line_width(&state.lines()[idx]),
                cols,
            );
        }
        let w = self.prompt_width_for(state.row()) + line_width(state.cursor_prefix());
        let row_in_line = if w > 0 { (w - 1) / cols } else { 0 };
        let col_in_row = w - row_in_line * cols;
        target_row += row_in_line;

        let up = total_rows - 1 - target_row;
        if up > 0 {
            write!(out, "\x1b[{up}A")?;
        }
        out.write_all(b"\r")?;
        if col_in_row > 0 {
            write!(out, "\x1b[{col_in_row}C")?;
        }
        out.flush()?;

        self.prev_total_rows = total_rows;
        self.prev_cursor_row = target_row;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(text: &str) -> EditorState {
        let mut state = EditorState::new();
        state.insert_text(text);
        state
    }

    fn render_to_string(renderer: &mut Renderer, state: &EditorState, cols: usize) -> String {
        let mut out = Vec::new();
        renderer.render(&mut out, state, cols).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn initial_render_erases_and_writes_prompt_line() {
        let mut renderer = Renderer::new("> ", "  ");
        let out = render_to_string(&mut renderer, &state_with("hi"), 80);
        assert_eq!(out, "\r\x1b[2K> hi\r\x1b[4C");
    }

    #[test]
    fn empty_buffer_cursor_sits_after_prompt() {
        let mut renderer = Renderer::new("> ", "  ");
        let out = render_to_string(&mut renderer, &EditorState::new(), 80);
        assert_eq!(out, "\r\x1b[2K> \r\x1b[2C");
    }

    #[test]
    fn cursor_at_exact_width_multiple_stays_on_current_visual_row() {
        // Prompt "> " (2) + 8 chars = 10 = cols: deferred wrap keeps the
        // cursor at column 10 of the first visual row, with no extra row.
        let mut renderer = Renderer::new("> ", "  ");
        let out = render_to_string(&mut renderer, &state_with("12345678"), 10);
        assert_eq!(out, "\r\x1b[2K> 12345678\r\x1b[10C");
    }

    #[test]
    fn cursor_past_width_multiple_moves_to_next_visual_row() {
        let mut renderer = Renderer::new("> ", "  ");
        // Span 11 at cols 10: one wrapped row, cursor at column 1 of it.
        let out = render_to_string(&mut renderer, &state_with("123456789"), 10);
        assert_eq!(out, "\r\x1b[2K> 123456789\r\x1b[1C");
    }

    #[test]
    fn wide_chars_count_double_in_wrap_arithmetic() {
        let mut renderer = Renderer::new("> ", "  ");
        // Prompt 2 + four wide chars = 10 display columns exactly.
        let out = render_to_string(&mut renderer, &state_with("日本語字"), 10);
        assert_eq!(out, "\r\x1b[2K> 日本語字\r\x1b[10C");
    }

    #[test]
    fn multi_row_render_uses_continuation_prompt() {
        let mut renderer = Renderer::new("> ", "… ");
        let out = render_to_string(&mut renderer, &state_with("ab\ncd"), 80);
        assert_eq!(out, "\r\x1b[2K> ab\r\n\r\x1b[2K… cd\r\x1b[4C");
    }

    #[test]
    fn cursor_mid_buffer_moves_back_up() {
        let mut renderer = Renderer::new("> ", "  ");
        let mut state = state_with("ab\ncd");
        state.move_up();
        let out = render_to_string(&mut renderer, &state, 80);
        assert_eq!(out, "\r\x1b[2K> ab\r\n\r\x1b[2K  cd\x1b[1A\r\x1b[4C");
    }

    #[test]
    fn second_render_backs_up_to_buffer_top() {
        let mut renderer = Renderer::new("> ", "  ");
        let mut state = state_with("ab\ncd");
        render_to_string(&mut renderer, &state, 80);
        state.insert_text("!");
        let out = render_to_string(&mut renderer, &state, 80);
        assert_eq!(
            out,
            "\x1b[1A\r\x1b[2K\n\r\x1b[2K\x1b[1A\r\x1b[2K> ab\r\n\r\x1b[2K  cd!\r\x1b[5C"
        );
    }

    #[test]
    fn shrinking_buffer_erases_leftover_rows() {
        let mut renderer = Renderer::new("> ", "  ");
        let mut state = state_with("ab\ncd");
        render_to_string(&mut renderer, &state, 80);
        state.move_to_start();
        state.backspace();
        let out = render_to_string(&mut renderer, &state, 80);
        assert_eq!(
            out,
            "\x1b[1A\r\x1b[2K\n\r\x1b[2K\x1b[1A\r\x1b[2K> abcd\r\x1b[4C"
        );
    }

    #[test]
    fn narrowed_wrapped_row_erases_stale_continuation() {
        let mut renderer = Renderer::new("> ", "  ");
        // Span 14 at cols 10: continuation row reads "89ab".
        let mut state = state_with("0123456789ab");
        render_to_string(&mut renderer, &state, 10);
        // One char shorter, same visual row count: the continuation row must
        // be erased before the autowrapped rewrite, or the "b" would linger.
        state.backspace();
        let out = render_to_string(&mut renderer, &state, 10);
        assert_eq!(
            out,
            "\x1b[1A\r\x1b[2K\n\r\x1b[2K\x1b[1A\r\x1b[2K> 0123456789a\r\x1b[3C"
        );
    }

    #[test]
    fn wrapped_logical_row_counts_multiple_visual_rows() {
        let mut renderer = Renderer::new("> ", "  ");
        // Span 12 at cols 10: two visual rows; cursor at end, column 2 of
        // the second visual row.
        let out = render_to_string(&mut renderer, &state_with("0123456789"), 10);
        assert_eq!(out, "\r\x1b[2K> 0123456789\r\x1b[2C");
        // The renderer remembered both rows: next render backs up past them.
        let out = render_to_string(&mut renderer, &state_with("x"), 10);
        assert!(out.starts_with("\x1b[1A"));
    }

    #[test]
    fn wrap_column_formula_boundary_cases() {
        // col = W - cols*floor((W-1)/cols) around exact width multiples.
        for (w, cols, expect) in [(10, 10, 10), (11, 10, 1), (20, 10, 10), (1, 10, 1)] {
            let row = (w - 1) / cols;
            assert_eq!(w - row * cols, expect);
        }
    }
}
