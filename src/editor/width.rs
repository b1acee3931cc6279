use unicode_width::UnicodeWidthChar;

/// Display width of a single character: 1 or 2 terminal columns.
///
/// East-Asian wide and fullwidth code points (CJK ideographs, Hiragana,
/// Katakana, Hangul, fullwidth forms, CJK symbols) occupy two columns.
/// Everything else counts as one, including code points `unicode-width`
/// reports as zero, so cursor arithmetic stays monotonic.
pub fn char_width(ch: char) -> usize {
    match UnicodeWidthChar::width(ch) {
        Some(w) if w >= 2 => 2,
        _ => 1,
    }
}

/// Total display width of a string, iterated by code point.
pub fn line_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn east_asian_wide_chars_are_two_columns() {
        for ch in ['中', '語', 'あ', 'カ', '한', '글', '！', 'Ａ', '　'] {
            assert_eq!(char_width(ch), 2, "{ch:?}");
        }
    }

    #[test]
    fn narrow_chars_are_one_column() {
        for ch in ['a', 'Z', '0', ' ', '~', 'é', 'ß', 'λ'] {
            assert_eq!(char_width(ch), 1, "{ch:?}");
        }
    }

    #[test]
    fn zero_width_reports_clamp_to_one() {
        // Combining acute accent; unicode-width reports 0.
        assert_eq!(char_width('\u{0301}'), 1);
    }

    #[test]
    fn line_width_is_additive() {
        assert_eq!(line_width(""), 0);
        assert_eq!(line_width("abc"), 3);
        assert_eq!(line_width("a中b"), 4);
        assert_eq!(line_width("日本語"), 6);
        assert_eq!(
            line_width("a中b") + line_width("日本語"),
            line_width("a中b日本語")
        );
    }
}
