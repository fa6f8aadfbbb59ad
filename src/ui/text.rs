//! Width of styled strings and alignment padding.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_width::UnicodeWidthStr;

/// SGR sequences only (`ESC [ <digits/semicolons> m`)
static SGR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Horizontal alignment of a row inside the box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Remove every SGR sequence from `s`
pub fn strip_sgr(s: &str) -> std::borrow::Cow<'_, str> {
    SGR_RE.replace_all(s, "")
}

/// Terminal columns `s` occupies once its SGR sequences are removed
pub fn visible_len(s: &str) -> usize {
    UnicodeWidthStr::width(strip_sgr(s).as_ref())
}

/// Pad `s` with spaces to `width` visible columns.
///
/// Never truncates: text at or beyond `width` is returned unchanged so
/// trailing reset codes survive. For `Center`, the smaller half of an odd
/// deficit goes before the text.
pub fn pad_to_width(s: &str, width: usize, align: Align) -> String {
    let deficit = width.saturating_sub(visible_len(s));
    if deficit == 0 {
        return s.to_string();
    }
    match align {
        Align::Left => format!("{}{}", s, " ".repeat(deficit)),
        Align::Right => format!("{}{}", " ".repeat(deficit), s),
        Align::Center => {
            let before = deficit / 2;
            format!("{}{}{}", " ".repeat(before), s, " ".repeat(deficit - before))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::{paint, ACCENT, RED};

    #[test]
    fn test_visible_len_plain() {
        assert_eq!(visible_len(""), 0);
        assert_eq!(visible_len("hello"), 5);
        assert_eq!(visible_len("██░░"), 4);
    }

    #[test]
    fn test_visible_len_ignores_sgr() {
        assert_eq!(visible_len("\x1b[0m"), 0);
        assert_eq!(visible_len("\x1b[38;2;1;2;3m\x1b[0mab\x1b[m"), 2);
        assert_eq!(visible_len(&paint(RED, "93%")), 3);
    }

    #[test]
    fn test_pad_never_truncates() {
        let s = paint(ACCENT, "long title");
        assert_eq!(pad_to_width(&s, 4, Align::Left), s);
        assert_eq!(pad_to_width(&s, 10, Align::Center), s);
    }

    #[test]
    fn test_pad_alignment() {
        assert_eq!(pad_to_width("ab", 5, Align::Left), "ab   ");
        assert_eq!(pad_to_width("ab", 5, Align::Right), "   ab");
        assert_eq!(pad_to_width("ab", 5, Align::Center), " ab  ");
        assert_eq!(pad_to_width("ab", 6, Align::Center), "  ab  ");
    }

    #[test]
    fn test_pad_reaches_width() {
        let samples = [
            String::new(),
            "plain".to_string(),
            paint(RED, "x"),
            format!("{}{}", paint(ACCENT, "Claude"), paint(RED, "")),
            "a much longer line than the width".to_string(),
        ];
        for s in &samples {
            for width in [0, 1, 7, 20] {
                for align in [Align::Left, Align::Center, Align::Right] {
                    let padded = pad_to_width(s, width, align);
                    assert_eq!(visible_len(&padded), width.max(visible_len(s)));
                }
            }
        }
    }
}
