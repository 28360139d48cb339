use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Shorten `s` to at most `width` display columns. Long values keep their
/// tail behind a leading "..", since the end of a path is the part that
/// tells artifacts apart.
pub(crate) fn truncate_left(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return ".".repeat(width);
    }

    let budget = width - 2;
    let mut used = 0;
    let mut start = s.len();
    for (i, ch) in s.char_indices().rev() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        start = i;
    }
    format!("..{}", &s[start..])
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let fitted = truncate_left(s, width);
    let fw = display_width(&fitted);
    format!("{}{}", fitted, " ".repeat(width.saturating_sub(fw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_are_padded() {
        assert_eq!(pad_right("a.eod", 8), "a.eod   ");
    }

    #[test]
    fn long_values_keep_tail() {
        assert_eq!(truncate_left("/data/runs/2025/a.eod", 9), "..5/a.eod");
        assert_eq!(display_width(&pad_right("/data/runs/2025/a.eod", 9)), 9);
    }

    #[test]
    fn wide_chars_count_double() {
        assert_eq!(display_width("数据.eod"), 8);
        let t = truncate_left("/数据/数据.eod", 8);
        assert!(display_width(&t) <= 8, "{t}");
        assert!(t.ends_with(".eod"));
    }

    #[test]
    fn tiny_width() {
        assert_eq!(truncate_left("abcdef", 2), "..");
        assert_eq!(truncate_left("ab", 2), "ab");
    }
}
