//! Text helpers shared across rendering paths.

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates a string to `max_width` terminal columns, appending `…` when
/// anything was cut. Width-aware so CJK and emoji count as two columns.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut truncated = String::new();
    for ch in text.chars() {
        let next_width = truncated.width() + ch.width().unwrap_or(0);
        if next_width + 1 > max_width {
            break;
        }
        truncated.push(ch);
    }
    truncated.push('…');
    truncated
}

/// Sanitizes report text for terminal display.
///
/// Feedback files come from an external service and may carry ANSI escape
/// sequences or tabs; escapes are stripped (removing `\x1b` breaks the
/// sequence) and tabs expand to four spaces so column math stays accurate.
pub fn sanitize_for_display(s: &str) -> Cow<'_, str> {
    if s.contains('\x1b') || s.contains('\t') {
        Cow::Owned(s.replace('\x1b', "").replace('\t', "    "))
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello", 5), "hello");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello world", 8), "hello w…");
    }

    #[test]
    fn truncate_tiny_width_is_just_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello", 1), "…");
    }

    #[test]
    fn truncate_counts_wide_characters() {
        assert_eq!(truncate_with_ellipsis("中文test", 6), "中文t…");
        assert_eq!(truncate_with_ellipsis("a中b文c", 4), "a中…");
    }

    #[test]
    fn sanitize_strips_ansi_and_expands_tabs() {
        let result = sanitize_for_display("\x1b[31mred\x1b[0m\ttext");
        assert_eq!(result, "[31mred[0m    text");
    }

    #[test]
    fn sanitize_borrows_clean_text() {
        assert!(matches!(
            sanitize_for_display("clean text"),
            Cow::Borrowed(_)
        ));
    }
}
