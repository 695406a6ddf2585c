//! Width-aware wrapping of styled spans.
//!
//! Wraps at word boundaries for normal text, preserves whitespace for code
//! spans, supports hanging indents for list items, and keeps style
//! information intact across line breaks.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::style::{MdLine, MdSpan, MdStyle};

/// Options for wrapping styled spans with hanging indents.
#[derive(Debug, Clone, Default)]
pub struct WrapOptions {
    /// Maximum display width for lines.
    pub width: usize,
    /// Prefix spans for the first line (e.g. a list bullet).
    pub first_prefix: Vec<MdSpan>,
    /// Prefix spans for continuation lines (alignment padding).
    pub rest_prefix: Vec<MdSpan>,
}

impl WrapOptions {
    /// Wrap options with just a width and no prefixes.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            first_prefix: vec![],
            rest_prefix: vec![],
        }
    }
}

fn spans_width(spans: &[MdSpan]) -> usize {
    spans.iter().map(|s| s.text.width()).sum()
}

/// Line-builder state shared by the wrapping helpers.
struct Wrapper<'a> {
    lines: Vec<MdLine>,
    current: Vec<MdSpan>,
    current_width: usize,
    first_line: bool,
    first_width: usize,
    rest_width: usize,
    first_prefix: &'a [MdSpan],
    rest_prefix: &'a [MdSpan],
}

impl<'a> Wrapper<'a> {
    fn new(opts: &'a WrapOptions) -> Self {
        let first_width = opts.width.saturating_sub(spans_width(&opts.first_prefix));
        let rest_width = opts.width.saturating_sub(spans_width(&opts.rest_prefix));
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            current_width: 0,
            first_line: true,
            first_width,
            rest_width,
            first_prefix: &opts.first_prefix,
            rest_prefix: &opts.rest_prefix,
        }
    }

    fn available(&self) -> usize {
        if self.first_line {
            self.first_width
        } else {
            self.rest_width
        }
    }

    fn flush(&mut self) {
        let mut spans = if self.first_line {
            self.first_prefix.to_vec()
        } else {
            self.rest_prefix.to_vec()
        };
        spans.append(&mut self.current);
        self.lines.push(MdLine { spans });
        self.first_line = false;
        self.current_width = 0;
    }

    fn push(&mut self, text: &str, style: MdStyle) {
        if text.is_empty() {
            return;
        }
        self.current.push(MdSpan::new(text, style));
        self.current_width += text.width();
    }

    fn push_space(&mut self, style: MdStyle) {
        if self.current_width < self.available() && !self.current.is_empty() {
            self.push(" ", style);
        }
    }

    /// Code spans keep their exact whitespace and break by character width.
    fn add_code(&mut self, span: &MdSpan) {
        let span_width = span.text.width();
        if self.current_width + span_width <= self.available() {
            self.push(&span.text, span.style);
        } else if span_width <= self.rest_width && self.current_width > 0 {
            self.flush();
            self.push(&span.text, span.style);
        } else {
            let room = self.available().saturating_sub(self.current_width).max(1);
            for (i, frag) in break_by_width(&span.text, room).into_iter().enumerate() {
                if i > 0 && self.current_width + frag.width() > self.available() {
                    self.flush();
                }
                self.push(&frag, span.style);
            }
        }
    }

    /// Normal text wraps at word boundaries; whitespace collapses to one
    /// space but leading/trailing spaces adjacent to other spans survive.
    fn add_text(&mut self, span: &MdSpan) {
        let leading = span.text.starts_with(|c: char| c.is_whitespace());
        let trailing = span.text.ends_with(|c: char| c.is_whitespace());
        let words: Vec<&str> = span.text.split_whitespace().collect();

        if words.is_empty() {
            self.push_space(span.style);
            return;
        }
        if leading {
            self.push_space(span.style);
        }

        for (i, word) in words.iter().enumerate() {
            let word_width = word.width();
            if i > 0 {
                if self.current_width + 1 + word_width <= self.available() {
                    self.push(" ", span.style);
                } else {
                    self.flush();
                }
            }

            if word_width <= self.available().saturating_sub(self.current_width) {
                self.push(word, span.style);
            } else if word_width <= self.rest_width && self.current_width > 0 {
                self.flush();
                self.push(word, span.style);
            } else {
                // Word wider than the line: break it by character.
                if self.current_width > 0 {
                    self.flush();
                }
                for frag in break_by_width(word, self.available().max(1)) {
                    if self.current_width + frag.width() > self.available()
                        && self.current_width > 0
                    {
                        self.flush();
                    }
                    self.push(&frag, span.style);
                }
            }
        }

        if trailing {
            self.push_space(span.style);
        }
    }

    fn finish(mut self, first_prefix: &[MdSpan]) -> Vec<MdLine> {
        if !self.current.is_empty() {
            self.flush();
        }
        if self.lines.is_empty() {
            self.lines.push(MdLine {
                spans: first_prefix.to_vec(),
            });
        }
        self.lines
    }
}

/// Breaks a string into fragments no wider than `max_width` columns.
/// Zero-width characters stay attached to the current fragment.
fn break_by_width(text: &str, max_width: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if ch_width == 0 {
            current.push(ch);
            continue;
        }
        if current_width + ch_width > max_width && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }
    if !current.is_empty() {
        parts.push(current);
    }
    if parts.is_empty() {
        parts.push(String::new());
    }
    parts
}

/// Wraps styled spans into lines no wider than `opts.width`.
pub fn wrap_spans(spans: &[MdSpan], opts: &WrapOptions) -> Vec<MdLine> {
    if opts.width == 0 || spans.is_empty() {
        let mut all = opts.first_prefix.clone();
        all.extend(spans.iter().cloned());
        return vec![MdLine { spans: all }];
    }

    let mut wrapper = Wrapper::new(opts);
    for span in spans {
        // Hard breaks arrive as embedded newlines.
        if span.text.contains('\n') {
            for (i, part) in span.text.split('\n').enumerate() {
                if i > 0 {
                    wrapper.flush();
                }
                if !part.is_empty() {
                    let part_span = MdSpan::new(part, span.style);
                    if span.style.preserves_whitespace() {
                        wrapper.add_code(&part_span);
                    } else {
                        wrapper.add_text(&part_span);
                    }
                }
            }
            continue;
        }

        if span.style.preserves_whitespace() {
            wrapper.add_code(span);
        } else {
            wrapper.add_text(span);
        }
    }

    wrapper.finish(&opts.first_prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_span(text: &str) -> MdSpan {
        MdSpan::new(text, MdStyle::Text)
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_spans(&[text_span("hello world")], &WrapOptions::new(20));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].plain_text(), "hello world");
    }

    #[test]
    fn wraps_at_word_boundary() {
        let lines = wrap_spans(&[text_span("hello world")], &WrapOptions::new(8));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].plain_text(), "hello");
        assert_eq!(lines[1].plain_text(), "world");
    }

    #[test]
    fn style_survives_line_break() {
        let spans = vec![text_span("hello "), MdSpan::new("world", MdStyle::Strong)];
        let lines = wrap_spans(&spans, &WrapOptions::new(8));
        assert_eq!(lines.len(), 2);
        assert!(lines[1].spans.iter().any(|s| s.style == MdStyle::Strong));
    }

    #[test]
    fn inline_code_preserves_double_space() {
        let spans = vec![MdSpan::new("foo  bar", MdStyle::CodeInline)];
        let lines = wrap_spans(&spans, &WrapOptions::new(20));
        assert_eq!(lines[0].plain_text(), "foo  bar");
    }

    #[test]
    fn hard_break_splits_lines() {
        let lines = wrap_spans(&[text_span("line1\nline2")], &WrapOptions::new(20));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn hanging_indent_applies_prefixes() {
        let opts = WrapOptions {
            width: 20,
            first_prefix: vec![MdSpan::new("• ", MdStyle::ListBullet)],
            rest_prefix: vec![MdSpan::new("  ", MdStyle::Plain)],
        };
        let lines = wrap_spans(
            &[text_span("this is a longer text that should wrap")],
            &opts,
        );
        assert!(lines.len() > 1);
        assert_eq!(lines[0].spans[0].text, "• ");
        assert_eq!(lines[1].spans[0].text, "  ");
    }

    #[test]
    fn overlong_word_breaks_by_character() {
        let lines = wrap_spans(&[text_span("abcdefghij")], &WrapOptions::new(4));
        assert!(lines.len() >= 3);
        assert!(lines.iter().all(|l| l.plain_text().width_check(4)));
    }

    trait WidthCheck {
        fn width_check(&self, max: usize) -> bool;
    }
    impl WidthCheck for String {
        fn width_check(&self, max: usize) -> bool {
            unicode_width::UnicodeWidthStr::width(self.as_str()) <= max
        }
    }
}
