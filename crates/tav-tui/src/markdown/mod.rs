//! Markdown rendering for feedback reports.
//!
//! Parses GitHub-flavored Markdown (tables, strikethrough, task lists) with
//! pulldown-cmark and renders it to styled terminal lines. Fenced code
//! blocks are highlighted through the [`Highlighter`] seam; unknown language
//! tags degrade to plain preformatted text.
//!
//! Report content is untrusted: HTML events are discarded and ANSI escape
//! bytes are stripped before any text reaches the terminal.

pub mod highlight;
pub mod style;
pub mod wrap;

pub use highlight::{Highlighter, PlainHighlighter, SyntectHighlighter};
pub use style::{MdLine, MdSpan, MdStyle};
pub use wrap::{WrapOptions, wrap_spans};

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use unicode_width::UnicodeWidthStr;

use crate::common::text::sanitize_for_display;

/// Renders Markdown text into styled lines wrapped at `width`.
pub fn render_markdown(text: &str, width: usize, highlighter: &dyn Highlighter) -> Vec<MdLine> {
    if text.is_empty() {
        return vec![MdLine::empty()];
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = Renderer::new(width, highlighter);
    for event in Parser::new_ext(text, options) {
        renderer.process(event);
    }
    renderer.finish()
}

#[derive(Debug, Clone)]
struct ListLevel {
    /// None for unordered lists, Some(n) for ordered lists starting at n.
    ordered: Option<u64>,
    current_item: u64,
}

/// In-flight table: rows of cells, each cell a span list.
#[derive(Debug, Default)]
struct TableBuilder {
    header: Vec<Vec<MdSpan>>,
    rows: Vec<Vec<Vec<MdSpan>>>,
    current_row: Vec<Vec<MdSpan>>,
    current_cell: Vec<MdSpan>,
    in_header: bool,
    in_cell: bool,
}

struct Renderer<'a> {
    width: usize,
    highlighter: &'a dyn Highlighter,
    lines: Vec<MdLine>,
    current_spans: Vec<MdSpan>,
    style_stack: Vec<MdStyle>,
    in_code_block: bool,
    code_lang: Option<String>,
    code_buf: String,
    list_stack: Vec<ListLevel>,
    in_blockquote: bool,
    table: Option<TableBuilder>,
}

impl<'a> Renderer<'a> {
    fn new(width: usize, highlighter: &'a dyn Highlighter) -> Self {
        Self {
            width,
            highlighter,
            lines: Vec::new(),
            current_spans: Vec::new(),
            style_stack: vec![MdStyle::Text],
            in_code_block: false,
            code_lang: None,
            code_buf: String::new(),
            list_stack: Vec::new(),
            in_blockquote: false,
            table: None,
        }
    }

    fn current_style(&self) -> MdStyle {
        self.style_stack.last().copied().unwrap_or(MdStyle::Text)
    }

    fn push_style(&mut self, style: MdStyle) {
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn process(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => self.add_span(&code, MdStyle::CodeInline),
            Event::SoftBreak => self.add_span(" ", self.current_style()),
            Event::HardBreak => self.add_span("\n", self.current_style()),
            // Untrusted input: raw HTML is never interpreted or echoed.
            Event::Html(_) | Event::InlineHtml(_) => {}
            Event::FootnoteReference(_) => {}
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.add_span(marker, MdStyle::ListBullet);
            }
            Event::Rule => {
                self.flush_paragraph();
                self.lines.push(MdLine {
                    spans: vec![MdSpan::new("─".repeat(self.width.min(40)), MdStyle::Rule)],
                });
                self.lines.push(MdLine::empty());
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                let style = match level {
                    HeadingLevel::H1 => MdStyle::H1,
                    HeadingLevel::H2 => MdStyle::H2,
                    _ => MdStyle::H3,
                };
                self.push_style(style);
            }
            Tag::CodeBlock(kind) => {
                self.flush_paragraph();
                self.in_code_block = true;
                self.code_lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
            }
            Tag::List(start) => {
                self.flush_paragraph();
                self.list_stack.push(ListLevel {
                    ordered: start,
                    current_item: start.unwrap_or(1),
                });
            }
            Tag::Item => self.flush_paragraph(),
            Tag::BlockQuote(_) => {
                self.flush_paragraph();
                self.in_blockquote = true;
                self.push_style(MdStyle::BlockQuote);
            }
            Tag::Emphasis => self.push_style(MdStyle::Emphasis),
            Tag::Strong => self.push_style(MdStyle::Strong),
            Tag::Strikethrough => self.push_style(MdStyle::Strikethrough),
            Tag::Link { .. } => self.push_style(MdStyle::Link),
            Tag::Table(_) => {
                self.flush_paragraph();
                self.table = Some(TableBuilder::default());
            }
            Tag::TableHead => {
                if let Some(table) = &mut self.table {
                    table.in_header = true;
                    table.current_row.clear();
                }
            }
            Tag::TableRow => {
                if let Some(table) = &mut self.table {
                    table.current_row.clear();
                }
            }
            Tag::TableCell => {
                if let Some(table) = &mut self.table {
                    table.in_cell = true;
                    table.current_cell.clear();
                }
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_paragraph();
                if self.list_stack.is_empty() {
                    self.lines.push(MdLine::empty());
                }
            }
            TagEnd::Heading(_) => {
                self.flush_paragraph();
                self.pop_style();
                self.lines.push(MdLine::empty());
            }
            TagEnd::CodeBlock => {
                self.flush_code_block();
                self.in_code_block = false;
                self.lines.push(MdLine::empty());
            }
            TagEnd::List(_) => {
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.lines.push(MdLine::empty());
                }
            }
            TagEnd::Item => {
                self.flush_list_item();
                if let Some(level) = self.list_stack.last_mut() {
                    level.current_item += 1;
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush_paragraph();
                self.in_blockquote = false;
                self.pop_style();
                self.lines.push(MdLine::empty());
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style();
            }
            TagEnd::TableCell => {
                if let Some(table) = &mut self.table {
                    table.in_cell = false;
                    let cell = std::mem::take(&mut table.current_cell);
                    table.current_row.push(cell);
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    table.in_header = false;
                    table.header = std::mem::take(&mut table.current_row);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.current_row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.flush_table(table);
                    self.lines.push(MdLine::empty());
                }
            }
            _ => {}
        }
    }

    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.in_code_block {
            self.code_buf.push_str(text);
            return;
        }
        let style = self.current_style();
        self.add_span(&sanitize_for_display(text), style);
    }

    fn add_span(&mut self, text: &str, style: MdStyle) {
        let span = MdSpan::new(text, style);
        if let Some(table) = &mut self.table {
            if table.in_cell {
                table.current_cell.push(span);
                return;
            }
        }
        self.current_spans.push(span);
    }

    fn flush_paragraph(&mut self) {
        if self.current_spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current_spans);
        let opts = if self.in_blockquote {
            WrapOptions {
                width: self.width,
                first_prefix: vec![MdSpan::new("▌ ", MdStyle::BlockQuote)],
                rest_prefix: vec![MdSpan::new("▌ ", MdStyle::BlockQuote)],
            }
        } else {
            WrapOptions::new(self.width)
        };
        self.lines.extend(wrap_spans(&spans, &opts));
    }

    fn flush_list_item(&mut self) {
        if self.current_spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current_spans);

        let (marker, marker_style) = match self.list_stack.last() {
            Some(level) if level.ordered.is_some() => {
                (format!("{}. ", level.current_item), MdStyle::ListNumber)
            }
            _ => ("• ".to_string(), MdStyle::ListBullet),
        };

        let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
        let marker_width = marker.width();
        let opts = WrapOptions {
            width: self.width,
            first_prefix: vec![
                MdSpan::new(indent.clone(), MdStyle::Plain),
                MdSpan::new(marker, marker_style),
            ],
            rest_prefix: vec![MdSpan::new(
                format!("{}{}", indent, " ".repeat(marker_width)),
                MdStyle::Plain,
            )],
        };
        self.lines.extend(wrap_spans(&spans, &opts));
    }

    fn flush_code_block(&mut self) {
        let code = std::mem::take(&mut self.code_buf);
        let lang = self.code_lang.take();

        let fence = match &lang {
            Some(lang) => format!("```{lang}"),
            None => "```".to_string(),
        };
        self.lines.push(MdLine {
            spans: vec![MdSpan::new(fence, MdStyle::CodeFence)],
        });

        let code = sanitize_for_display(code.trim_end_matches('\n'));
        let highlighted = lang
            .as_deref()
            .and_then(|lang| self.highlighter.highlight(lang, &code));

        match highlighted {
            Some(code_lines) => {
                for line in code_lines {
                    let mut spans = vec![MdSpan::new("  ", MdStyle::Plain)];
                    spans.extend(line.spans);
                    self.lines.push(MdLine { spans });
                }
            }
            None => {
                // Unknown or absent language: plain preformatted text.
                for line in code.split('\n') {
                    self.lines.push(MdLine {
                        spans: vec![
                            MdSpan::new("  ", MdStyle::Plain),
                            MdSpan::new(line, MdStyle::CodeBlock),
                        ],
                    });
                }
            }
        }

        self.lines.push(MdLine {
            spans: vec![MdSpan::new("```", MdStyle::CodeFence)],
        });
    }

    /// Lays a collected table out as aligned rows with box-drawing borders.
    /// Rows are emitted unwrapped; overlong lines are clipped by the pane.
    fn flush_table(&mut self, table: TableBuilder) {
        let cell_width = |cell: &[MdSpan]| -> usize {
            cell.iter().map(|s| s.text.width()).sum()
        };

        let columns = table
            .header
            .len()
            .max(table.rows.iter().map(Vec::len).max().unwrap_or(0));
        if columns == 0 {
            return;
        }

        let mut widths = vec![0usize; columns];
        for (i, cell) in table.header.iter().enumerate() {
            widths[i] = widths[i].max(cell_width(cell));
        }
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell_width(cell));
            }
        }

        fn emit_row(
            lines: &mut Vec<MdLine>,
            cells: &[Vec<MdSpan>],
            header: bool,
            widths: &[usize],
        ) {
            let empty_cell: Vec<MdSpan> = Vec::new();
            let mut spans = Vec::new();
            for (i, width) in widths.iter().enumerate() {
                if i > 0 {
                    spans.push(MdSpan::new(" │ ", MdStyle::TableBorder));
                }
                let cell = cells.get(i).unwrap_or(&empty_cell);
                let mut used = 0usize;
                for span in cell {
                    used += span.text.width();
                    if header {
                        spans.push(MdSpan::new(span.text.clone(), MdStyle::TableHeader));
                    } else {
                        spans.push(span.clone());
                    }
                }
                if used < *width {
                    spans.push(MdSpan::new(" ".repeat(width - used), MdStyle::Plain));
                }
            }
            lines.push(MdLine { spans });
        }

        if !table.header.is_empty() {
            emit_row(&mut self.lines, &table.header, true, &widths);
            let mut rule = Vec::new();
            for (i, width) in widths.iter().enumerate() {
                if i > 0 {
                    rule.push(MdSpan::new("─┼─", MdStyle::TableBorder));
                }
                rule.push(MdSpan::new("─".repeat(*width), MdStyle::TableBorder));
            }
            self.lines.push(MdLine { spans: rule });
        }
        for row in &table.rows {
            emit_row(&mut self.lines, row, false, &widths);
        }
    }

    fn finish(mut self) -> Vec<MdLine> {
        if !self.current_spans.is_empty() {
            self.flush_paragraph();
        }
        if self.in_code_block {
            self.flush_code_block();
        }

        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            self.lines.push(MdLine::empty());
        }
        self.lines
    }
}
