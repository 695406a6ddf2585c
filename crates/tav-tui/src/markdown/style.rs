//! UI-agnostic styled text primitives for rendered Markdown.

/// A styled span of text.
///
/// Minimal representation that the view layer converts to ratatui
/// `Span`/`Line` values at draw time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdSpan {
    pub text: String,
    pub style: MdStyle,
}

impl MdSpan {
    pub fn new(text: impl Into<String>, style: MdStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A line of styled spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdLine {
    pub spans: Vec<MdSpan>,
}

impl MdLine {
    /// Creates an empty line.
    pub fn empty() -> Self {
        MdLine { spans: vec![] }
    }

    /// Concatenated plain text of the line (test helper and label building).
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Semantic style identifiers.
///
/// Translated to terminal styles by the renderer; keeping these semantic
/// keeps the Markdown module free of ratatui types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdStyle {
    /// No styling.
    Plain,
    /// Body text.
    Text,
    /// Emphasized text (*italic*).
    Emphasis,
    /// Strong text (**bold**).
    Strong,
    /// Struck-through text (~~gone~~).
    Strikethrough,
    /// Heading level 1.
    H1,
    /// Heading level 2.
    H2,
    /// Heading level 3+.
    H3,
    /// Inline code.
    CodeInline,
    /// Fenced code block content (no recognized language).
    CodeBlock,
    /// Code fence markers (rendered subtly).
    CodeFence,
    /// A highlighted code token with a concrete foreground color.
    Syntax { fg: (u8, u8, u8) },
    /// Link text.
    Link,
    /// Blockquote content.
    BlockQuote,
    /// List bullet or task-list marker.
    ListBullet,
    /// Ordered list number marker.
    ListNumber,
    /// Table header cell.
    TableHeader,
    /// Table border characters.
    TableBorder,
    /// Horizontal rule.
    Rule,
}

impl MdStyle {
    /// True for styles whose text must keep exact whitespace when wrapping.
    pub fn preserves_whitespace(self) -> bool {
        matches!(
            self,
            MdStyle::CodeInline | MdStyle::CodeBlock | MdStyle::Syntax { .. }
        )
    }
}
