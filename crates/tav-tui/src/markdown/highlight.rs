//! Syntax highlighting seam for fenced code blocks.
//!
//! The Markdown renderer talks to a [`Highlighter`] trait so the concrete
//! engine is swappable; the default implementation is syntect. An unknown or
//! absent language tag makes `highlight` return `None` and the renderer
//! falls back to plain preformatted text.

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::style::{MdLine, MdSpan, MdStyle};

/// Capability interface for code-block highlighting.
pub trait Highlighter {
    /// Highlights `code` for the given language tag.
    ///
    /// Returns `None` when the language is not recognized; the caller then
    /// renders the block as plain preformatted text.
    fn highlight(&self, lang: &str, code: &str) -> Option<Vec<MdLine>>;
}

/// Highlighter that recognizes nothing. Used in tests and as a no-op
/// fallback when syntax definitions fail to load.
#[derive(Debug, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, _lang: &str, _code: &str) -> Option<Vec<MdLine>> {
        None
    }
}

/// syntect-backed highlighter using the bundled syntax and theme sets.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    const THEME: &'static str = "base16-ocean.dark";

    pub fn new() -> Self {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(Self::THEME)
            .unwrap_or_else(Theme::default);
        Self { syntaxes, theme }
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, lang: &str, code: &str) -> Option<Vec<MdLine>> {
        let syntax = self.syntaxes.find_syntax_by_token(lang)?;
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            // A parse error mid-block degrades the whole block to plain text.
            let ranges = highlighter.highlight_line(line, &self.syntaxes).ok()?;
            let spans: Vec<MdSpan> = ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']);
                    if text.is_empty() {
                        return None;
                    }
                    let fg = style.foreground;
                    Some(MdSpan::new(
                        text,
                        MdStyle::Syntax {
                            fg: (fg.r, fg.g, fg.b),
                        },
                    ))
                })
                .collect();
            lines.push(MdLine { spans });
        }

        // Drop the trailing empty line produced by a final newline.
        if lines.last().is_some_and(|l| l.spans.is_empty()) {
            lines.pop();
        }

        Some(lines)
    }
}
