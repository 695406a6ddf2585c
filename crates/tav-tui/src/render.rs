//! Pure view: draws the whole UI from [`AppState`].
//!
//! Layout: a sidebar (search box above the report list) next to the content
//! pane, with a one-line status bar underneath. Nothing here mutates state.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tav_core::types::FeedbackRef;

use crate::common::scrollbar::Scrollbar;
use crate::common::text::truncate_with_ellipsis;
use crate::markdown::{MdLine, MdStyle};
use crate::state::{AppState, Pane, SessionStatus};

const SIDEBAR_WIDTH: u16 = 34;
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Columns available for report text: everything minus the sidebar, the
/// content borders, one column of left padding and the scrollbar.
pub fn viewer_text_width(total_width: u16) -> usize {
    total_width.saturating_sub(SIDEBAR_WIDTH + 4) as usize
}

/// Rows available for report text: everything minus the status bar and the
/// content borders.
pub fn viewer_viewport_height(total_height: u16) -> usize {
    total_height.saturating_sub(3) as usize
}

/// Sidebar row label: uppercased assignment name plus the source filename.
pub fn row_label(feedback: &FeedbackRef) -> String {
    format!("{}  {}", feedback.assignment.to_uppercase(), feedback.filename)
}

pub fn render(state: &AppState, frame: &mut Frame) {
    let [main, status] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .areas(frame.area());
    let [sidebar, content] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .areas(main);
    let [search, results] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .areas(sidebar);

    render_search(state, frame, search);
    render_results(state, frame, results);
    render_content(state, frame, content);
    render_status(state, frame, status);
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

fn render_search(state: &AppState, frame: &mut Frame, area: Rect) {
    let focused = state.focus == Pane::Search;
    let mut spans = vec![Span::raw(state.search.input.clone())];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
    }
    let input = Paragraph::new(Line::from(spans)).block(pane_block("Student ID", focused));
    frame.render_widget(input, area);
}

fn render_results(state: &AppState, frame: &mut Frame, area: Rect) {
    let focused = state.focus == Pane::Results;
    let title = match state.results.searched_id {
        Some(_) => format!("Reports ({})", state.results.feedbacks.len()),
        None => "Reports".to_string(),
    };
    let block = pane_block(&title, focused);

    let label_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = state
        .results
        .feedbacks
        .iter()
        .map(|f| ListItem::new(truncate_with_ellipsis(&row_label(f), label_width)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("› ");
    let mut list_state =
        ListState::default().with_selected(Some(state.results.selected_row));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_content(state: &AppState, frame: &mut Frame, area: Rect) {
    let focused = state.focus == Pane::Viewer;
    match &state.viewer.report {
        Some(report) => {
            let title = format!(" {} ", report.assignment.to_uppercase());
            let block = pane_block(&title, focused);
            let inner = block.inner(area);
            frame.render_widget(block, area);

            let viewport = inner.height as usize;
            let lines: Vec<Line> = state
                .viewer
                .lines
                .iter()
                .skip(state.viewer.scroll)
                .take(viewport)
                .map(to_line)
                .collect();
            let text_area = Rect {
                x: inner.x + 1,
                width: inner.width.saturating_sub(2),
                ..inner
            };
            frame.render_widget(Paragraph::new(lines), text_area);
            frame.render_widget(
                Scrollbar::new(state.viewer.lines.len(), viewport, state.viewer.scroll),
                inner,
            );
        }
        None => render_welcome(state, frame, area),
    }
}

fn render_welcome(state: &AppState, frame: &mut Frame, area: Rect) {
    let block = pane_block(" Assignment Feedback ", state.focus == Pane::Viewer);
    let lines = vec![
        Line::default(),
        Line::styled(
            "  Assignment Feedback Viewer",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::default(),
        Line::styled(
            "  Search for a student ID to list their feedback reports.",
            Style::default().fg(Color::DarkGray),
        ),
        Line::styled(
            "  Select a report in the sidebar to read it here.",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(state: &AppState, frame: &mut Frame, area: Rect) {
    let line = match state.status {
        SessionStatus::Loading => {
            let spinner = SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()];
            Line::styled(
                format!(" {spinner} Loading…"),
                Style::default().fg(Color::Cyan),
            )
        }
        SessionStatus::Error => Line::styled(
            format!(
                " {}",
                state.error_message.as_deref().unwrap_or("Unknown error")
            ),
            Style::default().fg(Color::Red),
        ),
        SessionStatus::Idle => Line::styled(
            " Enter search · Tab switch pane · ↑↓ navigate · Esc close · q quit",
            Style::default().fg(Color::DarkGray),
        ),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn to_line(line: &MdLine) -> Line<'static> {
    Line::from(
        line.spans
            .iter()
            .map(|s| Span::styled(s.text.clone(), style_for(s.style)))
            .collect::<Vec<_>>(),
    )
}

fn style_for(style: MdStyle) -> Style {
    match style {
        MdStyle::Plain => Style::default(),
        MdStyle::Text => Style::default(),
        MdStyle::Emphasis => Style::default().add_modifier(Modifier::ITALIC),
        MdStyle::Strong => Style::default().add_modifier(Modifier::BOLD),
        MdStyle::Strikethrough => Style::default().add_modifier(Modifier::CROSSED_OUT),
        MdStyle::H1 => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        MdStyle::H2 => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD),
        MdStyle::H3 => Style::default().add_modifier(Modifier::BOLD),
        MdStyle::CodeInline => Style::default().fg(Color::Yellow),
        MdStyle::CodeBlock => Style::default().fg(Color::Gray),
        MdStyle::CodeFence => Style::default().fg(Color::DarkGray),
        MdStyle::Syntax { fg: (r, g, b) } => Style::default().fg(Color::Rgb(r, g, b)),
        MdStyle::Link => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
        MdStyle::BlockQuote => Style::default().fg(Color::DarkGray),
        MdStyle::ListBullet => Style::default().fg(Color::Cyan),
        MdStyle::ListNumber => Style::default().fg(Color::Cyan),
        MdStyle::TableHeader => Style::default().add_modifier(Modifier::BOLD),
        MdStyle::TableBorder => Style::default().fg(Color::DarkGray),
        MdStyle::Rule => Style::default().fg(Color::DarkGray),
    }
}
