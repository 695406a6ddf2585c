//! Application state.
//!
//! Single source of truth for the UI. Mutated only by the reducer in
//! [`crate::update`]; read by the pure view in [`crate::render`].

use tav_core::config::Config;
use tav_core::types::{FeedbackContent, FeedbackRef};

use crate::markdown::{Highlighter, MdLine};

/// Which pane owns keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Search,
    Results,
    Viewer,
}

/// Lifecycle of the current interaction with the feedback service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing in flight; the status line shows key hints.
    Idle,
    /// A request is in flight; the status line shows a spinner.
    Loading,
    /// The last request failed; the status line shows the error message.
    Error,
}

/// Search input box.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// Raw student ID text, untrimmed.
    pub input: String,
}

/// Sidebar list of feedback reports for the searched student.
#[derive(Debug, Clone, Default)]
pub struct ResultsState {
    pub feedbacks: Vec<FeedbackRef>,
    pub selected_row: usize,
    /// Student ID the current list belongs to. None until a search succeeds.
    pub searched_id: Option<String>,
}

impl ResultsState {
    pub fn select_next(&mut self) {
        if !self.feedbacks.is_empty() {
            self.selected_row = (self.selected_row + 1).min(self.feedbacks.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn selected(&self) -> Option<&FeedbackRef> {
        self.feedbacks.get(self.selected_row)
    }
}

/// Reading pane with the currently open report.
#[derive(Default)]
pub struct ViewerState {
    pub report: Option<FeedbackContent>,
    pub scroll: usize,
    /// Rendered lines for `report` at `rendered_width`. Rebuilt when the
    /// report changes or the terminal is resized.
    pub lines: Vec<MdLine>,
    pub rendered_width: usize,
}

impl ViewerState {
    pub fn max_scroll(&self, viewport_height: usize) -> usize {
        self.lines.len().saturating_sub(viewport_height)
    }

    pub fn clear(&mut self) {
        self.report = None;
        self.scroll = 0;
        self.lines.clear();
        self.rendered_width = 0;
    }
}

/// Top-level application state.
pub struct AppState {
    pub should_quit: bool,
    pub focus: Pane,
    pub status: SessionStatus,
    /// One user-visible message per failure class. Set iff status is Error.
    pub error_message: Option<String>,
    pub search: SearchState,
    pub results: ResultsState,
    pub viewer: ViewerState,
    /// Monotonic request counter; responses from older requests are dropped.
    pub generation: u64,
    pub spinner_frame: usize,
    /// Last known terminal size.
    pub width: u16,
    pub height: u16,
    pub config: Config,
    pub highlighter: Box<dyn Highlighter + Send>,
}

impl AppState {
    pub fn new(config: Config, highlighter: Box<dyn Highlighter + Send>) -> Self {
        Self {
            should_quit: false,
            focus: Pane::Search,
            status: SessionStatus::Idle,
            error_message: None,
            search: SearchState::default(),
            results: ResultsState::default(),
            viewer: ViewerState::default(),
            generation: 0,
            spinner_frame: 0,
            width: 0,
            height: 0,
            config,
            highlighter,
        }
    }

    /// Marks the session as failed with a user-visible message.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = SessionStatus::Error;
        self.error_message = Some(message.into());
    }

    /// Clears any error and returns to idle.
    pub fn clear_error(&mut self) {
        self.status = SessionStatus::Idle;
        self.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::PlainHighlighter;

    fn feedback(assignment: &str) -> FeedbackRef {
        FeedbackRef {
            filename: format!("{assignment}.py.md"),
            assignment: assignment.to_string(),
            path: format!("feedback/{assignment}.py.md"),
        }
    }

    #[test]
    fn results_selection_clamps_to_bounds() {
        let mut results = ResultsState {
            feedbacks: vec![feedback("p1"), feedback("p2")],
            ..Default::default()
        };
        results.select_prev();
        assert_eq!(results.selected_row, 0);
        results.select_next();
        results.select_next();
        results.select_next();
        assert_eq!(results.selected_row, 1);
        assert_eq!(results.selected().unwrap().assignment, "p2");
    }

    #[test]
    fn error_roundtrip() {
        let mut state = AppState::new(Config::default(), Box::new(PlainHighlighter));
        state.set_error("boom");
        assert_eq!(state.status, SessionStatus::Error);
        assert_eq!(state.error_message.as_deref(), Some("boom"));
        state.clear_error();
        assert_eq!(state.status, SessionStatus::Idle);
        assert!(state.error_message.is_none());
    }
}
