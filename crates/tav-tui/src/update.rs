//! Pure reducer: the only place application state changes.
//!
//! `update` consumes one [`UiEvent`], mutates [`AppState`], and returns the
//! effects the runtime should execute. Network outcomes come back in as
//! events, so every state transition in the app is exercisable from tests
//! without a terminal or a server.

use crossterm::event::{Event as TerminalEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tav_core::error::ApiError;
use tav_core::types::{FeedbackContent, FeedbackRef};
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::markdown::render_markdown;
use crate::render;
use crate::state::{AppState, Pane, SessionStatus};

/// One user-visible message per failure class.
pub const MSG_EMPTY_INPUT: &str = "Enter a student ID";
pub const MSG_LIST_NOT_FOUND: &str = "No feedback found for this student ID";
pub const MSG_LIST_FAILED: &str = "Failed to retrieve feedback";
pub const MSG_LIST_NETWORK: &str = "Network error — check that the backend service is running";
pub const MSG_CONTENT_FAILED: &str = "Failed to retrieve feedback content";
pub const MSG_CONTENT_NETWORK: &str = "Network error";

/// Applies one event to the state and returns effects to execute.
pub fn update(state: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            if state.status == SessionStatus::Loading {
                state.spinner_frame = state.spinner_frame.wrapping_add(1);
            }
            vec![]
        }
        UiEvent::Frame { width, height } => {
            let resized = width != state.width;
            state.width = width;
            state.height = height;
            if resized {
                rebuild_viewer(state);
            }
            vec![]
        }
        UiEvent::Terminal(event) => handle_terminal_event(state, event),
        UiEvent::FeedbackListLoaded {
            generation,
            student_id,
            result,
        } => handle_list_loaded(state, generation, student_id, result),
        UiEvent::FeedbackContentLoaded { generation, result } => {
            handle_content_loaded(state, generation, result)
        }
    }
}

fn handle_terminal_event(state: &mut AppState, event: TerminalEvent) -> Vec<UiEffect> {
    match event {
        TerminalEvent::Key(key) if key.kind == KeyEventKind::Press => handle_key(state, key),
        TerminalEvent::Resize(width, height) => {
            update(state, UiEvent::Frame { width, height })
        }
        _ => vec![],
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    // Ctrl+C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return vec![UiEffect::Quit];
    }

    if key.code == KeyCode::Tab {
        state.focus = next_pane(state);
        return vec![];
    }

    match state.focus {
        Pane::Search => handle_search_key(state, key),
        Pane::Results => handle_results_key(state, key),
        Pane::Viewer => handle_viewer_key(state, key),
    }
}

/// Tab order: search, results, viewer (when a report is open), back to search.
fn next_pane(state: &AppState) -> Pane {
    match state.focus {
        Pane::Search => Pane::Results,
        Pane::Results if state.viewer.report.is_some() => Pane::Viewer,
        Pane::Results => Pane::Search,
        Pane::Viewer => Pane::Search,
    }
}

fn handle_search_key(state: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Char(c) => {
            state.search.input.push(c);
            vec![]
        }
        KeyCode::Backspace => {
            state.search.input.pop();
            vec![]
        }
        KeyCode::Enter => submit_search(state),
        KeyCode::Esc => {
            state.should_quit = true;
            vec![UiEffect::Quit]
        }
        KeyCode::Down => {
            if !state.results.feedbacks.is_empty() {
                state.focus = Pane::Results;
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_results_key(state: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            state.results.select_next();
            vec![]
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.results.select_prev();
            vec![]
        }
        KeyCode::Enter => open_selected(state),
        KeyCode::Esc => {
            state.focus = Pane::Search;
            vec![]
        }
        KeyCode::Char('q') => {
            state.should_quit = true;
            vec![UiEffect::Quit]
        }
        _ => vec![],
    }
}

fn handle_viewer_key(state: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let viewport = render::viewer_viewport_height(state.height);
    let max_scroll = state.viewer.max_scroll(viewport);
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            state.viewer.scroll = (state.viewer.scroll + 1).min(max_scroll);
            vec![]
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.viewer.scroll = state.viewer.scroll.saturating_sub(1);
            vec![]
        }
        KeyCode::PageDown => {
            state.viewer.scroll = (state.viewer.scroll + viewport).min(max_scroll);
            vec![]
        }
        KeyCode::PageUp => {
            state.viewer.scroll = state.viewer.scroll.saturating_sub(viewport);
            vec![]
        }
        KeyCode::Char('g') | KeyCode::Home => {
            state.viewer.scroll = 0;
            vec![]
        }
        KeyCode::Char('G') | KeyCode::End => {
            state.viewer.scroll = max_scroll;
            vec![]
        }
        KeyCode::Esc => close_feedback(state),
        KeyCode::Char('q') => {
            state.should_quit = true;
            vec![UiEffect::Quit]
        }
        _ => vec![],
    }
}

/// Validates and submits the search box, requesting the report list.
pub fn submit_search(state: &mut AppState) -> Vec<UiEffect> {
    // A request is already in flight; its response will win anyway.
    if state.status == SessionStatus::Loading {
        return vec![];
    }

    let student_id = state.search.input.trim().to_string();
    if student_id.is_empty() {
        state.set_error(MSG_EMPTY_INPUT);
        return vec![];
    }

    state.clear_error();
    state.viewer.clear();
    state.results.feedbacks.clear();
    state.results.selected_row = 0;
    state.results.searched_id = None;
    state.status = SessionStatus::Loading;
    state.generation += 1;

    debug!(student_id, generation = state.generation, "search submitted");
    vec![UiEffect::FetchFeedbackList {
        generation: state.generation,
        student_id,
    }]
}

/// Opens the report selected in the sidebar.
fn open_selected(state: &mut AppState) -> Vec<UiEffect> {
    if state.status == SessionStatus::Loading {
        return vec![];
    }
    let (Some(feedback), Some(student_id)) = (
        state.results.selected().cloned(),
        state.results.searched_id.clone(),
    ) else {
        return vec![];
    };

    state.clear_error();
    state.status = SessionStatus::Loading;
    state.generation += 1;

    debug!(
        student_id,
        assignment = feedback.assignment,
        generation = state.generation,
        "report opened"
    );
    vec![UiEffect::FetchFeedbackContent {
        generation: state.generation,
        student_id,
        assignment: feedback.assignment,
    }]
}

/// Closes the open report; the content pane returns to the welcome state.
fn close_feedback(state: &mut AppState) -> Vec<UiEffect> {
    state.viewer.clear();
    state.focus = Pane::Results;
    vec![]
}

fn handle_list_loaded(
    state: &mut AppState,
    generation: u64,
    student_id: String,
    result: Result<Vec<FeedbackRef>, ApiError>,
) -> Vec<UiEffect> {
    // Latest request wins; responses to superseded searches are dropped.
    if generation != state.generation {
        debug!(generation, current = state.generation, "stale list response dropped");
        return vec![];
    }

    match result {
        Ok(feedbacks) => {
            debug!(student_id, count = feedbacks.len(), "report list loaded");
            state.clear_error();
            if !feedbacks.is_empty() {
                state.focus = Pane::Results;
            }
            state.results.feedbacks = feedbacks;
            state.results.selected_row = 0;
            state.results.searched_id = Some(student_id);
        }
        Err(error) => {
            debug!(student_id, %error, "report list fetch failed");
            state.results.feedbacks.clear();
            state.results.selected_row = 0;
            state.results.searched_id = None;
            state.set_error(match error {
                ApiError::NotFound => MSG_LIST_NOT_FOUND,
                ApiError::Transport(_) => MSG_LIST_NETWORK,
                ApiError::Status(_) | ApiError::Decode(_) => MSG_LIST_FAILED,
            });
        }
    }
    vec![]
}

fn handle_content_loaded(
    state: &mut AppState,
    generation: u64,
    result: Result<FeedbackContent, ApiError>,
) -> Vec<UiEffect> {
    if generation != state.generation {
        debug!(generation, current = state.generation, "stale content response dropped");
        return vec![];
    }

    match result {
        Ok(content) => {
            debug!(assignment = content.assignment, "report content loaded");
            state.clear_error();
            state.viewer.report = Some(content);
            state.viewer.scroll = 0;
            state.viewer.lines.clear();
            state.viewer.rendered_width = 0;
            rebuild_viewer(state);
            state.focus = Pane::Viewer;
        }
        Err(error) => {
            // The currently displayed report, if any, stays on screen.
            debug!(%error, "report content fetch failed");
            state.set_error(match error {
                ApiError::Transport(_) => MSG_CONTENT_NETWORK,
                _ => MSG_CONTENT_FAILED,
            });
        }
    }
    vec![]
}

/// Re-renders the open report when its width is out of date.
fn rebuild_viewer(state: &mut AppState) {
    let width = render::viewer_text_width(state.width);
    if state.viewer.rendered_width == width {
        return;
    }
    let Some(report) = &state.viewer.report else {
        return;
    };
    let lines = render_markdown(&report.content, width, state.highlighter.as_ref());
    state.viewer.lines = lines;
    state.viewer.rendered_width = width;
    let viewport = render::viewer_viewport_height(state.height);
    state.viewer.scroll = state.viewer.scroll.min(state.viewer.max_scroll(viewport));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::PlainHighlighter;
    use tav_core::config::Config;

    fn test_state() -> AppState {
        let mut state = AppState::new(Config::default(), Box::new(PlainHighlighter));
        state.width = 100;
        state.height = 30;
        state
    }

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(TerminalEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            update(state, key(KeyCode::Char(c)));
        }
    }

    fn feedback(assignment: &str, filename: &str) -> FeedbackRef {
        FeedbackRef {
            filename: filename.to_string(),
            assignment: assignment.to_string(),
            path: format!("feedback/{filename}"),
        }
    }

    fn content(student_id: &str, assignment: &str, body: &str) -> FeedbackContent {
        FeedbackContent {
            student_id: student_id.to_string(),
            assignment: assignment.to_string(),
            filename: format!("{assignment}.md"),
            content: body.to_string(),
        }
    }

    /// Runs a full successful search, leaving the list loaded.
    fn search(state: &mut AppState, student_id: &str, list: Vec<FeedbackRef>) {
        state.search.input = student_id.to_string();
        state.focus = Pane::Search;
        let effects = update(state, key(KeyCode::Enter));
        assert_eq!(effects.len(), 1);
        update(
            state,
            UiEvent::FeedbackListLoaded {
                generation: state.generation,
                student_id: student_id.to_string(),
                result: Ok(list),
            },
        );
    }

    #[test]
    fn search_rejects_empty_input() {
        let mut state = test_state();
        for input in ["", "   ", "\t "] {
            state.clear_error();
            state.search.input = input.to_string();
            let effects = update(&mut state, key(KeyCode::Enter));
            assert!(effects.is_empty());
            assert_eq!(state.status, SessionStatus::Error);
            assert_eq!(state.error_message.as_deref(), Some(MSG_EMPTY_INPUT));
        }
    }

    #[test]
    fn search_trims_input_and_emits_fetch() {
        let mut state = test_state();
        state.search.input = "  12210211  ".to_string();
        let effects = update(&mut state, key(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![UiEffect::FetchFeedbackList {
                generation: 1,
                student_id: "12210211".to_string(),
            }]
        );
        assert_eq!(state.status, SessionStatus::Loading);
        assert!(state.error_message.is_none());
    }

    #[test]
    fn enter_submits_from_search_box() {
        let mut state = test_state();
        type_text(&mut state, "42");
        let effects = update(&mut state, key(KeyCode::Enter));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::FetchFeedbackList { student_id, .. }] if student_id == "42"
        ));
    }

    #[test]
    fn list_success_keeps_response_order() {
        let mut state = test_state();
        search(
            &mut state,
            "s1",
            vec![feedback("p2", "p2.py.md"), feedback("p1", "p1.py.md")],
        );
        assert_eq!(state.status, SessionStatus::Idle);
        let order: Vec<&str> = state
            .results
            .feedbacks
            .iter()
            .map(|f| f.assignment.as_str())
            .collect();
        assert_eq!(order, vec!["p2", "p1"]);
        assert_eq!(state.results.searched_id.as_deref(), Some("s1"));
        assert_eq!(state.focus, Pane::Results);
    }

    #[test]
    fn list_not_found_clears_results() {
        let mut state = test_state();
        search(&mut state, "s1", vec![feedback("p1", "p1.md")]);
        state.search.input = "nobody".to_string();
        state.focus = Pane::Search;
        update(&mut state, key(KeyCode::Enter));
        let generation = state.generation;
        update(
            &mut state,
            UiEvent::FeedbackListLoaded {
                generation,
                student_id: "nobody".to_string(),
                result: Err(ApiError::NotFound),
            },
        );
        assert!(state.results.feedbacks.is_empty());
        assert_eq!(state.error_message.as_deref(), Some(MSG_LIST_NOT_FOUND));
    }

    #[test]
    fn list_server_error_maps_to_generic_message() {
        let mut state = test_state();
        for error in [ApiError::Status(500), ApiError::Decode("bad json".into())] {
            state.status = SessionStatus::Idle;
            state.search.input = "s1".to_string();
            state.focus = Pane::Search;
            update(&mut state, key(KeyCode::Enter));
            let generation = state.generation;
            update(
                &mut state,
                UiEvent::FeedbackListLoaded {
                    generation,
                    student_id: "s1".to_string(),
                    result: Err(error),
                },
            );
            assert_eq!(state.error_message.as_deref(), Some(MSG_LIST_FAILED));
            assert!(state.results.feedbacks.is_empty());
        }
    }

    #[test]
    fn list_transport_failure_names_the_backend() {
        let mut state = test_state();
        state.search.input = "s1".to_string();
        update(&mut state, key(KeyCode::Enter));
        let generation = state.generation;
        update(
            &mut state,
            UiEvent::FeedbackListLoaded {
                generation,
                student_id: "s1".to_string(),
                result: Err(ApiError::Transport("connection refused".into())),
            },
        );
        assert_eq!(state.error_message.as_deref(), Some(MSG_LIST_NETWORK));
    }

    #[test]
    fn view_then_close_round_trip() {
        let mut state = test_state();
        search(&mut state, "S1", vec![feedback("hw1", "hw1.md")]);

        let effects = update(&mut state, key(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![UiEffect::FetchFeedbackContent {
                generation: 2,
                student_id: "S1".to_string(),
                assignment: "hw1".to_string(),
            }]
        );

        update(
            &mut state,
            UiEvent::FeedbackContentLoaded {
                generation: 2,
                result: Ok(content("S1", "hw1", "# Hi\n- a\n- b")),
            },
        );
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.focus, Pane::Viewer);
        let report = state.viewer.report.as_ref().unwrap();
        assert_eq!(report.assignment, "hw1");

        update(&mut state, key(KeyCode::Esc));
        assert!(state.viewer.report.is_none());
        assert!(state.viewer.lines.is_empty());
        assert_eq!(state.focus, Pane::Results);
        // The list survives closing the report.
        assert_eq!(state.results.feedbacks.len(), 1);
    }

    #[test]
    fn content_round_trip_renders_markdown() {
        let mut state = test_state();
        search(&mut state, "S1", vec![feedback("hw1", "hw1.md")]);
        update(&mut state, key(KeyCode::Enter));
        let generation = state.generation;
        update(
            &mut state,
            UiEvent::FeedbackContentLoaded {
                generation,
                result: Ok(content("S1", "hw1", "# Hi\n- a\n- b")),
            },
        );
        let text: Vec<String> = state.viewer.lines.iter().map(|l| l.plain_text()).collect();
        assert_eq!(text[0], "Hi");
        assert!(text.iter().any(|l| l == "• a"));
        assert!(text.iter().any(|l| l == "• b"));
    }

    #[test]
    fn failed_content_fetch_preserves_current_report() {
        let mut state = test_state();
        search(&mut state, "S1", vec![feedback("hw1", "hw1.md"), feedback("hw2", "hw2.md")]);
        update(&mut state, key(KeyCode::Enter));
        let generation = state.generation;
        update(
            &mut state,
            UiEvent::FeedbackContentLoaded {
                generation,
                result: Ok(content("S1", "hw1", "first report")),
            },
        );

        // Opening the second report fails; the first stays on screen.
        state.focus = Pane::Results;
        update(&mut state, key(KeyCode::Down));
        update(&mut state, key(KeyCode::Enter));
        let generation = state.generation;
        update(
            &mut state,
            UiEvent::FeedbackContentLoaded {
                generation,
                result: Err(ApiError::Status(500)),
            },
        );
        assert_eq!(state.error_message.as_deref(), Some(MSG_CONTENT_FAILED));
        assert_eq!(
            state.viewer.report.as_ref().unwrap().content,
            "first report"
        );
    }

    #[test]
    fn stale_list_response_is_dropped() {
        let mut state = test_state();
        state.search.input = "first".to_string();
        update(&mut state, key(KeyCode::Enter));
        let first_generation = state.generation;

        // A second search supersedes the first before its response lands.
        state.status = SessionStatus::Idle;
        state.search.input = "second".to_string();
        state.focus = Pane::Search;
        update(&mut state, key(KeyCode::Enter));

        update(
            &mut state,
            UiEvent::FeedbackListLoaded {
                generation: first_generation,
                student_id: "first".to_string(),
                result: Ok(vec![feedback("old", "old.md")]),
            },
        );
        assert!(state.results.feedbacks.is_empty());
        assert_eq!(state.status, SessionStatus::Loading);

        let generation = state.generation;
        update(
            &mut state,
            UiEvent::FeedbackListLoaded {
                generation,
                student_id: "second".to_string(),
                result: Ok(vec![feedback("new", "new.md")]),
            },
        );
        assert_eq!(state.results.feedbacks[0].assignment, "new");
        assert_eq!(state.results.searched_id.as_deref(), Some("second"));
    }

    #[test]
    fn stale_content_response_is_dropped() {
        let mut state = test_state();
        search(&mut state, "S1", vec![feedback("hw1", "hw1.md")]);
        update(&mut state, key(KeyCode::Enter));
        let stale = state.generation;

        // A new search supersedes the in-flight content fetch.
        state.status = SessionStatus::Idle;
        state.focus = Pane::Search;
        state.search.input = "S2".to_string();
        update(&mut state, key(KeyCode::Enter));

        update(
            &mut state,
            UiEvent::FeedbackContentLoaded {
                generation: stale,
                result: Ok(content("S1", "hw1", "late arrival")),
            },
        );
        assert!(state.viewer.report.is_none());
    }

    #[test]
    fn submit_ignored_while_loading() {
        let mut state = test_state();
        state.search.input = "s1".to_string();
        update(&mut state, key(KeyCode::Enter));
        assert_eq!(state.generation, 1);

        let effects = update(&mut state, key(KeyCode::Enter));
        assert!(effects.is_empty());
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn search_twice_yields_same_list() {
        let mut state = test_state();
        let list = vec![feedback("p1", "p1.md"), feedback("p2", "p2.md")];
        search(&mut state, "s1", list.clone());
        let first = state.results.feedbacks.clone();
        search(&mut state, "s1", list);
        assert_eq!(state.results.feedbacks, first);
    }

    #[test]
    fn new_search_clears_selected_report() {
        let mut state = test_state();
        search(&mut state, "S1", vec![feedback("hw1", "hw1.md")]);
        update(&mut state, key(KeyCode::Enter));
        let generation = state.generation;
        update(
            &mut state,
            UiEvent::FeedbackContentLoaded {
                generation,
                result: Ok(content("S1", "hw1", "body")),
            },
        );
        assert!(state.viewer.report.is_some());

        state.focus = Pane::Search;
        state.search.input = "S2".to_string();
        update(&mut state, key(KeyCode::Enter));
        assert!(state.viewer.report.is_none());
    }

    #[test]
    fn scenario_search_then_network_failure_on_view() {
        let mut state = test_state();
        search(&mut state, "12210211", vec![feedback("p1", "p1.py")]);
        assert_eq!(
            render::row_label(&state.results.feedbacks[0]),
            "P1  p1.py"
        );

        update(&mut state, key(KeyCode::Enter));
        let generation = state.generation;
        update(
            &mut state,
            UiEvent::FeedbackContentLoaded {
                generation,
                result: Err(ApiError::Transport("connection reset".into())),
            },
        );
        assert_eq!(state.error_message.as_deref(), Some(MSG_CONTENT_NETWORK));
        assert_eq!(state.results.feedbacks.len(), 1);
        assert_eq!(state.results.feedbacks[0].assignment, "p1");
        assert!(state.viewer.report.is_none());
    }

    #[test]
    fn tick_advances_spinner_only_while_loading() {
        let mut state = test_state();
        update(&mut state, UiEvent::Tick);
        assert_eq!(state.spinner_frame, 0);
        state.status = SessionStatus::Loading;
        update(&mut state, UiEvent::Tick);
        assert_eq!(state.spinner_frame, 1);
    }

    #[test]
    fn resize_rerenders_open_report() {
        let mut state = test_state();
        search(&mut state, "S1", vec![feedback("hw1", "hw1.md")]);
        update(&mut state, key(KeyCode::Enter));
        let generation = state.generation;
        update(
            &mut state,
            UiEvent::FeedbackContentLoaded {
                generation,
                result: Ok(content("S1", "hw1", "a paragraph that is long enough to wrap somewhere")),
            },
        );
        let before = state.viewer.lines.len();
        update(&mut state, UiEvent::Frame { width: 50, height: 30 });
        assert!(state.viewer.lines.len() > before);
    }

    #[test]
    fn ctrl_c_quits_from_any_pane() {
        let mut state = test_state();
        let event = UiEvent::Terminal(TerminalEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        let effects = update(&mut state, event);
        assert_eq!(effects, vec![UiEffect::Quit]);
        assert!(state.should_quit);
    }

    #[test]
    fn viewer_scroll_clamps_to_content() {
        let mut state = test_state();
        search(&mut state, "S1", vec![feedback("hw1", "hw1.md")]);
        update(&mut state, key(KeyCode::Enter));
        let body = (0..100).map(|i| format!("line {i}\n\n")).collect::<String>();
        let generation = state.generation;
        update(
            &mut state,
            UiEvent::FeedbackContentLoaded {
                generation,
                result: Ok(content("S1", "hw1", &body)),
            },
        );
        update(&mut state, key(KeyCode::End));
        let max = state.viewer.scroll;
        assert!(max > 0);
        update(&mut state, key(KeyCode::Down));
        assert_eq!(state.viewer.scroll, max);
        update(&mut state, key(KeyCode::Home));
        assert_eq!(state.viewer.scroll, 0);
    }
}
