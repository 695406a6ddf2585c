//! Events consumed by the reducer.
//!
//! Everything that can change state arrives here: terminal input, frame
//! ticks, and completions of async fetches posted back through the runtime
//! inbox.

use tav_core::error::ApiError;
use tav_core::types::{FeedbackContent, FeedbackRef};

/// A single input to the reducer.
#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick driving the spinner.
    Tick,
    /// Current terminal size, prepended before each drain of the inbox.
    Frame { width: u16, height: u16 },
    /// Raw terminal event from crossterm.
    Terminal(crossterm::event::Event),
    /// The report list fetch for a search finished.
    FeedbackListLoaded {
        generation: u64,
        student_id: String,
        result: Result<Vec<FeedbackRef>, ApiError>,
    },
    /// The content fetch for an opened report finished.
    FeedbackContentLoaded {
        generation: u64,
        result: Result<FeedbackContent, ApiError>,
    },
}
