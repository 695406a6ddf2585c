//! Side effects requested by the reducer.
//!
//! The reducer stays pure by describing work instead of doing it; the
//! runtime executes each effect and posts the outcome back as a
//! [`crate::events::UiEvent`].

/// An effect for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Tear down the terminal and exit the event loop.
    Quit,
    /// GET the feedback report list for a student.
    FetchFeedbackList { generation: u64, student_id: String },
    /// GET the content of one feedback report.
    FetchFeedbackContent {
        generation: u64,
        student_id: String,
        assignment: String,
    },
}
