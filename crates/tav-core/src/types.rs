//! Wire types for the feedback backend.

use serde::{Deserialize, Serialize};

/// One retrievable report in a student's result set.
///
/// `filename` is unique within a single student's results and is used as the
/// list key by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRef {
    pub filename: String,
    pub assignment: String,
    pub path: String,
}

/// Body of the list endpoint: `GET /api/feedback/{student_id}`.
///
/// A missing `feedbacks` field decodes as an empty list rather than an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackListResponse {
    #[serde(default)]
    pub feedbacks: Vec<FeedbackRef>,
}

/// Body of the content endpoint: `GET /api/feedback/{student_id}/{assignment}`.
///
/// `content` is raw Markdown authored by an instructor. It is untrusted and
/// must only ever be rendered through the sanitizing Markdown path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackContent {
    pub student_id: String,
    pub assignment: String,
    pub filename: String,
    pub content: String,
}
