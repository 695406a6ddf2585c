//! HTTP client for the feedback backend.
//!
//! Two read-only endpoints:
//! - `GET {base_url}/api/feedback/{student_id}` - list reports
//! - `GET {base_url}/api/feedback/{student_id}/{assignment}` - report content

use std::time::Duration;

use anyhow::Result;

use crate::config::Config;
use crate::error::ApiError;
use crate::types::{FeedbackContent, FeedbackListResponse, FeedbackRef};

/// Client for the two feedback endpoints.
///
/// Cheap to clone; the inner `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct FeedbackClient {
    http: reqwest::Client,
    base_url: String,
}

impl FeedbackClient {
    /// Builds a client from config (base URL and request timeout).
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Lists the reports available for a student.
    ///
    /// 404 maps to [`ApiError::NotFound`]; other non-2xx statuses map to
    /// [`ApiError::Status`].
    pub async fn list_feedback(&self, student_id: &str) -> Result<Vec<FeedbackRef>, ApiError> {
        let url = format!("{}/api/feedback/{}", self.base_url, student_id);
        tracing::debug!(%url, "fetching feedback list");
        let response = self.http.get(&url).send().await?;
        let response = check_status(response)?;
        let body: FeedbackListResponse = response.json().await?;
        tracing::debug!(count = body.feedbacks.len(), "feedback list received");
        Ok(body.feedbacks)
    }

    /// Fetches the Markdown content of one report.
    pub async fn feedback_content(
        &self,
        student_id: &str,
        assignment: &str,
    ) -> Result<FeedbackContent, ApiError> {
        let url = format!("{}/api/feedback/{}/{}", self.base_url, student_id, assignment);
        tracing::debug!(%url, "fetching feedback content");
        let response = self.http.get(&url).send().await?;
        let response = check_status(response)?;
        Ok(response.json().await?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Maps a non-success status to the matching [`ApiError`] variant.
fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status == reqwest::StatusCode::NOT_FOUND {
        Err(ApiError::NotFound)
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = Config {
            base_url: "http://localhost:8000/".to_string(),
            ..Config::default()
        };
        let client = FeedbackClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
