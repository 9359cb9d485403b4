//! Out-of-band question submission.

use serde_json::json;
use tracing::debug;

use sidechat_models::DiscussionId;

use crate::config::ChatEndpoints;
use crate::error::{Result, response_to_error};
use crate::http_client::build_http_client;

/// Delivers user questions to the backend, keyed by discussion id.
///
/// Answers never come back on this call - they arrive asynchronously on
/// whichever answer channel the caller runs. Failures surface as values;
/// nothing is retried.
#[derive(Debug, Clone)]
pub struct QuestionClient {
    client: reqwest::Client,
    endpoints: ChatEndpoints,
}

impl QuestionClient {
    pub fn new(endpoints: ChatEndpoints) -> Self {
        Self {
            client: build_http_client(),
            endpoints,
        }
    }

    /// Submit one question. Whitespace-only text is dropped without any
    /// network traffic.
    pub async fn submit(&self, discussion: &DiscussionId, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            debug!("skipping empty question");
            return Ok(());
        }
        let response = self
            .client
            .post(self.endpoints.questions_url(discussion))
            .json(&json!({ "text": text }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(response_to_error(response).await);
        }
        debug!(discussion = %discussion, "question accepted");
        Ok(())
    }
}
