//! Endpoint configuration for the chat backend.

use serde::{Deserialize, Serialize};
use sidechat_models::DiscussionId;

/// Where the chat backend lives and which paths serve each exchange.
///
/// Defaults match the reference deployment: a LangServe-style
/// invoke/stream pair plus the session-keyed SSE and question endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEndpoints {
    pub base_url: String,
    pub invoke_path: String,
    pub stream_path: String,
    pub events_path: String,
    pub questions_path: String,
}

impl Default for ChatEndpoints {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            invoke_path: "/langchain/chat/invoke".to_string(),
            stream_path: "/langchain/chat/stream".to_string(),
            events_path: "/chat".to_string(),
            questions_path: "/questions".to_string(),
        }
    }
}

impl ChatEndpoints {
    /// Endpoints rooted at the given base URL, with the default paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn invoke_url(&self) -> String {
        self.join(&self.invoke_path)
    }

    pub fn stream_url(&self) -> String {
        self.join(&self.stream_path)
    }

    pub fn events_url(&self, discussion: &DiscussionId) -> String {
        format!("{}/{}", self.join(&self.events_path), discussion)
    }

    pub fn questions_url(&self, discussion: &DiscussionId) -> String {
        format!("{}/{}", self.join(&self.questions_path), discussion)
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_use_default_paths() {
        let endpoints = ChatEndpoints::new("http://localhost:9000");
        assert_eq!(
            endpoints.stream_url(),
            "http://localhost:9000/langchain/chat/stream"
        );
        let id = DiscussionId::from("discussion-1-abcdefg");
        assert_eq!(
            endpoints.events_url(&id),
            "http://localhost:9000/chat/discussion-1-abcdefg"
        );
        assert_eq!(
            endpoints.questions_url(&id),
            "http://localhost:9000/questions/discussion-1-abcdefg"
        );
    }

    #[test]
    fn trailing_slash_on_base_url_is_tolerated() {
        let endpoints = ChatEndpoints::new("http://localhost:9000/");
        assert_eq!(
            endpoints.invoke_url(),
            "http://localhost:9000/langchain/chat/invoke"
        );
    }
}
