//! Error types for the transport layer.

use thiserror::Error;

/// Transport layer error types.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request never completed at the network level.
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server error {status}: {detail}")]
    Api { status: u16, detail: String },

    /// The connection failed mid-stream; terminal for that stream.
    #[error("stream error: {0}")]
    Stream(String),

    /// A live event channel already exists for this discussion.
    #[error("event channel already open for this discussion")]
    AlreadyOpen,

    /// Operation on a channel that has already shut down.
    #[error("channel closed")]
    Closed,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

// Truncate reported details to prevent leaking large or sensitive bodies.
const MAX_DETAIL: usize = 512;

#[derive(serde::Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Shape a non-success response into an [`TransportError::Api`].
///
/// Prefers the `{"detail": ...}` payload the backend emits on failure and
/// falls back to the HTTP status text when the body is not that JSON.
pub(crate) async fn response_to_error(response: reqwest::Response) -> TransportError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|parsed| parsed.detail)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    let detail = if detail.len() > MAX_DETAIL {
        format!("{}... [truncated]", &detail[..MAX_DETAIL])
    } else {
        detail
    };

    TransportError::Api {
        status: status.as_u16(),
        detail,
    }
}
