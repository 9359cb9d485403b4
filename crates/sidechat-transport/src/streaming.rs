//! Request-scoped answer transport (buffered and chunked variants).

use std::pin::Pin;

use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ChatEndpoints;
use crate::decode::AnswerLineDecoder;
use crate::error::{Result, TransportError, response_to_error};
use crate::http_client::build_http_client;

/// Ordered fragments decoded from one streaming exchange.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[derive(Deserialize)]
struct InvokeResponse {
    output: String,
}

/// Client for the request-scoped answer endpoints.
///
/// [`invoke`](Self::invoke) buffers the whole answer;
/// [`stream_answer`](Self::stream_answer) decodes fragments as the
/// response body arrives. Each call is one exchange; the client itself is
/// reusable and cheap to clone.
#[derive(Debug, Clone)]
pub struct StreamingClient {
    client: reqwest::Client,
    endpoints: ChatEndpoints,
    cancel: CancellationToken,
}

impl StreamingClient {
    pub fn new(endpoints: ChatEndpoints) -> Self {
        Self {
            client: build_http_client(),
            endpoints,
            cancel: CancellationToken::new(),
        }
    }

    /// Tie every exchange started by this client to the given token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Buffered variant: POST the question, await the complete answer.
    pub async fn invoke(&self, input: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoints.invoke_url())
            .json(&json!({ "input": input }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(response_to_error(response).await);
        }
        let data: InvokeResponse = response.json().await?;
        Ok(data.output)
    }

    /// Streamed variant: POST the question and decode the chunked answer
    /// body into text fragments as it arrives.
    ///
    /// Fragments come out in exact arrival order, and the next read is not
    /// issued until the previous fragment has been consumed, so at most
    /// one read is outstanding on the connection. On a connect failure or
    /// a non-success status the stream yields a single error and ends
    /// without producing any fragment; a mid-stream read failure likewise
    /// ends the stream after one terminal error, never a retry.
    /// Completion is implicit: the stream just ends. Two concurrent calls
    /// are not ordered relative to each other.
    pub fn stream_answer(&self, input: &str) -> FragmentStream {
        let client = self.client.clone();
        let url = self.endpoints.stream_url();
        let cancel = self.cancel.clone();
        let body = json!({ "input": input });

        Box::pin(async_stream::stream! {
            let response = match client.post(&url).json(&body).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    yield Err(TransportError::Http(e));
                    return;
                }
            };
            if !response.status().is_success() {
                yield Err(response_to_error(response).await);
                return;
            }

            let mut byte_stream = response.bytes_stream();
            let mut decoder = AnswerLineDecoder::new();

            loop {
                let chunk = tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("answer stream cancelled");
                        return;
                    }
                    chunk = byte_stream.next() => chunk,
                };
                let bytes = match chunk {
                    Some(Ok(bytes)) => bytes,
                    Some(Err(e)) => {
                        warn!("answer stream read failed: {e}");
                        yield Err(TransportError::Stream(e.to_string()));
                        return;
                    }
                    None => break,
                };
                for fragment in decoder.feed(&bytes) {
                    yield Ok(fragment);
                }
            }

            // A final line without a trailing newline still counts.
            if let Some(fragment) = decoder.finish() {
                yield Ok(fragment);
            }
        })
    }
}
