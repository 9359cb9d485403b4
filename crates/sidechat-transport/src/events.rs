//! Session-scoped SSE answer channel.

use std::sync::Arc;

use dashmap::DashMap;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sidechat_models::DiscussionId;

use crate::config::ChatEndpoints;
use crate::decode::SseEventDecoder;
use crate::error::{TransportError, response_to_error};
use crate::http_client::build_http_client;

/// Events buffered per channel before the reader yields to the consumer.
pub(crate) const EVENT_BUFFER: usize = 64;

/// Lifecycle notifications from one event channel, in arrival order.
#[derive(Debug)]
pub enum ChannelEvent {
    /// The server accepted the stream.
    Opened,
    /// One inbound server event; always a complete message.
    Message(String),
    /// The channel is down; nothing is delivered after this. Carries the
    /// failure when there was one. Reconnecting is the caller's decision.
    Closed { error: Option<TransportError> },
}

/// Opens and guards session-keyed SSE channels.
///
/// At most one live channel exists per discussion id; opening an
/// already-open id is a no-op. The slot frees when its reader task exits,
/// so a fresh open after a close or failure succeeds.
#[derive(Debug, Clone)]
pub struct EventChannels {
    client: reqwest::Client,
    endpoints: ChatEndpoints,
    open: Arc<DashMap<DiscussionId, CancellationToken>>,
}

impl EventChannels {
    pub fn new(endpoints: ChatEndpoints) -> Self {
        Self {
            client: build_http_client(),
            endpoints,
            open: Arc::new(DashMap::new()),
        }
    }

    pub fn endpoints(&self) -> &ChatEndpoints {
        &self.endpoints
    }

    /// Open the channel for `discussion`, or `None` when one is live.
    pub fn open(&self, discussion: &DiscussionId) -> Option<EventChannel> {
        let cancel = CancellationToken::new();
        let mut claimed = false;
        self.open.entry(discussion.clone()).or_insert_with(|| {
            claimed = true;
            cancel.clone()
        });
        if !claimed {
            debug!(discussion = %discussion, "event channel already open");
            return None;
        }

        let (tx, events) = mpsc::channel(EVENT_BUFFER);
        let url = self.endpoints.events_url(discussion);
        let client = self.client.clone();
        let registry = Arc::clone(&self.open);
        let discussion = discussion.clone();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            run_reader(client, url, tx.clone(), task_cancel).await;
            // The slot frees before the last sender drops: the consumer
            // cannot observe the end of the stream while the slot is held.
            registry.remove(&discussion);
            drop(tx);
            debug!(discussion = %discussion, "event channel slot released");
        });

        Some(EventChannel { events, cancel })
    }
}

/// Consumer handle for one open SSE channel.
///
/// The channel is session-scoped: it stays up across any number of
/// question/answer cycles until an error, an explicit [`close`](Self::close),
/// or drop.
#[derive(Debug)]
pub struct EventChannel {
    events: mpsc::Receiver<ChannelEvent>,
    cancel: CancellationToken,
}

impl EventChannel {
    /// Next lifecycle event; `None` once the channel has fully shut down.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    /// Tear the channel down deterministically.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_reader(
    client: reqwest::Client,
    url: String,
    tx: mpsc::Sender<ChannelEvent>,
    cancel: CancellationToken,
) {
    let response = match client
        .get(&url)
        .header("Accept", "text/event-stream")
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            warn!("event channel connect failed: {e}");
            let _ = tx
                .send(ChannelEvent::Closed {
                    error: Some(TransportError::Http(e)),
                })
                .await;
            return;
        }
    };
    if !response.status().is_success() {
        let error = response_to_error(response).await;
        warn!("event channel rejected: {error}");
        let _ = tx.send(ChannelEvent::Closed { error: Some(error) }).await;
        return;
    }

    info!("event channel established");
    if tx.send(ChannelEvent::Opened).await.is_err() {
        return;
    }

    let mut byte_stream = response.bytes_stream();
    let mut decoder = SseEventDecoder::new();

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("event channel cancelled");
                return;
            }
            chunk = byte_stream.next() => chunk,
        };
        match chunk {
            Some(Ok(bytes)) => {
                for event in decoder.feed(&bytes) {
                    if tx.send(ChannelEvent::Message(event.data)).await.is_err() {
                        return;
                    }
                }
            }
            Some(Err(e)) => {
                warn!("event channel read failed: {e}");
                let _ = tx
                    .send(ChannelEvent::Closed {
                        error: Some(TransportError::Stream(e.to_string())),
                    })
                    .await;
                return;
            }
            None => {
                debug!("event channel ended by server");
                let _ = tx.send(ChannelEvent::Closed { error: None }).await;
                return;
            }
        }
    }
}
