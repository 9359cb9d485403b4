//! One seam over the two answer flows.
//!
//! The chunked flow appends fragments into a single bubble while the SSE
//! flow delivers one complete message per server event. Rather than two
//! render paths, both express the same policy here: every [`AnswerEvent::Delta`]
//! up to the next [`AnswerEvent::Completed`] belongs to one message bubble.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use sidechat_models::DiscussionId;

use crate::config::ChatEndpoints;
use crate::error::{Result, TransportError};
use crate::events::{ChannelEvent, EVENT_BUFFER, EventChannel, EventChannels};
use crate::questions::QuestionClient;
use crate::streaming::StreamingClient;

/// Unified answer-channel notification.
#[derive(Debug)]
pub enum AnswerEvent {
    /// The underlying channel is ready (SSE flow only).
    Opened,
    /// A piece of the current answer bubble.
    Delta(String),
    /// The current answer bubble is complete.
    Completed,
    /// The current exchange failed; the channel may accept another ask.
    Failed(TransportError),
    /// The channel is down; nothing follows.
    Closed { error: Option<TransportError> },
}

/// A source of incrementally-delivered answers.
///
/// Accumulation policy: every [`AnswerEvent::Delta`] between the start of
/// an answer and the next [`AnswerEvent::Completed`] extends the same
/// message bubble. Interleaving of two concurrent `ask` calls on one
/// channel is undefined; callers run one exchange at a time.
#[async_trait]
pub trait AnswerChannel: Send {
    /// Start one question/answer exchange.
    async fn ask(&mut self, text: &str) -> Result<()>;

    /// Next notification, in arrival order; `None` once the channel has
    /// fully shut down.
    async fn next_event(&mut self) -> Option<AnswerEvent>;

    /// Tear down the underlying connection, if any.
    fn close(&mut self);
}

// ── Chunked flow ─────────────────────────────────────────────────────

/// Chunked flow: each `ask` runs one streaming request; fragments arrive
/// as deltas and the end of the response body completes the bubble.
pub struct StreamingAnswers {
    client: StreamingClient,
    tx: Option<mpsc::Sender<AnswerEvent>>,
    events: mpsc::Receiver<AnswerEvent>,
    cancel: CancellationToken,
}

impl StreamingAnswers {
    pub fn new(endpoints: ChatEndpoints) -> Self {
        let cancel = CancellationToken::new();
        let (tx, events) = mpsc::channel(EVENT_BUFFER);
        Self {
            client: StreamingClient::new(endpoints).with_cancellation(cancel.clone()),
            tx: Some(tx),
            events,
            cancel,
        }
    }
}

#[async_trait]
impl AnswerChannel for StreamingAnswers {
    async fn ask(&mut self, text: &str) -> Result<()> {
        let Some(tx) = self.tx.clone() else {
            return Err(TransportError::Closed);
        };
        let mut fragments = self.client.stream_answer(text);
        tokio::spawn(async move {
            while let Some(item) = fragments.next().await {
                let event = match item {
                    Ok(fragment) => AnswerEvent::Delta(fragment),
                    Err(error) => {
                        // One terminal failure per exchange; the channel
                        // itself stays usable for the next ask.
                        let _ = tx.send(AnswerEvent::Failed(error)).await;
                        return;
                    }
                };
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(AnswerEvent::Completed).await;
        });
        Ok(())
    }

    async fn next_event(&mut self) -> Option<AnswerEvent> {
        self.events.recv().await
    }

    fn close(&mut self) {
        self.cancel.cancel();
        self.tx = None;
    }
}

// ── SSE flow ─────────────────────────────────────────────────────────

/// Session flow: questions go out through the question endpoint; answers
/// arrive on the discussion's event channel, one complete bubble per
/// inbound event.
pub struct SseAnswers {
    questions: QuestionClient,
    channel: Option<EventChannel>,
    pending: VecDeque<AnswerEvent>,
    discussion: DiscussionId,
}

impl SseAnswers {
    /// Open the discussion's event channel and wire question submission to
    /// the same id. Fails when the discussion already has a live channel.
    pub fn connect(channels: &EventChannels, discussion: DiscussionId) -> Result<Self> {
        let channel = channels
            .open(&discussion)
            .ok_or(TransportError::AlreadyOpen)?;
        Ok(Self {
            questions: QuestionClient::new(channels.endpoints().clone()),
            channel: Some(channel),
            pending: VecDeque::new(),
            discussion,
        })
    }

    pub fn discussion(&self) -> &DiscussionId {
        &self.discussion
    }
}

#[async_trait]
impl AnswerChannel for SseAnswers {
    async fn ask(&mut self, text: &str) -> Result<()> {
        self.questions.submit(&self.discussion, text).await
    }

    async fn next_event(&mut self) -> Option<AnswerEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        let channel = self.channel.as_mut()?;
        match channel.next_event().await? {
            ChannelEvent::Opened => Some(AnswerEvent::Opened),
            ChannelEvent::Message(text) => {
                // One complete bubble per inbound event.
                self.pending.push_back(AnswerEvent::Completed);
                Some(AnswerEvent::Delta(text))
            }
            ChannelEvent::Closed { error } => {
                self.channel = None;
                Some(AnswerEvent::Closed { error })
            }
        }
    }

    fn close(&mut self) {
        if let Some(channel) = &self.channel {
            channel.close();
        }
    }
}
