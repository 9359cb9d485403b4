//! The rendering seam.

use sidechat_models::{MessageId, Role, Side, Transcript};
use tracing::warn;

/// The message-bubble widget this library drives.
///
/// Implementations render however they like; the core only ever creates a
/// bubble, extends one, or reports a failure.
pub trait ChatUi: Send {
    /// Create a new message bubble; the handle addresses later appends.
    fn message_add(&mut self, role: Role, side: Side, content: &str) -> MessageId;

    /// Extend an existing bubble with more text.
    fn message_append(&mut self, id: MessageId, delta: &str);

    /// Surface a connection or transport failure to the user.
    fn report_error(&mut self, detail: &str);
}

/// In-memory [`ChatUi`] over a [`Transcript`]; failures render as
/// left-side system messages.
#[derive(Debug, Default)]
pub struct TranscriptUi {
    transcript: Transcript,
}

impl TranscriptUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }
}

impl ChatUi for TranscriptUi {
    fn message_add(&mut self, role: Role, side: Side, content: &str) -> MessageId {
        self.transcript.add(role, side, content)
    }

    fn message_append(&mut self, id: MessageId, delta: &str) {
        if !self.transcript.append(id, delta) {
            warn!("append to unknown message handle");
        }
    }

    fn report_error(&mut self, detail: &str) {
        self.transcript.add(Role::System, Side::Left, detail);
    }
}
