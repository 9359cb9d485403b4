//! Message types and the conversation transcript.

use serde::{Deserialize, Serialize};

/// Speaker role of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
    System,
}

/// Which side of the conversation a bubble renders on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Handle addressing one message within its transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

/// One chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub side: Side,
    pub content: String,
}

/// Ordered, append-only message store.
///
/// Messages are never removed or reordered. [`Transcript::append`] is the
/// only mutation and exists for incrementally streamed bot messages; every
/// other message is written once.
#[derive(Debug, Default)]
pub struct Transcript {
    next_id: u64,
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new message and return its handle.
    pub fn add(&mut self, role: Role, side: Side, content: impl Into<String>) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message {
            id,
            role,
            side,
            content: content.into(),
        });
        id
    }

    /// Extend an existing message's content. Returns `false` when the
    /// handle is unknown.
    pub fn append(&mut self, id: MessageId, delta: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.content.push_str(delta);
                true
            }
            None => false,
        }
    }

    /// Current content of a message.
    pub fn content(&self, id: MessageId) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.content.as_str())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_ordered() {
        let mut transcript = Transcript::new();
        let a = transcript.add(Role::User, Side::Right, "hello");
        let b = transcript.add(Role::Bot, Side::Left, "hi");
        assert_ne!(a, b);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].id, a);
        assert_eq!(transcript.messages()[1].id, b);
    }

    #[test]
    fn append_extends_only_the_target() {
        let mut transcript = Transcript::new();
        let bot = transcript.add(Role::Bot, Side::Left, "Hel");
        let other = transcript.add(Role::User, Side::Right, "unrelated");
        assert!(transcript.append(bot, "lo"));
        assert_eq!(transcript.content(bot), Some("Hello"));
        assert_eq!(transcript.content(other), Some("unrelated"));
    }

    #[test]
    fn append_to_unknown_handle_is_rejected() {
        let mut transcript = Transcript::new();
        let id = transcript.add(Role::Bot, Side::Left, "x");
        let mut stale = Transcript::new();
        stale.add(Role::Bot, Side::Left, "y");
        let foreign = stale.add(Role::Bot, Side::Left, "z");
        assert!(transcript.append(id, "!"));
        assert!(!transcript.append(foreign, "!"));
    }
}
