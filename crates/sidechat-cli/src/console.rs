//! Console rendering for the chat transcript.

use std::io::Write;

use sidechat_models::{MessageId, Role, Side, Transcript};
use sidechat_widget::ChatUi;

/// Prints bubbles as role-tagged lines; streamed deltas extend the
/// current line in place.
#[derive(Debug, Default)]
pub struct ConsoleUi {
    transcript: Transcript,
    /// Handle of the bubble currently streaming to the terminal.
    streaming: Option<MessageId>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn tag(role: Role) -> &'static str {
        match role {
            Role::User => "you",
            Role::Bot => "bot",
            Role::System => "system",
        }
    }

    fn end_streaming_line(&mut self) {
        if self.streaming.take().is_some() {
            println!();
        }
    }
}

impl ChatUi for ConsoleUi {
    fn message_add(&mut self, role: Role, side: Side, content: &str) -> MessageId {
        self.end_streaming_line();
        let id = self.transcript.add(role, side, content);
        match role {
            // Bot bubbles may keep growing; leave the line open.
            Role::Bot => {
                print!("[bot] {content}");
                let _ = std::io::stdout().flush();
                self.streaming = Some(id);
            }
            _ => println!("[{}] {content}", Self::tag(role)),
        }
        id
    }

    fn message_append(&mut self, id: MessageId, delta: &str) {
        self.transcript.append(id, delta);
        if self.streaming == Some(id) {
            print!("{delta}");
            let _ = std::io::stdout().flush();
        }
    }

    fn report_error(&mut self, detail: &str) {
        self.end_streaming_line();
        self.transcript.add(Role::System, Side::Left, detail);
        eprintln!("[system] {detail}");
    }
}
