//! The chat widget organism.

use tracing::{debug, info, warn};

use sidechat_models::{MessageId, Role, Side};
use sidechat_transport::{AnswerChannel, AnswerEvent, TransportError};

use crate::ui::ChatUi;

/// Notice shown when the event channel comes up.
const CONNECTED_NOTICE: &str = "Connection to server established.";
/// Notice shown when the answer channel goes away.
const CLOSED_NOTICE: &str = "Connection error or stream closed.";
/// Notice shown when a question never reached the server.
const SEND_FAILED_NOTICE: &str = "Error: Could not send question to server.";
/// Default greeting added on mount.
const DEFAULT_WELCOME: &str = "Hello! How can I help you today?";

/// Widget behavior knobs.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Greeting added on mount; `None` mounts silently.
    pub welcome_message: Option<String>,
    /// Appended to every transported question, not to the echoed bubble.
    pub prompt_suffix: Option<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            welcome_message: Some(DEFAULT_WELCOME.to_string()),
            prompt_suffix: None,
        }
    }
}

/// One chat conversation wired to one answer channel and one UI.
///
/// An explicit instance with an explicit lifecycle: the welcome message
/// appears on [`mount`](Self::mount) and the channel is torn down on
/// [`unmount`](Self::unmount) or drop. Nothing happens at construction.
pub struct ChatWidget<U: ChatUi> {
    ui: U,
    channel: Box<dyn AnswerChannel>,
    config: WidgetConfig,
    open_bubble: Option<MessageId>,
    mounted: bool,
}

impl<U: ChatUi> ChatWidget<U> {
    pub fn new(ui: U, channel: Box<dyn AnswerChannel>, config: WidgetConfig) -> Self {
        Self {
            ui,
            channel,
            config,
            open_bubble: None,
            mounted: false,
        }
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// Bring the widget up; adds the welcome message once.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        if let Some(welcome) = &self.config.welcome_message {
            self.ui.message_add(Role::Bot, Side::Left, welcome);
        }
        info!("chat widget mounted");
    }

    /// Take the widget down and close the answer channel.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.channel.close();
        info!("chat widget unmounted");
    }

    /// Echo the user's message and start the exchange.
    ///
    /// Whitespace-only input does nothing at all. A submission failure is
    /// reported through the UI; the return value says whether the
    /// question actually went out.
    pub async fn submit(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.ui.message_add(Role::User, Side::Right, text);
        let outgoing = match &self.config.prompt_suffix {
            Some(suffix) => format!("{text}{suffix}"),
            None => text.to_string(),
        };
        match self.channel.ask(&outgoing).await {
            Ok(()) => true,
            Err(error) => {
                warn!("question submission failed: {error}");
                self.ui.report_error(&error_notice(&error));
                false
            }
        }
    }

    /// Apply the next answer event to the UI.
    ///
    /// Returns `false` once the channel has shut down and no further
    /// event will arrive.
    pub async fn pump(&mut self) -> bool {
        let Some(event) = self.channel.next_event().await else {
            return false;
        };
        self.apply(event)
    }

    /// Run one full exchange: submit, then pump until the answer bubble
    /// completes or the channel goes away.
    pub async fn run_exchange(&mut self, text: &str) {
        if !self.submit(text).await {
            return;
        }
        while let Some(event) = self.channel.next_event().await {
            let done = matches!(
                event,
                AnswerEvent::Completed | AnswerEvent::Failed(_) | AnswerEvent::Closed { .. }
            );
            let alive = self.apply(event);
            if done || !alive {
                break;
            }
        }
    }

    fn apply(&mut self, event: AnswerEvent) -> bool {
        match event {
            AnswerEvent::Opened => {
                self.ui.message_add(Role::System, Side::Left, CONNECTED_NOTICE);
            }
            AnswerEvent::Delta(text) => match self.open_bubble {
                // The first fragment opens the answer bubble...
                None => {
                    let id = self.ui.message_add(Role::Bot, Side::Left, &text);
                    self.open_bubble = Some(id);
                }
                // ...and every further fragment extends the same one.
                Some(id) => self.ui.message_append(id, &text),
            },
            AnswerEvent::Completed => {
                debug!("answer bubble sealed");
                self.open_bubble = None;
            }
            AnswerEvent::Failed(error) => {
                self.open_bubble = None;
                self.ui.report_error(&error_notice(&error));
            }
            AnswerEvent::Closed { error } => {
                self.open_bubble = None;
                if let Some(error) = error {
                    warn!("answer channel closed: {error}");
                }
                self.ui.report_error(CLOSED_NOTICE);
                return false;
            }
        }
        true
    }
}

impl<U: ChatUi> Drop for ChatWidget<U> {
    fn drop(&mut self) {
        if self.mounted {
            self.channel.close();
        }
    }
}

fn error_notice(error: &TransportError) -> String {
    match error {
        TransportError::Api { detail, .. } => format!("Error: {detail}"),
        TransportError::Http(_) => SEND_FAILED_NOTICE.to_string(),
        other => format!("Error: {other}"),
    }
}
