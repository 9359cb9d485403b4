//! Sidechat Widget - lifecycle and render wiring over an answer channel.
//!
//! [`ChatWidget`] owns one conversation: it echoes the user's questions,
//! drives an [`AnswerChannel`](sidechat_transport::AnswerChannel), and
//! renders incremental answers through the [`ChatUi`] seam.

pub mod ui;
pub mod widget;

pub use ui::{ChatUi, TranscriptUi};
pub use widget::{ChatWidget, WidgetConfig};
