//! Sidechat Transport - question submission and incremental answer delivery.
//!
//! Three ways to move a server-produced answer into the widget:
//! - [`StreamingClient::invoke`] - one buffered request/response exchange
//! - [`StreamingClient::stream_answer`] - a chunked response body decoded
//!   into ordered text fragments as it arrives
//! - [`EventChannels`] - a session-scoped SSE channel delivering one
//!   complete message per server event
//!
//! The [`AnswerChannel`] trait unifies the chunked and SSE flows behind a
//! single accumulation policy so the widget has exactly one render path.

pub mod channel;
pub mod config;
pub mod decode;
pub mod error;
pub mod events;
mod http_client;
pub mod questions;
pub mod streaming;

// Re-export commonly used types
pub use channel::{AnswerChannel, AnswerEvent, SseAnswers, StreamingAnswers};
pub use config::ChatEndpoints;
pub use decode::{AnswerLineDecoder, SseEvent, SseEventDecoder};
pub use error::{Result, TransportError};
pub use events::{ChannelEvent, EventChannel, EventChannels};
pub use questions::QuestionClient;
pub use streaming::{FragmentStream, StreamingClient};
