//! Sidechat Models - Shared chat data types.
//!
//! This crate provides the vocabulary used across the sidechat workspace:
//! - Message roles, display sides, and handles
//! - The append-only conversation [`Transcript`]
//! - Client-generated [`DiscussionId`]s correlating questions with answers

pub mod discussion;
pub mod message;

pub use discussion::DiscussionId;
pub use message::{Message, MessageId, Role, Side, Transcript};
