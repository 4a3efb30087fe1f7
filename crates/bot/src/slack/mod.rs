//! Slack integration.
//!
//! This module provides:
//! - [`ChatTransport`], the chat operations the workflow needs
//! - [`SlackClient`], its Web API implementation
//! - Legacy attachment and callback types
//! - Request signature verification

mod client;
mod error;
pub mod format;
mod signature;
mod transport;
mod types;

pub use client::SlackClient;
pub use error::SlackError;
pub use signature::{SignatureVerifier, constant_time_compare};
pub use transport::ChatTransport;
pub use types::{
    ActionOption, Attachment, AttachmentAction, AttachmentField, ButtonStyle, EventEnvelope,
    InteractionAction, InteractionCallback, InteractionChannel, InteractionUser, Message,
    MessageEvent, PostedMessage, SelectedOption, SlackProfile, SlackUser, UserProfile,
};
