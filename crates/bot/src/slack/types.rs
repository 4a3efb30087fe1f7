//! Slack wire types.
//!
//! Messages are built from legacy attachments: each workflow step is one
//! attachment carrying the request identifier as its `callback_id`, and the
//! buttons and menus a user can click.
//!
//! See: <https://api.slack.com/legacy/interactive-messages>

use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// A message as posted, updated, or returned to an interaction callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Top-level message text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// One attachment per workflow step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Ask Slack to replace the message the interaction came from.
    #[serde(default, skip_serializing_if = "is_false")]
    pub replace_original: bool,
}

impl Message {
    /// Create a plain text message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Create a message made of a single attachment.
    #[must_use]
    pub fn with_attachment(attachment: Attachment) -> Self {
        Self {
            attachments: vec![attachment],
            ..Self::default()
        }
    }
}

/// A legacy message attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Hex colour of the attachment's side bar.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    /// Correlates clicks on this attachment's actions with a pending request.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub callback_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<AttachmentAction>,
}

/// A short field rendered under an attachment's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "short")]
    pub is_short: bool,
}

impl AttachmentField {
    /// Create an untitled field.
    #[must_use]
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }
}

/// A button or menu inside an attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentAction {
    /// Action name reported back in the interaction callback.
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// `button` or `select`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub style: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ActionOption>,
}

impl AttachmentAction {
    /// Create a button.
    #[must_use]
    pub fn button(name: &str, text: &str, style: ButtonStyle) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
            kind: "button".to_string(),
            style: style.as_str().to_string(),
            ..Self::default()
        }
    }

    /// Create a single-select menu.
    #[must_use]
    pub fn select(name: &str, text: &str, options: Vec<ActionOption>) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
            kind: "select".to_string(),
            options,
            ..Self::default()
        }
    }
}

/// Button style (affects color).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    /// Green primary button.
    Primary,
    /// Red danger button.
    Danger,
}

impl ButtonStyle {
    /// Slack's name for the style.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Danger => "danger",
        }
    }
}

/// An entry of a select menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOption {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: String,
}

impl ActionOption {
    /// Create an option whose label is its value.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            text: value.to_string(),
            value: value.to_string(),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Response from `chat.postMessage` and `chat.update`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Channel ID where the message lives.
    #[serde(default)]
    pub channel: Option<String>,
    /// Message timestamp (unique ID).
    #[serde(default)]
    pub ts: Option<String>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `users.info`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoResponse {
    pub ok: bool,
    #[serde(default)]
    pub user: Option<SlackUser>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A Slack user as returned by `users.info`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile: SlackProfile,
}

/// The profile part of a [`SlackUser`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackProfile {
    #[serde(default)]
    pub email: Option<String>,
}

/// Where a posted message ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

/// A chat user resolved through the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    /// Empty when the profile has no visible email.
    pub email: String,
}

impl From<SlackUser> for UserProfile {
    fn from(user: SlackUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.profile.email.unwrap_or_default(),
        }
    }
}

// =============================================================================
// Inbound Types
// =============================================================================

/// Interaction callback sent when a user clicks a button or picks a menu item.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionCallback {
    /// Verification token shared with the Slack app.
    #[serde(default)]
    pub token: String,
    /// The `callback_id` of the attachment that was clicked.
    #[serde(default)]
    pub callback_id: String,
    pub channel: InteractionChannel,
    pub user: InteractionUser,
    /// Timestamp of the message holding the attachment.
    #[serde(default)]
    pub message_ts: String,
    /// Actions that were triggered; Slack sends exactly one.
    #[serde(default)]
    pub actions: Vec<InteractionAction>,
    /// The message as it was when the user clicked.
    #[serde(default)]
    pub original_message: Message,
}

/// Channel where an interaction occurred.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// User who triggered an interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Action that was triggered.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionAction {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
    /// Chosen entries of a select menu.
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

/// A chosen entry of a select menu.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOption {
    #[serde(default)]
    pub value: String,
}

/// Envelope of an Events API request.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Handshake sent when the request URL is configured.
    UrlVerification {
        #[serde(default)]
        token: String,
        challenge: String,
    },
    /// A subscribed event.
    EventCallback {
        #[serde(default)]
        token: String,
        event: MessageEvent,
    },
    /// Any other envelope type.
    #[serde(other)]
    Unsupported,
}

/// A channel message event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageEvent {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl MessageEvent {
    /// Whether this is a plain message written by a human.
    #[must_use]
    pub fn is_user_message(&self) -> bool {
        self.kind == "message" && self.subtype.is_none() && self.bot_id.is_none()
    }
}
