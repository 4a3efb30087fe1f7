//! Message rendering for workflow steps.
//!
//! A workflow message accumulates one attachment per step. Closing a step
//! recolours its attachment and removes its controls; hints annotate the
//! current step without touching its controls.

use chrono::{DateTime, FixedOffset, Utc};
use esa_gatekeeper_core::{RequestId, RequestKind};

use super::Clock;
use super::action::Action;
use super::approvers::Approvers;
use super::request::PendingRequest;
use crate::slack::format::{code_block, user_link};
use crate::slack::{ActionOption, Attachment, AttachmentAction, AttachmentField, ButtonStyle, Message};

/// Status palette for attachment side bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// In progress.
    Blue,
    /// Succeeded.
    Green,
    /// Closed without execution.
    Yellow,
    /// Needs attention.
    Orange,
    /// Failed.
    Red,
}

impl Color {
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Blue => "#0000FF",
            Self::Green => "#00FF00",
            Self::Yellow => "#FFFF00",
            Self::Orange => "#FFA500",
            Self::Red => "#FF0000",
        }
    }
}

/// Annotate the current step with a hint, keeping its controls.
pub fn mark_hint(message: &mut Message, text: &str) {
    if let Some(last) = message.attachments.last_mut() {
        last.color = Color::Orange.hex().to_string();
        last.fields.push(AttachmentField::value(text));
    }
}

/// Close the current step with `color`. An empty `text` keeps the step's text.
pub fn close_step(message: &mut Message, color: Color, text: &str) {
    if let Some(last) = message.attachments.last_mut() {
        last.color = color.hex().to_string();
        last.actions.clear();
        last.fields.clear();
        if !text.is_empty() {
            last.text = text.to_string();
        }
    }
}

pub fn mark_success(message: &mut Message, text: &str) {
    close_step(message, Color::Green, text);
}

pub fn mark_warning(message: &mut Message, text: &str) {
    close_step(message, Color::Yellow, text);
}

pub fn mark_error(message: &mut Message, text: &str) {
    close_step(message, Color::Red, text);
}

/// Builds step attachments with time-stamped titles.
#[derive(Clone)]
pub struct Renderer {
    offset: FixedOffset,
    clock: Clock,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    #[must_use]
    pub fn new(offset: FixedOffset, clock: Clock) -> Self {
        Self { offset, clock }
    }

    /// Convert a UTC time to the display time zone.
    #[must_use]
    pub fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset)
    }

    /// `"MM/DD HH:MM - step"` in the display time zone.
    #[must_use]
    pub fn title(&self, step: &str) -> String {
        let now = self.local((self.clock)());
        format!("{} - {step}", now.format("%m/%d %H:%M"))
    }

    fn step(
        &self,
        step: &str,
        text: String,
        callback_id: &RequestId,
        actions: Vec<AttachmentAction>,
    ) -> Attachment {
        Attachment {
            title: self.title(step),
            text,
            color: Color::Blue.hex().to_string(),
            callback_id: callback_id.to_string(),
            actions,
            ..Attachment::default()
        }
    }

    /// First message of an invite: pick the invitee's organization.
    #[must_use]
    pub fn invite_proposal(
        &self,
        request: &PendingRequest,
        organizations: &[String],
        self_invite: bool,
    ) -> Message {
        let text = if self_invite {
            "Select your organization"
        } else {
            "Select the organization of the account to invite"
        };
        let options = organizations.iter().map(|o| ActionOption::new(o)).collect();
        Message::with_attachment(self.step(
            "Select organization",
            text.to_string(),
            &request.id,
            vec![
                AttachmentAction::select(
                    Action::INVITE_SELECT_ORGANIZATION,
                    "Organization",
                    options,
                ),
                cancel_button(),
            ],
        ))
    }

    /// Second step of an invite, once the organization is known.
    #[must_use]
    pub fn invite_confirmation(&self, request: &PendingRequest) -> Attachment {
        let lines = [
            format!("Requester: {}", user_link(&request.owner.id)),
            format!("Invitation email: {}", request.target.value()),
            format!(
                "Organization: {}",
                request.organization.as_deref().unwrap_or_default()
            ),
        ];
        self.step(
            "Confirm",
            format!(
                "Check the account invitation request\n{}",
                code_block(&lines)
            ),
            &request.id,
            vec![
                AttachmentAction::button(Action::INVITE_CONFIRM, "OK, invite", ButtonStyle::Primary),
                cancel_button(),
            ],
        )
    }

    /// First message of a delete.
    #[must_use]
    pub fn delete_proposal(&self, request: &PendingRequest, profile_url: &str) -> Message {
        let lines = [
            format!("Requester: {}", user_link(&request.owner.id)),
            format!("Profile: {profile_url}"),
        ];
        Message::with_attachment(self.step(
            "Confirm",
            format!(
                "Check the account deletion request\n{}",
                code_block(&lines)
            ),
            &request.id,
            vec![
                AttachmentAction::button(Action::DELETE_CONFIRM, "OK, delete", ButtonStyle::Primary),
                cancel_button(),
            ],
        ))
    }

    /// First message of a cleanup. `targets` holds one line per member.
    #[must_use]
    pub fn cleanup_proposal(
        &self,
        request: &PendingRequest,
        cutoff: DateTime<Utc>,
        targets: &[String],
    ) -> Message {
        let mut lines = vec![
            format!("Requester: {}", user_link(&request.owner.id)),
            format!(
                "Condition: delete {} expired accounts last accessed before {}",
                targets.len(),
                self.local(cutoff).format("%Y/%m/%d")
            ),
        ];
        lines.extend_from_slice(targets);
        Message::with_attachment(self.step(
            "Confirm",
            format!(
                "Check the expired account deletion request\n{}",
                code_block(&lines)
            ),
            &request.id,
            vec![
                AttachmentAction::button(
                    Action::CLEANUP_CONFIRM,
                    "OK, cleanup",
                    ButtonStyle::Primary,
                ),
                cancel_button(),
            ],
        ))
    }

    /// Review step asking the administrators to approve.
    #[must_use]
    pub fn review(&self, request: &PendingRequest, approvers: &Approvers) -> Attachment {
        self.step(
            "Review",
            format!(
                ":pray: Approval from administrators {} is required",
                approvers.mention()
            ),
            &request.id,
            vec![
                AttachmentAction::button(
                    Action::Approve(request.kind()).name(),
                    "Approve",
                    ButtonStyle::Primary,
                ),
                AttachmentAction::button(Action::REJECT, "Reject", ButtonStyle::Danger),
            ],
        )
    }

    /// Progress step appended when an approved request starts executing.
    #[must_use]
    pub fn execution_started(&self, kind: RequestKind) -> Attachment {
        let text = match kind {
            RequestKind::Invite => ":car: Starting invite account ...",
            RequestKind::Delete => ":car: Starting delete account ...",
            RequestKind::Cleanup => ":car: Starting delete expired account ...",
        };
        Attachment {
            title: self.title("Execute"),
            text: text.to_string(),
            color: Color::Blue.hex().to_string(),
            ..Attachment::default()
        }
    }
}

fn cancel_button() -> AttachmentAction {
    AttachmentAction::button(Action::CANCEL, "Cancel", ButtonStyle::Danger)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use esa_gatekeeper_core::ScreenName;

    use super::*;
    use crate::slack::UserProfile;
    use crate::workflow::request::Target;

    fn renderer() -> Renderer {
        let at = Utc.with_ymd_and_hms(2024, 3, 31, 23, 30, 0).unwrap();
        Renderer::new(FixedOffset::east_opt(9 * 3600).unwrap(), Arc::new(move || at))
    }

    fn delete_request() -> PendingRequest {
        PendingRequest::new(
            RequestId::new("2024-03-31T23:30:00.000000000Z"),
            Target::Delete(ScreenName::parse("bob").unwrap()),
            UserProfile {
                id: "U1".to_string(),
                name: "alice".to_string(),
                email: String::new(),
            },
        )
    }

    #[test]
    fn test_title_uses_display_time_zone() {
        assert_eq!(renderer().title("Confirm"), "04/01 08:30 - Confirm");
    }

    #[test]
    fn test_hint_keeps_actions() {
        let renderer = renderer();
        let mut message = renderer.delete_proposal(&delete_request(), "https://x");
        mark_hint(&mut message, "nope");

        let last = message.attachments.last().unwrap();
        assert_eq!(last.color, Color::Orange.hex());
        assert_eq!(last.fields.len(), 1);
        assert_eq!(last.actions.len(), 2);
    }

    #[test]
    fn test_close_step_clears_controls() {
        let renderer = renderer();
        let mut message = renderer.delete_proposal(&delete_request(), "https://x");
        let text = message.attachments[0].text.clone();
        mark_hint(&mut message, "nope");
        mark_success(&mut message, "");

        let last = message.attachments.last().unwrap();
        assert_eq!(last.color, Color::Green.hex());
        assert!(last.actions.is_empty());
        assert!(last.fields.is_empty());
        assert_eq!(last.text, text);

        mark_error(&mut message, "boom");
        assert_eq!(message.attachments[0].text, "boom");
    }

    #[test]
    fn test_marks_on_empty_message_are_noops() {
        let mut message = Message::default();
        mark_hint(&mut message, "x");
        mark_warning(&mut message, "x");
        assert_eq!(message, Message::default());
    }

    #[test]
    fn test_review_uses_kind_specific_approve_action() {
        let renderer = renderer();
        let approvers = Approvers::new(
            vec![UserProfile {
                id: "A1".to_string(),
                name: "admin".to_string(),
                email: String::new(),
            }],
            None,
        )
        .unwrap();
        let review = renderer.review(&delete_request(), &approvers);
        assert_eq!(review.actions[0].name, Action::DELETE_APPROVE);
        assert_eq!(review.actions[1].name, Action::REJECT);
        assert!(review.text.contains("<@A1>"));
        assert_eq!(review.callback_id, "2024-03-31T23:30:00.000000000Z");
    }
}
