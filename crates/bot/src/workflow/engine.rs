//! Applying interactions to pending requests.

use esa_gatekeeper_core::{RequestId, RequestKind};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use super::action::{Action, Permission};
use super::approvers::Approvers;
use super::execute::{ExecutionJob, ExecutionReport, Executor};
use super::render::{self, Renderer};
use super::request::{Outcome, PendingRequest, RequestState};
use super::store::PendingStore;
use crate::slack::Message;
use crate::slack::format::{inline_code, user_link};

/// The user who clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

/// A decoded button or menu click.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub request_id: RequestId,
    pub action: Action,
    pub actor: Actor,
    /// Value picked in a select menu.
    pub selection: Option<String>,
    pub channel_id: String,
    /// Timestamp of the message the click came from.
    pub message_ts: String,
    /// The message the click came from, as Slack sent it back.
    pub original: Message,
}

/// How an interaction was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Moved to the next step.
    Advanced,
    /// Approved and handed to the executor.
    Approved,
    Cancelled,
    Rejected,
    /// No such request in the store.
    Expired,
    /// The actor lacks the permission.
    Unauthorized,
    /// The action does not apply to the request in its current state.
    Invalid,
    /// The request is already closed.
    Stale,
}

/// Result of handling an interaction.
#[derive(Debug)]
pub struct Transition {
    pub verdict: Verdict,
    /// Replacement for the original message.
    pub message: Message,
    /// Set when the request was approved.
    pub execution: Option<JoinHandle<ExecutionReport>>,
}

impl Transition {
    const fn reply(verdict: Verdict, message: Message) -> Self {
        Self {
            verdict,
            message,
            execution: None,
        }
    }
}

/// Why [`advance`] refused a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    Unauthorized,
    Closed(RequestState),
    OutOfStep(RequestState),
    KindMismatch(RequestKind),
    MissingOrganization,
    UnknownOrganization(String),
}

impl Refusal {
    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        match self {
            Self::Unauthorized => Verdict::Unauthorized,
            Self::Closed(_) => Verdict::Stale,
            Self::OutOfStep(_)
            | Self::KindMismatch(_)
            | Self::MissingOrganization
            | Self::UnknownOrganization(_) => Verdict::Invalid,
        }
    }

    fn hint(&self, action: Action, actor: &Actor) -> String {
        match self {
            Self::Unauthorized => format!(
                ":warning: {} does not have {} permission",
                user_link(&actor.id),
                action.verb()
            ),
            Self::Closed(state) => format!(":warning: This request is {}", state.describe()),
            Self::OutOfStep(state) => format!(
                ":warning: Cannot {} a request that is {}",
                action.verb(),
                state.describe()
            ),
            Self::KindMismatch(kind) => {
                format!(":warning: This request is not a {kind} request")
            }
            Self::MissingOrganization => ":warning: Select an organization".to_string(),
            Self::UnknownOrganization(org) => {
                format!(":warning: Unknown organization: {}", inline_code(org))
            }
        }
    }
}

/// Compute the request that results from `action`, without side effects.
///
/// Checks run in order: permission, closed request, then applicability of the
/// action to the request's kind and state.
///
/// # Errors
///
/// Returns the [`Refusal`] describing the first failed check.
pub fn advance(
    request: &PendingRequest,
    action: Action,
    actor_id: &str,
    is_admin: bool,
    selection: Option<&str>,
    organizations: &[String],
) -> Result<PendingRequest, Refusal> {
    let permitted = match action.permission() {
        Permission::Owner => request.is_owned_by(actor_id),
        Permission::Administrator => is_admin,
        Permission::OwnerOrAdministrator => is_admin || request.is_owned_by(actor_id),
    };
    if !permitted {
        return Err(Refusal::Unauthorized);
    }
    if request.state.is_closed() {
        return Err(Refusal::Closed(request.state));
    }

    let mut next = request.clone();
    next.state = match (action, request.state) {
        (Action::Confirm(kind) | Action::Approve(kind), _) if kind != request.kind() => {
            return Err(Refusal::KindMismatch(kind));
        }
        (Action::SelectOrganization, _) if request.kind() != RequestKind::Invite => {
            return Err(Refusal::KindMismatch(RequestKind::Invite));
        }
        (Action::SelectOrganization, RequestState::AwaitingOrganization) => {
            let organization = selection.map(str::trim).unwrap_or_default();
            if organization.is_empty() {
                return Err(Refusal::MissingOrganization);
            }
            if !organizations.iter().any(|o| o == organization) {
                return Err(Refusal::UnknownOrganization(organization.to_string()));
            }
            next.organization = Some(organization.to_string());
            RequestState::AwaitingConfirmation
        }
        (Action::Confirm(_), RequestState::Proposed | RequestState::AwaitingConfirmation) => {
            RequestState::AwaitingApproval
        }
        (Action::Approve(_), RequestState::AwaitingApproval) => RequestState::Executing,
        (
            Action::Cancel,
            RequestState::Proposed
            | RequestState::AwaitingOrganization
            | RequestState::AwaitingConfirmation,
        ) => RequestState::Terminated {
            outcome: Outcome::Cancelled,
        },
        (Action::Reject, RequestState::AwaitingApproval) => RequestState::Terminated {
            outcome: Outcome::Rejected,
        },
        (_, state) => return Err(Refusal::OutOfStep(state)),
    };
    Ok(next)
}

/// Applies interactions to the pending store and renders the outcome.
#[derive(Debug)]
pub struct WorkflowEngine {
    store: PendingStore,
    approvers: Approvers,
    organizations: Vec<String>,
    renderer: Renderer,
    executor: Executor,
}

impl WorkflowEngine {
    #[must_use]
    pub const fn new(
        store: PendingStore,
        approvers: Approvers,
        organizations: Vec<String>,
        renderer: Renderer,
        executor: Executor,
    ) -> Self {
        Self {
            store,
            approvers,
            organizations,
            renderer,
            executor,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &PendingStore {
        &self.store
    }

    /// Handle one interaction.
    ///
    /// The stored request changes only when the transition is accepted.
    /// Approval spawns the executor and returns without waiting for it.
    #[instrument(
        skip_all,
        fields(
            request_id = %interaction.request_id,
            action = interaction.action.name(),
            user_id = %interaction.actor.id,
        )
    )]
    pub async fn handle(&self, interaction: Interaction) -> Transition {
        let Interaction {
            request_id,
            action,
            actor,
            selection,
            channel_id,
            message_ts,
            original: mut message,
        } = interaction;

        let is_admin = self.approvers.is_admin(&actor.id);
        let outcome = self
            .store
            .transition(&request_id, |request| {
                advance(
                    request,
                    action,
                    &actor.id,
                    is_admin,
                    selection.as_deref(),
                    &self.organizations,
                )
            })
            .await;

        let request = match outcome {
            None => {
                info!("Request not found, it may have expired");
                render::mark_error(
                    &mut message,
                    &format!(":x: Request has expired: {request_id}"),
                );
                return Transition::reply(Verdict::Expired, message);
            }
            Some(Err(refusal)) => {
                warn!(reason = ?refusal, "Interaction refused");
                render::mark_hint(&mut message, &refusal.hint(action, &actor));
                return Transition::reply(refusal.verdict(), message);
            }
            Some(Ok(request)) => request,
        };

        info!(state = ?request.state, "Request advanced");
        let actor_link = user_link(&actor.id);
        match action {
            Action::SelectOrganization => {
                let organization = request.organization.as_deref().unwrap_or_default();
                render::mark_success(
                    &mut message,
                    &format!("Organization: {}", inline_code(organization)),
                );
                message
                    .attachments
                    .push(self.renderer.invite_confirmation(&request));
                Transition::reply(Verdict::Advanced, message)
            }
            Action::Confirm(_) => {
                render::mark_success(&mut message, "");
                message
                    .attachments
                    .push(self.renderer.review(&request, &self.approvers));
                Transition::reply(Verdict::Advanced, message)
            }
            Action::Approve(_) => {
                render::mark_success(
                    &mut message,
                    &format!(":white_check_mark: {actor_link} approved the request"),
                );
                let execution = self.executor.spawn(ExecutionJob {
                    request,
                    channel_id,
                    message_ts,
                    message: message.clone(),
                });
                Transition {
                    verdict: Verdict::Approved,
                    message,
                    execution: Some(execution),
                }
            }
            Action::Cancel => {
                render::mark_warning(
                    &mut message,
                    &format!(":x: {actor_link} canceled the request"),
                );
                Transition::reply(Verdict::Cancelled, message)
            }
            Action::Reject => {
                render::mark_warning(
                    &mut message,
                    &format!(":x: {actor_link} rejected the request"),
                );
                Transition::reply(Verdict::Rejected, message)
            }
        }
    }
}
