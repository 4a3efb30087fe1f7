//! Integration tests for esa gatekeeper.
//!
//! [`TestContext`] wires the real workflow engine, command interpreter, and
//! router to in-memory fakes of Slack and esa, and a manually driven clock.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p esa-gatekeeper-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};
use esa_gatekeeper::commands::{CommandError, CommandInterpreter, CommandOutcome, CommandSettings};
use esa_gatekeeper::config::SlackConfig;
use esa_gatekeeper::esa::{AccountDirectory, EsaError, Member, MemberPage, MemberQuery};
use esa_gatekeeper::routes;
use esa_gatekeeper::slack::{
    ChatTransport, Message, MessageEvent, PostedMessage, SlackError, UserProfile,
};
use esa_gatekeeper::state::AppState;
use esa_gatekeeper::workflow::{
    Action, Actor, Approvers, Clock, Executor, Interaction, PendingStore, Renderer, Transition,
    WorkflowEngine,
};
use esa_gatekeeper_core::{Email, RequestId, ScreenName};
use secrecy::SecretString;
use tokio::sync::mpsc;

pub const CHANNEL: &str = "C_OPS";
pub const BOT_ID: &str = "U_BOT";
pub const OWNER: &str = "U_OWNER";
pub const ADMIN: &str = "U_ADMIN";
pub const OUTSIDER: &str = "U_OUTSIDER";
pub const VERIFICATION_TOKEN: &str = "Zq8rT2vX9wY4kL1mN6pB3cD7";
pub const TEAM: &str = "docs";

// =============================================================================
// Fakes
// =============================================================================

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock().unwrap() += by;
    }

    #[must_use]
    pub fn clock(self: &Arc<Self>) -> Clock {
        let clock = Arc::clone(self);
        Arc::new(move || clock.now())
    }
}

/// Records every message posted or updated.
#[derive(Default)]
pub struct FakeChat {
    users: HashMap<String, UserProfile>,
    pub posted: Mutex<Vec<(String, Message)>>,
    pub updates: Mutex<Vec<(String, String, Message)>>,
}

impl FakeChat {
    #[must_use]
    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            ..Self::default()
        }
    }

    pub fn posted(&self) -> Vec<(String, Message)> {
        self.posted.lock().unwrap().clone()
    }

    /// The most recently posted message.
    pub fn last_posted(&self) -> Message {
        self.posted.lock().unwrap().last().unwrap().1.clone()
    }

    pub fn updates(&self) -> Vec<Message> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, m)| m.clone())
            .collect()
    }
}

#[async_trait]
impl ChatTransport for FakeChat {
    async fn post_message(
        &self,
        channel: &str,
        message: &Message,
    ) -> Result<PostedMessage, SlackError> {
        let mut posted = self.posted.lock().unwrap();
        posted.push((channel.to_string(), message.clone()));
        Ok(PostedMessage {
            channel: channel.to_string(),
            ts: format!("1700000000.{:06}", posted.len()),
        })
    }

    async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        message: &Message,
    ) -> Result<(), SlackError> {
        self.updates
            .lock()
            .unwrap()
            .push((channel.to_string(), ts.to_string(), message.clone()));
        Ok(())
    }

    async fn user_info(&self, user_id: &str) -> Result<UserProfile, SlackError> {
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| SlackError::Api("user_not_found".to_string()))
    }
}

/// In-memory esa team. Members are listed in insertion order, so tests add
/// them oldest first, as esa returns them for a `last_accessed` query.
#[derive(Default)]
pub struct FakeDirectory {
    pub members: Mutex<Vec<Member>>,
    pub invited: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    /// Screen names whose deletion fails as already deleted.
    pub missing: Mutex<HashSet<String>>,
    pub list_calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn add_member(&self, screen_name: &str, last_accessed_at: DateTime<Utc>) {
        self.members.lock().unwrap().push(Member {
            name: screen_name.to_string(),
            screen_name: screen_name.to_string(),
            last_accessed_at: last_accessed_at.to_rfc3339(),
            ..Member::default()
        });
    }

    pub fn mark_missing(&self, screen_name: &str) {
        self.missing.lock().unwrap().insert(screen_name.to_string());
    }

    pub fn invited(&self) -> Vec<String> {
        self.invited.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountDirectory for FakeDirectory {
    fn team_name(&self) -> &str {
        TEAM
    }

    async fn invite(&self, email: &Email) -> Result<(), EsaError> {
        self.invited.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn delete(&self, screen_name: &ScreenName) -> Result<(), EsaError> {
        if self.missing.lock().unwrap().contains(screen_name.as_str()) {
            return Err(EsaError::AlreadyDeleted(screen_name.clone()));
        }
        self.deleted.lock().unwrap().push(screen_name.to_string());
        Ok(())
    }

    async fn list_members(&self, _query: &MemberQuery) -> Result<MemberPage, EsaError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let members = self.members.lock().unwrap().clone();
        Ok(MemberPage {
            total_count: u32::try_from(members.len()).unwrap(),
            members,
            ..MemberPage::default()
        })
    }
}

// =============================================================================
// Context
// =============================================================================

/// Adjustable settings.
#[derive(Debug, Clone)]
pub struct Options {
    pub allowed_email_domains: Vec<String>,
    pub min_expire_months: u32,
    pub organizations: Vec<String>,
    pub admin_group_id: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allowed_email_domains: Vec::new(),
            min_expire_months: 6,
            organizations: vec!["Org1".to_string(), "Other".to_string()],
            admin_group_id: None,
        }
    }
}

fn profile(id: &str, name: &str, email: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
    }
}

/// Fully wired bot with fake collaborators.
pub struct TestContext {
    pub chat: Arc<FakeChat>,
    pub directory: Arc<FakeDirectory>,
    pub clock: Arc<ManualClock>,
    pub store: PendingStore,
    pub engine: Arc<WorkflowEngine>,
    pub interpreter: CommandInterpreter,
    pub state: AppState,
    pub events: mpsc::Receiver<MessageEvent>,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    #[must_use]
    pub fn with_options(options: Options) -> Self {
        let chat = Arc::new(FakeChat::with_users([
            profile(BOT_ID, "gatekeeper", ""),
            profile(OWNER, "owner", "owner@example.com"),
            profile(ADMIN, "admin", "admin@example.com"),
            profile(OUTSIDER, "outsider", "outsider@example.com"),
        ]));
        let directory = Arc::new(FakeDirectory::default());
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap());

        let store = PendingStore::new(TimeDelta::days(7), clock.clock());
        let renderer = Renderer::new(FixedOffset::east_opt(9 * 3600).unwrap(), clock.clock());
        let approvers = Approvers::new(
            vec![profile(ADMIN, "admin", "admin@example.com")],
            options.admin_group_id.clone(),
        )
        .unwrap();
        let executor = Executor::new(chat.clone(), directory.clone(), renderer.clone());
        let engine = Arc::new(WorkflowEngine::new(
            store.clone(),
            approvers.clone(),
            options.organizations.clone(),
            renderer.clone(),
            executor,
        ));
        let interpreter = CommandInterpreter::new(
            chat.clone(),
            directory.clone(),
            store.clone(),
            approvers,
            renderer,
            CommandSettings {
                bot_id: BOT_ID.to_string(),
                bot_name: "gatekeeper".to_string(),
                channel_id: CHANNEL.to_string(),
                usage_url: None,
                allowed_email_domains: options.allowed_email_domains,
                min_expire_months: options.min_expire_months,
                organizations: options.organizations,
            },
        );

        let (events_tx, events) = mpsc::channel(8);
        let slack = SlackConfig {
            channel_id: CHANNEL.to_string(),
            bot_id: BOT_ID.to_string(),
            bot_token: SecretString::from("xoxb-test"),
            verification_token: SecretString::from(VERIFICATION_TOKEN),
            signing_secret: None,
            usage_url: None,
        };
        let state = AppState::new(&slack, engine.clone(), events_tx);

        Self {
            chat,
            directory,
            clock,
            store,
            engine,
            interpreter,
            state,
            events,
        }
    }

    /// The HTTP router, ready for `oneshot`.
    #[must_use]
    pub fn router(&self) -> Router {
        routes::routes().with_state(self.state.clone())
    }

    /// A channel message from `user`.
    #[must_use]
    pub fn message(user: &str, text: &str) -> MessageEvent {
        MessageEvent {
            kind: "message".to_string(),
            channel: CHANNEL.to_string(),
            user: user.to_string(),
            text: text.to_string(),
            ts: "1700000000.000001".to_string(),
            ..MessageEvent::default()
        }
    }

    /// Send `<@BOT> {args}` as `user`.
    pub async fn command(&self, user: &str, args: &str) -> Result<CommandOutcome, CommandError> {
        let event = Self::message(user, &format!("<@{BOT_ID}> {args}"));
        self.interpreter.handle(&event).await
    }

    /// Send a command expected to create a request.
    pub async fn propose(&self, user: &str, args: &str) -> RequestId {
        match self.command(user, args).await.unwrap() {
            CommandOutcome::Proposed(id) => id,
            other => panic!("expected a proposal, got {other:?}"),
        }
    }

    /// Click `action` on `message` as `user`.
    pub async fn click(
        &self,
        id: &RequestId,
        action: Action,
        user: &str,
        selection: Option<&str>,
        message: Message,
    ) -> Transition {
        self.engine
            .handle(Interaction {
                request_id: id.clone(),
                action,
                actor: Actor {
                    id: user.to_string(),
                    name: user.to_lowercase(),
                },
                selection: selection.map(str::to_string),
                channel_id: CHANNEL.to_string(),
                message_ts: "1700000000.000001".to_string(),
                original: message,
            })
            .await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Form body of an interaction callback, as Slack sends it.
#[must_use]
pub fn interaction_body(payload: &serde_json::Value) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("payload", &payload.to_string())
        .finish()
}
